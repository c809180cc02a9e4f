//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("No database at {0}")]
    NotFound(std::path::PathBuf),
}

/// A row from the `employees` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbEmployee {
    pub id: String,
    pub employee_name: String,
    pub user_id: Option<String>,
    pub reports_to: Option<String>,
    pub department: Option<String>,
}

impl DbEmployee {
    pub fn new(id: &str, employee_name: &str, user_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            employee_name: employee_name.to_string(),
            user_id: user_id.map(str::to_string),
            reports_to: None,
            department: None,
        }
    }

    pub fn reporting_to(mut self, manager: &str) -> Self {
        self.reports_to = Some(manager.to_string());
        self
    }
}

/// A row from the `leads` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbLead {
    pub id: String,
    pub lead_name: String,
    pub lead_owner: Option<String>,
    pub qualified_by: Option<String>,
    pub qualified_on: Option<String>,
    pub status: String,
    pub customer: Option<String>,
    pub creation: String,
}

/// A row from the `opportunities` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbOpportunity {
    pub id: String,
    pub opportunity_from: Option<String>,
    pub opportunity_owner: Option<String>,
    pub status: String,
    pub creation: String,
}

/// A row from the `customers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCustomer {
    pub id: String,
    pub customer_name: String,
    pub customer_group: Option<String>,
    pub territory: Option<String>,
    pub disabled: bool,
    pub creation: String,
}

/// Attendance status values accepted by the `attendance` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[serde(rename = "Work From Home")]
    WorkFromHome,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::WorkFromHome => "Work From Home",
        }
    }
}

/// Document state of an attendance record. Cancelled rows never count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    Draft = 0,
    Submitted = 1,
    Cancelled = 2,
}

/// A row from the `attendance` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbAttendance {
    pub id: String,
    pub employee: String,
    pub attendance_date: String,
    pub status: AttendanceStatus,
    pub docstatus: DocStatus,
}

/// A row from the `daily_reports` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbDailyReport {
    pub id: String,
    pub employee: String,
    pub department: Option<String>,
    pub date: String,
    pub daily_summary: Option<String>,
}

/// Direction of a check-in log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    In,
    Out,
}

impl LogType {
    pub fn as_str(self) -> &'static str {
        match self {
            LogType::In => "IN",
            LogType::Out => "OUT",
        }
    }
}

/// A row from the `employee_checkins` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCheckin {
    pub id: String,
    pub employee: String,
    pub time: String,
    pub log_type: String,
    pub device_id: Option<String>,
}

/// A row from the `appointments` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbAppointment {
    pub id: String,
    pub scheduled_time: String,
    pub owner: Option<String>,
    pub custom_own: Option<String>,
}

/// A row from the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbEvent {
    pub id: String,
    pub subject: String,
    pub starts_on: String,
    pub event_type: Option<String>,
    pub sent_or_received: Option<String>,
    pub owner: Option<String>,
    pub custom_own: Option<String>,
}

/// A row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTask {
    pub id: String,
    pub subject: String,
    pub status: String,
    pub owner: Option<String>,
    pub custom_own: Option<String>,
    pub creation: String,
}

/// A row from the `visitors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbVisitor {
    pub id: String,
    pub host_employee: String,
    pub visit_date: String,
    pub purpose: Option<String>,
}

/// Attendance counts for one employee over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceStats {
    /// Present plus Work From Home.
    pub present: i64,
    pub absent: i64,
    pub half_day: i64,
}

/// Visitor counts for one host employee over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorStats {
    pub total: i64,
    pub on_last_day: i64,
    pub client: i64,
    pub interview: i64,
}
