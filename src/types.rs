use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::db::FieldConvention;

/// Main configuration stored in ~/.perfdash/config.json
///
/// `fieldConvention` has no default: deployments disagree on which lead and
/// activity columns carry ownership, and guessing silently skews every count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    pub field_convention: FieldConvention,
    /// User emails the seeder targets when none are given on the command line.
    #[serde(default)]
    pub seed_targets: Vec<String>,
}

/// Dashboard request as received from a surface. Dates are raw `YYYY-MM-DD`
/// strings; blank values count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardRequest {
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

impl DashboardRequest {
    pub fn for_employee(employee: &str) -> Self {
        Self {
            employee: Some(employee.to_string()),
            ..Self::default()
        }
    }

    pub fn between(mut self, from: &str, to: &str) -> Self {
        self.from_date = Some(from.to_string());
        self.to_date = Some(to.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmSection {
    pub total_leads: i64,
    pub total_opportunities: i64,
    pub active_customers: i64,
    pub conversion_rate: f64,
    pub total_lead_trend: f64,
    pub new_leads_month: i64,
    pub daily_leads: i64,
    pub sales_invoices: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinEntry {
    pub time: String,
    pub log_type: String,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub date: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrSection {
    pub present_days: i64,
    pub absent_days: i64,
    pub total_checkins: i64,
    pub total_checkouts: i64,
    pub recent_checkins: Vec<CheckinEntry>,
    pub recent_reports: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorSection {
    pub total: i64,
    pub daily: i64,
    pub client: i64,
    pub interview: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentsSection {
    pub total: i64,
}

/// Parallel label/value arrays, the shape chart widgets consume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl ChartSeries {
    pub fn total(&self) -> i64 {
        self.values.iter().sum()
    }
}

pub const ATTENDANCE_LABELS: [&str; 3] = ["Present", "Absent", "Half Day"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeSection {
    pub from_date: String,
    pub to_date: String,
}

impl From<&DateRange> for DateRangeSection {
    fn from(range: &DateRange) -> Self {
        Self {
            from_date: range.start_str(),
            to_date: range.end_str(),
        }
    }
}

/// Full dashboard response for one employee and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub crm: CrmSection,
    pub hr: HrSection,
    pub visitor: VisitorSection,
    pub daily_report: i64,
    pub appointments: AppointmentsSection,
    pub events_chart: ChartSeries,
    pub attendance_chart: ChartSeries,
    pub leads_pulse: ChartSeries,
    pub checkin_chart: ChartSeries,
    pub total_task: i64,
    pub date_range: DateRangeSection,
}

impl DashboardPayload {
    /// All counters zero, series empty. Attendance keeps its fixed labels.
    pub fn empty(range: &DateRange) -> Self {
        Self {
            crm: CrmSection::default(),
            hr: HrSection::default(),
            visitor: VisitorSection::default(),
            daily_report: 0,
            appointments: AppointmentsSection::default(),
            events_chart: ChartSeries::default(),
            attendance_chart: ChartSeries {
                labels: ATTENDANCE_LABELS.iter().map(|s| s.to_string()).collect(),
                values: vec![0; ATTENDANCE_LABELS.len()],
            },
            leads_pulse: ChartSeries::default(),
            checkin_chart: ChartSeries::default(),
            total_task: 0,
            date_range: DateRangeSection::from(range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_config_requires_field_convention() {
        let missing: Result<Config, _> = serde_json::from_str(r#"{"databasePath": "/tmp/x.db"}"#);
        assert!(missing.is_err());

        let config: Config = serde_json::from_str(
            r#"{"fieldConvention": {"lead": "leadOwner", "activityOwner": "owner"}}"#,
        )
        .expect("parse");
        assert!(config.database_path.is_none());
        assert!(config.seed_targets.is_empty());
    }

    #[test]
    fn test_empty_payload_shape() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            NaiveDate::from_ymd_opt(2024, 3, 31).expect("date"),
        );
        let json = serde_json::to_value(DashboardPayload::empty(&range)).expect("serialize");
        assert_eq!(json["crm"]["conversion_rate"], 0.0);
        assert_eq!(json["attendance_chart"]["labels"][2], "Half Day");
        assert_eq!(json["attendance_chart"]["values"], serde_json::json!([0, 0, 0]));
        assert_eq!(json["leads_pulse"]["labels"], serde_json::json!([]));
        assert_eq!(json["date_range"]["to_date"], "2024-03-31");
    }
}
