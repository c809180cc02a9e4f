// Dashboard service
// Aggregates one employee's CRM, HR and activity records over a window.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::access::{can_view, Actor};
use crate::date_range::{month_start, parse_date, DateRange, DATE_FORMAT};
use crate::db::{
    DashboardDb, EventScope, FieldConvention, LeadCriteria, OwnedCriteria,
};
use crate::error::DashboardError;
use crate::types::{
    AppointmentsSection, ChartSeries, CheckinEntry, CrmSection, DashboardPayload,
    DashboardRequest, DateRangeSection, HrSection, ReportEntry, VisitorSection,
    ATTENDANCE_LABELS,
};

/// Rows kept in `hr.recent_checkins` and `hr.recent_reports`.
pub const RECENT_LIMIT: usize = 20;

/// Fixed buckets for the activity distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Call,
    Meeting,
    Event,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 4] = [
        EventCategory::Call,
        EventCategory::Meeting,
        EventCategory::Event,
        EventCategory::Other,
    ];

    /// Unknown and empty types land in `Other` so no event is dropped.
    pub fn from_event_type(event_type: Option<&str>) -> Self {
        match event_type.map(str::trim).unwrap_or("") {
            "Call" => EventCategory::Call,
            "Meeting" => EventCategory::Meeting,
            "Public" | "Private" | "Event" => EventCategory::Event,
            _ => EventCategory::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventCategory::Call => "Call",
            EventCategory::Meeting => "Meeting",
            EventCategory::Event => "Event",
            EventCategory::Other => "Other",
        }
    }
}

/// Build the dashboard for `request.employee` as seen by `actor`.
///
/// An employee without a linked user yields [`DashboardPayload::empty`].
/// Store failures propagate; they are never folded into the empty case.
pub fn get_employee_dashboard(
    db: &DashboardDb,
    actor: &Actor,
    convention: &FieldConvention,
    request: &DashboardRequest,
    today: NaiveDate,
) -> Result<DashboardPayload, DashboardError> {
    let employee = request
        .employee
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(DashboardError::EmployeeRequired)?;

    let from = parse_date(request.from_date.as_deref()).map_err(DashboardError::InvalidDate)?;
    let to = parse_date(request.to_date.as_deref()).map_err(DashboardError::InvalidDate)?;
    let range = DateRange::resolve(from, to, today).map_err(DashboardError::InvalidDate)?;
    log::debug!(
        "Dashboard for {} over {}..={}",
        employee,
        range.start_str(),
        range.end_str()
    );

    if !can_view(db, actor, employee)? {
        return Err(DashboardError::PermissionDenied {
            actor: actor.user_id.clone(),
            employee: employee.to_string(),
        });
    }

    let user = match db.user_id_for_employee(employee)? {
        Some(u) => u,
        None => {
            log::debug!("Employee {} has no linked user; returning empty dashboard", employee);
            return Ok(DashboardPayload::empty(&range));
        }
    };

    let crm = crm_section(db, convention, &user, &range)?;
    let (hr, checkin_chart, attendance_chart) = hr_section(db, employee, &range)?;

    let visits = db.visitor_stats(employee, &range)?;
    let visitor = VisitorSection {
        total: visits.total,
        daily: visits.on_last_day,
        client: visits.client,
        interview: visits.interview,
    };

    let owned = OwnedCriteria {
        user: &user,
        column: convention.activity_owner,
        range,
    };
    let appointments = AppointmentsSection {
        total: db.count_appointments(&owned)?,
    };

    let scope = if db.has_column("events", "employee")? {
        EventScope::Employee(employee)
    } else {
        EventScope::Owner {
            column: convention.activity_owner,
            user: &user,
        }
    };
    let events_chart = bucket_events(&db.event_counts_by_type(&scope, &range)?);

    let total_task = if db.has_table("tasks")? {
        db.count_tasks(&owned)?
    } else {
        0
    };

    let lead_criteria = LeadCriteria {
        user: &user,
        fields: convention.lead,
        range,
    };
    let leads_pulse = build_daily_series(&range, &db.lead_counts_by_day(&lead_criteria)?);

    Ok(DashboardPayload {
        crm,
        hr,
        visitor,
        daily_report: db.count_daily_reports(employee, &range)?,
        appointments,
        events_chart,
        attendance_chart,
        leads_pulse,
        checkin_chart,
        total_task,
        date_range: DateRangeSection::from(&range),
    })
}

fn crm_section(
    db: &DashboardDb,
    convention: &FieldConvention,
    user: &str,
    range: &DateRange,
) -> Result<CrmSection, DashboardError> {
    let leads = LeadCriteria {
        user,
        fields: convention.lead,
        range: *range,
    };
    let total_leads = db.count_leads(&leads)?;
    let active_customers = db.count_active_customers(&leads)?;

    let conversion = conversion_rate(active_customers, total_leads);
    if conversion > 100.0 {
        log::warn!(
            "Conversion rate {}% for {} exceeds 100: {} customers from {} leads",
            conversion,
            user,
            active_customers,
            total_leads
        );
    }

    let previous = match range.previous() {
        Some(prev) => db.count_leads(&LeadCriteria { range: prev, ..leads })?,
        None => 0,
    };
    let daily_leads = db.count_leads(&LeadCriteria {
        range: DateRange::new(range.to, range.to),
        ..leads
    })?;
    let new_leads_month = db.count_leads(&LeadCriteria {
        range: DateRange::new(month_start(range.to), range.to),
        ..leads
    })?;

    let sales_invoices = if db.has_table("sales_invoices")? {
        db.count_sales_invoices(user, range)?
    } else {
        0
    };

    Ok(CrmSection {
        total_leads,
        total_opportunities: db.count_opportunities(user, range)?,
        active_customers,
        conversion_rate: conversion,
        total_lead_trend: lead_trend(total_leads, previous),
        new_leads_month,
        daily_leads,
        sales_invoices,
    })
}

fn hr_section(
    db: &DashboardDb,
    employee: &str,
    range: &DateRange,
) -> Result<(HrSection, ChartSeries, ChartSeries), DashboardError> {
    let attendance = db.attendance_stats(employee, range)?;
    let (total_checkins, total_checkouts) = db.checkin_totals(employee, range)?;

    let recent_checkins = db
        .recent_checkins(employee, range, RECENT_LIMIT)?
        .into_iter()
        .map(|c| CheckinEntry {
            time: c.time,
            log_type: c.log_type,
            device_id: c.device_id,
        })
        .collect();
    let recent_reports = db
        .recent_daily_reports(employee, range, RECENT_LIMIT)?
        .into_iter()
        .map(|r| ReportEntry {
            date: r.date,
            summary: r.daily_summary,
        })
        .collect();

    let hr = HrSection {
        present_days: attendance.present,
        absent_days: attendance.absent,
        total_checkins,
        total_checkouts,
        recent_checkins,
        recent_reports,
    };
    let attendance_chart = ChartSeries {
        labels: ATTENDANCE_LABELS.iter().map(|s| s.to_string()).collect(),
        values: vec![attendance.present, attendance.absent, attendance.half_day],
    };
    let checkin_chart = build_daily_series(range, &db.checkins_by_day(employee, range)?);

    Ok((hr, checkin_chart, attendance_chart))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `active / total * 100` to two decimals, 0 without leads. Not clamped.
pub fn conversion_rate(active_customers: i64, total_leads: i64) -> f64 {
    if total_leads == 0 {
        return 0.0;
    }
    round2(active_customers as f64 / total_leads as f64 * 100.0)
}

/// Percent change against the previous window, 0 when it had no leads.
pub fn lead_trend(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    round2((current - previous) as f64 / previous as f64 * 100.0)
}

/// Fold grouped `(event_type, count)` rows into the fixed categories.
pub fn bucket_events(rows: &[(Option<String>, i64)]) -> ChartSeries {
    let mut counts: HashMap<EventCategory, i64> = HashMap::new();
    for (event_type, cnt) in rows {
        *counts
            .entry(EventCategory::from_event_type(event_type.as_deref()))
            .or_insert(0) += cnt;
    }
    ChartSeries {
        labels: EventCategory::ALL.iter().map(|c| c.label().to_string()).collect(),
        values: EventCategory::ALL
            .iter()
            .map(|c| counts.get(c).copied().unwrap_or(0))
            .collect(),
    }
}

/// One bucket per day in `range`, zero by default, with `rows` laid over.
/// Rows for days outside the range are ignored.
pub fn build_daily_series(range: &DateRange, rows: &[(String, i64)]) -> ChartSeries {
    let by_day: HashMap<&str, i64> = rows.iter().map(|(d, n)| (d.as_str(), *n)).collect();
    let labels: Vec<String> = range
        .days()
        .map(|day| day.format(DATE_FORMAT).to_string())
        .collect();
    let values = labels
        .iter()
        .map(|label| by_day.get(label.as_str()).copied().unwrap_or(0))
        .collect();
    ChartSeries { labels, values }
}
