// Seed service
// Generates synthetic HR/CRM records for target users, dated into last month.
//
// Ownership is written to both lead conventions (lead_owner and qualified_by)
// and both activity owner columns, so seeded data shows up whichever
// field convention the dashboard runs with.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::date_range::{DateRange, DATE_FORMAT};
use crate::db::{
    new_record_id, AttendanceStatus, DashboardDb, DbAppointment, DbAttendance, DbCheckin,
    DbCustomer, DbDailyReport, DbError, DbEvent, DbLead, DbOpportunity, DbTask, DocStatus,
    LogType,
};
use crate::types::DateRangeSection;

const LEAD_STATUSES: &[&str] = &["Open", "Replied", "Opportunity", "Converted"];
const TASK_STATUSES: &[&str] = &["Open", "Working", "Completed"];
const TASK_SUBJECTS: &[&str] = &[
    "Follow up with client",
    "Prepare monthly report",
    "Draft proposal",
    "Review code PR",
];
const EVENT_SUBJECTS: &[&str] = &["Client review", "Product demo", "Internal sync", "Workshop"];
const GENERAL_EVENT_TYPES: &[&str] = &["Public", "Private"];
const REPORT_SUMMARIES: &[&str] = &[
    "Completed client follow-ups and updated CRM records.",
    "Attended team meeting. Prepared weekly report.",
    "Site visit to client premises for project review.",
    "Worked on proposal draft and sent for internal review.",
    "Cold calling and prospecting new leads.",
    "Training session on new product features.",
    "Processed purchase orders and coordinated with vendors.",
    "Prepared presentation for upcoming quarterly review.",
    "Resolved customer complaints and escalated issues.",
    "Reviewed project milestones and updated timeline.",
    "Conducted market research for new opportunities.",
    "Coordinated with logistics for shipment tracking.",
];

/// How much data to generate per employee.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    /// User emails; each is resolved to its linked employees.
    pub targets: Vec<String>,
    pub leads: usize,
    pub opportunities: usize,
    pub converted_customers: usize,
    pub attendance_days: usize,
    pub daily_reports: usize,
    pub appointments: usize,
    pub calls: usize,
    pub meetings: usize,
    pub emails_sent: usize,
    pub emails_received: usize,
    pub general_events_min: usize,
    pub general_events_max: usize,
    pub tasks: usize,
    /// Department created when the store has none.
    pub department: String,
    /// Fixed seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            leads: 100,
            opportunities: 50,
            converted_customers: 25,
            attendance_days: 25,
            daily_reports: 30,
            appointments: 20,
            calls: 20,
            meetings: 18,
            emails_sent: 50,
            emails_received: 50,
            general_events_min: 3,
            general_events_max: 7,
            tasks: 15,
            department: "General".to_string(),
            rng_seed: None,
        }
    }
}

impl SeedPlan {
    pub fn for_targets(targets: Vec<String>) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }
}

/// Outcome of a batch of writes. Failures are counted and kept, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Write {
    Insert,
    Update,
}

impl BatchResult {
    fn track(&mut self, result: Result<(), DbError>, write: Write, what: &str) {
        match result {
            Ok(()) => match write {
                Write::Insert => self.inserted += 1,
                Write::Update => self.updated += 1,
            },
            Err(e) => {
                log::warn!("Seed write failed for {}: {}", what, e);
                self.failed += 1;
                self.errors.push(format!("{}: {}", what, e));
            }
        }
    }

    pub fn merge(&mut self, other: &BatchResult) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.failed += other.failed;
        self.errors.extend(other.errors.iter().cloned());
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeSeedReport {
    pub email: String,
    pub employee: String,
    pub department: Option<String>,
    pub leads: BatchResult,
    pub opportunities: BatchResult,
    pub customers: BatchResult,
    pub attendance: BatchResult,
    pub daily_reports: BatchResult,
    pub checkins: BatchResult,
    pub appointments: BatchResult,
    pub events: BatchResult,
    pub tasks: BatchResult,
}

impl EmployeeSeedReport {
    pub fn collections(&self) -> [(&'static str, &BatchResult); 9] {
        [
            ("leads", &self.leads),
            ("opportunities", &self.opportunities),
            ("customers", &self.customers),
            ("attendance", &self.attendance),
            ("daily_reports", &self.daily_reports),
            ("checkins", &self.checkins),
            ("appointments", &self.appointments),
            ("events", &self.events),
            ("tasks", &self.tasks),
        ]
    }

    pub fn total(&self) -> BatchResult {
        let mut total = BatchResult::default();
        for (_, batch) in self.collections() {
            total.merge(batch);
        }
        total
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub window: DateRangeSection,
    pub employees: Vec<EmployeeSeedReport>,
    /// Target emails with no linked employee.
    pub skipped: Vec<String>,
}

impl SeedReport {
    pub fn total(&self) -> BatchResult {
        let mut total = BatchResult::default();
        for employee in &self.employees {
            total.merge(&employee.total());
        }
        total
    }
}

/// Seed every target in `plan` inside one transaction, dated into the month
/// before `today`.
pub fn seed_dashboard_data(
    db: &DashboardDb,
    plan: &SeedPlan,
    today: NaiveDate,
) -> Result<SeedReport, DbError> {
    let window = DateRange::last_month(today);
    let mut rng = match plan.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    log::info!(
        "Seeding {} target(s) for {}..={}",
        plan.targets.len(),
        window.start_str(),
        window.end_str()
    );

    db.with_transaction(|tx| -> Result<SeedReport, DbError> {
        let department = ensure_department(tx, &plan.department)?;
        let mut employees = Vec::new();
        let mut skipped = Vec::new();

        for email in &plan.targets {
            let linked = tx.employees_for_user(email)?;
            if linked.is_empty() {
                log::warn!("Skipping {}: no linked employee", email);
                skipped.push(email.clone());
                continue;
            }
            for employee in linked {
                let seeder = Seeder {
                    db: tx,
                    plan,
                    window,
                    today,
                    email,
                    employee: &employee.id,
                    department: department.as_deref(),
                };
                let report = seeder.run(&mut rng)?;
                for (name, batch) in report.collections() {
                    log::info!(
                        "{} / {}: {} inserted, {} updated, {} failed",
                        email,
                        name,
                        batch.inserted,
                        batch.updated,
                        batch.failed
                    );
                }
                employees.push(report);
            }
        }

        Ok(SeedReport {
            window: DateRangeSection::from(&window),
            employees,
            skipped,
        })
    })
}

fn ensure_department(db: &DashboardDb, fallback: &str) -> Result<Option<String>, DbError> {
    if let Some(existing) = db.first_department()? {
        return Ok(Some(existing));
    }
    match db.insert_department(fallback) {
        Ok(()) => Ok(Some(fallback.to_string())),
        Err(e) => {
            log::warn!("Could not create department {}: {}", fallback, e);
            Ok(None)
        }
    }
}

struct Seeder<'a> {
    db: &'a DashboardDb,
    plan: &'a SeedPlan,
    window: DateRange,
    today: NaiveDate,
    email: &'a str,
    employee: &'a str,
    department: Option<&'a str>,
}

impl Seeder<'_> {
    fn run(&self, rng: &mut StdRng) -> Result<EmployeeSeedReport, DbError> {
        let mut report = EmployeeSeedReport {
            email: self.email.to_string(),
            employee: self.employee.to_string(),
            department: self.department.map(str::to_string),
            ..EmployeeSeedReport::default()
        };

        if let Some(dept) = self.department {
            self.db.set_employee_department(self.employee, dept)?;
        }

        report.leads = self.seed_leads(rng)?;
        report.opportunities = self.seed_opportunities(rng)?;
        report.customers = self.seed_customers()?;
        let (attendance, checkins) = self.seed_attendance(rng)?;
        report.attendance = attendance;
        report.checkins = checkins;
        report.daily_reports = self.seed_daily_reports(rng)?;
        report.appointments = self.seed_appointments(rng);
        report.events = self.seed_events(rng);
        report.tasks = self.seed_tasks(rng);
        Ok(report)
    }

    /// `YYYY-MM-DD HH:00:00` on a random day of the window.
    fn random_timestamp(&self, rng: &mut StdRng, first_hour: u32, last_hour: u32) -> String {
        let day = self.window.from + Duration::days(rng.random_range(0..self.window.num_days()));
        let hour = rng.random_range(first_hour..=last_hour);
        format!("{} {:02}:00:00", day.format(DATE_FORMAT), hour)
    }

    fn seed_leads(&self, rng: &mut StdRng) -> Result<BatchResult, DbError> {
        let mut batch = BatchResult::default();
        let existing = self.db.leads_for_owner(self.email, None)?;
        for lead in &existing {
            let ts = self.random_timestamp(rng, 8, 17);
            batch.track(self.db.backdate_lead(&lead.id, self.email, &ts), Write::Update, &lead.id);
        }

        for i in existing.len()..self.plan.leads {
            let ts = self.random_timestamp(rng, 8, 17);
            let status = LEAD_STATUSES.choose(rng).copied().unwrap_or("Open");
            let lead = DbLead {
                id: new_record_id(),
                lead_name: format!("Test Lead {} for {}", i + 1, self.email),
                lead_owner: Some(self.email.to_string()),
                qualified_by: Some(self.email.to_string()),
                qualified_on: Some(ts.clone()),
                status: status.to_string(),
                customer: None,
                creation: ts,
            };
            batch.track(self.db.insert_lead(&lead), Write::Insert, &lead.lead_name);
        }
        Ok(batch)
    }

    fn seed_opportunities(&self, rng: &mut StdRng) -> Result<BatchResult, DbError> {
        let mut batch = BatchResult::default();
        let existing = self.db.opportunity_ids_for_owner(self.email)?;
        for id in &existing {
            let ts = self.random_timestamp(rng, 10, 10);
            batch.track(self.db.backdate_opportunity(id, &ts), Write::Update, id);
        }

        for _ in existing.len()..self.plan.opportunities {
            let opp = DbOpportunity {
                id: new_record_id(),
                opportunity_from: Some("Lead".to_string()),
                opportunity_owner: Some(self.email.to_string()),
                status: "Open".to_string(),
                creation: self.random_timestamp(rng, 10, 10),
            };
            batch.track(self.db.insert_opportunity(&opp), Write::Insert, &opp.id);
        }
        Ok(batch)
    }

    /// Convert the first leads into customers, reusing customers by name.
    /// Leads already linked to a customer are left alone.
    fn seed_customers(&self) -> Result<BatchResult, DbError> {
        let mut batch = BatchResult::default();
        let leads = self
            .db
            .leads_for_owner(self.email, Some(self.plan.converted_customers))?;
        let creation = format!("{} 09:00:00", self.window.start_str());

        for lead in leads.iter().filter(|l| l.customer.is_none()) {
            let name = format!("Test Customer from {}", lead.id);
            match self.db.customer_id_by_name(&name)? {
                Some(existing) => {
                    batch.track(self.db.set_lead_customer(&lead.id, &existing), Write::Update, &name);
                }
                None => {
                    let customer = DbCustomer {
                        id: new_record_id(),
                        customer_name: name.clone(),
                        customer_group: Some("All Customer Groups".to_string()),
                        territory: Some("All Territories".to_string()),
                        disabled: false,
                        creation: creation.clone(),
                    };
                    let result = self
                        .db
                        .insert_customer(&customer)
                        .and_then(|()| self.db.set_lead_customer(&lead.id, &customer.id));
                    batch.track(result, Write::Insert, &name);
                }
            }
        }
        Ok(batch)
    }

    /// Present days from the start of the window, one IN and one OUT log each.
    fn seed_attendance(&self, rng: &mut StdRng) -> Result<(BatchResult, BatchResult), DbError> {
        let mut attendance = BatchResult::default();
        let mut checkins = BatchResult::default();

        let removed = self.db.delete_attendance_in_range(self.employee, &self.window)?;
        let removed_logs = self.db.delete_checkins_in_range(self.employee, &self.window)?;
        if removed > 0 || removed_logs > 0 {
            log::info!(
                "Cleared {} attendance row(s) and {} check-in(s) for {}",
                removed,
                removed_logs,
                self.employee
            );
        }

        for day in self.window.days().take(self.plan.attendance_days) {
            if day > self.today {
                break;
            }
            let date = day.format(DATE_FORMAT).to_string();
            let record = DbAttendance {
                id: new_record_id(),
                employee: self.employee.to_string(),
                attendance_date: date.clone(),
                status: AttendanceStatus::Present,
                docstatus: DocStatus::Submitted,
            };
            attendance.track(self.db.insert_attendance(&record), Write::Insert, &date);

            for (log_type, hour) in [(LogType::In, 9), (LogType::Out, 17)] {
                let checkin = DbCheckin {
                    id: new_record_id(),
                    employee: self.employee.to_string(),
                    time: format!("{} {:02}:{:02}:00", date, hour, rng.random_range(0..60)),
                    log_type: log_type.as_str().to_string(),
                    device_id: None,
                };
                checkins.track(self.db.insert_checkin(&checkin), Write::Insert, &checkin.time);
            }
        }
        Ok((attendance, checkins))
    }

    fn seed_daily_reports(&self, rng: &mut StdRng) -> Result<BatchResult, DbError> {
        let mut batch = BatchResult::default();
        self.db.delete_daily_reports_in_range(self.employee, &self.window)?;

        let days: Vec<NaiveDate> = self.window.days().collect();
        for i in 0..self.plan.daily_reports {
            let day = days[i % days.len()];
            if day > self.today {
                continue;
            }
            let report = DbDailyReport {
                id: new_record_id(),
                employee: self.employee.to_string(),
                department: self.department.map(str::to_string),
                date: day.format(DATE_FORMAT).to_string(),
                daily_summary: REPORT_SUMMARIES.choose(rng).map(|s| s.to_string()),
            };
            batch.track(self.db.insert_daily_report(&report), Write::Insert, &report.date);
        }
        Ok(batch)
    }

    fn seed_appointments(&self, rng: &mut StdRng) -> BatchResult {
        let mut batch = BatchResult::default();
        for _ in 0..self.plan.appointments {
            let appointment = DbAppointment {
                id: new_record_id(),
                scheduled_time: self.random_timestamp(rng, 9, 16),
                owner: Some(self.email.to_string()),
                custom_own: Some(self.email.to_string()),
            };
            batch.track(
                self.db.insert_appointment(&appointment),
                Write::Insert,
                &appointment.scheduled_time,
            );
        }
        batch
    }

    fn seed_events(&self, rng: &mut StdRng) -> BatchResult {
        let mut batch = BatchResult::default();
        let general = if self.plan.general_events_max > self.plan.general_events_min {
            rng.random_range(self.plan.general_events_min..=self.plan.general_events_max)
        } else {
            self.plan.general_events_min
        };

        let mut specs: Vec<(String, String, Option<&str>)> = Vec::new();
        for i in 0..self.plan.calls {
            specs.push((format!("Call with client #{}", i + 1), "Call".into(), None));
        }
        for i in 0..self.plan.meetings {
            specs.push((format!("Meeting #{}", i + 1), "Meeting".into(), None));
        }
        for i in 0..self.plan.emails_sent {
            specs.push((format!("Email sent #{}", i + 1), "Email".into(), Some("Sent")));
        }
        for i in 0..self.plan.emails_received {
            specs.push((format!("Email received #{}", i + 1), "Email".into(), Some("Received")));
        }
        for i in 0..general {
            let subject = EVENT_SUBJECTS.choose(rng).copied().unwrap_or("Event");
            let event_type = GENERAL_EVENT_TYPES.choose(rng).copied().unwrap_or("Public");
            specs.push((format!("{} #{}", subject, i + 1), event_type.into(), None));
        }

        for (subject, event_type, direction) in specs {
            let event = DbEvent {
                id: new_record_id(),
                starts_on: self.random_timestamp(rng, 9, 16),
                subject,
                event_type: Some(event_type),
                sent_or_received: direction.map(str::to_string),
                owner: Some(self.email.to_string()),
                custom_own: Some(self.email.to_string()),
            };
            batch.track(self.db.insert_event(&event), Write::Insert, &event.subject);
        }
        batch
    }

    fn seed_tasks(&self, rng: &mut StdRng) -> BatchResult {
        let mut batch = BatchResult::default();
        for i in 0..self.plan.tasks {
            let subject = TASK_SUBJECTS.choose(rng).copied().unwrap_or("Follow up");
            let status = TASK_STATUSES.choose(rng).copied().unwrap_or("Open");
            let task = DbTask {
                id: new_record_id(),
                subject: format!("{} #{}", subject, i + 1),
                status: status.to_string(),
                owner: Some(self.email.to_string()),
                custom_own: Some(self.email.to_string()),
                creation: self.random_timestamp(rng, 10, 10),
            };
            batch.track(self.db.insert_task(&task), Write::Insert, &task.subject);
        }
        batch
    }
}
