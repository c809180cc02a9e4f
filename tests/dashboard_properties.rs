use chrono::NaiveDate;
use tempfile::TempDir;

use perfdash_lib::access::Actor;
use perfdash_lib::db::{
    DashboardDb, DbEmployee, DbEvent, DbLead, DbTask, DbVisitor, FieldConvention, LeadFields,
    OwnerColumn,
};
use perfdash_lib::error::DashboardError;
use perfdash_lib::services::dashboard::get_employee_dashboard;
use perfdash_lib::services::seed::{seed_dashboard_data, SeedPlan};
use perfdash_lib::types::{DashboardPayload, DashboardRequest};

const BY_OWNER: FieldConvention = FieldConvention {
    lead: LeadFields::LeadOwner,
    activity_owner: OwnerColumn::Owner,
};

const BY_QUALIFIER: FieldConvention = FieldConvention {
    lead: LeadFields::QualifiedBy,
    activity_owner: OwnerColumn::CustomOwn,
};

fn open_db() -> (TempDir, DashboardDb) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = DashboardDb::open_at(dir.path().join("perfdash.db")).expect("open");
    (dir, db)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 15).expect("date")
}

fn dashboard(
    db: &DashboardDb,
    convention: &FieldConvention,
    request: &DashboardRequest,
) -> Result<DashboardPayload, DashboardError> {
    get_employee_dashboard(db, &Actor::system(), convention, request, today())
}

fn lead(id: &str, creation: &str) -> DbLead {
    DbLead {
        id: id.to_string(),
        lead_name: format!("Lead {id}"),
        lead_owner: Some("u@x.com".to_string()),
        qualified_by: Some("u@x.com".to_string()),
        qualified_on: Some(creation.to_string()),
        status: "Open".to_string(),
        customer: None,
        creation: creation.to_string(),
    }
}

fn event(id: &str, event_type: Option<&str>, starts_on: &str) -> DbEvent {
    DbEvent {
        id: id.to_string(),
        subject: format!("Event {id}"),
        starts_on: starts_on.to_string(),
        event_type: event_type.map(str::to_string),
        sent_or_received: None,
        owner: Some("u@x.com".to_string()),
        custom_own: None,
    }
}

/// E1 linked to u@x.com with leads spread over March and one in April.
fn march_fixture(db: &DashboardDb) {
    db.upsert_employee(&DbEmployee::new("E1", "Employee One", Some("u@x.com")))
        .expect("insert");
    for (i, ts) in [
        "2024-03-01 00:00:00",
        "2024-03-05 09:00:00",
        "2024-03-05 18:00:00",
        "2024-03-20 10:00:00",
        "2024-03-31 23:30:00",
        "2024-04-01 00:00:00",
    ]
    .iter()
    .enumerate()
    {
        db.insert_lead(&lead(&format!("L{i}"), ts)).expect("insert");
    }
    for (id, kind, ts) in [
        ("EV1", Some("Call"), "2024-03-02 10:00:00"),
        ("EV2", Some("Meeting"), "2024-03-03 10:00:00"),
        ("EV3", Some("Private"), "2024-03-04 10:00:00"),
        ("EV4", Some("Email"), "2024-03-05 10:00:00"),
        ("EV5", None, "2024-03-06 10:00:00"),
        ("EV6", Some("Call"), "2024-04-02 10:00:00"),
    ] {
        db.insert_event(&event(id, kind, ts)).expect("insert");
    }
}

#[test]
fn swapped_range_gives_identical_payload() {
    let (_dir, db) = open_db();
    march_fixture(&db);

    let ordered = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let swapped = DashboardRequest::for_employee("E1").between("2024-03-31", "2024-03-01");
    assert_eq!(
        dashboard(&db, &BY_OWNER, &ordered).expect("ordered"),
        dashboard(&db, &BY_OWNER, &swapped).expect("swapped")
    );
}

#[test]
fn pulse_covers_every_day_and_sums_to_total_leads() {
    let (_dir, db) = open_db();
    march_fixture(&db);

    for convention in [BY_OWNER, BY_QUALIFIER] {
        let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
        let payload = dashboard(&db, &convention, &request).expect("dashboard");
        assert_eq!(payload.leads_pulse.labels.len(), 31);
        assert_eq!(payload.leads_pulse.labels.last().map(String::as_str), Some("2024-03-31"));
        assert_eq!(payload.crm.total_leads, 5);
        assert_eq!(payload.leads_pulse.total(), payload.crm.total_leads);
        assert_eq!(payload.crm.daily_leads, 1);
    }
}

#[test]
fn event_categories_account_for_every_matched_event() {
    let (_dir, db) = open_db();
    march_fixture(&db);

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let payload = dashboard(&db, &BY_OWNER, &request).expect("dashboard");
    assert_eq!(payload.events_chart.labels, vec!["Call", "Meeting", "Event", "Other"]);
    assert_eq!(payload.events_chart.values, vec![1, 1, 1, 2]);
    assert_eq!(payload.events_chart.total(), 5);
}

#[test]
fn employee_without_user_gets_zero_payload() {
    let (_dir, db) = open_db();
    march_fixture(&db);
    db.upsert_employee(&DbEmployee::new("E9", "Unlinked", None))
        .expect("insert");

    let request = DashboardRequest::for_employee("E9").between("2024-03-01", "2024-03-31");
    let payload = dashboard(&db, &BY_OWNER, &request).expect("dashboard");
    assert_eq!(payload.crm.total_leads, 0);
    assert_eq!(payload.crm.conversion_rate, 0.0);
    assert!(payload.leads_pulse.labels.is_empty());
    assert!(payload.events_chart.values.is_empty());
    assert_eq!(payload.attendance_chart.values, vec![0, 0, 0]);
    assert_eq!(payload.date_range.from_date, "2024-03-01");

    let missing = DashboardRequest::for_employee("NOPE");
    assert_eq!(
        dashboard(&db, &BY_OWNER, &missing).expect("dashboard").crm.total_leads,
        0
    );
}

#[test]
fn team_scope_follows_reporting_chain() {
    let (_dir, db) = open_db();
    march_fixture(&db);
    db.upsert_employee(&DbEmployee::new("M1", "Manager", Some("m@x.com")))
        .expect("insert");
    db.upsert_employee(&DbEmployee::new("T1", "Team Lead", None).reporting_to("M1"))
        .expect("insert");
    db.upsert_employee(&DbEmployee::new("E1", "Employee One", Some("u@x.com")).reporting_to("T1"))
        .expect("insert");
    db.upsert_employee(&DbEmployee::new("P1", "Peer", Some("p@x.com")))
        .expect("insert");

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let manager = Actor::new("m@x.com", vec!["Sales Manager".into()]);
    let payload = get_employee_dashboard(&db, &manager, &BY_OWNER, &request, today())
        .expect("manager sees indirect report");
    assert_eq!(payload.crm.total_leads, 5);

    let peer = Actor::new("p@x.com", vec![]);
    let err = get_employee_dashboard(&db, &peer, &BY_OWNER, &request, today())
        .expect_err("peer is outside the chain");
    assert!(matches!(err, DashboardError::PermissionDenied { .. }));
}

#[test]
fn seeded_data_shows_up_for_last_month() {
    let (_dir, db) = open_db();
    db.upsert_employee(&DbEmployee::new("E1", "Seeded", Some("s@x.com")))
        .expect("insert");
    let plan = SeedPlan {
        rng_seed: Some(42),
        ..SeedPlan::for_targets(vec!["s@x.com".to_string()])
    };
    let report = seed_dashboard_data(&db, &plan, today()).expect("seed");
    assert_eq!(report.total().failed, 0);

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    for convention in [BY_OWNER, BY_QUALIFIER] {
        let payload = dashboard(&db, &convention, &request).expect("dashboard");
        assert_eq!(payload.crm.total_leads, 100);
        assert_eq!(payload.crm.total_opportunities, 50);
        assert_eq!(payload.crm.active_customers, 25);
        assert_eq!(payload.crm.conversion_rate, 25.0);
        assert_eq!(payload.hr.present_days, 25);
        assert_eq!(payload.hr.total_checkins, 25);
        assert_eq!(payload.hr.total_checkouts, 25);
        assert_eq!(payload.hr.recent_checkins.len(), 20);
        assert_eq!(payload.hr.recent_reports.len(), 20);
        assert_eq!(payload.daily_report, 30);
        assert_eq!(payload.appointments.total, 20);
        assert_eq!(payload.total_task, 15);
        assert_eq!(payload.leads_pulse.total(), 100);
        assert_eq!(&payload.events_chart.values[..2], &[20, 18]);
        assert_eq!(payload.events_chart.values[3], 100);
        assert!((3..=7).contains(&payload.events_chart.values[2]));
    }

    let again = seed_dashboard_data(&db, &plan, today()).expect("reseed");
    assert_eq!(again.employees[0].leads.inserted, 0);
    let payload = dashboard(&db, &BY_OWNER, &request).expect("dashboard");
    assert_eq!(payload.crm.total_leads, 100);
    assert_eq!(payload.crm.total_opportunities, 50);
}

#[test]
fn lead_trend_compares_with_the_previous_window() {
    let (_dir, db) = open_db();
    march_fixture(&db);
    // March is 31 days, so the previous window is 2024-01-30..=2024-02-29.
    for (i, ts) in [
        "2024-01-29 12:00:00",
        "2024-01-30 00:00:00",
        "2024-02-10 09:00:00",
        "2024-02-20 09:00:00",
        "2024-02-29 23:59:00",
    ]
    .iter()
    .enumerate()
    {
        db.insert_lead(&lead(&format!("P{i}"), ts)).expect("insert");
    }

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    for convention in [BY_OWNER, BY_QUALIFIER] {
        let payload = dashboard(&db, &convention, &request).expect("dashboard");
        assert_eq!(payload.crm.total_leads, 5);
        assert_eq!(payload.crm.total_lead_trend, 25.0);
    }

    let quiet = DashboardRequest::for_employee("E1").between("2024-01-01", "2024-01-10");
    let payload = dashboard(&db, &BY_OWNER, &quiet).expect("dashboard");
    assert_eq!(payload.crm.total_lead_trend, 0.0);
}

#[test]
fn missing_optional_collections_count_zero() {
    let (_dir, db) = open_db();
    march_fixture(&db);
    db.insert_task(&DbTask {
        id: "T1".into(),
        subject: "Follow up".into(),
        status: "Open".into(),
        owner: Some("u@x.com".into()),
        custom_own: None,
        creation: "2024-03-12 10:00:00".into(),
    })
    .expect("insert");
    db.conn_ref()
        .execute(
            "INSERT INTO sales_invoices (id, owner, posting_date) VALUES ('SI1', 'u@x.com', '2024-03-12')",
            [],
        )
        .expect("insert");

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let payload = dashboard(&db, &BY_OWNER, &request).expect("dashboard");
    assert_eq!(payload.total_task, 1);
    assert_eq!(payload.crm.sales_invoices, 1);

    db.conn_ref()
        .execute_batch("DROP TABLE tasks; DROP TABLE sales_invoices;")
        .expect("drop");
    let payload = dashboard(&db, &BY_OWNER, &request).expect("dashboard without tables");
    assert_eq!(payload.total_task, 0);
    assert_eq!(payload.crm.sales_invoices, 0);
    assert_eq!(payload.crm.total_leads, 5);
}

#[test]
fn visitor_section_counts_hosted_visits() {
    let (_dir, db) = open_db();
    march_fixture(&db);
    for (id, host, day, purpose) in [
        ("V1", "E1", "2024-03-02", Some("Client")),
        ("V2", "E1", "2024-03-31", Some("Interview")),
        ("V3", "E1", "2024-03-31", Some("Client")),
        ("V4", "E1", "2024-03-15", None),
        ("V5", "E1", "2024-04-01", Some("Client")),
        ("V6", "E2", "2024-03-10", Some("Client")),
    ] {
        db.insert_visitor(&DbVisitor {
            id: id.into(),
            host_employee: host.into(),
            visit_date: day.into(),
            purpose: purpose.map(str::to_string),
        })
        .expect("insert");
    }

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let visitor = dashboard(&db, &BY_OWNER, &request).expect("dashboard").visitor;
    assert_eq!(visitor.total, 4);
    assert_eq!(visitor.daily, 2);
    assert_eq!(visitor.client, 2);
    assert_eq!(visitor.interview, 1);
}

#[test]
fn store_created_elsewhere_is_usable_after_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hr.db");
    {
        let legacy = rusqlite::Connection::open(&path).expect("open");
        legacy
            .execute_batch(
                "CREATE TABLE employees (id TEXT PRIMARY KEY, employee_name TEXT NOT NULL,
                     user_id TEXT, reports_to TEXT, department TEXT);
                 INSERT INTO employees (id, employee_name, user_id) VALUES ('E1', 'Legacy', 'u@x.com');
                 CREATE TABLE leads (id TEXT PRIMARY KEY, lead_name TEXT NOT NULL, lead_owner TEXT,
                     qualified_by TEXT, qualified_on TEXT, status TEXT NOT NULL DEFAULT 'Open',
                     customer TEXT, creation TEXT NOT NULL);
                 INSERT INTO leads (id, lead_name, lead_owner, creation)
                     VALUES ('L1', 'Old lead', 'u@x.com', '2024-03-05 10:00:00');",
            )
            .expect("legacy schema");
    }

    let db = DashboardDb::open_at(path.clone()).expect("open");
    assert!(db.has_table("visitors").expect("query"));
    assert!(dir.path().join("hr.db.pre-migration.bak").exists());

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let payload = dashboard(&db, &BY_OWNER, &request).expect("dashboard");
    assert_eq!(payload.crm.total_leads, 1);
    assert_eq!(payload.crm.active_customers, 0);
}

#[test]
fn seeding_over_existing_leads_keeps_both_conventions_equal() {
    let (_dir, db) = open_db();
    db.upsert_employee(&DbEmployee::new("E1", "Seeded", Some("s@x.com")))
        .expect("insert");
    for i in 0..10 {
        db.insert_lead(&DbLead {
            id: format!("OLD{i}"),
            lead_name: format!("Old lead {i}"),
            lead_owner: Some("s@x.com".to_string()),
            qualified_by: None,
            qualified_on: None,
            status: "Open".to_string(),
            customer: None,
            creation: "2023-06-01 10:00:00".to_string(),
        })
        .expect("insert");
    }

    let plan = SeedPlan {
        rng_seed: Some(7),
        ..SeedPlan::for_targets(vec!["s@x.com".to_string()])
    };
    let report = seed_dashboard_data(&db, &plan, today()).expect("seed");
    assert_eq!(report.employees[0].leads.updated, 10);
    assert_eq!(report.employees[0].leads.inserted, 90);

    let request = DashboardRequest::for_employee("E1").between("2024-03-01", "2024-03-31");
    let by_owner = dashboard(&db, &BY_OWNER, &request).expect("dashboard");
    let by_qualifier = dashboard(&db, &BY_QUALIFIER, &request).expect("dashboard");
    assert_eq!(by_owner.crm.total_leads, 100);
    assert_eq!(by_qualifier.crm.total_leads, 100);
    assert_eq!(by_owner.leads_pulse, by_qualifier.leads_pulse);
}
