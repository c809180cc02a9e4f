//! `perfdash`: employee performance dashboards from the command line.
//!
//! Prints JSON on stdout. Logging goes to stderr and is controlled by
//! `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use perfdash_lib::access::Actor;
use perfdash_lib::db::{DashboardDb, LeadFields, OwnerColumn};
use perfdash_lib::error::{DashboardError, ErrorPayload};
use perfdash_lib::services::{audit, dashboard, seed};
use perfdash_lib::state::{load_config, load_config_from, resolve_db_path, resolve_field_convention};
use perfdash_lib::types::{Config, DashboardRequest};

/// Employee performance dashboard over HR and CRM records.
#[derive(Parser, Debug)]
#[command(name = "perfdash", version, about)]
struct Cli {
    /// SQLite store (default: $PERFDASH_DB, then config, then ~/.perfdash/perfdash.db).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: ~/.perfdash/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Lead columns to count by. Overrides `fieldConvention.lead`.
    #[arg(long, global = true, value_enum)]
    lead_field: Option<LeadFieldArg>,

    /// Owner column for appointments, events and tasks. Overrides
    /// `fieldConvention.activityOwner`.
    #[arg(long, global = true, value_enum)]
    activity_owner: Option<ActivityOwnerArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one employee's dashboard payload.
    Dashboard {
        /// Employee ID.
        #[arg(long)]
        employee: String,
        /// First day (YYYY-MM-DD). Defaults to the first of this month.
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        to: Option<String>,
        /// Act as this user instead of the local operator.
        #[arg(long = "as")]
        actor: Option<String>,
        /// Roles of the acting user. Repeatable.
        #[arg(long = "role", requires = "actor")]
        roles: Vec<String>,
    },

    /// Generate test data dated into last month.
    Seed {
        /// Target user email. Repeatable; defaults to `seedTargets` in config.
        #[arg(long = "email")]
        emails: Vec<String>,
        /// RNG seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Look employees up by full or partial name.
    Audit {
        /// Names to search for.
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Create or upgrade the store schema.
    Migrate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LeadFieldArg {
    LeadOwner,
    QualifiedBy,
}

impl From<LeadFieldArg> for LeadFields {
    fn from(arg: LeadFieldArg) -> Self {
        match arg {
            LeadFieldArg::LeadOwner => LeadFields::LeadOwner,
            LeadFieldArg::QualifiedBy => LeadFields::QualifiedBy,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ActivityOwnerArg {
    Owner,
    CustomOwn,
}

impl From<ActivityOwnerArg> for OwnerColumn {
    fn from(arg: ActivityOwnerArg) -> Self {
        match arg {
            ActivityOwnerArg::Owner => OwnerColumn::Owner,
            ActivityOwnerArg::CustomOwn => OwnerColumn::CustomOwn,
        }
    }
}

/// Report a dashboard failure as its JSON error payload.
fn payload_error(e: DashboardError) -> anyhow::Error {
    let body = ErrorPayload::from(&e);
    anyhow!(serde_json::to_string(&body).unwrap_or_else(|_| e.to_string()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    if let Err(e) = &config {
        log::debug!("No usable config: {}", e);
    }

    let db_path = resolve_db_path(cli.db.as_deref(), config.as_ref().ok()).map_err(|e| anyhow!(e))?;
    // Reads never create a store; only `seed` and `migrate` may.
    let open_existing = || {
        DashboardDb::open_readonly_at(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))
    };
    let open_writable = || {
        DashboardDb::open_at(db_path.clone())
            .with_context(|| format!("Failed to open database at {}", db_path.display()))
    };
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Dashboard {
            employee,
            from,
            to,
            actor,
            roles,
        } => {
            let convention = resolve_field_convention(
                config.as_ref().ok(),
                cli.lead_field.map(Into::into),
                cli.activity_owner.map(Into::into),
            )
            .map_err(|e| match (e, &config) {
                (DashboardError::Config(msg), Err(config_err)) => {
                    DashboardError::Config(format!("{msg} ({config_err})"))
                }
                (e, _) => e,
            })
            .map_err(payload_error)?;
            let actor = match actor {
                Some(user) => Actor::new(user, roles),
                None => Actor::system(),
            };
            let request = DashboardRequest {
                employee: Some(employee),
                from_date: from,
                to_date: to,
            };

            let db = open_existing()?;
            let payload = dashboard::get_employee_dashboard(&db, &actor, &convention, &request, today)
                .map_err(payload_error)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Commands::Seed { emails, seed } => {
            let targets = if emails.is_empty() {
                config
                    .as_ref()
                    .map(|c: &Config| c.seed_targets.clone())
                    .unwrap_or_default()
            } else {
                emails
            };
            if targets.is_empty() {
                return Err(anyhow!(
                    "No seed targets. Pass --email or set `seedTargets` in the config file"
                ));
            }
            let plan = seed::SeedPlan {
                rng_seed: seed,
                ..seed::SeedPlan::for_targets(targets)
            };
            let db = open_writable()?;
            let report = seed::seed_dashboard_data(&db, &plan, today)?;
            let total = report.total();
            log::info!(
                "Seed complete: {} inserted, {} updated, {} failed, {} skipped",
                total.inserted,
                total.updated,
                total.failed,
                report.skipped.len()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Audit { names } => {
            let db = open_existing()?;
            let results = audit::search_employees(&db, &names)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Commands::Migrate => {
            open_writable()?;
            println!("Schema up to date at {}", db_path.display());
        }
    }

    Ok(())
}
