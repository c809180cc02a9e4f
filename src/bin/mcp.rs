//! perfdash MCP Server: exposes employee dashboards to MCP clients.
//!
//! Standalone binary that communicates over stdio using the Model Context Protocol.
//! Opens the SQLite database read-only; the schema must already exist
//! (`perfdash migrate`).
//!
//! Build: `cargo build --features mcp --bin perfdash-mcp`
//! Acting user: `PERFDASH_ACTOR` and comma-separated `PERFDASH_ROLES`.
//! Without them the server acts as the local system manager.

use std::sync::{Arc, Mutex};

use rmcp::model::*;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, ServerHandler, ServiceExt};
use serde::Deserialize;

use perfdash_lib::access::Actor;
use perfdash_lib::db::{DashboardDb, FieldConvention};
use perfdash_lib::error::ErrorPayload;
use perfdash_lib::services::{audit, dashboard};
use perfdash_lib::state::{load_config, resolve_db_path, resolve_field_convention};
use perfdash_lib::types::DashboardRequest;

// =============================================================================
// Server State
// =============================================================================

#[derive(Clone)]
struct PerfdashMcp {
    /// Wrapped in Arc<Mutex> because rusqlite::Connection is not Sync, and
    /// MCP tool calls are sequential over stdio anyway.
    db: Arc<Mutex<DashboardDb>>,
    convention: FieldConvention,
    actor: Actor,
}

// =============================================================================
// Tool Parameter Types
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
struct GetDashboardParams {
    #[schemars(description = "Employee ID, e.g. HR-EMP-0001")]
    employee: String,
    #[schemars(description = "First day (YYYY-MM-DD). Defaults to the first of this month.")]
    from_date: Option<String>,
    #[schemars(description = "Last day (YYYY-MM-DD). Defaults to today.")]
    to_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchEmployeesParams {
    #[schemars(description = "Full or partial employee names or IDs")]
    names: Vec<String>,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool(tool_box)]
impl PerfdashMcp {
    fn new(db: DashboardDb, convention: FieldConvention, actor: Actor) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            convention,
            actor,
        }
    }

    #[tool(description = "Get an employee's performance dashboard: CRM pipeline (leads, opportunities, customers, conversion rate), attendance, check-ins, daily reports, visitors, appointments, events by category, tasks and a daily leads pulse for a date range.")]
    fn get_employee_dashboard(&self, #[tool(aggr)] params: GetDashboardParams) -> String {
        let db = match self.db.lock() {
            Ok(db) => db,
            Err(_) => return "Error: DB lock poisoned".to_string(),
        };
        let request = DashboardRequest {
            employee: Some(params.employee),
            from_date: params.from_date,
            to_date: params.to_date,
        };
        let today = chrono::Local::now().date_naive();

        match dashboard::get_employee_dashboard(&db, &self.actor, &self.convention, &request, today) {
            Ok(payload) => {
                serde_json::to_string_pretty(&payload).unwrap_or_else(|e| format!("Error: {e}"))
            }
            Err(e) => serde_json::to_string_pretty(&ErrorPayload::from(&e))
                .unwrap_or_else(|_| format!("Error: {e}")),
        }
    }

    #[tool(description = "Find employees by full or partial name or ID. Returns each search term with the matching employee IDs, names and linked users. Use this to resolve a name before asking for a dashboard.")]
    fn search_employees(&self, #[tool(aggr)] params: SearchEmployeesParams) -> String {
        let db = match self.db.lock() {
            Ok(db) => db,
            Err(_) => return "Error: DB lock poisoned".to_string(),
        };
        match audit::search_employees(&db, &params.names) {
            Ok(results) => {
                serde_json::to_string_pretty(&results).unwrap_or_else(|e| format!("Error: {e}"))
            }
            Err(e) => format!("Error: {e}"),
        }
    }
}

// =============================================================================
// ServerHandler: wires tool_box into the MCP protocol
// =============================================================================

#[tool(tool_box)]
impl ServerHandler for PerfdashMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "perfdash".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "perfdash MCP server. Read-only access to employee performance dashboards. \
                 Use search_employees to resolve a name to an employee ID, then \
                 get_employee_dashboard for that employee's metrics over a date range."
                    .to_string(),
            ),
        }
    }
}

fn actor_from_env() -> Actor {
    match std::env::var("PERFDASH_ACTOR") {
        Ok(user) if !user.trim().is_empty() => {
            let roles = std::env::var("PERFDASH_ROLES")
                .map(|r| {
                    r.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Actor::new(user.trim(), roles)
        }
        _ => Actor::system(),
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config =
        load_config().map_err(|e| anyhow::anyhow!("Failed to load perfdash config: {e}"))?;
    let convention = resolve_field_convention(Some(&config), None, None)?;

    let path = resolve_db_path(None, Some(&config)).map_err(|e| anyhow::anyhow!(e))?;
    let db = DashboardDb::open_readonly_at(&path)
        .map_err(|e| anyhow::anyhow!("Failed to open database at {}: {e}", path.display()))?;

    let actor = actor_from_env();
    log::info!("Serving dashboards as {}", actor.user_id);

    let server = PerfdashMcp::new(db, convention, actor);

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
