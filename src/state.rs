use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{DashboardDb, FieldConvention};
use crate::error::DashboardError;
use crate::types::Config;

/// Environment variable that overrides the configured database path.
pub const DB_PATH_ENV: &str = "PERFDASH_DB";

pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".perfdash").join("config.json"))
}

/// Load configuration from ~/.perfdash/config.json
pub fn load_config() -> Result<Config, String> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"fieldConvention\": {{ \"lead\": \"leadOwner\" | \"qualifiedBy\", \"activityOwner\": \"owner\" | \"customOwn\" }} }}",
            path.display()
        ));
    }

    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| {
        format!(
            "Failed to parse config: {}. `fieldConvention` is required and selects which lead and activity owner columns the dashboard counts",
            e
        )
    })
}

/// Field convention from the config file, with command-line overrides.
///
/// Both halves must come from somewhere: with a partial override and no
/// config file the convention is still undecided and this fails.
pub fn resolve_field_convention(
    config: Option<&Config>,
    lead: Option<crate::db::LeadFields>,
    activity_owner: Option<crate::db::OwnerColumn>,
) -> Result<FieldConvention, DashboardError> {
    let base = config.map(|c| c.field_convention);
    let lead = lead.or(base.map(|c| c.lead));
    let activity_owner = activity_owner.or(base.map(|c| c.activity_owner));
    match (lead, activity_owner) {
        (Some(lead), Some(activity_owner)) => Ok(FieldConvention {
            lead,
            activity_owner,
        }),
        _ => Err(DashboardError::Config(
            "no field convention configured. Set `fieldConvention` in ~/.perfdash/config.json or pass both --lead-field and --activity-owner"
                .to_string(),
        )),
    }
}

/// Database location: explicit flag, then `PERFDASH_DB`, then config, then
/// `~/.perfdash/perfdash.db`.
pub fn resolve_db_path(flag: Option<&Path>, config: Option<&Config>) -> Result<PathBuf, String> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(DB_PATH_ENV) {
        if !env_path.trim().is_empty() {
            return Ok(PathBuf::from(env_path.trim()));
        }
    }
    if let Some(path) = config.and_then(|c| c.database_path.as_deref()) {
        if !path.trim().is_empty() {
            return Ok(expand_home(path.trim()));
        }
    }
    DashboardDb::default_path().map_err(|e| e.to_string())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
