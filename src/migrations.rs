//! Schema migrations.
//!
//! Numbered SQL migrations are embedded at compile time via `include_str!`.
//! Each migration runs exactly once, tracked by the `schema_version` table.
//!
//! Stores populated by an earlier tool have tables but no `schema_version`.
//! They are backed up, then the baseline runs statement by statement so the
//! collections they lack are created next to the ones they already hold.

use rusqlite::Connection;

struct Migration {
    version: i32,
    sql: &'static str,
}

const BASELINE_VERSION: i32 = 1;

const MIGRATIONS: &[Migration] = &[Migration {
    version: BASELINE_VERSION,
    sql: include_str!("migrations/001_baseline.sql"),
}];

fn ensure_schema_version_table(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Failed to create schema_version table: {}", e))
}

/// Return the highest applied migration version, or 0 if none.
fn current_version(conn: &Connection) -> Result<i32, String> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {}", e))
}

/// Whether the file already holds tables other than `schema_version`.
fn has_existing_tables(conn: &Connection) -> Result<bool, String> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master
         WHERE type = 'table' AND name NOT IN ('schema_version') AND name NOT LIKE 'sqlite_%')",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to inspect existing tables: {}", e))
}

/// Apply the baseline to a store created outside this tool.
///
/// Every statement is `IF NOT EXISTS`, so existing tables are kept as they
/// are. An index over a column a legacy table lacks is skipped with a warning.
fn bootstrap_existing_db(conn: &Connection, sql: &str) -> Result<(), String> {
    for statement in sql.split(';') {
        let statement = statement.trim();
        if statement.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with("--")) {
            continue;
        }
        if let Err(e) = conn.execute_batch(statement) {
            if statement.contains("CREATE INDEX") {
                log::warn!("Migration bootstrap: skipped index on existing table: {}", e);
                continue;
            }
            return Err(format!("Migration bootstrap failed: {}", e));
        }
    }
    log::info!("Migration bootstrap: applied baseline to existing store");
    Ok(())
}

/// Back up the database before applying migrations.
///
/// Uses SQLite's online backup API to create a hot copy at
/// `<db_path>.pre-migration.bak`. Skipped for in-memory databases.
fn backup_before_migration(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to get database path: {}", e))?;

    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(());
    }

    let backup_path = format!("{}.pre-migration.bak", db_path);
    let mut backup_conn = Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup file: {}", e))?;

    let backup = rusqlite::backup::Backup::new(conn, &mut backup_conn)
        .map_err(|e| format!("Failed to initialize pre-migration backup: {}", e))?;

    backup
        .step(-1)
        .map_err(|e| format!("Pre-migration backup failed: {}", e))?;

    log::info!("Pre-migration backup created at {}", backup_path);
    Ok(())
}

/// Run all pending migrations.
///
/// Returns the number of migrations applied (0 if already up-to-date).
/// Refuses to touch a store whose schema is newer than this build knows.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    ensure_schema_version_table(conn)?;

    let current = current_version(conn)?;
    let max_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);

    if current > max_known {
        return Err(format!(
            "Database schema version ({}) is newer than this build of perfdash supports ({}). \
             Please upgrade perfdash.",
            current, max_known
        ));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        return Ok(0);
    }

    let existing = current > 0 || has_existing_tables(conn)?;
    if existing {
        backup_before_migration(conn)?;
    }

    for migration in &pending {
        if migration.version == BASELINE_VERSION && existing {
            bootstrap_existing_db(conn, migration.sql)?;
        } else {
            conn.execute_batch(migration.sql)
                .map_err(|e| format!("Migration v{} failed: {}", migration.version, e))?;
        }

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| format!("Failed to record migration v{}: {}", migration.version, e))?;

        log::info!("Applied migration v{}", migration.version);
    }

    Ok(pending.len())
}
