//! SQLite-backed record store for HR and CRM collections.
//!
//! The database lives at `~/.perfdash/perfdash.db` unless a path is given.
//! The dashboard only reads from it; the seeder writes through the same
//! connection inside one transaction.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};

use crate::date_range::DateRange;

pub mod activity;
pub mod criteria;
pub mod crm;
pub mod employees;
pub mod hr;
pub mod types;

pub use criteria::*;
pub use types::*;

pub struct DashboardDb {
    conn: Connection,
}

impl DashboardDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(DbError::from)?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT").map_err(DbError::from)?;
                Ok(val)
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Open a database at an explicit path, creating parent directories and
    /// applying pending migrations.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let applied = crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;
        if applied > 0 {
            log::info!("Applied {} migration(s) to {}", applied, path.display());
        }

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }

    /// Open an existing database in read-only mode. No migrations are run
    /// and a missing file is an error, never an empty store.
    pub fn open_readonly_at(path: &Path) -> Result<Self, DbError> {
        if !path.is_file() {
            return Err(DbError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Resolve the default database path: `~/.perfdash/perfdash.db`.
    pub fn default_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".perfdash").join("perfdash.db"))
    }

    /// Whether a collection exists in this store.
    pub fn has_table(&self, table: &str) -> Result<bool, DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![table],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Whether `table` carries `column`. Sites add optional columns (for
    /// example `events.employee`) that change how records are attributed.
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool, DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2)",
            params![table, column],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Run a single-value `COUNT(*)`-style query.
    pub(crate) fn count(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<i64, DbError> {
        let n: Option<i64> = self.conn.query_row(sql, args, |row| row.get(0))?;
        Ok(n.unwrap_or(0))
    }

    /// Run a `SELECT key, COUNT(*) ... GROUP BY key` query.
    pub(crate) fn grouped_counts(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<(Option<String>, i64)>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Generate a record id for rows created by this tool.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn test_db() -> DashboardDb {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("perfdash_test.db");
        std::mem::forget(dir);
        DashboardDb::open_at(path).expect("open test db")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_db;
    use super::*;

    #[test]
    fn test_has_table_and_column() {
        let db = test_db();
        assert!(db.has_table("leads").expect("query"));
        assert!(!db.has_table("nonexistent").expect("query"));
        assert!(db.has_column("events", "owner").expect("query"));
        assert!(!db.has_column("events", "employee").expect("query"));
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = test_db();
        let result: Result<(), DbError> = db.with_transaction(|tx| {
            tx.conn_ref().execute(
                "INSERT INTO departments (name) VALUES ('Sales')",
                [],
            )?;
            Err(DbError::Migration("forced".into()))
        });
        assert!(result.is_err());
        let n = db
            .count("SELECT COUNT(*) FROM departments", &[])
            .expect("count");
        assert_eq!(n, 0);
    }

    #[test]
    fn test_open_at_creates_parent_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("store.db");
        let db = DashboardDb::open_at(path.clone()).expect("open");
        assert!(path.exists());
        assert!(db.has_table("employees").expect("query"));
    }

    #[test]
    fn test_readonly_open_requires_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("typo.db");
        let err = DashboardDb::open_readonly_at(&path).err().expect("missing file");
        assert!(matches!(err, DbError::NotFound(_)));
        assert!(!path.exists());

        DashboardDb::open_at(path.clone()).expect("create");
        let db = DashboardDb::open_readonly_at(&path).expect("open existing");
        assert!(db.has_table("leads").expect("query"));
    }
}
