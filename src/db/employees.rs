use super::*;

const EMPLOYEE_COLUMNS: &str = "id, employee_name, user_id, reports_to, department";

fn map_employee(row: &rusqlite::Row) -> rusqlite::Result<DbEmployee> {
    Ok(DbEmployee {
        id: row.get(0)?,
        employee_name: row.get(1)?,
        user_id: row.get(2)?,
        reports_to: row.get(3)?,
        department: row.get(4)?,
    })
}

impl DashboardDb {
    // =========================================================================
    // Employees
    // =========================================================================

    /// Insert or replace an employee record.
    pub fn upsert_employee(&self, employee: &DbEmployee) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO employees (id, employee_name, user_id, reports_to, department)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                employee_name = excluded.employee_name,
                user_id = excluded.user_id,
                reports_to = excluded.reports_to,
                department = excluded.department",
            params![
                employee.id,
                employee.employee_name,
                employee.user_id,
                employee.reports_to,
                employee.department,
            ],
        )?;
        Ok(())
    }

    pub fn get_employee(&self, id: &str) -> Result<Option<DbEmployee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], map_employee)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Linked user of an employee. `None` covers both a missing employee and
    /// an employee without a user.
    pub fn user_id_for_employee(&self, id: &str) -> Result<Option<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM employees WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], |row| row.get::<_, Option<String>>(0))?;
        match rows.next() {
            Some(row) => Ok(row?.filter(|u| !u.trim().is_empty())),
            None => Ok(None),
        }
    }

    /// All employees linked to a user, ordered by id.
    pub fn employees_for_user(&self, user_id: &str) -> Result<Vec<DbEmployee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE user_id = ?1 ORDER BY id");
        self.query_employees(&sql, params![user_id])
    }

    /// Employees whose `reports_to` is `manager`.
    pub fn direct_reports(&self, manager: &str) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM employees WHERE reports_to = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![manager], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// `LIKE %fragment%` over employee ids.
    pub fn search_employees_by_id(&self, fragment: &str) -> Result<Vec<DbEmployee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id LIKE ?1 ORDER BY id");
        self.query_employees(&sql, params![like_pattern(fragment)])
    }

    /// `LIKE %fragment%` over employee names.
    pub fn search_employees_by_name(&self, fragment: &str) -> Result<Vec<DbEmployee>, DbError> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_name LIKE ?1 ORDER BY id"
        );
        self.query_employees(&sql, params![like_pattern(fragment)])
    }

    pub fn get_all_employees(&self) -> Result<Vec<DbEmployee>, DbError> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
        self.query_employees(&sql, [])
    }

    pub fn set_employee_department(&self, id: &str, department: &str) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE employees SET department = ?2 WHERE id = ?1",
            params![id, department],
        )?;
        Ok(())
    }

    /// Any existing department, in name order.
    pub fn first_department(&self) -> Result<Option<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM departments ORDER BY name LIMIT 1")?;
        let mut rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn insert_department(&self, name: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO departments (name) VALUES (?1)",
            params![name],
        )?;
        Ok(())
    }

    fn query_employees<P: rusqlite::Params>(
        &self,
        sql: &str,
        args: P,
    ) -> Result<Vec<DbEmployee>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, map_employee)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Wrap a search fragment for `LIKE`, escaping nothing: `%` and `_` typed by
/// an operator keep their wildcard meaning.
fn like_pattern(fragment: &str) -> String {
    format!("%{}%", fragment.trim())
}
