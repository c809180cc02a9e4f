use super::*;

impl DashboardDb {
    // =========================================================================
    // Attendance
    // =========================================================================

    /// Status breakdown for draft and submitted attendance in range.
    /// Cancelled records are excluded.
    pub fn attendance_stats(&self, employee: &str, range: &DateRange) -> Result<AttendanceStats, DbError> {
        let stats = self.conn.query_row(
            "SELECT
                SUM(CASE WHEN status IN ('Present', 'Work From Home') THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'Absent' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'Half Day' THEN 1 ELSE 0 END)
             FROM attendance
             WHERE employee = ?1
               AND docstatus IN (0, 1)
               AND attendance_date BETWEEN ?2 AND ?3",
            params![employee, range.start_str(), range.end_str()],
            |row| {
                Ok(AttendanceStats {
                    present: row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                    absent: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                    half_day: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                })
            },
        )?;
        Ok(stats)
    }

    pub fn insert_attendance(&self, record: &DbAttendance) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO attendance (id, employee, attendance_date, status, docstatus)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.employee,
                record.attendance_date,
                record.status.as_str(),
                record.docstatus as i32,
            ],
        )?;
        Ok(())
    }

    /// Returns the number of rows removed.
    pub fn delete_attendance_in_range(&self, employee: &str, range: &DateRange) -> Result<usize, DbError> {
        let n = self.conn.execute(
            "DELETE FROM attendance WHERE employee = ?1 AND attendance_date BETWEEN ?2 AND ?3",
            params![employee, range.start_str(), range.end_str()],
        )?;
        Ok(n)
    }

    // =========================================================================
    // Daily employee reports
    // =========================================================================

    pub fn count_daily_reports(&self, employee: &str, range: &DateRange) -> Result<i64, DbError> {
        self.count(
            "SELECT COUNT(*) FROM daily_reports WHERE employee = ?1 AND date BETWEEN ?2 AND ?3",
            &[&employee, &range.start_str(), &range.end_str()],
        )
    }

    /// Newest reports first.
    pub fn recent_daily_reports(
        &self,
        employee: &str,
        range: &DateRange,
        limit: usize,
    ) -> Result<Vec<DbDailyReport>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, employee, department, date, daily_summary
             FROM daily_reports
             WHERE employee = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, id
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![employee, range.start_str(), range.end_str(), limit as i64],
            |row| {
                Ok(DbDailyReport {
                    id: row.get(0)?,
                    employee: row.get(1)?,
                    department: row.get(2)?,
                    date: row.get(3)?,
                    daily_summary: row.get(4)?,
                })
            },
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn insert_daily_report(&self, report: &DbDailyReport) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO daily_reports (id, employee, department, date, daily_summary)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.id,
                report.employee,
                report.department,
                report.date,
                report.daily_summary,
            ],
        )?;
        Ok(())
    }

    pub fn delete_daily_reports_in_range(&self, employee: &str, range: &DateRange) -> Result<usize, DbError> {
        let n = self.conn.execute(
            "DELETE FROM daily_reports WHERE employee = ?1 AND date BETWEEN ?2 AND ?3",
            params![employee, range.start_str(), range.end_str()],
        )?;
        Ok(n)
    }

    // =========================================================================
    // Check-ins
    // =========================================================================

    /// `(ins, outs)` logged within the window.
    pub fn checkin_totals(&self, employee: &str, range: &DateRange) -> Result<(i64, i64), DbError> {
        let totals = self.conn.query_row(
            "SELECT
                SUM(CASE WHEN log_type = 'IN' THEN 1 ELSE 0 END),
                SUM(CASE WHEN log_type = 'OUT' THEN 1 ELSE 0 END)
             FROM employee_checkins
             WHERE employee = ?1 AND time >= ?2 AND time < ?3",
            params![employee, range.lower_bound(), range.upper_bound()],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                    row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                ))
            },
        )?;
        Ok(totals)
    }

    /// Newest logs first.
    pub fn recent_checkins(
        &self,
        employee: &str,
        range: &DateRange,
        limit: usize,
    ) -> Result<Vec<DbCheckin>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, employee, time, log_type, device_id
             FROM employee_checkins
             WHERE employee = ?1 AND time >= ?2 AND time < ?3
             ORDER BY time DESC, id
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![employee, range.lower_bound(), range.upper_bound(), limit as i64],
            |row| {
                Ok(DbCheckin {
                    id: row.get(0)?,
                    employee: row.get(1)?,
                    time: row.get(2)?,
                    log_type: row.get(3)?,
                    device_id: row.get(4)?,
                })
            },
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// IN logs grouped by calendar day.
    pub fn checkins_by_day(&self, employee: &str, range: &DateRange) -> Result<Vec<(String, i64)>, DbError> {
        let rows = self.grouped_counts(
            "SELECT DATE(time), COUNT(*)
             FROM employee_checkins
             WHERE employee = ?1 AND log_type = 'IN' AND time >= ?2 AND time < ?3
             GROUP BY DATE(time)
             ORDER BY DATE(time)",
            &[&employee, &range.lower_bound(), &range.upper_bound()],
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|(day, cnt)| day.map(|d| (d, cnt)))
            .collect())
    }

    pub fn insert_checkin(&self, checkin: &DbCheckin) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO employee_checkins (id, employee, time, log_type, device_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                checkin.id,
                checkin.employee,
                checkin.time,
                checkin.log_type,
                checkin.device_id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_checkins_in_range(&self, employee: &str, range: &DateRange) -> Result<usize, DbError> {
        let n = self.conn.execute(
            "DELETE FROM employee_checkins WHERE employee = ?1 AND time >= ?2 AND time < ?3",
            params![employee, range.lower_bound(), range.upper_bound()],
        )?;
        Ok(n)
    }

    // =========================================================================
    // Visitors
    // =========================================================================

    pub fn visitor_stats(&self, host: &str, range: &DateRange) -> Result<VisitorStats, DbError> {
        let stats = self.conn.query_row(
            "SELECT
                COUNT(*),
                SUM(CASE WHEN visit_date = ?3 THEN 1 ELSE 0 END),
                SUM(CASE WHEN purpose = 'Client' THEN 1 ELSE 0 END),
                SUM(CASE WHEN purpose = 'Interview' THEN 1 ELSE 0 END)
             FROM visitors
             WHERE host_employee = ?1 AND visit_date BETWEEN ?2 AND ?3",
            params![host, range.start_str(), range.end_str()],
            |row| {
                Ok(VisitorStats {
                    total: row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                    on_last_day: row.get::<_, Option<i64>>(1)?.unwrap_or(0),
                    client: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                    interview: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                })
            },
        )?;
        Ok(stats)
    }

    pub fn insert_visitor(&self, visitor: &DbVisitor) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO visitors (id, host_employee, visit_date, purpose) VALUES (?1, ?2, ?3, ?4)",
            params![
                visitor.id,
                visitor.host_employee,
                visitor.visit_date,
                visitor.purpose,
            ],
        )?;
        Ok(())
    }
}
