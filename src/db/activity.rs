use super::*;

impl DashboardDb {
    // =========================================================================
    // Appointments
    // =========================================================================

    pub fn count_appointments(&self, criteria: &OwnedCriteria) -> Result<i64, DbError> {
        let owner = criteria.column.column();
        let sql = format!(
            "SELECT COUNT(*) FROM appointments
             WHERE {owner} = ?1 AND scheduled_time >= ?2 AND scheduled_time < ?3"
        );
        self.count(
            &sql,
            &[
                &criteria.user,
                &criteria.range.lower_bound(),
                &criteria.range.upper_bound(),
            ],
        )
    }

    pub fn insert_appointment(&self, appointment: &DbAppointment) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO appointments (id, scheduled_time, owner, custom_own)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                appointment.id,
                appointment.scheduled_time,
                appointment.owner,
                appointment.custom_own,
            ],
        )?;
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Event counts keyed by trimmed `event_type`. A `None` key covers
    /// events without a type.
    pub fn event_counts_by_type(
        &self,
        scope: &EventScope,
        range: &DateRange,
    ) -> Result<Vec<(Option<String>, i64)>, DbError> {
        let column = scope.column();
        let sql = format!(
            "SELECT TRIM(event_type), COUNT(*)
             FROM events
             WHERE {column} = ?1 AND starts_on >= ?2 AND starts_on < ?3
             GROUP BY TRIM(event_type)"
        );
        self.grouped_counts(
            &sql,
            &[&scope.value(), &range.lower_bound(), &range.upper_bound()],
        )
    }

    pub fn insert_event(&self, event: &DbEvent) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO events (id, subject, starts_on, event_type, sent_or_received, owner, custom_own)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.id,
                event.subject,
                event.starts_on,
                event.event_type,
                event.sent_or_received,
                event.owner,
                event.custom_own,
            ],
        )?;
        Ok(())
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub fn count_tasks(&self, criteria: &OwnedCriteria) -> Result<i64, DbError> {
        let owner = criteria.column.column();
        let sql = format!(
            "SELECT COUNT(*) FROM tasks
             WHERE {owner} = ?1 AND creation >= ?2 AND creation < ?3"
        );
        self.count(
            &sql,
            &[
                &criteria.user,
                &criteria.range.lower_bound(),
                &criteria.range.upper_bound(),
            ],
        )
    }

    pub fn insert_task(&self, task: &DbTask) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO tasks (id, subject, status, owner, custom_own, creation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id,
                task.subject,
                task.status,
                task.owner,
                task.custom_own,
                task.creation,
            ],
        )?;
        Ok(())
    }
}
