use super::*;

impl DashboardDb {
    // =========================================================================
    // Leads
    // =========================================================================

    pub fn count_leads(&self, criteria: &LeadCriteria) -> Result<i64, DbError> {
        let owner = criteria.fields.owner_column();
        let date = criteria.fields.date_column();
        let sql = format!(
            "SELECT COUNT(*) FROM leads
             WHERE {owner} = ?1 AND {date} >= ?2 AND {date} < ?3"
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

    /// Distinct enabled customers converted from the user's leads in the window.
    pub fn count_active_customers(&self, criteria: &LeadCriteria) -> Result<i64, DbError> {
        let owner = criteria.fields.owner_column();
        let date = criteria.fields.date_column();
        let sql = format!(
            "SELECT COUNT(DISTINCT c.id)
             FROM customers c
             JOIN leads l ON l.customer = c.id
             WHERE l.{owner} = ?1
               AND c.disabled = 0
               AND l.{date} >= ?2 AND l.{date} < ?3"
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

    /// Lead counts grouped by calendar day (`YYYY-MM-DD`), ascending.
    pub fn lead_counts_by_day(&self, criteria: &LeadCriteria) -> Result<Vec<(String, i64)>, DbError> {
        let owner = criteria.fields.owner_column();
        let date = criteria.fields.date_column();
        let sql = format!(
            "SELECT DATE({date}) AS d, COUNT(*) AS cnt
             FROM leads
             WHERE {owner} = ?1 AND {date} >= ?2 AND {date} < ?3
             GROUP BY DATE({date})
             ORDER BY DATE({date})"
        );
        let rows = self.grouped_counts(
            &sql,
            &[
                &criteria.user,
                &criteria.range.lower_bound(),
                &criteria.range.upper_bound(),
            ],
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|(day, cnt)| day.map(|d| (d, cnt)))
            .collect())
    }

    /// Leads by `lead_owner` in insertion order. Used by the seeder, which
    /// always writes ownership to `lead_owner`.
    pub fn leads_for_owner(&self, owner: &str, limit: Option<usize>) -> Result<Vec<DbLead>, DbError> {
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_name, lead_owner, qualified_by, qualified_on, status, customer, creation
             FROM leads WHERE lead_owner = ?1
             ORDER BY rowid
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![owner, limit], |row| {
            Ok(DbLead {
                id: row.get(0)?,
                lead_name: row.get(1)?,
                lead_owner: row.get(2)?,
                qualified_by: row.get(3)?,
                qualified_on: row.get(4)?,
                status: row.get(5)?,
                customer: row.get(6)?,
                creation: row.get(7)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn insert_lead(&self, lead: &DbLead) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO leads (id, lead_name, lead_owner, qualified_by, qualified_on, status, customer, creation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                lead.id,
                lead.lead_name,
                lead.lead_owner,
                lead.qualified_by,
                lead.qualified_on,
                lead.status,
                lead.customer,
                lead.creation,
            ],
        )?;
        Ok(())
    }

    /// Move a lead's creation and qualification to `timestamp`. A lead with
    /// no qualifier is marked as qualified by `owner`.
    pub fn backdate_lead(&self, id: &str, owner: &str, timestamp: &str) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE leads SET creation = ?3,
                qualified_by = COALESCE(qualified_by, ?2),
                qualified_on = ?3
             WHERE id = ?1",
            params![id, owner, timestamp],
        )?;
        Ok(())
    }

    pub fn set_lead_customer(&self, lead_id: &str, customer_id: &str) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE leads SET customer = ?2 WHERE id = ?1",
            params![lead_id, customer_id],
        )?;
        Ok(())
    }

    // =========================================================================
    // Opportunities
    // =========================================================================

    pub fn count_opportunities(&self, user: &str, range: &DateRange) -> Result<i64, DbError> {
        self.count(
            "SELECT COUNT(*) FROM opportunities
             WHERE opportunity_owner = ?1 AND creation >= ?2 AND creation < ?3",
            &[&user, &range.lower_bound(), &range.upper_bound()],
        )
    }

    pub fn opportunity_ids_for_owner(&self, owner: &str) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM opportunities WHERE opportunity_owner = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![owner], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn insert_opportunity(&self, opp: &DbOpportunity) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO opportunities (id, opportunity_from, opportunity_owner, status, creation)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                opp.id,
                opp.opportunity_from,
                opp.opportunity_owner,
                opp.status,
                opp.creation,
            ],
        )?;
        Ok(())
    }

    pub fn backdate_opportunity(&self, id: &str, timestamp: &str) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE opportunities SET creation = ?2 WHERE id = ?1",
            params![id, timestamp],
        )?;
        Ok(())
    }

    // =========================================================================
    // Customers & invoices
    // =========================================================================

    pub fn insert_customer(&self, customer: &DbCustomer) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO customers (id, customer_name, customer_group, territory, disabled, creation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                customer.id,
                customer.customer_name,
                customer.customer_group,
                customer.territory,
                customer.disabled as i32,
                customer.creation,
            ],
        )?;
        Ok(())
    }

    pub fn customer_id_by_name(&self, name: &str) -> Result<Option<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM customers WHERE customer_name = ?1 ORDER BY id LIMIT 1")?;
        let mut rows = stmt.query_map(params![name], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Invoices owned by the user with a posting date in range (date-only column).
    pub fn count_sales_invoices(&self, user: &str, range: &DateRange) -> Result<i64, DbError> {
        self.count(
            "SELECT COUNT(*) FROM sales_invoices
             WHERE owner = ?1 AND posting_date BETWEEN ?2 AND ?3",
            &[&user, &range.start_str(), &range.end_str()],
        )
    }
}
