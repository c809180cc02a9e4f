// Audit service
// Resolves full or partial employee names to records before seeding.

use serde::Serialize;

use crate::db::{DashboardDb, DbEmployee, DbError};

/// Minimum Jaro-Winkler similarity for the fuzzy fallback.
pub const FUZZY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeMatch {
    pub id: String,
    pub employee_name: String,
    pub user_id: Option<String>,
}

impl From<DbEmployee> for EmployeeMatch {
    fn from(e: DbEmployee) -> Self {
        Self {
            id: e.id,
            employee_name: e.employee_name,
            user_id: e.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSearchResult {
    pub search: String,
    pub found: Vec<EmployeeMatch>,
}

/// Look each name up by id, then by display name, then fuzzily.
/// The first strategy with any hit wins.
pub fn search_employees(
    db: &DashboardDb,
    names: &[String],
) -> Result<Vec<EmployeeSearchResult>, DbError> {
    let mut everyone: Option<Vec<DbEmployee>> = None;
    let mut results = Vec::with_capacity(names.len());

    for name in names {
        let needle = name.trim();
        let mut found = if needle.is_empty() {
            Vec::new()
        } else {
            db.search_employees_by_id(needle)?
        };
        if found.is_empty() && !needle.is_empty() {
            found = db.search_employees_by_name(needle)?;
        }
        if found.is_empty() && !needle.is_empty() {
            if everyone.is_none() {
                everyone = Some(db.get_all_employees()?);
            }
            found = everyone
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .filter(|e| name_similarity(needle, &e.employee_name) >= FUZZY_THRESHOLD)
                .cloned()
                .collect();
        }

        log::debug!("Audit '{}': {} match(es)", needle, found.len());
        results.push(EmployeeSearchResult {
            search: name.clone(),
            found: found.into_iter().map(EmployeeMatch::from).collect(),
        });
    }
    Ok(results)
}

/// Best Jaro-Winkler score of `needle` against the full name or any of its
/// tokens, case-insensitive.
pub fn name_similarity(needle: &str, full_name: &str) -> f64 {
    let needle = needle.to_lowercase();
    let full = full_name.to_lowercase();
    std::iter::once(full.as_str())
        .chain(full.split_whitespace())
        .map(|candidate| strsim::jaro_winkler(&needle, candidate))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_db;

    fn staff(db: &DashboardDb) {
        for (id, name, user) in [
            ("HR-EMP-0001", "Omar Mostafa", Some("omar@x.com")),
            ("HR-EMP-0002", "Hassan Tarek", None),
            ("HR-EMP-0003", "Noor Gamal", Some("noor@x.com")),
        ] {
            db.upsert_employee(&DbEmployee::new(id, name, user)).expect("insert");
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_id_match_wins_over_name() {
        let db = test_db();
        staff(&db);
        let results = search_employees(&db, &names(&["EMP-0003"])).expect("search");
        assert_eq!(results[0].found.len(), 1);
        assert_eq!(results[0].found[0].employee_name, "Noor Gamal");
        assert_eq!(results[0].found[0].user_id.as_deref(), Some("noor@x.com"));
    }

    #[test]
    fn test_partial_name_match() {
        let db = test_db();
        staff(&db);
        let results = search_employees(&db, &names(&["Tarek"])).expect("search");
        assert_eq!(results[0].search, "Tarek");
        assert_eq!(results[0].found[0].id, "HR-EMP-0002");
    }

    #[test]
    fn test_fuzzy_fallback_catches_misspelling() {
        let db = test_db();
        staff(&db);
        let results = search_employees(&db, &names(&["Omar Mostfa", "Zzyzx Qwerty"])).expect("search");
        assert_eq!(results[0].found.len(), 1);
        assert_eq!(results[0].found[0].id, "HR-EMP-0001");
        assert!(results[1].found.is_empty());
    }

    #[test]
    fn test_blank_name_finds_nothing() {
        let db = test_db();
        staff(&db);
        let results = search_employees(&db, &names(&["  "])).expect("search");
        assert!(results[0].found.is_empty());
    }

    #[test]
    fn test_token_similarity() {
        assert!(name_similarity("gamal", "Noor Gamal") > 0.99);
        assert!(name_similarity("xyz", "Noor Gamal") < FUZZY_THRESHOLD);
    }
}
