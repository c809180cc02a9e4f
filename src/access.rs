//! Who may see whose dashboard.
//!
//! Requests carry an explicit [`Actor`]. Full-access roles see everyone;
//! everyone else sees their own employee record and the employees who report
//! to it, directly or through intermediate managers.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::db::{DashboardDb, DbError};

/// Roles that bypass the reporting-chain scope.
pub const FULL_ACCESS_ROLES: &[&str] = &["High Management", "System Manager"];

/// The user a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles,
        }
    }

    /// Local operator with unrestricted scope.
    pub fn system() -> Self {
        Self::new("Administrator", vec!["System Manager".to_string()])
    }

    pub fn has_full_access(&self) -> bool {
        self.roles
            .iter()
            .any(|r| FULL_ACCESS_ROLES.contains(&r.trim()))
    }
}

/// Resolved set of employees an actor may view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    All,
    Employees(HashSet<String>),
}

impl Visibility {
    pub fn allows(&self, employee: &str) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Employees(ids) => ids.contains(employee),
        }
    }
}

pub fn resolve_visibility(db: &DashboardDb, actor: &Actor) -> Result<Visibility, DbError> {
    if actor.has_full_access() {
        return Ok(Visibility::All);
    }

    let mut visible = HashSet::new();
    for own in db.employees_for_user(&actor.user_id)? {
        visible.extend(team_members(db, &own.id)?);
    }
    Ok(Visibility::Employees(visible))
}

/// `root` plus everyone below it in the reporting chain.
///
/// Breadth-first; a visited set stops `reports_to` cycles.
pub fn team_members(db: &DashboardDb, root: &str) -> Result<HashSet<String>, DbError> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(root.to_string());
    queue.push_back(root.to_string());

    while let Some(manager) = queue.pop_front() {
        for report in db.direct_reports(&manager)? {
            if seen.insert(report.clone()) {
                queue.push_back(report);
            }
        }
    }
    Ok(seen)
}

pub fn can_view(db: &DashboardDb, actor: &Actor, employee: &str) -> Result<bool, DbError> {
    Ok(resolve_visibility(db, actor)?.allows(employee))
}
