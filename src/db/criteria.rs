//! Typed query criteria.
//!
//! Column names interpolated into SQL come only from the closed enums below;
//! user-supplied values are always bound as parameters.

use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;

/// Which pair of lead columns identifies "this user's leads in the window".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeadFields {
    /// `lead_owner` / `creation`
    LeadOwner,
    /// `qualified_by` / `qualified_on`
    QualifiedBy,
}

impl LeadFields {
    pub fn owner_column(self) -> &'static str {
        match self {
            LeadFields::LeadOwner => "lead_owner",
            LeadFields::QualifiedBy => "qualified_by",
        }
    }

    pub fn date_column(self) -> &'static str {
        match self {
            LeadFields::LeadOwner => "creation",
            LeadFields::QualifiedBy => "qualified_on",
        }
    }
}

/// Owner column on appointments, events and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OwnerColumn {
    Owner,
    CustomOwn,
}

impl OwnerColumn {
    pub fn column(self) -> &'static str {
        match self {
            OwnerColumn::Owner => "owner",
            OwnerColumn::CustomOwn => "custom_own",
        }
    }
}

/// Field mapping the dashboard queries run against.
///
/// Deployments disagree on which columns carry ownership, so there is no
/// default: it must be chosen in config or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConvention {
    pub lead: LeadFields,
    pub activity_owner: OwnerColumn,
}

/// Leads belonging to one user within a window.
#[derive(Debug, Clone, Copy)]
pub struct LeadCriteria<'a> {
    pub user: &'a str,
    pub fields: LeadFields,
    pub range: DateRange,
}

/// Records keyed by an owner column within a window.
#[derive(Debug, Clone, Copy)]
pub struct OwnedCriteria<'a> {
    pub user: &'a str,
    pub column: OwnerColumn,
    pub range: DateRange,
}

/// How events are attributed to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope<'a> {
    /// The store carries an `employee` column on events.
    Employee(&'a str),
    Owner { column: OwnerColumn, user: &'a str },
}

impl EventScope<'_> {
    pub fn column(&self) -> &'static str {
        match self {
            EventScope::Employee(_) => "employee",
            EventScope::Owner { column, .. } => column.column(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            EventScope::Employee(id) => id,
            EventScope::Owner { user, .. } => user,
        }
    }
}
