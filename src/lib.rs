//! Employee performance dashboards over an HR/CRM SQLite store.
//!
//! [`services::dashboard`] aggregates one employee's records for a window,
//! [`services::seed`] generates test data dated into last month, and
//! [`services::audit`] resolves employee names.

pub mod access;
pub mod date_range;
pub mod db;
pub mod error;
mod migrations;
pub mod services;
pub mod state;
pub mod types;

pub use access::Actor;
pub use db::{DashboardDb, FieldConvention};
pub use error::DashboardError;
pub use types::{DashboardPayload, DashboardRequest};
