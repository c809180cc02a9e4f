//! Error types for dashboard requests
//!
//! Errors are classified by who can fix them:
//! - UserFacing: bad input, access scope, missing configuration
//! - Internal: store failures

use thiserror::Error;

use crate::db::DbError;

/// Error types for dashboard and audit requests
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Employee ID is required")]
    EmployeeRequired,

    #[error("{actor} is not allowed to view employee {employee}")]
    PermissionDenied { actor: String, employee: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl DashboardError {
    /// Returns true if the caller can fix this error by changing the request
    /// or the configuration
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, DashboardError::Store(_))
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            DashboardError::EmployeeRequired | DashboardError::InvalidDate(_) => {
                ErrorType::InvalidRequest
            }
            DashboardError::PermissionDenied { .. } => ErrorType::PermissionDenied,
            DashboardError::Config(_) => ErrorType::Configuration,
            DashboardError::Store(_) => ErrorType::Internal,
        }
    }
}

/// Serializable error representation for the CLI and MCP surfaces
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    pub error_type: ErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    InvalidRequest,
    PermissionDenied,
    Configuration,
    Internal,
}

impl From<&DashboardError> for ErrorPayload {
    fn from(err: &DashboardError) -> Self {
        ErrorPayload {
            message: err.to_string(),
            error_type: err.error_type(),
        }
    }
}
