use crate::views;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::{error, warn};

pub const LOGIN_FAILED_MESSAGE: &str =
    "Invalid login credentials or database not found. Please try again.";

#[derive(Debug, ThisError)]
pub enum InventoryError {
    /// No credentials in the session; answered with a redirect to the login page.
    #[error("no database credentials in session")]
    SessionMissing,

    #[error("Invalid login credentials or database not found. Please try again.")]
    LoginFailed,

    #[error("Digital display not found.")]
    DisplayNotFound(String),

    #[error("No details found for this model number.")]
    ModelNotFound(String),

    #[error("Error: Model No \"{0}\" does not exist. Please provide a valid model.")]
    UnknownModel(String),

    #[error("Error: Digital display with Serial No \"{0}\" already exists.")]
    DuplicateSerial(String),

    #[error("Error: Model No \"{0}\" already exists.")]
    DuplicateModel(String),

    #[error("Error: {0}")]
    InvalidForm(String),

    #[error("Error {action}: {source}")]
    Operation {
        action: &'static str,
        #[source]
        source: SqlxError,
    },

    #[error("Error {action}: the database did not answer in time.")]
    QueryTimeout { action: &'static str },

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Attaches the user-facing action label to a driver error.
pub trait OperationContext<T> {
    fn during(self, action: &'static str) -> Result<T, InventoryError>;
}

impl<T> OperationContext<T> for Result<T, SqlxError> {
    fn during(self, action: &'static str) -> Result<T, InventoryError> {
        self.map_err(|source| InventoryError::Operation { action, source })
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            InventoryError::SessionMissing => return Redirect::to("/").into_response(),
            InventoryError::LoginFailed => {
                return views::login_page(Some(LOGIN_FAILED_MESSAGE)).into_response();
            }
            InventoryError::Operation { action, source } => {
                error!(action = %action, error = %source, "database operation failed");
            }
            InventoryError::QueryTimeout { action } => {
                error!(action = %action, "database operation timed out");
            }
            InventoryError::SessionStore(e) | InventoryError::Config(e) => {
                error!(error = %e, "internal failure");
            }
            other => warn!(error = %other, "request rejected"),
        }

        let status = match &self {
            InventoryError::DisplayNotFound(_) | InventoryError::ModelNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            InventoryError::SessionStore(_) | InventoryError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        };
        (status, views::message_page(&self.to_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_session_redirects_to_login() {
        let resp = InventoryError::SessionMissing.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/");
    }

    #[test]
    fn only_lookups_answer_not_found() {
        assert_eq!(
            InventoryError::ModelNotFound("M1".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            InventoryError::DisplayNotFound("S1".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            InventoryError::UnknownModel("M9".into()).into_response().status(),
            StatusCode::OK
        );
        assert_eq!(
            InventoryError::InvalidForm("width: invalid float literal".into())
                .into_response()
                .status(),
            StatusCode::OK
        );
        let failed = InventoryError::Operation {
            action: "fetching digital displays",
            source: SqlxError::RowNotFound,
        };
        assert_eq!(failed.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn operation_message_echoes_driver_text() {
        let err: Result<(), _> = Err(SqlxError::PoolTimedOut);
        let msg = err.during("searching digital displays").unwrap_err().to_string();
        assert!(msg.starts_with("Error searching digital displays: "));
        assert!(msg.contains(&SqlxError::PoolTimedOut.to_string()));
    }
}
