use bankbot_core::HttpRPCError;
use serde::{Deserialize, Serialize};

/// Error object returned by the Plaid API on non-success responses.
/// https://plaid.com/docs/errors/
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlaidApiError {
    pub error_type: String,
    pub error_code: String,
    pub error_message: String,
    #[serde(default)]
    pub display_message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    #[error("plaid request {path} failed: {error}")]
    Request { path: String, error: String },

    #[error("plaid {path} returned status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("plaid {path} error {}: {} ({})", .error.error_code, .error.error_message, .error.error_type)]
    Api {
        path: String,
        status: u16,
        error: PlaidApiError,
    },

    #[error("plaid {path} malformed response: {error}")]
    Decode { path: String, error: String },

    #[error("plaid returned no accounts")]
    NoAccounts,

    #[error("account {account_id} has no available balance")]
    MissingBalance { account_id: String },
}

impl PlaidError {
    /// The HTTP status code, if Plaid responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlaidError::Status { status, .. } | PlaidError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpRPCError> for PlaidError {
    fn from(err: HttpRPCError) -> Self {
        match err {
            HttpRPCError::RequestError { path, error, .. } => PlaidError::Request { path, error },
            HttpRPCError::ResponseError {
                path,
                status,
                error,
                ..
            } => PlaidError::Status {
                path,
                status,
                body: error,
            },
            HttpRPCError::ResultError { path, error, .. } => PlaidError::Decode { path, error },
        }
    }
}
