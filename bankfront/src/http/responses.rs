use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::backend::BackendError;

use super::error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Data for the account list page; the backend body is passed through as is.
#[derive(Debug, Serialize)]
pub struct AccountsPage {
    pub bank: Value,
}

/// Data for the signed-in visitor's own account page.
#[derive(Debug, Serialize)]
pub struct AccountPage {
    pub user: Value,
}

/// The login and signup pages render a bare form.
#[derive(Debug, Default, Serialize)]
pub struct FormPage {}

/// Returned by a form action the accounts service refused; the page re-renders
/// its form with this status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    pub status: u16,
}

impl ActionFailure {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status: status.as_u16(),
        }
    }
}

impl IntoResponse for ActionFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub account_number: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub fn map_backend_error(err: BackendError) -> ApiError {
    match err {
        BackendError::InvalidAccountRef(id) => {
            warn!(account_ref = %id, "refusing account lookup");
            ApiError::InvalidAccountRef
        }
        other => {
            error!(error = %other, "accounts service call failed");
            ApiError::Internal
        }
    }
}
