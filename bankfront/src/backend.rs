//! Client for the remote accounts service.
//!
//! Every call is a single request with no retry. Transport failures and malformed
//! JSON bubble up as [`BackendError`]; non-success statuses on form actions are
//! ordinary outcomes the caller renders.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Response header carrying the authenticated account id after `POST /login`.
pub const USER_ID_HEADER: &str = "user-id";

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub account_number: Option<i64>,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { user_id: String },
    Rejected(StatusCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted,
    Rejected(StatusCode),
}

impl BackendClient {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "bankfront/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn list_accounts(&self) -> Result<Value, BackendError> {
        self.get_json(self.endpoint(&["accounts"])).await
    }

    pub async fn get_account(&self, id: &str) -> Result<Value, BackendError> {
        // The url crate drops dot segments, which would turn `/accounts/..` into `/`.
        if id == "." || id == ".." {
            return Err(BackendError::InvalidAccountRef(String::from(id)));
        }
        self.get_json(self.endpoint(&["accounts", id])).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, BackendError> {
        let url = self.endpoint(&["login"]);
        let resp = self.http.post(url.clone()).json(request).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "login: accounts service unreachable");
            BackendError::Http(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Ok(LoginOutcome::Rejected(status));
        }

        let user_id = resp
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
            .ok_or(BackendError::MissingUserId)?;
        Ok(LoginOutcome::Authenticated { user_id })
    }

    pub async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<ActionOutcome, BackendError> {
        let url = self.endpoint(&["accounts"]);
        let resp = self.http.post(url.clone()).json(request).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "create account: accounts service unreachable");
            BackendError::Http(e)
        })?;
        Ok(action_outcome(resp.status()))
    }

    pub async fn logout(&self) -> Result<ActionOutcome, BackendError> {
        let resp = self.http.post(self.endpoint(&["logout"])).send().await?;
        Ok(action_outcome(resp.status()))
    }

    /// Page loads hand the body through whatever the status, so error payloads
    /// reach the page as data.
    async fn get_json(&self, url: Url) -> Result<Value, BackendError> {
        let resp = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "accounts service unreachable");
            BackendError::Http(e)
        })?;
        let status = resp.status();
        if status.is_success() {
            debug!(url = %url, status = %status, "accounts service responded");
        } else {
            warn!(url = %url, status = %status, "accounts service returned error status");
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Appends percent-encoded segments to the base path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn action_outcome(status: StatusCode) -> ActionOutcome {
    if status.is_success() {
        ActionOutcome::Accepted
    } else {
        ActionOutcome::Rejected(status)
    }
}

/// Form input is forwarded unvalidated: blank means 0, decimal or `0x`/`0o`/`0b`
/// text is taken as written, anything else (or anything outside `i64`) is sent as
/// JSON `null` for the backend to reject.
pub fn coerce_account_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Some(number) = parse_radix_prefixed(trimmed) {
        return number;
    }
    if let Ok(number) = trimmed.parse::<i64>() {
        return Some(number);
    }
    let number = trimmed.parse::<f64>().ok()?;
    // 2^63 is exactly representable; anything at or past it overflows i64.
    let in_range = number >= i64::MIN as f64 && number < i64::MAX as f64;
    if number.is_finite() && number.fract() == 0.0 && in_range {
        Some(number as i64)
    } else {
        None
    }
}

/// `Some(_)` when the text carries a radix prefix, whether or not the digits parse.
fn parse_radix_prefixed(text: &str) -> Option<Option<i64>> {
    let prefix = text.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Some(None);
    }
    Some(i64::from_str_radix(digits, radix).ok())
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("login succeeded without a user-id header")]
    MissingUserId,
    #[error("invalid account reference {0:?}")]
    InvalidAccountRef(String),
}
