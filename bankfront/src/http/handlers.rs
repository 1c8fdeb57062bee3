use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Form;
use tracing::{debug, info, warn};

use crate::backend::{
    coerce_account_number, ActionOutcome, CreateAccountRequest, LoginOutcome, LoginRequest,
};

use super::error::ApiError;
use super::gate::{landing_redirect, require_session, HOME_ROUTE, LANDING_ROUTE, LOGIN_ROUTE};
use super::responses::{
    map_backend_error, AccountPage, AccountsPage, ActionFailure, FormPage, HealthResponse,
    LoginForm, SignupForm,
};
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/accounts", get(accounts_page))
        .route("/me", get(me_page))
        .route("/login", get(form_page).post(login))
        .route("/signup", get(form_page).post(signup))
        .route("/logout", post(logout))
        // Propagate must sit inside Set so it sees the generated id.
        .layer(tower_http::request_id::PropagateRequestIdLayer::new(
            axum::http::header::HeaderName::from_static("x-request-id"),
        ))
        .layer(
            tower_http::request_id::SetRequestIdLayer::new(
                axum::http::header::HeaderName::from_static("x-request-id"),
                tower_http::request_id::MakeRequestUuid::default(),
            ),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn root(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    landing_redirect(&state, &jar)
}

async fn form_page() -> Json<FormPage> {
    Json(FormPage::default())
}

async fn accounts_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    if state.protect_accounts {
        if let Err(redirect) = require_session(&state, &jar) {
            return Ok(redirect.into_response());
        }
    }

    let bank = state
        .backend
        .list_accounts()
        .await
        .map_err(map_backend_error)?;
    debug!("account list loaded");
    Ok(Json(AccountsPage { bank }).into_response())
}

async fn me_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiError> {
    let user_id = match require_session(&state, &jar) {
        Ok(user_id) => user_id,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let user = state
        .backend
        .get_account(user_id)
        .await
        .map_err(map_backend_error)?;
    debug!(user_id = %user_id, "account detail loaded");
    Ok(Json(AccountPage { user }).into_response())
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let request = LoginRequest {
        account_number: coerce_account_number(&form.account_number),
        password: form.password,
    };

    match state.backend.login(&request).await.map_err(map_backend_error)? {
        LoginOutcome::Authenticated { user_id } => {
            info!(account_number = ?request.account_number, "login successful");
            let jar = state.session.issue(jar, &user_id);
            Ok((jar, Redirect::to(LANDING_ROUTE)).into_response())
        }
        LoginOutcome::Rejected(status) => {
            warn!(
                account_number = ?request.account_number,
                status = %status,
                "login rejected by accounts service"
            );
            Ok(ActionFailure::new(status).into_response())
        }
    }
}

async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, ApiError> {
    let request = CreateAccountRequest {
        first_name: form.first_name,
        last_name: form.last_name,
        password: form.password,
    };

    match state
        .backend
        .create_account(&request)
        .await
        .map_err(map_backend_error)?
    {
        ActionOutcome::Accepted => {
            info!("account created");
            Ok(Redirect::to(HOME_ROUTE).into_response())
        }
        ActionOutcome::Rejected(status) => {
            warn!(status = %status, "account not created");
            Ok(ActionFailure::new(status).into_response())
        }
    }
}

/// The local session is dropped even when the accounts service cannot be told.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    match state.backend.logout().await {
        Ok(ActionOutcome::Accepted) => debug!("accounts service acknowledged logout"),
        Ok(ActionOutcome::Rejected(status)) => {
            warn!(status = %status, "accounts service rejected logout");
        }
        Err(err) => warn!(error = %err, "accounts service logout failed"),
    }
    (state.session.clear(jar), Redirect::to(LOGIN_ROUTE)).into_response()
}
