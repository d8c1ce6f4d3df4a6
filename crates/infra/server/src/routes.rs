//! HTTP routes over the passcode registry.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::TimeDelta;
use multiauth_core::{MultiAuthError, PasscodeId};
use multiauth_passcode::display::{remaining_seconds, soonest_first};
use multiauth_passcode::{
    CheckOutcome, InputError, IssueOutcome, PasscodeConfig, PasscodeRegistry, validate_code,
    validate_lookup,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for passcode routes.
#[derive(Clone)]
pub struct AppState {
    /// The registry every request operates on.
    pub registry: Arc<PasscodeRegistry>,
    /// Issuing settings.
    pub passcodes: PasscodeConfig,
}

/// Creates an Axum router with the passcode API.
///
/// ```text
/// POST /api/passcodes          issue or renew a passcode
/// GET  /api/passcodes          list active passcodes, soonest expiry first
/// GET  /api/passcodes/{code}   check a passcode
/// GET  /health                 liveness and active count
/// ```
pub fn passcode_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/passcodes", get(list_handler).post(issue_handler))
        .route("/api/passcodes/{code}", get(check_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Body of `POST /api/passcodes`.
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    /// Code as entered by the user, either a JSON string or integer.
    pub code: RawCode,
    /// Lifetime override; the configured default applies when absent.
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

/// A code as it arrives in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCode {
    /// `"1234"`
    Text(String),
    /// `1234`
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
}

impl RawCode {
    /// Text handed to input validation; integers are rendered in decimal.
    pub fn into_text(self) -> String {
        match self {
            RawCode::Text(text) => text,
            RawCode::Integer(n) => PasscodeId::from(n).to_string(),
            RawCode::Unsigned(n) => PasscodeId::from(n).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct IssueResponse {
    code: PasscodeId,
    renewed: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    code: PasscodeId,
    valid: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ListedPasscode {
    code: PasscodeId,
    expires_in_ms: i64,
    expires_in_seconds: i64,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    passcodes: Vec<ListedPasscode>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    active: usize,
}

async fn issue_handler(
    State(state): State<AppState>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<IssueResponse>, ApiError> {
    let Json(request) = body?;
    let code = validate_code(&request.code.into_text(), &state.passcodes)?;
    let duration = match request.duration_ms {
        Some(ms) if ms <= 0 => {
            return Err(MultiAuthError::invalid_input("duration_ms", "must be positive").into());
        }
        Some(ms) => TimeDelta::milliseconds(ms),
        None => state.passcodes.default_duration(),
    };

    let outcome = IssueOutcome::from_renewed(state.registry.create_or_renew(&code, duration));

    Ok(Json(IssueResponse {
        code,
        renewed: outcome.is_renewed(),
        message: outcome.message(),
    }))
}

async fn check_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<CheckResponse>, ApiError> {
    let code = validate_lookup(&raw, &state.passcodes)?;
    let outcome = CheckOutcome::from_valid(state.registry.is_valid(&code));

    Ok(Json(CheckResponse {
        code,
        valid: outcome.is_valid(),
        message: outcome.message(),
    }))
}

async fn list_handler(State(state): State<AppState>) -> Json<ListResponse> {
    let passcodes = soonest_first(state.registry.list_active())
        .into_iter()
        .map(|p| ListedPasscode {
            expires_in_seconds: remaining_seconds(p.remaining_ms),
            expires_in_ms: p.remaining_ms,
            code: p.identifier,
        })
        .collect();

    Json(ListResponse { passcodes })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        active: state.registry.len(),
    })
}

/// Error returned by the passcode API.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

impl From<MultiAuthError> for ApiError {
    fn from(err: MultiAuthError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = if err.is_user_error() {
            "INVALID_INPUT"
        } else {
            "INTERNAL_ERROR"
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "INVALID_BODY",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            tracing::warn!(code = self.code, "Rejected passcode request: {}", self.message);
        } else {
            tracing::error!(code = self.code, "Passcode request failed: {}", self.message);
        }

        let body = serde_json::json!({
            "error": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}
