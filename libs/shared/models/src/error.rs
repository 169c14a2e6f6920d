use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The HTTP-boundary error type (spec.md §7). Every cell's own `thiserror`
/// enum converts into one of these variants; the failing `phase` is carried
/// through so a caller always sees which stage (parse/classify/solve/
/// simulate) produced the failure, per §7's structured-message requirement.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fatal at startup: missing required config key, unparseable arrival
    /// expression, unknown `defaultArrivalFunction` (§7 "Configuration").
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Fatal per-call: unknown diagnosis code (§7 "Classification").
    #[error("classification error: {0}")]
    Classification(String),

    /// Fatal per-tick: non-positive arrival-rate expression value (§7
    /// "Arrival-rate").
    #[error("arrival-rate error: {0}")]
    ArrivalRate(String),

    /// Non-fatal: solver infeasible/unbounded/errored/missing its native
    /// library (§7 "Solver-*"). The affected staff class continues with the
    /// infeasible-output shape rather than aborting the run.
    #[error("solver error: {0}")]
    Solver(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Classification(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ArrivalRate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Solver(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn phase(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "parse",
            AppError::Classification(_) => "classify",
            AppError::ArrivalRate(_) => "simulate",
            AppError::Solver(_) => "solve",
            AppError::NotFound(_) | AppError::BadRequest(_) | AppError::Internal(_) => "request",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let phase = self.phase();
        let message = self.to_string();

        tracing::error!(%status, phase, "{message}");

        let body = Json(json!({
            "error": message,
            "phase": phase,
        }));

        (status, body).into_response()
    }
}