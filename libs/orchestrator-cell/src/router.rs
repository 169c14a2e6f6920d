//! The §6 HTTP surface, exposed the way each cell owns its own router and
//! the app crate merges it in.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use shared_models::{AppError, TriageLevel, UtilitySummary};

use crate::cycle::{self, RunRequest};
use crate::error::{to_app_error, OrchestratorError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunResponse {
    success: bool,
    patients_processed: u64,
    patients_rejected: u64,
    simulation_time: u64,
    has_chart_data: bool,
}

#[derive(Debug, Serialize)]
struct ChartDataResponse {
    hours: Vec<u64>,
    arrivals: Vec<u64>,
    waiting: Vec<u64>,
    treating: Vec<u64>,
    #[serde(rename = "openRooms")]
    open_rooms: Vec<u64>,
}

async fn run_simulation(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, AppError> {
    let config = state.config.clone();
    let log_dir = state.log_dir.clone();

    let outcome = tokio::task::spawn_blocking(move || cycle::run(&config, &request, &log_dir))
        .await
        .map_err(|e| to_app_error(OrchestratorError::Join(e.to_string())))?
        .map_err(to_app_error)?;

    let response = RunResponse {
        success: true,
        patients_processed: outcome.patients_processed,
        patients_rejected: outcome.patients_rejected,
        simulation_time: outcome.hourly.len() as u64,
        has_chart_data: true,
    };

    *state.last_run.lock().await = Some(outcome);
    Ok(Json(response))
}

async fn chart_data(State(state): State<AppState>) -> Result<Json<ChartDataResponse>, AppError> {
    let guard = state.last_run.lock().await;
    let outcome = guard.as_ref().ok_or_else(|| to_app_error(OrchestratorError::NoRunYet))?;

    Ok(Json(ChartDataResponse {
        hours: outcome.hourly.iter().map(|r| r.hour_index).collect(),
        arrivals: outcome.hourly.iter().map(|r| r.arrivals_this_hour).collect(),
        waiting: outcome.hourly.iter().map(|r| r.waiting_size).collect(),
        treating: outcome.hourly.iter().map(|r| r.treating_size).collect(),
        open_rooms: outcome.hourly.iter().map(|r| r.available_rooms).collect(),
    }))
}

/// spec.md §6 `GET /api/simulation/utilities`: room utilization is measured
/// against treatment-room-hours available across the run; throughput and
/// rejection rate are measured against total arrivals.
async fn utilities(State(state): State<AppState>) -> Result<Json<UtilitySummary>, AppError> {
    let guard = state.last_run.lock().await;
    let outcome = guard.as_ref().ok_or_else(|| to_app_error(OrchestratorError::NoRunYet))?;

    let room_hours_available = outcome.hourly.len() as f64 * outcome.er_treatment_rooms as f64;
    let room_hours_occupied: f64 = outcome.hourly.iter().map(|r| r.treating_size as f64).sum();
    let room_utilization_pct = if room_hours_available > 0.0 { 100.0 * room_hours_occupied / room_hours_available } else { 0.0 };

    let throughput_pct = if outcome.total_arrivals > 0 {
        100.0 * outcome.patients_processed as f64 / outcome.total_arrivals as f64
    } else {
        0.0
    };
    let rejection_rate_pct = if outcome.total_arrivals > 0 {
        100.0 * outcome.patients_rejected as f64 / outcome.total_arrivals as f64
    } else {
        0.0
    };

    Ok(Json(UtilitySummary { room_utilization_pct, throughput_pct, rejection_rate_pct }))
}

async fn patients_triage(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let guard = state.last_run.lock().await;
    let outcome = guard.as_ref().ok_or_else(|| to_app_error(OrchestratorError::NoRunYet))?;

    let mut counts = serde_json::Map::new();
    for level in TriageLevel::ALL {
        let count = outcome.triage_counts.get(&level).copied().unwrap_or(0);
        counts.insert(level.to_string(), json!(count));
    }
    Ok(Json(json!({ "triageCounts": counts })))
}

async fn config_hyperparameters(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = &state.config;
    Json(json!({
        "interarrivalTimeMins": config.interarrival_time_mins,
        "erCapacity": config.er_capacity,
        "erTreatmentRooms": config.er_treatment_rooms,
        "maxHoursPerDay": config.max_hours_per_day,
        "maxRegularHoursPerWeek": config.max_regular_hours_per_week,
        "maxTotalHoursPerWeek": config.max_total_hours_per_week,
        "overtimeMultiplier": config.overtime_multiplier,
    }))
}

async fn config_scenarios(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = &state.config;
    let labels: Vec<&str> = config.patient_arrival_functions.keys().map(|s| s.as_str()).collect();
    Json(json!({
        "arrivalFunctions": labels,
        "defaultArrivalFunction": config.default_arrival_function,
    }))
}

async fn config_triage_levels() -> Json<serde_json::Value> {
    let levels: Vec<_> = TriageLevel::ALL
        .iter()
        .map(|level| json!({ "level": level.to_string(), "priority": level.priority(), "description": level.description() }))
        .collect();
    Json(json!(levels))
}

async fn config_triage_classifiers() -> Json<serde_json::Value> {
    Json(json!(["CTAS", "ESI", "MTS"]))
}

/// Builds the full §6 HTTP surface at its documented absolute paths (not
/// nested under a further prefix — `apps/api` merges this directly).
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/simulation/run", post(run_simulation))
        .route("/api/simulation/chartdata", get(chart_data))
        .route("/api/simulation/utilities", get(utilities))
        .route("/api/patients/triage", get(patients_triage))
        .route("/api/config/hyperparameters", get(config_hyperparameters))
        .route("/api/config/scenarios", get(config_scenarios))
        .route("/api/config/triage-levels", get(config_triage_levels))
        .route("/api/config/triage-classifiers", get(config_triage_classifiers))
        .with_state(state)
}
