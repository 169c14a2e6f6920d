use thiserror::Error;

use arrival_rate_cell::ArrivalRateError;
use des_engine_cell::DesEngineError;
use roster_optimizer_cell::RosterError;
use shared_config::ConfigError;
use shared_models::{AppError, TriageClassifierVariant};

/// Errors the cyclic orchestrator (C10) can surface, above whatever its
/// constituent cells produce (spec.md §4.10, §7). Per-class solver failures
/// are NOT represented here — those are absorbed into the infeasible-output
/// shape by `roster-optimizer-cell` itself and never reach this layer.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    ArrivalRate(#[from] ArrivalRateError),

    #[error(transparent)]
    Simulation(#[from] DesEngineError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("unknown arrival function label '{0}'")]
    UnknownArrivalFunction(String),

    #[error("unknown triage classifier '{0}'")]
    UnknownClassifier(String),

    #[error("unknown triage level '{0}'")]
    UnknownTriageLevel(String),

    #[error("no simulation has been run yet")]
    NoRunYet,

    #[error("simulation worker task failed: {0}")]
    Join(String),
}

/// Maps an orchestrator failure onto the shared HTTP-boundary error shape
/// (spec.md §7: "failing phase... offending parameter... current simulation
/// time").
pub fn to_app_error(err: OrchestratorError) -> AppError {
    match err {
        OrchestratorError::Configuration(e) => AppError::Configuration(e.to_string()),
        OrchestratorError::ArrivalRate(e) => AppError::ArrivalRate(e.to_string()),
        OrchestratorError::Simulation(e) => AppError::Internal(e.to_string()),
        OrchestratorError::Roster(e) => AppError::Solver(e.to_string()),
        OrchestratorError::UnknownArrivalFunction(_)
        | OrchestratorError::UnknownClassifier(_)
        | OrchestratorError::UnknownTriageLevel(_) => AppError::BadRequest(err.to_string()),
        OrchestratorError::NoRunYet => AppError::NotFound(err.to_string()),
        OrchestratorError::Join(_) => AppError::Internal(err.to_string()),
    }
}

pub fn unknown_classifier(label: &str) -> Result<TriageClassifierVariant, OrchestratorError> {
    use std::str::FromStr;
    TriageClassifierVariant::from_str(label).map_err(|_| OrchestratorError::UnknownClassifier(label.to_string()))
}
