use thiserror::Error;
use triage_classifier_cell::ClassifierError;

#[derive(Error, Debug)]
pub enum PatientGeneratorError {
    #[error(transparent)]
    Classification(#[from] ClassifierError),

    #[error("no mean service time configured for triage level {0:?}")]
    MissingServiceTimeMean(shared_models::TriageLevel),

    #[error("invalid service-time distribution for triage level {level:?}: mean {mean} must be positive")]
    InvalidServiceTimeMean { level: shared_models::TriageLevel, mean: f64 },
}
