use thiserror::Error;

use arrival_rate_cell::ArrivalRateError;
use patient_generator_cell::PatientGeneratorError;

#[derive(Error, Debug)]
pub enum DesEngineError {
    #[error(transparent)]
    ArrivalRate(#[from] ArrivalRateError),

    #[error(transparent)]
    PatientGeneration(#[from] PatientGeneratorError),

    #[error("exponential distribution rejected rate {rate} for hour {hour}")]
    InvalidRate { hour: i64, rate: f64 },

    #[error("event queue referenced patient {0} that was not pending")]
    DanglingPatientReference(uuid::Uuid),
}
