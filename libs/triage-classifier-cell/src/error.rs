use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("unknown diagnosis code: {0} (valid range is 1..=17)")]
    UnknownDiagnosis(u8),
}
