use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("demand record references unknown LP shift id '{0}'")]
    UnknownShift(String),
}
