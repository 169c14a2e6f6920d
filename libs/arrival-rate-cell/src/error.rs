use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArrivalRateError {
    /// Fatal at configuration time (spec.md §4.1, §7 "Configuration").
    #[error("failed to parse arrival-rate expression '{expression}': {source}")]
    ParseFailure { expression: String, source: meval::Error },

    /// Fatal per-tick: the expression must be strictly positive everywhere
    /// it's sampled (spec.md §4.1, §7 "Arrival-rate").
    #[error("arrival-rate expression evaluated to non-positive value {value} at hour {hour}")]
    NonPositive { hour: i64, value: f64 },
}
