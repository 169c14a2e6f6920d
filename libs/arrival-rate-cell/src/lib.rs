//! Evaluates a closed-form arrival-rate expression `f(t)` of the hour index
//! `t` (spec.md §4.1, component C1). Parsing happens once, at configuration
//! time; the compiled expression is then a pure, thread-safe `Fn(f64) ->
//! f64` that may be called concurrently for different `t`.

mod error;

pub use error::ArrivalRateError;

/// A parsed arrival-rate expression bound to its single free variable `t`.
pub struct ArrivalRateFn {
    expression: String,
    eval: Box<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl ArrivalRateFn {
    /// Parses `expression` (e.g. `"(-0.25)*cos((pi/12)*t)+0.75"`). Fatal at
    /// configuration time on a parse failure (spec.md §4.1).
    pub fn parse(expression: &str) -> Result<Self, ArrivalRateError> {
        let expr: meval::Expr = expression
            .parse()
            .map_err(|source| ArrivalRateError::ParseFailure { expression: expression.to_string(), source })?;
        let eval = expr
            .bind("t")
            .map_err(|source| ArrivalRateError::ParseFailure { expression: expression.to_string(), source })?;
        Ok(Self { expression: expression.to_string(), eval: Box::new(eval) })
    }

    /// Evaluates the multiplier at integer hour index `hour`. Fail-fast if
    /// the result isn't strictly positive (spec.md §4.1, §7 "Arrival-rate").
    pub fn evaluate(&self, hour: i64) -> Result<f64, ArrivalRateError> {
        let value = (self.eval)(hour as f64);
        if value > 0.0 {
            Ok(value)
        } else {
            Err(ArrivalRateError::NonPositive { hour, value })
        }
    }

    /// The mean inter-arrival time (minutes) at the hour containing absolute
    /// time `T`: `tau(T) = tau0 / f(floor(T / 1h))` (spec.md §4.1).
    pub fn mean_interarrival_minutes(&self, tau0_minutes: f64, hour: i64) -> Result<f64, ArrivalRateError> {
        let multiplier = self.evaluate(hour)?;
        Ok(tau0_minutes / multiplier)
    }

    pub fn source(&self) -> &str {
        &self.expression
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_evaluates_documented_expression() {
        let f = ArrivalRateFn::parse("(-0.25)*cos((pi/12)*t)+0.75").unwrap();
        // At t=0, cos(0) = 1, so f(0) = -0.25 + 0.75 = 0.5.
        let v = f.evaluate(0).unwrap();
        assert!((v - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_unparseable_expression() {
        assert!(ArrivalRateFn::parse("not an expression (").is_err());
    }

    #[test]
    fn rejects_non_positive_value_at_runtime() {
        let f = ArrivalRateFn::parse("t - t - 1").unwrap(); // constant -1
        let err = f.evaluate(5).unwrap_err();
        assert!(matches!(err, ArrivalRateError::NonPositive { hour: 5, .. }));
    }

    #[test]
    fn mean_interarrival_scales_by_multiplier() {
        let f = ArrivalRateFn::parse("2").unwrap();
        let tau = f.mean_interarrival_minutes(10.0, 0).unwrap();
        assert!((tau - 5.0).abs() < 1e-9);
    }
}
