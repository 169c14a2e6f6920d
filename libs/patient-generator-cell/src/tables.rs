/// Fixed 17-entry diagnosis probability distribution (spec.md §4.3 step 1).
/// Sums to ~1.0; the tiny rounding tail is handled by a fallback to index 17
/// in [`crate::sample_diagnosis_code`] rather than by forcing the sum to
/// exactly 1.0 here.
pub const DIAGNOSIS_DISTRIBUTION: [f64; 17] = [
    0.1400, 0.1200, 0.1050, 0.0950, 0.0850, 0.0750, 0.0650, 0.0580, 0.0520, 0.0450, 0.0380, 0.0320,
    0.0260, 0.0210, 0.0160, 0.0110, 0.0064,
];
