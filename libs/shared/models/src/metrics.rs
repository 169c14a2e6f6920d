use serde::{Deserialize, Serialize};

/// One row of the hourly metrics log (spec.md §4.10, §6 "CSV output").
/// Field order is the CSV column order and MUST NOT change: `Hour,
/// Arrivals, Waiting, Treating, Available Rooms[, …]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HourlyMetrics {
    pub hour_index: u64,
    pub arrivals_this_hour: u64,
    pub waiting_size: u64,
    pub treating_size: u64,
    pub available_rooms: u64,
    pub total_treatment_seconds: f64,
    pub avg_treatment_seconds: f64,
    pub total_wait_seconds: f64,
    pub avg_wait_seconds: f64,
    pub total_arrivals_cum: u64,
}

/// The §6 `GET /api/simulation/utilities` response shape.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilitySummary {
    pub room_utilization_pct: f64,
    pub throughput_pct: f64,
    pub rejection_rate_pct: f64,
}
