use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::triage::TriageLevel;

/// A patient moving through admit/treat/release (spec.md §3, "Patient").
/// Durations are measured since the simulation epoch rather than wall-clock
/// time so a run is fully reproducible independent of when it executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: u8,
    pub triage_level: TriageLevel,
    pub diagnosis_code: u8,
    pub arrival_time: Duration,
    pub treatment_start: Option<Duration>,
    pub discharge_time: Option<Duration>,
    /// Sampled service time, in minutes (spec.md §4.3 step 5).
    pub service_time_minutes: f64,
}

impl Patient {
    pub fn new(
        name: String,
        age: u8,
        triage_level: TriageLevel,
        diagnosis_code: u8,
        service_time_minutes: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            age,
            triage_level,
            diagnosis_code,
            arrival_time: Duration::zero(),
            treatment_start: None,
            discharge_time: None,
            service_time_minutes,
        }
    }

    pub fn wait_time(&self) -> Option<Duration> {
        self.treatment_start.map(|t| t - self.arrival_time)
    }
}

/// Discrete event kind (spec.md §3, "Event").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Arrival,
    Release,
}

/// A scheduled event, ordered by `time` with FIFO tie-breaking via
/// `insertion_seq` so the simulator is deterministic given a seeded RNG
/// (spec.md §3, "Event"; §8 property 5).
#[derive(Debug, Clone)]
pub struct Event {
    pub time: Duration,
    pub kind: EventKind,
    pub patient_id: Uuid,
    pub insertion_seq: u64,
}

impl Event {
    pub fn new(time: Duration, kind: EventKind, patient_id: Uuid, insertion_seq: u64) -> Self {
        Self { time, kind, patient_id, insertion_seq }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.insertion_seq == other.insertion_seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    /// `BinaryHeap` is a max-heap; reverse time (and insertion order) so the
    /// earliest-scheduled, earliest-inserted event sorts to the top.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.insertion_seq.cmp(&self.insertion_seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn heap_pops_earliest_time_first() {
        let mut heap = BinaryHeap::new();
        let p = Uuid::new_v4();
        heap.push(Event::new(Duration::minutes(10), EventKind::Arrival, p, 1));
        heap.push(Event::new(Duration::minutes(1), EventKind::Arrival, p, 0));
        heap.push(Event::new(Duration::minutes(5), EventKind::Arrival, p, 2));
        let times: Vec<_> = std::iter::from_fn(|| heap.pop().map(|e| e.time)).collect();
        assert_eq!(times, vec![Duration::minutes(1), Duration::minutes(5), Duration::minutes(10)]);
    }

    #[test]
    fn heap_breaks_ties_by_insertion_order() {
        let mut heap = BinaryHeap::new();
        let p = Uuid::new_v4();
        heap.push(Event::new(Duration::minutes(1), EventKind::Release, p, 5));
        heap.push(Event::new(Duration::minutes(1), EventKind::Arrival, p, 2));
        let seqs: Vec<_> = std::iter::from_fn(|| heap.pop().map(|e| e.insertion_seq)).collect();
        assert_eq!(seqs, vec![2, 5]);
    }
}
