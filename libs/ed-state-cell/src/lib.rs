//! The ED resource model: bounded waiting room, treatment rooms, and pooled
//! staff counters (spec.md §4.4, component C4).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use shared_models::{Patient, StaffGroup};

/// A waiting-room entry ordered by triage priority (lower integer = more
/// urgent), ties broken by FIFO insertion order, exactly like the event
/// queue's own ordering (spec.md §3 "ED state"; GLOSSARY "Triage level").
struct WaitingEntry {
    patient: Patient,
    insertion_seq: u64,
}

impl PartialEq for WaitingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.patient.triage_level.priority() == other.patient.triage_level.priority()
            && self.insertion_seq == other.insertion_seq
    }
}
impl Eq for WaitingEntry {}

impl PartialOrd for WaitingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WaitingEntry {
    /// `BinaryHeap` is a max-heap; reverse priority (lower number is more
    /// urgent) and insertion order so the most urgent, earliest-arrived
    /// patient sorts to the top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .patient
            .triage_level
            .priority()
            .cmp(&self.patient.triage_level.priority())
            .then_with(|| other.insertion_seq.cmp(&self.insertion_seq))
    }
}

/// The ED's resource state (spec.md §3 "ED state", §4.4). Invariants checked
/// by [`EdState::check_invariants`] must hold before and after every event
/// the scheduler (C5) processes.
pub struct EdState {
    pub name: String,
    waiting_capacity: usize,
    waiting_queue: BinaryHeap<WaitingEntry>,
    next_insertion_seq: u64,
    treatment_rooms_total: u32,
    treatment_rooms_occupied: u32,
    available_staff: HashMap<StaffGroup, f64>,
    initial_total_staff: HashMap<StaffGroup, f64>,
}

impl EdState {
    pub fn new(
        name: String,
        waiting_capacity: usize,
        treatment_rooms_total: u32,
        initial_total_staff: HashMap<StaffGroup, f64>,
    ) -> Self {
        Self {
            name,
            waiting_capacity,
            waiting_queue: BinaryHeap::new(),
            next_insertion_seq: 0,
            treatment_rooms_total,
            treatment_rooms_occupied: 0,
            available_staff: initial_total_staff.clone(),
            initial_total_staff,
        }
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting_queue.len()
    }

    pub fn waiting_capacity(&self) -> usize {
        self.waiting_capacity
    }

    pub fn treatment_rooms_total(&self) -> u32 {
        self.treatment_rooms_total
    }

    pub fn treatment_rooms_occupied(&self) -> u32 {
        self.treatment_rooms_occupied
    }

    pub fn available_staff(&self, group: StaffGroup) -> f64 {
        *self.available_staff.get(&group).unwrap_or(&0.0)
    }

    /// Enqueues `patient` iff the waiting room isn't full. No side effects
    /// on failure (spec.md §4.4 `try_admit`).
    pub fn try_admit(&mut self, patient: Patient) -> bool {
        if self.waiting_queue.len() >= self.waiting_capacity {
            return false;
        }
        let seq = self.next_insertion_seq;
        self.next_insertion_seq += 1;
        self.waiting_queue.push(WaitingEntry { patient, insertion_seq: seq });
        true
    }

    /// Pops the highest-priority waiting patient (spec.md §4.4
    /// `next_waiting`).
    pub fn next_waiting(&mut self) -> Option<Patient> {
        self.waiting_queue.pop().map(|entry| entry.patient)
    }

    /// Non-destructive look at the head of the waiting queue (spec.md §4.4
    /// `peek_waiting`).
    pub fn peek_waiting(&self) -> Option<&Patient> {
        self.waiting_queue.peek().map(|entry| &entry.patient)
    }

    pub fn has_room(&self) -> bool {
        self.treatment_rooms_occupied < self.treatment_rooms_total
    }

    /// Bounded increment; ignored if already at capacity (spec.md §4.4).
    pub fn occupy_room(&mut self) {
        if self.has_room() {
            self.treatment_rooms_occupied += 1;
        }
    }

    /// Bounded decrement; ignored if already at zero (spec.md §4.4).
    pub fn free_room(&mut self) {
        if self.treatment_rooms_occupied > 0 {
            self.treatment_rooms_occupied -= 1;
        }
    }

    /// Consumes up to `amount` units of `group`'s pool, clamped so the pool
    /// never goes negative (spec.md §4.4 "saturate at bounds").
    pub fn occupy_staff(&mut self, group: StaffGroup, amount: f64) {
        let entry = self.available_staff.entry(group).or_insert(0.0);
        *entry = (*entry - amount).max(0.0);
    }

    /// Returns up to `amount` units of `group`'s pool, clamped so the pool
    /// never exceeds its initial total (spec.md §4.4 "saturate at bounds").
    pub fn free_staff(&mut self, group: StaffGroup, amount: f64) {
        let cap = *self.initial_total_staff.get(&group).unwrap_or(&0.0);
        let entry = self.available_staff.entry(group).or_insert(0.0);
        *entry = (*entry + amount).min(cap);
    }

    /// Checks whether staff group `group` has at least `required` available
    /// without mutating state.
    pub fn staff_available(&self, group: StaffGroup, required: f64) -> bool {
        self.available_staff(group) >= required
    }

    /// All five invariants from spec.md §8 that concern ED state directly
    /// (properties 1-3), useful for tests and debug assertions after each
    /// event transition.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.waiting_queue.len() > self.waiting_capacity {
            return Err("waiting queue exceeds capacity".into());
        }
        if self.treatment_rooms_occupied > self.treatment_rooms_total {
            return Err("occupied rooms exceed total rooms".into());
        }
        for group in StaffGroup::ALL {
            let available = self.available_staff(group);
            let total = *self.initial_total_staff.get(&group).unwrap_or(&0.0);
            if available < 0.0 || available > total {
                return Err(format!("{group:?} pool out of bounds: {available} not in [0, {total}]"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::TriageLevel;

    fn patient(level: TriageLevel) -> Patient {
        Patient::new("p".into(), 40, level, 1, 30.0)
    }

    fn state() -> EdState {
        let mut staff = HashMap::new();
        staff.insert(StaffGroup::Nurses, 3.0);
        staff.insert(StaffGroup::Physicians, 1.0);
        staff.insert(StaffGroup::Residents, 1.0);
        EdState::new("Test ER".into(), 2, 1, staff)
    }

    #[test]
    fn try_admit_respects_capacity() {
        let mut ed = state();
        assert!(ed.try_admit(patient(TriageLevel::Green)));
        assert!(ed.try_admit(patient(TriageLevel::Green)));
        assert!(!ed.try_admit(patient(TriageLevel::Green)));
        assert_eq!(ed.waiting_len(), 2);
    }

    #[test]
    fn next_waiting_pops_highest_priority_first() {
        let mut ed = state();
        ed.try_admit(patient(TriageLevel::Blue));
        ed.try_admit(patient(TriageLevel::Red));
        let first = ed.next_waiting().unwrap();
        assert_eq!(first.triage_level, TriageLevel::Red);
    }

    #[test]
    fn ties_broken_fifo() {
        let mut ed = EdState::new("x".into(), 5, 1, HashMap::new());
        let mut p1 = patient(TriageLevel::Yellow);
        p1.name = "first".into();
        let mut p2 = patient(TriageLevel::Yellow);
        p2.name = "second".into();
        ed.try_admit(p1);
        ed.try_admit(p2);
        assert_eq!(ed.next_waiting().unwrap().name, "first");
        assert_eq!(ed.next_waiting().unwrap().name, "second");
    }

    #[test]
    fn occupy_and_free_room_saturate() {
        let mut ed = state();
        ed.occupy_room();
        assert!(!ed.has_room());
        ed.occupy_room(); // ignored, already full
        assert_eq!(ed.treatment_rooms_occupied(), 1);
        ed.free_room();
        ed.free_room(); // ignored, already zero
        assert_eq!(ed.treatment_rooms_occupied(), 0);
    }

    #[test]
    fn occupy_then_free_staff_is_identity() {
        // spec.md §8 property 7.
        let mut ed = state();
        let before = ed.available_staff(StaffGroup::Nurses);
        ed.occupy_staff(StaffGroup::Nurses, 1.5);
        ed.free_staff(StaffGroup::Nurses, 1.5);
        assert!((ed.available_staff(StaffGroup::Nurses) - before).abs() < 1e-12);
    }

    #[test]
    fn staff_pool_never_exceeds_initial_total() {
        let mut ed = state();
        ed.free_staff(StaffGroup::Nurses, 100.0);
        assert_eq!(ed.available_staff(StaffGroup::Nurses), 3.0);
        ed.check_invariants().unwrap();
    }
}
