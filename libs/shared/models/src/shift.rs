use serde::{Deserialize, Serialize};

/// Fixed catalog of shift kinds (spec.md §3, "Shift"): length in hours, the
/// default start hour from midnight, and whether the kind represents time
/// off (not a working assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftKind {
    Day8,
    Evening8,
    Night8,
    Day10,
    Evening10,
    Night10,
    Day12,
    Night12,
    OnCall,
    Free,
}

impl ShiftKind {
    pub fn length_hours(self) -> u32 {
        match self {
            ShiftKind::Day8 | ShiftKind::Evening8 | ShiftKind::Night8 => 8,
            ShiftKind::Day10 | ShiftKind::Evening10 | ShiftKind::Night10 => 10,
            ShiftKind::Day12 | ShiftKind::Night12 => 12,
            ShiftKind::OnCall | ShiftKind::Free => 0,
        }
    }

    pub fn default_start_hour(self) -> u32 {
        match self {
            ShiftKind::Day8 | ShiftKind::Day10 | ShiftKind::Day12 => 7,
            ShiftKind::Evening8 | ShiftKind::Evening10 => 15,
            ShiftKind::Night8 | ShiftKind::Night10 | ShiftKind::Night12 => 23,
            ShiftKind::OnCall | ShiftKind::Free => 0,
        }
    }

    pub fn is_off(self) -> bool {
        matches!(self, ShiftKind::Free)
    }

    pub fn end_hour(self) -> u32 {
        self.default_start_hour() + self.length_hours()
    }
}

/// A short LP identifier paired with exactly one shift kind (spec.md §3,
/// "Shift definition"). LP ids are unique within a problem instance and are
/// what the ILP's decision variables and demand records reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub lp_id: String,
    pub kind: ShiftKind,
}

/// The set of shift definitions usable in one optimization instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCatalog {
    pub definitions: Vec<ShiftDefinition>,
}

impl ShiftCatalog {
    /// The catalog implied by spec.md §3's worked example: 8-hour day/
    /// evening/night plus an off-shift.
    pub fn default_8h() -> Self {
        Self {
            definitions: vec![
                ShiftDefinition { lp_id: "d8".into(), kind: ShiftKind::Day8 },
                ShiftDefinition { lp_id: "e8".into(), kind: ShiftKind::Evening8 },
                ShiftDefinition { lp_id: "n8".into(), kind: ShiftKind::Night8 },
                ShiftDefinition { lp_id: "off".into(), kind: ShiftKind::Free },
            ],
        }
    }

    pub fn find(&self, lp_id: &str) -> Option<&ShiftDefinition> {
        self.definitions.iter().find(|d| d.lp_id == lp_id)
    }

    /// The off-shift detection predicate (spec.md §9, "Off-shift detection";
    /// §4.7 resident/admin day-off rules). `None` if the catalog defines no
    /// off-shift — callers must warn and skip the day-off rule in that case.
    pub fn off_shift(&self) -> Option<&ShiftDefinition> {
        self.definitions.iter().find(|d| d.kind.is_off())
    }

    /// `s` covers `s*` iff both are work shifts on the same day and `s`'s
    /// interval fully contains `s*`'s interval (GLOSSARY, "Covers"; spec.md
    /// §4.7 K5; §9 "Demand-vs-catalog consistency" mandates containment,
    /// not exact LP-id equality, so e.g. `d12` covers `d8`).
    pub fn covers(&self, s: &ShiftDefinition, s_star: &ShiftDefinition) -> bool {
        if s.kind.is_off() || s_star.kind.is_off() {
            return false;
        }
        let (s_start, s_end) = (s.kind.default_start_hour(), s.kind.end_hour());
        let (t_start, t_end) = (s_star.kind.default_start_hour(), s_star.kind.end_hour());
        s_start <= t_start && t_end <= s_end
    }
}
