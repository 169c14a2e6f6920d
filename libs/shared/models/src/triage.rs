use serde::{Deserialize, Serialize};

/// Clinical urgency tier. Lower `priority()` means more urgent; this is the
/// total order the waiting-room min-heap sorts on (spec.md §3, "Triage level").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TriageLevel {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
}

impl TriageLevel {
    pub const ALL: [TriageLevel; 5] = [
        TriageLevel::Red,
        TriageLevel::Orange,
        TriageLevel::Yellow,
        TriageLevel::Green,
        TriageLevel::Blue,
    ];

    /// 1 = most urgent, 5 = least urgent.
    pub fn priority(self) -> u8 {
        match self {
            TriageLevel::Red => 1,
            TriageLevel::Orange => 2,
            TriageLevel::Yellow => 3,
            TriageLevel::Green => 4,
            TriageLevel::Blue => 5,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TriageLevel::Red => "immediate, life-threatening",
            TriageLevel::Orange => "very urgent",
            TriageLevel::Yellow => "urgent",
            TriageLevel::Green => "standard",
            TriageLevel::Blue => "non-urgent",
        }
    }

    /// One step towards RED; RED is a fixed point. Used for the 5% up-escalation
    /// in patient generation (spec.md §4.3 step 3).
    pub fn escalate(self) -> TriageLevel {
        match self {
            TriageLevel::Blue => TriageLevel::Green,
            TriageLevel::Green => TriageLevel::Yellow,
            TriageLevel::Yellow => TriageLevel::Orange,
            TriageLevel::Orange => TriageLevel::Red,
            TriageLevel::Red => TriageLevel::Red,
        }
    }
}

impl std::str::FromStr for TriageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RED" => Ok(TriageLevel::Red),
            "ORANGE" => Ok(TriageLevel::Orange),
            "YELLOW" => Ok(TriageLevel::Yellow),
            "GREEN" => Ok(TriageLevel::Green),
            "BLUE" => Ok(TriageLevel::Blue),
            other => Err(format!("unknown triage level '{other}'")),
        }
    }
}

impl std::fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TriageLevel::Red => "RED",
            TriageLevel::Orange => "ORANGE",
            TriageLevel::Yellow => "YELLOW",
            TriageLevel::Green => "GREEN",
            TriageLevel::Blue => "BLUE",
        };
        write!(f, "{s}")
    }
}

/// Selectable triage scoring scheme (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageClassifierVariant {
    Ctas,
    Esi,
    Mts,
}

impl std::str::FromStr for TriageClassifierVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CTAS" => Ok(TriageClassifierVariant::Ctas),
            "ESI" => Ok(TriageClassifierVariant::Esi),
            "MTS" => Ok(TriageClassifierVariant::Mts),
            other => Err(format!("unknown triage classifier variant '{other}'")),
        }
    }
}
