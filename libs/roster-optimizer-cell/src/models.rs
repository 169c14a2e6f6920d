use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared_models::{Role, RoleClass, ShiftCatalog};

/// One schedulable staff member (spec.md §9 "Sum types over class
/// hierarchy" — the source's five concrete staff classes collapse to one
/// record with a role discriminator).
#[derive(Debug, Clone)]
pub struct StaffMember {
    pub id: String,
    pub role: Role,
    pub wage_per_hour: f64,
}

impl StaffMember {
    pub fn role_class(&self) -> RoleClass {
        self.role.class()
    }
}

/// Everything C7 needs beyond the staff list and demand, independent of
/// staff class (spec.md §3 "Optimization input").
#[derive(Debug, Clone)]
pub struct OptimizationInput {
    pub shift_catalog: ShiftCatalog,
    pub num_days: u32,
    pub num_weeks: u32,
    pub max_hours_per_day: f64,
    pub max_regular_hours_per_week: f64,
    pub max_total_hours_per_week: f64,
    pub overtime_multiplier: f64,
}

/// Per-week regular/overtime/total hours for one staff member (spec.md §3
/// "Optimized schedule output").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeekHours {
    pub regular: f64,
    pub overtime: f64,
    pub total_actual: f64,
}

/// The result of one class's ILP solve (spec.md §3, §4.7 "Solver contract").
/// An infeasible/unbounded/errored/missing-library solve produces the empty,
/// `feasible = false` shape rather than propagating an error — per-class
/// failure does not abort the run (spec.md §7).
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutput {
    /// staff id -> day index -> LP shift id.
    pub assignments: HashMap<String, HashMap<u32, String>>,
    /// staff id -> week index -> hours.
    pub hours: HashMap<String, HashMap<u32, WeekHours>>,
    pub total_cost: f64,
    pub feasible: bool,
    pub diagnostic: Option<String>,
}

impl ScheduleOutput {
    pub fn infeasible(diagnostic: impl Into<String>) -> Self {
        Self { diagnostic: Some(diagnostic.into()), ..Default::default() }
    }

    /// spec.md §4.8: resolves a staff member's week into a day -> shift-kind
    /// map through the catalog, omitting days beyond the horizon.
    pub fn week_shifts(
        &self,
        catalog: &ShiftCatalog,
        staff_id: &str,
        week_index: u32,
        num_days: u32,
    ) -> HashMap<u32, shared_models::ShiftKind> {
        let Some(days) = self.assignments.get(staff_id) else { return HashMap::new() };
        let start = week_index * 7;
        (start..(start + 7).min(num_days))
            .filter_map(|day| {
                let lp_id = days.get(&day)?;
                let kind = catalog.find(lp_id)?.kind;
                Some((day, kind))
            })
            .collect()
    }
}

/// The rules one staff class's ILP imposes beyond the common K1-K5 set
/// (spec.md §4.7 "Class-specific rules").
#[derive(Debug, Clone)]
pub struct ClassRules {
    /// Tighter individual per-week cap than `max_total_hours_per_week`
    /// (residents: `min(maxTotalHoursPerWeek, 80)`).
    pub individual_weekly_cap: Option<f64>,
    /// Horizon-averaged cap: `Σ_w actualH[n,w] ≤ cap_per_week · num_weeks`
    /// (residents: 80).
    pub horizon_average_cap_per_week: Option<f64>,
    /// Minimum off-shift days required per week (residents: 1, admin: 2).
    pub min_days_off_per_week: u32,
    /// K6 minimum-rest rule (admin-class may omit it).
    pub enforce_rest_rule: bool,
    /// Fixed override for the regular-hours cap, independent of config
    /// (attending-class defaults to 40 regardless of config).
    pub max_regular_hours_override: Option<f64>,
}

impl ClassRules {
    pub fn nurse() -> Self {
        Self {
            individual_weekly_cap: None,
            horizon_average_cap_per_week: None,
            min_days_off_per_week: 0,
            enforce_rest_rule: true,
            max_regular_hours_override: None,
        }
    }

    pub fn attending() -> Self {
        Self {
            individual_weekly_cap: None,
            horizon_average_cap_per_week: None,
            min_days_off_per_week: 0,
            enforce_rest_rule: true,
            max_regular_hours_override: Some(40.0),
        }
    }

    pub fn resident(max_total_hours_per_week: f64) -> Self {
        Self {
            individual_weekly_cap: Some(max_total_hours_per_week.min(80.0)),
            horizon_average_cap_per_week: Some(80.0),
            min_days_off_per_week: 1,
            enforce_rest_rule: true,
            max_regular_hours_override: None,
        }
    }

    pub fn admin() -> Self {
        Self {
            individual_weekly_cap: None,
            horizon_average_cap_per_week: None,
            min_days_off_per_week: 2,
            enforce_rest_rule: false,
            max_regular_hours_override: None,
        }
    }
}
