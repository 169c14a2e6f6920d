//! Translates estimated per-shift patient-acuity counts into a per-role
//! staffing-demand vector (spec.md §4.6, component C6 "OregonStaffingRules"),
//! and adjusts that vector between cycles from observed simulator outcomes
//! (spec.md §4.9, component C9 "Feedback Controller").

use serde::{Deserialize, Serialize};
use shared_config::AppConfig;
use shared_models::Role;

/// One line of the demand list: `role` needs `required_count` staff on
/// `day_index` covering `lp_shift_id` (spec.md §3 "Demand record").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub role: Role,
    pub day_index: u32,
    pub lp_shift_id: String,
    pub required_count: u32,
}

fn ceil_div(numerator: f64, denominator: f64) -> u32 {
    (numerator / denominator).ceil().max(0.0) as u32
}

/// Generates the demand list for a `num_days`-long horizon starting at day 0
/// (spec.md §4.6). Day/evening/night patient-acuity estimates each produce
/// their own row of role demand, mapped onto the 8-hour shift catalog
/// (`d8`/`e8`/`n8`); admin-clerk demand is computed once per day from the
/// day's total census and assigned to the day shift, since the source treats
/// admin staffing as a single daily office-hours requirement rather than a
/// per-daypart one.
pub fn generate_demand(config: &AppConfig, num_days: u32) -> Vec<DemandRecord> {
    let day_parts = [
        (config.est_trauma_patients.day, config.est_non_trauma_patients.day, "d8"),
        (config.est_trauma_patients.evening, config.est_non_trauma_patients.evening, "e8"),
        (config.est_trauma_patients.night, config.est_non_trauma_patients.night, "n8"),
    ];

    let mut records = Vec::new();
    for day_index in 0..num_days {
        let mut daily_census = 0.0;
        for &(trauma, non_trauma, shift_id) in &day_parts {
            let total = trauma + non_trauma;
            daily_census += total;

            let registered_nurses = (trauma.ceil() as u32) + ceil_div(non_trauma, 4.0);
            let lpns = if config.lpn_ratio > 0.0 { ceil_div(total, config.lpn_ratio) } else { 0 };
            let cnas = if config.cna_ratio > 0.0 { ceil_div(total, config.cna_ratio) } else { 0 };
            let attendings = ceil_div(total, 20.0).max(1);
            let residents = ceil_div(total, 15.0);

            records.push(DemandRecord {
                role: Role::RegisteredNurse,
                day_index,
                lp_shift_id: shift_id.into(),
                required_count: registered_nurses,
            });
            records.push(DemandRecord {
                role: Role::LicensedPracticalNurse,
                day_index,
                lp_shift_id: shift_id.into(),
                required_count: lpns,
            });
            records.push(DemandRecord {
                role: Role::CertifiedNursingAssistant,
                day_index,
                lp_shift_id: shift_id.into(),
                required_count: cnas,
            });
            records.push(DemandRecord {
                role: Role::AttendingPhysician,
                day_index,
                lp_shift_id: shift_id.into(),
                required_count: attendings,
            });
            records.push(DemandRecord {
                role: Role::ResidentPhysician,
                day_index,
                lp_shift_id: shift_id.into(),
                required_count: residents,
            });
        }

        records.push(DemandRecord {
            role: Role::AdminClerk,
            day_index,
            lp_shift_id: "d8".into(),
            required_count: ceil_div(daily_census, 50.0).max(1),
        });
    }
    records
}

/// The multiplicative adjustment factor for the next cycle's demand
/// (spec.md §4.9).
pub fn feedback_factor(rejection_rate: f64, avg_wait_minutes: f64) -> f64 {
    if rejection_rate > 0.05 || avg_wait_minutes > 45.0 {
        let mut factor = 1.0;
        if rejection_rate > 0.05 {
            factor += 0.15;
        }
        if avg_wait_minutes > 45.0 {
            factor += 0.10;
        }
        factor
    } else if rejection_rate < 0.01 && avg_wait_minutes < 15.0 {
        0.90
    } else {
        1.0
    }
}

/// Applies [`feedback_factor`] to every record's `required_count`, flooring
/// any record that would otherwise drop to zero back up to 1 when its
/// original count was above 1 (spec.md §4.9 "Apply by... with a floor").
pub fn apply_feedback(records: &[DemandRecord], rejection_rate: f64, avg_wait_minutes: f64) -> Vec<DemandRecord> {
    let factor = feedback_factor(rejection_rate, avg_wait_minutes);
    records
        .iter()
        .map(|record| {
            let mut adjusted = (record.required_count as f64 * factor).ceil() as u32;
            if record.required_count > 1 && adjusted == 0 {
                adjusted = 1;
            }
            DemandRecord { required_count: adjusted, ..record.clone() }
        })
        .collect()
}
