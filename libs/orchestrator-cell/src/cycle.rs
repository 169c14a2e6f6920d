//! Wires C1-C9 into the cyclic scheduling loop spec.md §4.10 describes for
//! component C10: each `P`-day cycle re-derives staffing demand, solves one
//! ILP per staff class, then advances the shared simulator across that
//! cycle's arrivals before moving on to the next.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Duration, Local};
use serde::Deserialize;
use tracing::{info, warn};

use arrival_rate_cell::ArrivalRateFn;
use demand_cell::{apply_feedback, generate_demand, DemandRecord};
use des_engine_cell::{SimConfig, Simulator, StaffRequirements};
use ed_state_cell::EdState;
use patient_generator_cell::PatientGeneratorConfig;
use roster_optimizer_cell::{optimize_class, ClassRules, OptimizationInput, ScheduleOutput, StaffMember};
use shared_config::AppConfig;
use shared_models::{HourlyMetrics, Role, RoleClass, ShiftCatalog, StaffGroup, TriageClassifierVariant, TriageLevel};
use shared_utils::{log_file_name, seeded_rng, write_hourly_log};

use crate::error::{unknown_classifier, OrchestratorError};

/// The scheduling period `P` (spec.md §4.10: "fixed scheduling period P
/// (default 28 days)").
pub const DEFAULT_CYCLE_DAYS: u32 = 28;

/// Overrides accepted on `POST /api/simulation/run` (spec.md §6
/// `hyperparameters`), applied on top of the loaded config for this run only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperparameterOverrides {
    pub interarrival_time: Option<f64>,
    pub treatment_capacity: Option<usize>,
    pub waiting_capacity: Option<usize>,
}

/// One simulation request (spec.md §6 `POST /api/simulation/run` body).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub days: u32,
    pub arrival_function: Option<String>,
    pub triage_classifier: Option<String>,
    pub triage_level: Option<String>,
    pub hyperparameters: Option<HyperparameterOverrides>,
    /// Not part of §6's documented body, but threaded through so every run
    /// is reproducible given the same request (§4.3, §8 property 6; the
    /// CLI's `--seed` flag uses the same field).
    pub seed: Option<u64>,
}

/// Everything one full orchestrator run produced, kept in memory so the
/// read-only `GET /api/simulation/*` and `GET /api/patients/triage`
/// endpoints can serve it after the run completes (spec.md §5 "start ->
/// await completion -> read outputs").
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub hourly: Vec<HourlyMetrics>,
    pub triage_counts: HashMap<TriageLevel, u64>,
    pub patients_processed: u64,
    pub patients_rejected: u64,
    pub total_arrivals: u64,
    pub er_treatment_rooms: u32,
    pub roster: HashMap<RoleClass, ScheduleOutput>,
    pub log_path: Option<PathBuf>,
}

fn staff_requirements(config: &AppConfig) -> StaffRequirements {
    let mut map = HashMap::new();
    map.insert(StaffGroup::Nurses, config.triage_nurse_requirements.clone());
    map.insert(StaffGroup::Physicians, config.triage_physician_requirements.clone());
    map.insert(StaffGroup::Residents, config.triage_rp_requirements.clone());
    map
}

/// Sums each pooled group's configured role counts into its initial crew
/// size (spec.md §4.4 "Initialization").
fn initial_staff_pools(config: &AppConfig) -> HashMap<StaffGroup, f64> {
    let mut pools = HashMap::new();
    for group in StaffGroup::ALL {
        let total: u32 =
            group.pooled_roles().iter().map(|role| config.staff_counts.get(role).copied().unwrap_or(0)).sum();
        pools.insert(group, total as f64);
    }
    pools
}

/// Synthesizes one named [`StaffMember`] per configured headcount unit
/// (spec.md §9 "Sum types over class hierarchy" — the config only gives
/// per-role counts and wages, not individual identities, so the roster
/// optimizer's inputs are materialized here).
fn synth_staff(config: &AppConfig) -> Vec<StaffMember> {
    let mut staff = Vec::new();
    for role in Role::ALL {
        let count = config.staff_counts.get(&role).copied().unwrap_or(0);
        let wage = config.hourly_wages.get(&role).copied().unwrap_or(0.0);
        for idx in 0..count {
            staff.push(StaffMember { id: format!("{role}-{idx:04}"), role, wage_per_hour: wage });
        }
    }
    staff
}

fn resolve_arrival_expression<'a>(config: &'a AppConfig, label: Option<&str>) -> Result<&'a str, OrchestratorError> {
    match label {
        Some(l) => config
            .patient_arrival_functions
            .get(l)
            .map(|s| s.as_str())
            .ok_or_else(|| OrchestratorError::UnknownArrivalFunction(l.to_string())),
        None => Ok(config.default_arrival_expression()),
    }
}

fn class_rules(class: RoleClass, config: &AppConfig) -> ClassRules {
    match class {
        RoleClass::Nurse => ClassRules::nurse(),
        RoleClass::Attending => ClassRules::attending(),
        RoleClass::Resident => ClassRules::resident(config.max_total_hours_per_week as f64),
        RoleClass::Admin => ClassRules::admin(),
    }
}

/// Runs the full C10 cyclic orchestration for `request.days` days against
/// `config`, then flushes the hourly metrics log into `log_dir` (spec.md
/// §4.10 step 2, §6 "CSV output"). This is the single entry point both the
/// HTTP handler and the CLI binary call.
pub fn run(config: &AppConfig, request: &RunRequest, log_dir: &Path) -> Result<RunOutcome, OrchestratorError> {
    let hyperparams = request.hyperparameters.clone().unwrap_or_default();

    let arrival_expression = resolve_arrival_expression(config, request.arrival_function.as_deref())?;
    let arrival_fn = ArrivalRateFn::parse(arrival_expression)?;

    let classifier_variant = match &request.triage_classifier {
        Some(label) => unknown_classifier(label)?,
        None => TriageClassifierVariant::Ctas,
    };
    let forced_triage_level = match &request.triage_level {
        Some(label) => {
            Some(TriageLevel::from_str(label).map_err(|_| OrchestratorError::UnknownTriageLevel(label.clone()))?)
        }
        None => None,
    };

    let patient_gen = PatientGeneratorConfig {
        classifier_variant,
        age_min: config.patient_min_age,
        age_max: config.patient_max_age,
        mean_service_minutes: config.avg_treatment_times_mins.clone(),
        forced_triage_level,
    };

    let tau0_minutes = hyperparams.interarrival_time.unwrap_or(config.interarrival_time_mins);
    let waiting_capacity = hyperparams.waiting_capacity.unwrap_or(config.er_capacity);
    let treatment_rooms = hyperparams.treatment_capacity.unwrap_or(config.er_treatment_rooms) as u32;

    let sim_config =
        SimConfig { arrival_fn, tau0_minutes, patient_gen, staff_requirements: staff_requirements(config) };
    let ed = EdState::new(config.er_name.clone(), waiting_capacity, treatment_rooms, initial_staff_pools(config));
    let seed = request.seed.unwrap_or(0);
    let mut simulator = Simulator::new(ed, sim_config, seeded_rng(seed));

    let staff = synth_staff(config);
    let shift_catalog = ShiftCatalog::default_8h();
    let total_days = request.days.max(1);

    let mut hourly = Vec::new();
    let mut roster = HashMap::new();
    let mut prev_rejection_rate = 0.0;
    let mut prev_avg_wait_minutes = 0.0;
    let mut first_cycle = true;
    let mut t_days = 0u32;

    while t_days < total_days {
        let cycle_days = DEFAULT_CYCLE_DAYS.min(total_days - t_days);
        let cycle_start = Duration::days(t_days as i64);
        let cycle_end = Duration::days((t_days + cycle_days) as i64);

        let baseline = generate_demand(config, cycle_days);
        let demand: Vec<DemandRecord> =
            if first_cycle { baseline } else { apply_feedback(&baseline, prev_rejection_rate, prev_avg_wait_minutes) };

        let num_weeks = (cycle_days + 6) / 7;
        let opt_input = OptimizationInput {
            shift_catalog: shift_catalog.clone(),
            num_days: cycle_days,
            num_weeks: num_weeks.max(1),
            max_hours_per_day: config.max_hours_per_day as f64,
            max_regular_hours_per_week: config.max_regular_hours_per_week as f64,
            max_total_hours_per_week: config.max_total_hours_per_week as f64,
            overtime_multiplier: config.overtime_multiplier,
        };

        for class in RoleClass::ALL {
            let class_staff: Vec<StaffMember> =
                staff.iter().filter(|m| m.role_class() == class).cloned().collect();
            let class_demand: Vec<DemandRecord> =
                demand.iter().filter(|d| d.role.class() == class).cloned().collect();
            let rules = class_rules(class, config);
            let output = optimize_class(&class_staff, &class_demand, &opt_input, &rules)?;
            if !output.feasible {
                warn!(?class, diagnostic = ?output.diagnostic, "roster class infeasible this cycle");
            }
            roster.insert(class, output);
        }

        let cycle_rows = simulator.run_cycle(cycle_start, cycle_end)?;
        hourly.extend(cycle_rows);

        let total_arrivals = simulator.total_arrivals();
        prev_rejection_rate =
            if total_arrivals > 0 { simulator.patients_rejected() as f64 / total_arrivals as f64 } else { 0.0 };
        prev_avg_wait_minutes = if simulator.total_er_admissions() > 0 {
            (simulator.total_wait_seconds() / 60.0) / simulator.total_er_admissions() as f64
        } else {
            0.0
        };

        info!(
            cycle_start_day = t_days,
            cycle_days,
            rejection_rate = prev_rejection_rate,
            avg_wait_minutes = prev_avg_wait_minutes,
            "completed orchestrator cycle"
        );

        t_days += cycle_days;
        first_cycle = false;
    }

    let stamp = Local::now().format("%d%m%H%M%S").to_string();
    let log_path = log_dir.join(log_file_name(&stamp));
    let log_path = match write_hourly_log(&log_path, &hourly) {
        Ok(()) => Some(log_path),
        Err(e) => {
            warn!(error = %e, "failed to write hourly metrics log; continuing without it");
            None
        }
    };

    Ok(RunOutcome {
        triage_counts: simulator.triage_counts().clone(),
        patients_processed: simulator.total_er_admissions(),
        patients_rejected: simulator.patients_rejected(),
        total_arrivals: simulator.total_arrivals(),
        er_treatment_rooms: treatment_rooms,
        hourly,
        roster,
        log_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_config::DayPartCounts;

    fn config() -> AppConfig {
        let mut staff_counts = HashMap::new();
        staff_counts.insert(Role::RegisteredNurse, 4);
        staff_counts.insert(Role::AttendingPhysician, 2);
        staff_counts.insert(Role::ResidentPhysician, 2);
        staff_counts.insert(Role::AdminClerk, 1);

        let mut hourly_wages = HashMap::new();
        hourly_wages.insert(Role::RegisteredNurse, 45.0);
        hourly_wages.insert(Role::AttendingPhysician, 120.0);
        hourly_wages.insert(Role::ResidentPhysician, 60.0);
        hourly_wages.insert(Role::AdminClerk, 22.0);

        let mut triage_nurse = HashMap::new();
        let mut triage_phys = HashMap::new();
        let mut triage_rp = HashMap::new();
        let mut treatment_times = HashMap::new();
        for level in TriageLevel::ALL {
            triage_nurse.insert(level, 1.0);
            triage_phys.insert(level, 0.5);
            triage_rp.insert(level, 0.5);
            treatment_times.insert(level, 30.0);
        }

        let mut arrival_functions = HashMap::new();
        arrival_functions.insert("baseline".to_string(), "1".to_string());

        AppConfig {
            population_size: 1000,
            er_name: "Test ER".into(),
            er_capacity: 30,
            er_treatment_rooms: 5,
            interarrival_time_mins: 10.0,
            max_hours_per_day: 12,
            max_regular_hours_per_week: 40,
            max_total_hours_per_week: 48,
            overtime_multiplier: 1.5,
            staff_counts,
            hourly_wages,
            cna_ratio: 8.0,
            lpn_ratio: 6.0,
            est_trauma_patients: DayPartCounts { day: 2.0, evening: 1.0, night: 1.0 },
            est_non_trauma_patients: DayPartCounts { day: 10.0, evening: 8.0, night: 4.0 },
            triage_nurse_requirements: triage_nurse,
            triage_physician_requirements: triage_phys,
            triage_rp_requirements: triage_rp,
            avg_treatment_times_mins: treatment_times,
            patient_arrival_functions: arrival_functions,
            default_arrival_function: "baseline".into(),
            patient_min_age: 1,
            patient_max_age: 99,
        }
    }

    #[test]
    fn a_short_run_produces_one_row_per_hour_and_a_log_file() {
        let cfg = config();
        let request = RunRequest {
            days: 2,
            arrival_function: None,
            triage_classifier: None,
            triage_level: None,
            hyperparameters: None,
            seed: Some(1),
        };
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(&cfg, &request, dir.path()).unwrap();
        assert_eq!(outcome.hourly.len(), 48);
        assert_eq!(outcome.roster.len(), 4);
        assert!(outcome.log_path.is_some());
        assert!(outcome.log_path.unwrap().exists());
    }

    #[test]
    fn unknown_arrival_function_label_is_reported() {
        let cfg = config();
        let request = RunRequest {
            days: 1,
            arrival_function: Some("ghost".into()),
            triage_classifier: None,
            triage_level: None,
            hyperparameters: None,
            seed: None,
        };
        let dir = tempfile::tempdir().unwrap();
        let result = run(&cfg, &request, dir.path());
        assert!(matches!(result, Err(OrchestratorError::UnknownArrivalFunction(ref s)) if s == "ghost"));
    }

    #[test]
    fn forced_triage_level_routes_every_patient_through_one_tier() {
        let cfg = config();
        let request = RunRequest {
            days: 1,
            arrival_function: None,
            triage_classifier: None,
            triage_level: Some("RED".into()),
            hyperparameters: None,
            seed: Some(7),
        };
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(&cfg, &request, dir.path()).unwrap();
        let red_count = outcome.triage_counts.get(&TriageLevel::Red).copied().unwrap_or(0);
        assert_eq!(red_count, outcome.total_arrivals);
    }

    #[test]
    fn a_cycle_longer_than_28_days_splits_into_multiple_cycles() {
        let cfg = config();
        let request = RunRequest {
            days: DEFAULT_CYCLE_DAYS + 3,
            arrival_function: None,
            triage_classifier: None,
            triage_level: None,
            hyperparameters: None,
            seed: Some(2),
        };
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(&cfg, &request, dir.path()).unwrap();
        assert_eq!(outcome.hourly.len() as u32, (DEFAULT_CYCLE_DAYS + 3) * 24);
    }
}
