//! Builds and solves one ILP per staff class, minimizing wage cost subject
//! to labor rules (spec.md §4.7, component C7). Four structurally similar
//! optimizers — nurse-, attending-, resident-, and admin-class — share this
//! one model builder and differ only through [`models::ClassRules`] and the
//! staff/demand slices a caller passes in.

mod error;
pub mod models;

use std::collections::HashMap;

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use tracing::{info, warn};

pub use error::RosterError;
pub use models::{ClassRules, OptimizationInput, ScheduleOutput, StaffMember, WeekHours};

use demand_cell::DemandRecord;

/// Numeric noise tolerance for treating a relaxed binary as "assigned"
/// (spec.md §4.7 "Solver contract": "treat `x` > 0.9 as 1").
const ASSIGNED_THRESHOLD: f64 = 0.9;

/// Decision-variable indices, keyed the way spec.md §4.7 names them:
/// `x[n, s, d]` by (staff index, shift index, day); `regH`/`otH`/`actualH`
/// by (staff index, week index).
struct Vars {
    x: HashMap<(usize, usize, u32), Variable>,
    reg_h: HashMap<(usize, u32), Variable>,
    ot_h: HashMap<(usize, u32), Variable>,
    actual_h: HashMap<(usize, u32), Variable>,
}

fn sum_expr(terms: impl IntoIterator<Item = Expression>) -> Expression {
    terms.into_iter().fold(Expression::from(0.0), |acc, term| acc + term)
}

/// Week `w`'s day range within `[0, num_days)`, or `None` if the week starts
/// beyond the horizon (the last week of a horizon not divisible by 7 is
/// simply shorter).
fn week_days(w: u32, num_days: u32) -> Option<std::ops::Range<u32>> {
    let start = w * 7;
    if start >= num_days {
        return None;
    }
    Some(start..(start + 7).min(num_days))
}

/// Solves one staff class's roster ILP (spec.md §4.7). `staff` and `demand`
/// MUST already be filtered to a single [`shared_models::RoleClass`] by the
/// caller — this function has no notion of class beyond the `rules` passed
/// in. Returns `Err` only for a caller/config mistake (a demand record
/// naming a shift id absent from the catalog); an infeasible, unbounded, or
/// errored solve is not an `Err` — it is the empty, `feasible: false`
/// [`ScheduleOutput`] shape (spec.md §7 "Solver-infeasible...").
pub fn optimize_class(
    staff: &[StaffMember],
    demand: &[DemandRecord],
    input: &OptimizationInput,
    rules: &ClassRules,
) -> Result<ScheduleOutput, RosterError> {
    if staff.is_empty() {
        return Ok(ScheduleOutput { feasible: true, ..Default::default() });
    }

    for record in demand {
        if input.shift_catalog.find(&record.lp_shift_id).is_none() {
            return Err(RosterError::UnknownShift(record.lp_shift_id.clone()));
        }
    }

    let shifts = &input.shift_catalog.definitions;
    let off_shift_idx = shifts.iter().position(|s| s.kind.is_off());
    if rules.min_days_off_per_week > 0 && off_shift_idx.is_none() {
        warn!("shift catalog defines no off-shift; skipping the minimum-days-off rule for this class (spec.md §9)");
    }

    let max_regular = rules.max_regular_hours_override.unwrap_or(input.max_regular_hours_per_week);
    let max_total_individual = rules.individual_weekly_cap.unwrap_or(input.max_total_hours_per_week);

    let mut pb = ProblemVariables::new();
    let mut vars = Vars { x: HashMap::new(), reg_h: HashMap::new(), ot_h: HashMap::new(), actual_h: HashMap::new() };

    for n in 0..staff.len() {
        for s in 0..shifts.len() {
            for d in 0..input.num_days {
                vars.x.insert((n, s, d), pb.add(variable().binary()));
            }
        }
        for w in 0..input.num_weeks {
            vars.reg_h.insert((n, w), pb.add(variable().min(0.0).max(max_regular)));
            vars.ot_h.insert((n, w), pb.add(variable().min(0.0).max(input.max_total_hours_per_week)));
            vars.actual_h.insert((n, w), pb.add(variable().min(0.0).max(max_total_individual)));
        }
    }

    // Objective (spec.md §4.7 "Objective"): wage-weighted regular + overtime
    // hours, summed over every staff member and week.
    let mut objective = Expression::from(0.0);
    for (n, member) in staff.iter().enumerate() {
        for w in 0..input.num_weeks {
            objective = objective + vars.reg_h[&(n, w)] * member.wage_per_hour;
            objective = objective + vars.ot_h[&(n, w)] * (member.wage_per_hour * input.overtime_multiplier);
        }
    }

    let mut problem = pb.minimise(objective).using(highs);

    // K1: one shift per day.
    for n in 0..staff.len() {
        for d in 0..input.num_days {
            let mut expr = Expression::from(0.0);
            for s in 0..shifts.len() {
                expr = expr + vars.x[&(n, s, d)];
            }
            problem = problem.with(constraint!(expr == 1.0));
        }
    }

    // K2 + K3: weekly-hours definition and the regular/overtime split.
    for n in 0..staff.len() {
        for w in 0..input.num_weeks {
            let Some(days) = week_days(w, input.num_days) else { continue };
            let mut hours_expr = Expression::from(0.0);
            for d in days {
                for s in 0..shifts.len() {
                    let len = shifts_len(shifts, s);
                    if len > 0.0 {
                        hours_expr = hours_expr + vars.x[&(n, s, d)] * len;
                    }
                }
            }
            problem = problem.with(constraint!(vars.actual_h[&(n, w)] == hours_expr));
            problem = problem.with(constraint!(vars.actual_h[&(n, w)] == vars.reg_h[&(n, w)] + vars.ot_h[&(n, w)]));
        }
    }

    // K4: max daily hours.
    for n in 0..staff.len() {
        for d in 0..input.num_days {
            let mut expr = Expression::from(0.0);
            for s in 0..shifts.len() {
                let len = shifts_len(shifts, s);
                if len > 0.0 {
                    expr = expr + vars.x[&(n, s, d)] * len;
                }
            }
            problem = problem.with(constraint!(expr <= input.max_hours_per_day));
        }
    }

    // K5: demand coverage, via the "covers" relation so e.g. d12 satisfies a
    // d8 demand (spec.md §9 "Demand-vs-catalog consistency").
    for record in demand {
        if record.required_count == 0 {
            continue;
        }
        let s_star = input.shift_catalog.find(&record.lp_shift_id).expect("checked above");
        let eligible_staff: Vec<usize> =
            staff.iter().enumerate().filter(|(_, m)| m.role == record.role).map(|(i, _)| i).collect();
        let covering_shifts: Vec<usize> =
            shifts.iter().enumerate().filter(|(_, s)| input.shift_catalog.covers(s, s_star)).map(|(i, _)| i).collect();

        if eligible_staff.is_empty() || covering_shifts.is_empty() {
            warn!(
                role = ?record.role,
                day = record.day_index,
                shift = %record.lp_shift_id,
                "demand cannot be met: no eligible staff or no covering shift in the catalog"
            );
            continue;
        }

        let mut expr = Expression::from(0.0);
        for &n in &eligible_staff {
            for &s in &covering_shifts {
                expr = expr + vars.x[&(n, s, record.day_index)];
            }
        }
        problem = problem.with(constraint!(expr >= record.required_count as f64));
    }

    // K6: minimum 10-hour rest after any shift of length >= 12h (spec.md §4.7,
    // GLOSSARY "Rest rule"). Admin-class may omit this per its class rules.
    if rules.enforce_rest_rule {
        for n in 0..staff.len() {
            for d in 0..input.num_days {
                for (s_long_idx, s_long) in shifts.iter().enumerate() {
                    if s_long.kind.is_off() || s_long.kind.length_hours() < 12 {
                        continue;
                    }
                    let rest_until = s_long.kind.end_hour() + 10;
                    for delta in 0..=1u32 {
                        let d_prime = d + delta;
                        if d_prime >= input.num_days {
                            continue;
                        }
                        for (s_prime_idx, s_prime) in shifts.iter().enumerate() {
                            if s_prime.kind.is_off() {
                                continue;
                            }
                            if delta == 0 && s_prime_idx == s_long_idx {
                                continue;
                            }
                            let abs_start = delta * 24 + s_prime.kind.default_start_hour();
                            if abs_start < rest_until {
                                let expr = vars.x[&(n, s_long_idx, d)] + vars.x[&(n, s_prime_idx, d_prime)];
                                problem = problem.with(constraint!(expr <= 1.0));
                            }
                        }
                    }
                }
            }
        }
    }

    // Resident-class horizon-averaged cap: sum_w actualH[n,w] <= 80 * num_weeks.
    if let Some(cap_per_week) = rules.horizon_average_cap_per_week {
        for n in 0..staff.len() {
            let expr = sum_expr((0..input.num_weeks).map(|w| vars.actual_h[&(n, w)].into()));
            problem = problem.with(constraint!(expr <= cap_per_week * input.num_weeks as f64));
        }
    }

    // Resident-/admin-class minimum days off per week.
    if rules.min_days_off_per_week > 0 {
        if let Some(off_idx) = off_shift_idx {
            for n in 0..staff.len() {
                for w in 0..input.num_weeks {
                    let Some(days) = week_days(w, input.num_days) else { continue };
                    let expr = sum_expr(days.map(|d| vars.x[&(n, off_idx, d)].into()));
                    problem = problem.with(constraint!(expr >= rules.min_days_off_per_week as f64));
                }
            }
        }
    }

    info!(staff = staff.len(), days = input.num_days, shifts = shifts.len(), "solving roster ILP");
    match problem.solve() {
        Ok(solution) => Ok(extract_solution(&solution, staff, shifts, input, &vars)),
        Err(ResolutionError::Infeasible) => {
            warn!("roster ILP infeasible for this staff class");
            Ok(ScheduleOutput::infeasible("solver reported the problem infeasible"))
        }
        Err(ResolutionError::Unbounded) => {
            warn!("roster ILP unbounded for this staff class");
            Ok(ScheduleOutput::infeasible("solver reported the problem unbounded"))
        }
        Err(other) => {
            warn!(error = %other, "roster ILP solver error");
            Ok(ScheduleOutput::infeasible(format!("solver error: {other}")))
        }
    }
}

fn shifts_len(shifts: &[shared_models::ShiftDefinition], idx: usize) -> f64 {
    shifts[idx].kind.length_hours() as f64
}

fn extract_solution(
    solution: &impl Solution,
    staff: &[StaffMember],
    shifts: &[shared_models::ShiftDefinition],
    input: &OptimizationInput,
    vars: &Vars,
) -> ScheduleOutput {
    let mut assignments = HashMap::new();
    let mut hours = HashMap::new();
    let mut total_cost = 0.0;

    for (n, member) in staff.iter().enumerate() {
        let mut days = HashMap::new();
        for d in 0..input.num_days {
            for (s_idx, shift) in shifts.iter().enumerate() {
                if solution.value(vars.x[&(n, s_idx, d)]) > ASSIGNED_THRESHOLD {
                    days.insert(d, shift.lp_id.clone());
                    break;
                }
            }
        }
        assignments.insert(member.id.clone(), days);

        let mut weeks = HashMap::new();
        for w in 0..input.num_weeks {
            let regular = solution.value(vars.reg_h[&(n, w)]);
            let overtime = solution.value(vars.ot_h[&(n, w)]);
            let total_actual = solution.value(vars.actual_h[&(n, w)]);
            total_cost += member.wage_per_hour * regular + member.wage_per_hour * input.overtime_multiplier * overtime;
            weeks.insert(w, WeekHours { regular, overtime, total_actual });
        }
        hours.insert(member.id.clone(), weeks);
    }

    ScheduleOutput { assignments, hours, total_cost, feasible: true, diagnostic: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::{Role, ShiftCatalog, ShiftDefinition, ShiftKind};

    fn member(id: &str, role: Role, wage: f64) -> StaffMember {
        StaffMember { id: id.into(), role, wage_per_hour: wage }
    }

    fn base_input(catalog: ShiftCatalog, num_days: u32, num_weeks: u32) -> OptimizationInput {
        OptimizationInput {
            shift_catalog: catalog,
            num_days,
            num_weeks,
            max_hours_per_day: 12.0,
            max_regular_hours_per_week: 40.0,
            max_total_hours_per_week: 48.0,
            overtime_multiplier: 1.5,
        }
    }

    #[test]
    fn no_staff_in_class_is_trivially_feasible() {
        let input = base_input(ShiftCatalog::default_8h(), 7, 1);
        let output = optimize_class(&[], &[], &input, &ClassRules::nurse()).unwrap();
        assert!(output.feasible);
        assert_eq!(output.total_cost, 0.0);
    }

    #[test]
    fn unknown_shift_in_demand_is_a_caller_error() {
        let staff = vec![member("rn-1", Role::RegisteredNurse, 40.0)];
        let demand =
            vec![DemandRecord { role: Role::RegisteredNurse, day_index: 0, lp_shift_id: "ghost".into(), required_count: 1 }];
        let input = base_input(ShiftCatalog::default_8h(), 1, 1);
        let result = optimize_class(&staff, &demand, &input, &ClassRules::nurse());
        assert!(matches!(result, Err(RosterError::UnknownShift(ref s)) if s == "ghost"));
    }

    // spec.md §8 S6: two RNs, a single-nurse demand on five of seven days,
    // catalog {d8, e8, n8, off}. The cheaper nurse should cover all five
    // shifts alone rather than splitting them, since there is no other cost
    // driver distinguishing the two.
    #[test]
    fn minimal_two_nurse_schedule_is_feasible_and_minimizes_wage_cost() {
        let staff =
            vec![member("rn-cheap", Role::RegisteredNurse, 40.0), member("rn-pricey", Role::RegisteredNurse, 60.0)];
        let demand: Vec<_> = (0..5)
            .map(|day| DemandRecord { role: Role::RegisteredNurse, day_index: day, lp_shift_id: "d8".into(), required_count: 1 })
            .collect();
        let input = base_input(ShiftCatalog::default_8h(), 7, 1);
        let output = optimize_class(&staff, &demand, &input, &ClassRules::nurse()).unwrap();

        assert!(output.feasible);
        assert!((output.total_cost - 5.0 * 8.0 * 40.0).abs() < 1e-6);
        let cheap_days = &output.assignments["rn-cheap"];
        let worked_days = (0..5u32).filter(|d| cheap_days.get(d).map(|s| s == "d8").unwrap_or(false)).count();
        assert_eq!(worked_days, 5);
    }

    // spec.md §4.7 K6 / GLOSSARY "Rest rule": a night12 (23:00-11:00) on day
    // 0 ends at hour 35; any other work shift on day 0 or day 1 starting
    // before hour 45 is forbidden. d8/e8 on day 1 both start before that
    // (hour 31 and 39), so the only day-1 options left are n12 or off.
    #[test]
    fn rest_rule_forbids_an_early_day_shift_after_a_night12() {
        let staff = vec![member("rn-1", Role::RegisteredNurse, 40.0)];
        let catalog = ShiftCatalog {
            definitions: vec![
                ShiftDefinition { lp_id: "d8".into(), kind: ShiftKind::Day8 },
                ShiftDefinition { lp_id: "e8".into(), kind: ShiftKind::Evening8 },
                ShiftDefinition { lp_id: "n12".into(), kind: ShiftKind::Night12 },
                ShiftDefinition { lp_id: "off".into(), kind: ShiftKind::Free },
            ],
        };
        let demand = vec![DemandRecord { role: Role::RegisteredNurse, day_index: 0, lp_shift_id: "n12".into(), required_count: 1 }];
        let input = base_input(catalog, 2, 1);
        let output = optimize_class(&staff, &demand, &input, &ClassRules::nurse()).unwrap();

        assert!(output.feasible);
        assert_eq!(output.assignments["rn-1"][&0], "n12");
        let day1 = &output.assignments["rn-1"][&1];
        assert!(day1 == "n12" || day1 == "off", "day 1 was {day1}, rest rule should forbid d8/e8");
    }

    #[test]
    fn resident_schedule_gets_at_least_one_off_day_per_week() {
        let staff = vec![member("res-1", Role::ResidentPhysician, 60.0)];
        // Demand covers only 6 of the 7 days, leaving room for the mandatory
        // weekly off-day the resident-class rules require.
        let demand: Vec<_> = (0..6)
            .map(|day| DemandRecord { role: Role::ResidentPhysician, day_index: day, lp_shift_id: "d8".into(), required_count: 1 })
            .collect();
        let mut input = base_input(ShiftCatalog::default_8h(), 7, 1);
        input.max_total_hours_per_week = 80.0;
        let output = optimize_class(&staff, &demand, &input, &ClassRules::resident(80.0)).unwrap();

        assert!(output.feasible);
        let off_days = output.assignments["res-1"].values().filter(|s| s.as_str() == "off").count();
        assert!(off_days >= 1);
    }
}
