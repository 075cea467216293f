use crate::model::{ModelInput, TimetableModel, Tuple};
use crate::solver::Relation;
use good_lp::{Expression, Variable};
use log::info;

// soft constraint weights; fixed so objectives stay comparable across variants
pub const PENALTY_WEIGHT: u32 = 10;
pub const LOAD_SPREAD_WEIGHT: u32 = 5;
pub const LATE_PERIOD_PENALTY: u32 = 1;
pub const ROOM_MISMATCH_PENALTY: u32 = 1;

/// Penalty units a single tuple contributes when chosen.
pub fn tuple_penalty(input: ModelInput<'_>, &(s, t, r, _): &Tuple) -> u32 {
    let mut penalty = 0;
    if input.params.is_undesirable(t) {
        penalty += LATE_PERIOD_PENALTY;
    }
    let allowed = &input.sessions[s].allowed_rooms;
    let room = &input.dataset.rooms[r].id;
    if !allowed.is_empty() && !allowed.contains(room) {
        penalty += ROOM_MISMATCH_PENALTY;
    }
    penalty
}

/// Sets the minimisation objective
/// `10 * sum(penalties) + 5 * (max_load - min_load)`
/// where `load(f)` counts the sessions taught by faculty `f` over the week.
pub fn compose_objective(model: &mut TimetableModel, input: ModelInput<'_>) {
    let faculty_count = input.dataset.faculties.len();
    let session_count = input.sessions.len() as i32;

    let mut penalties = Expression::from(0.0);
    let mut loads: Vec<Vec<Variable>> = vec![Vec::new(); faculty_count];
    for (tuple, &var) in model.variables() {
        let weight = tuple_penalty(input, tuple);
        if weight > 0 {
            penalties += weight as f64 * var;
        }
        loads[tuple.3].push(var);
    }

    let max_load = model.lp.new_int_var(0, session_count, "max_load");
    let min_load = model.lp.new_int_var(0, session_count, "min_load");
    for vars in &loads {
        let load: Expression = vars.iter().copied().sum();
        model.lp.post(max_load - load.clone(), Relation::Ge, 0.0);
        model.lp.post(min_load - load, Relation::Le, 0.0);
    }

    let objective =
        PENALTY_WEIGHT as f64 * penalties + LOAD_SPREAD_WEIGHT as f64 * (max_load - min_load);
    model.lp.minimise(objective);
    info!(
        "Objective defined over {} faculty loads with period and room penalties.",
        faculty_count
    );
}
