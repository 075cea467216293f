use crate::data::{
    Dataset, GenerationParams, Session, Solution, SolutionReport, UnmetSoftConstraint,
};
use crate::objective::{
    LATE_PERIOD_PENALTY, LOAD_SPREAD_WEIGHT, PENALTY_WEIGHT, ROOM_MISMATCH_PENALTY,
};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Recomputes the objective of a finished solution and lists the soft
/// constraints it does not meet.
pub fn score_solution(
    solution: &Solution,
    dataset: &Dataset,
    params: &GenerationParams,
    sessions: &[Session],
) -> SolutionReport {
    let grid = params.grid();
    let mut unmet = Vec::new();
    let mut late_period_penalties = 0;
    let mut room_mismatch_penalties = 0;

    // prefer early periods
    for a in &solution.assignments {
        if params.is_undesirable(a.timeslot) {
            late_period_penalties += LATE_PERIOD_PENALTY;
            unmet.push(UnmetSoftConstraint {
                constraint_type: "Avoid Late Periods".to_string(),
                description: format!(
                    "Session {} is scheduled on day {} period {}, one of the last {} periods of the day.",
                    a.session_id,
                    grid.day_of(a.timeslot),
                    grid.period_of(a.timeslot),
                    params.undesirable_tail_periods
                ),
            });
        }
    }

    // prefer the subject's own rooms
    for a in &solution.assignments {
        let Some(session) = sessions.get(a.session_id) else {
            continue;
        };
        if !session.allowed_rooms.is_empty() && !session.allowed_rooms.contains(&a.room_id) {
            room_mismatch_penalties += ROOM_MISMATCH_PENALTY;
            unmet.push(UnmetSoftConstraint {
                constraint_type: "Use Allowed Rooms".to_string(),
                description: format!(
                    "Session {} ({}) is held in room {}, outside its allowed rooms [{}].",
                    a.session_id,
                    session.subject_id,
                    a.room_id,
                    session.allowed_rooms.iter().join(", ")
                ),
            });
        }
    }

    let load_spread = faculty_loads(solution, dataset)
        .into_values()
        .minmax()
        .into_option()
        .map_or(0, |(min, max)| max - min);

    let objective = PENALTY_WEIGHT * (late_period_penalties + room_mismatch_penalties)
        + LOAD_SPREAD_WEIGHT * load_spread;

    SolutionReport {
        late_period_penalties,
        room_mismatch_penalties,
        load_spread,
        objective,
        unmet_soft_constraints: unmet,
    }
}

/// Sessions taught by each faculty member, including those teaching none.
pub fn faculty_loads<'a>(solution: &Solution, dataset: &'a Dataset) -> HashMap<&'a str, u32> {
    let mut loads: HashMap<&str, u32> = dataset
        .faculties
        .iter()
        .map(|f| (f.id.as_str(), 0))
        .collect();
    for a in &solution.assignments {
        if let Some(load) = loads.get_mut(a.faculty_id.as_str()) {
            *load += 1;
        }
    }
    loads
}

/// A hard rule broken by a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub description: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.description)
    }
}

fn violation(rule: &'static str, description: String) -> Violation {
    Violation { rule, description }
}

/// Checks every hard rule of a timetable against its input.
///
/// Returns an empty list for a valid solution.
pub fn audit(
    solution: &Solution,
    dataset: &Dataset,
    params: &GenerationParams,
    sessions: &[Session],
) -> Vec<Violation> {
    let grid = params.grid();
    let cap = params.max_classes_per_day;
    let rooms: HashMap<&str, _> = dataset.rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    let faculties: HashMap<&str, _> = dataset
        .faculties
        .iter()
        .map(|f| (f.id.as_str(), f))
        .collect();
    let mut found = Vec::new();

    let per_session = solution
        .assignments
        .iter()
        .map(|a| (a.session_id, a))
        .into_group_map();
    for session in sessions {
        let count = per_session.get(&session.id).map_or(0, Vec::len);
        if count != 1 {
            found.push(violation(
                "scheduled once",
                format!("Session {} has {} assignments.", session.id, count),
            ));
        }
    }
    for a in &solution.assignments {
        if a.session_id >= sessions.len() {
            found.push(violation(
                "scheduled once",
                format!("Assignment refers to unknown session {}.", a.session_id),
            ));
        }
    }

    let mut room_slots = HashSet::new();
    let mut faculty_slots = HashSet::new();
    let mut batch_slots = HashSet::new();
    let mut faculty_days: HashMap<(&str, usize), usize> = HashMap::new();
    let mut batch_days: HashMap<(&str, usize), usize> = HashMap::new();
    for a in &solution.assignments {
        let Some(session) = sessions.get(a.session_id) else {
            continue;
        };
        let day = grid.day_of(a.timeslot);

        if !room_slots.insert((a.timeslot, a.room_id.as_str())) {
            found.push(violation(
                "no room overlap",
                format!("Room {} is double-booked at timeslot {}.", a.room_id, a.timeslot),
            ));
        }
        if !faculty_slots.insert((a.timeslot, a.faculty_id.as_str())) {
            found.push(violation(
                "no faculty overlap",
                format!(
                    "Faculty {} teaches twice at timeslot {}.",
                    a.faculty_id, a.timeslot
                ),
            ));
        }
        if !batch_slots.insert((a.timeslot, session.batch_id.as_str())) {
            found.push(violation(
                "no batch overlap",
                format!(
                    "Batch {} attends two sessions at timeslot {}.",
                    session.batch_id, a.timeslot
                ),
            ));
        }
        *faculty_days.entry((a.faculty_id.as_str(), day)).or_default() += 1;
        *batch_days.entry((session.batch_id.as_str(), day)).or_default() += 1;

        match faculties.get(a.faculty_id.as_str()) {
            Some(f) if a.timeslot < grid.len() && f.available_times.contains(&a.timeslot) => {}
            Some(_) => found.push(violation(
                "faculty availability",
                format!(
                    "Faculty {} is not available at timeslot {}.",
                    a.faculty_id, a.timeslot
                ),
            )),
            None => found.push(violation(
                "faculty availability",
                format!("Unknown faculty {}.", a.faculty_id),
            )),
        }
        match rooms.get(a.room_id.as_str()) {
            Some(r) if r.capacity >= session.size => {}
            Some(r) => found.push(violation(
                "room capacity",
                format!(
                    "Room {} seats {} but session {} has {} students.",
                    r.id, r.capacity, session.id, session.size
                ),
            )),
            None => found.push(violation(
                "room capacity",
                format!("Unknown room {}.", a.room_id),
            )),
        }
    }

    for ((faculty, day), count) in faculty_days.into_iter().sorted() {
        if count > cap {
            found.push(violation(
                "daily load",
                format!("Faculty {faculty} teaches {count} sessions on day {day} (max {cap})."),
            ));
        }
    }
    for ((batch, day), count) in batch_days.into_iter().sorted() {
        if count > cap {
            found.push(violation(
                "daily load",
                format!("Batch {batch} attends {count} sessions on day {day} (max {cap})."),
            ));
        }
    }

    for fixed in &dataset.fixed_slots {
        let honoured = solution.assignment_for(fixed.session_idx).is_some_and(|a| {
            a.timeslot == fixed.timeslot
                && fixed.room.as_ref().is_none_or(|r| *r == a.room_id)
                && fixed.faculty.as_ref().is_none_or(|f| *f == a.faculty_id)
        });
        if !honoured {
            found.push(violation(
                "fixed slot",
                format!(
                    "Session {} is not pinned to timeslot {} as required.",
                    fixed.session_idx, fixed.timeslot
                ),
            ));
        }
    }

    found
}
