#![allow(dead_code)]

use timetable_solver::data::{
    Batch, Dataset, Faculty, FixedSlot, GenerationOutput, GenerationParams, Room, Subject,
};
use timetable_solver::report::audit;

pub fn room(id: &str, capacity: u32) -> Room {
    Room {
        id: id.to_string(),
        name: format!("Room {id}"),
        capacity,
        room_type: None,
    }
}

pub fn faculty(
    id: &str,
    subjects: &[&str],
    available: impl IntoIterator<Item = usize>,
) -> Faculty {
    Faculty {
        id: id.to_string(),
        name: format!("Dr {id}"),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        available_times: available.into_iter().collect(),
    }
}

pub fn batch(id: &str, size: u32) -> Batch {
    Batch {
        id: id.to_string(),
        name: id.to_string(),
        size,
    }
}

pub fn subject(id: &str, hours: u32, rooms: &[&str], faculties: &[&str]) -> Subject {
    Subject {
        id: id.to_string(),
        name: id.to_string(),
        hours_per_week: hours,
        allowed_rooms: rooms.iter().map(|r| r.to_string()).collect(),
        eligible_faculties: faculties.iter().map(|f| f.to_string()).collect(),
    }
}

pub fn pin(
    session_idx: usize,
    timeslot: usize,
    room: Option<&str>,
    faculty: Option<&str>,
) -> FixedSlot {
    FixedSlot {
        session_idx,
        timeslot,
        room: room.map(str::to_string),
        faculty: faculty.map(str::to_string),
    }
}

pub fn params(days: usize, periods_per_day: usize, num_variants: usize) -> GenerationParams {
    GenerationParams {
        days,
        periods_per_day,
        num_variants,
        time_limit_seconds: Some(20.0),
        ..GenerationParams::default()
    }
}

/// Every solution obeys the hard rules and no two solutions are identical.
pub fn assert_valid_and_distinct(
    output: &GenerationOutput,
    dataset: &Dataset,
    params: &GenerationParams,
) {
    for (i, solution) in output.solutions.iter().enumerate() {
        let violations = audit(solution, dataset, params, &output.sessions);
        assert!(violations.is_empty(), "variant {i} breaks hard rules: {violations:?}");
        assert_eq!(solution.assignments.len(), output.sessions.len());
    }
    for i in 0..output.solutions.len() {
        for j in (i + 1)..output.solutions.len() {
            assert_ne!(
                output.solutions[i], output.solutions[j],
                "variants {i} and {j} are identical"
            );
        }
    }
}
