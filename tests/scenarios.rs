mod common;

use common::*;
use timetable_solver::data::{Dataset, FacultyFallback, GenerationParams};
use timetable_solver::{ConfigurationError, TimetableError, generate};

fn scenario_a(r2_capacity: u32) -> Dataset {
    Dataset {
        rooms: vec![room("R1", 40), room("R2", r2_capacity)],
        faculties: vec![
            faculty("F1", &["S1"], 0..30),
            faculty("F2", &["S2"], 0..30),
        ],
        batches: vec![batch("B1", 40)],
        subjects: vec![
            subject("S1", 3, &["R1"], &["F1"]),
            subject("S2", 2, &["R2"], &["F2"]),
        ],
        fixed_slots: vec![pin(0, 0, Some("R1"), Some("F1"))],
    }
}

#[test]
fn scenario_a_pins_session_zero_and_keeps_subjects_in_their_rooms() {
    let dataset = scenario_a(40);
    let params = params(5, 6, 1);

    let output = generate(&dataset, &params).expect("scenario A is feasible");
    assert_eq!(output.sessions.len(), 5);
    assert_eq!(output.solutions.len(), 1);
    assert!(output.complete);
    assert_valid_and_distinct(&output, &dataset, &params);

    let solution = &output.solutions[0];
    assert_eq!(
        solution.assignment_for(0).unwrap().as_row(),
        (0, 0, "R1".to_string(), "F1".to_string())
    );
    for a in &solution.assignments {
        let session = &output.sessions[a.session_id];
        match session.subject_id.as_str() {
            "S1" => assert_eq!((a.room_id.as_str(), a.faculty_id.as_str()), ("R1", "F1")),
            "S2" => assert_eq!((a.room_id.as_str(), a.faculty_id.as_str()), ("R2", "F2")),
            other => panic!("unexpected subject {other}"),
        }
    }
    let mut slots: Vec<usize> = solution.assignments.iter().map(|a| a.timeslot).collect();
    slots.sort();
    slots.dedup();
    assert_eq!(slots.len(), 5);
}

#[test]
fn scenario_a_moves_an_oversized_batch_out_of_a_small_lab() {
    // R2 seats 30 but the batch has 40 students: capacity wins over the room list
    let dataset = scenario_a(30);
    let params = params(5, 6, 1);

    let output = generate(&dataset, &params).expect("scenario A is feasible");
    assert_valid_and_distinct(&output, &dataset, &params);
    let solution = &output.solutions[0];
    for a in &solution.assignments {
        assert_eq!(a.room_id, "R1");
        let expected = if output.sessions[a.session_id].subject_id == "S1" {
            "F1"
        } else {
            "F2"
        };
        assert_eq!(a.faculty_id, expected);
    }
    assert_eq!(output.reports[0].room_mismatch_penalties, 2);
}

#[test]
fn scenario_b_more_hours_than_timeslots_is_a_configuration_error() {
    let dataset = Dataset {
        rooms: vec![room("R1", 40)],
        faculties: vec![faculty("F1", &["S1"], 0..30)],
        batches: vec![batch("B1", 30)],
        subjects: vec![subject("S1", 31, &["R1"], &["F1"])],
        fixed_slots: vec![],
    };
    let params = GenerationParams {
        max_classes_per_day: 6,
        ..params(5, 6, 1)
    };

    match generate(&dataset, &params) {
        Err(TimetableError::Configuration(ConfigurationError::BatchOverloaded {
            sessions,
            capacity,
            ..
        })) => {
            assert_eq!(sessions, 31);
            assert_eq!(capacity, 30);
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn scenario_b_faculty_availability_bounds_the_subject() {
    let dataset = Dataset {
        rooms: vec![room("R1", 40)],
        faculties: vec![faculty("F1", &["S1"], 0..4)],
        batches: vec![batch("B1", 30)],
        subjects: vec![subject("S1", 5, &["R1"], &["F1"])],
        fixed_slots: vec![],
    };

    let err = generate(&dataset, &params(5, 6, 1)).unwrap_err();
    assert!(matches!(
        err,
        TimetableError::Configuration(ConfigurationError::SubjectOverloaded { .. })
    ));
}

fn unique_dataset() -> Dataset {
    Dataset {
        rooms: vec![room("R1", 30)],
        faculties: vec![faculty("F1", &["S1"], [0])],
        batches: vec![batch("B1", 25)],
        subjects: vec![subject("S1", 1, &["R1"], &["F1"])],
        fixed_slots: vec![],
    }
}

#[test]
fn scenario_c_unique_solution_yields_one_variant_without_error() {
    let dataset = unique_dataset();
    let params = GenerationParams {
        undesirable_tail_periods: 0,
        ..params(1, 1, 3)
    };

    let output = generate(&dataset, &params).expect("a single variant exists");
    assert_eq!(output.solutions.len(), 1);
    assert_eq!(output.requested_variants, 3);
    assert!(!output.complete);
    assert_eq!(
        output.solutions[0].assignments[0].as_row(),
        (0, 0, "R1".to_string(), "F1".to_string())
    );
}

#[test]
fn regenerating_a_unique_timetable_is_idempotent() {
    let mut dataset = unique_dataset();
    dataset.faculties[0].available_times = [0, 1].into_iter().collect();
    dataset.subjects[0].hours_per_week = 2;
    dataset.fixed_slots.push(pin(1, 0, None, None));
    let params = GenerationParams {
        undesirable_tail_periods: 0,
        ..params(1, 2, 1)
    };

    let first = generate(&dataset, &params).unwrap();
    let second = generate(&dataset, &params).unwrap();
    assert_eq!(first.solutions, second.solutions);
    assert_eq!(first.solutions[0].assignment_for(0).unwrap().timeslot, 1);
}

#[test]
fn variants_differ_and_all_honour_fixed_slots() {
    let dataset = Dataset {
        rooms: vec![room("R1", 50), room("R2", 40), room("L1", 24)],
        faculties: vec![
            faculty("F1", &["S0", "S1"], 0..12),
            faculty("F2", &["S1", "S2"], 0..12),
            faculty("F3", &["S0", "S2"], 0..12),
        ],
        batches: vec![batch("B0", 45), batch("B1", 22)],
        subjects: vec![
            subject("S0", 2, &["R1", "R2"], &["F1", "F3"]),
            subject("S1", 1, &["R1"], &["F1", "F2"]),
            subject("S2", 1, &["L1"], &["F2", "F3"]),
        ],
        fixed_slots: vec![pin(0, 1, Some("R1"), None), pin(4, 2, None, Some("F3"))],
    };
    let params = GenerationParams {
        max_classes_per_day: 3,
        ..params(3, 4, 3)
    };

    let output = generate(&dataset, &params).unwrap();
    assert_eq!(output.solutions.len(), 3);
    assert!(output.complete);
    assert_valid_and_distinct(&output, &dataset, &params);
    for solution in &output.solutions {
        let a = solution.assignment_for(0).unwrap();
        assert_eq!((a.timeslot, a.room_id.as_str()), (1, "R1"));
        let b = solution.assignment_for(4).unwrap();
        assert_eq!((b.timeslot, b.faculty_id.as_str()), (2, "F3"));
    }
    // each variant is at least as costly as the one before it
    for pair in output.reports.windows(2) {
        assert!(pair[0].objective <= pair[1].objective);
    }
}

#[test]
fn qualified_fallback_only_admits_faculty_teaching_the_subject() {
    let dataset = Dataset {
        rooms: vec![room("R1", 30)],
        faculties: vec![
            faculty("F1", &["S1"], 0..6),
            faculty("F2", &["S2"], 0..6),
        ],
        batches: vec![batch("B1", 20)],
        subjects: vec![subject("S1", 3, &[], &[]), subject("S2", 0, &[], &[])],
        fixed_slots: vec![],
    };
    let params = GenerationParams {
        faculty_fallback: FacultyFallback::Qualified,
        ..params(1, 6, 2)
    };

    let output = generate(&dataset, &params).unwrap();
    assert!(!output.solutions.is_empty());
    for solution in &output.solutions {
        assert!(solution.assignments.iter().all(|a| a.faculty_id == "F1"));
    }
}

#[test]
fn invalid_references_are_rejected_before_solving() {
    let mut dataset = unique_dataset();
    dataset.subjects[0].eligible_faculties.push("F9".to_string());

    let err = generate(&dataset, &GenerationParams::default()).unwrap_err();
    match err {
        TimetableError::Validation(issues) => assert_eq!(issues.len(), 1),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn absurd_weekly_hours_are_rejected_before_sessions_are_built() {
    let mut dataset = unique_dataset();
    dataset.subjects[0].hours_per_week = 4_000_000_000;

    match generate(&dataset, &params(5, 6, 1)) {
        Err(TimetableError::Configuration(ConfigurationError::BatchOverloaded {
            sessions,
            capacity,
            ..
        })) => {
            assert_eq!(sessions, 4_000_000_000);
            assert_eq!(capacity, 20);
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn contradictory_pins_return_no_variants_without_error() {
    let mut dataset = unique_dataset();
    dataset.faculties[0].available_times = [0, 1].into_iter().collect();
    dataset.fixed_slots = vec![pin(0, 0, None, None), pin(0, 1, None, None)];
    let params = params(1, 2, 2);

    let output = generate(&dataset, &params).expect("an infeasible model is not an error");
    assert!(output.solutions.is_empty());
    assert!(output.reports.is_empty());
    assert!(!output.complete);
}

#[test]
fn exhausted_request_budget_returns_partial_results() {
    let dataset = Dataset {
        rooms: vec![room("R1", 40), room("R2", 40)],
        faculties: vec![
            faculty("F1", &["S1"], 0..30),
            faculty("F2", &["S1"], 0..30),
        ],
        batches: vec![batch("B1", 30)],
        subjects: vec![subject("S1", 3, &[], &[])],
        fixed_slots: vec![],
    };
    let params = GenerationParams {
        request_time_limit_seconds: Some(1e-9),
        ..params(5, 6, 3)
    };

    let output = generate(&dataset, &params).expect("running out of time is not an error");
    assert!(output.solutions.len() < 3);
    assert!(!output.complete);
    assert_valid_and_distinct(&output, &dataset, &params);
}

#[test]
fn nothing_to_schedule_yields_a_single_empty_timetable() {
    let dataset = Dataset {
        rooms: vec![room("R1", 40)],
        faculties: vec![faculty("F1", &[], 0..30)],
        ..Dataset::default()
    };

    let output = generate(&dataset, &params(5, 6, 1)).unwrap();
    assert!(output.sessions.is_empty());
    assert_eq!(output.solutions.len(), 1);
    assert!(output.solutions[0].assignments.is_empty());
    assert!(output.complete);
    assert_eq!(output.reports[0].objective, 0);

    let output = generate(&dataset, &params(5, 6, 3)).unwrap();
    assert_eq!(output.solutions.len(), 1);
    assert!(!output.complete);
}
