//! Input validation for generation requests.
//!
//! Runs before any session is expanded and reports every problem found,
//! not just the first:
//! - non-positive grid dimensions or variant counts
//! - weeks with more than [`MAX_TIMESLOTS`] timeslots
//! - duplicate ids within an entity kind
//! - subject/faculty references to unknown rooms, faculties or subjects
//! - fixed slots pointing outside the session list or the time grid

use crate::data::{Dataset, GenerationParams, MAX_TIMESLOTS};
use log::debug;
use std::collections::HashSet;
use std::fmt;

/// A single rejected aspect of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub message: String,
}

/// Categories of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssueKind {
    /// Two entities of the same kind share an id.
    DuplicateId,
    /// An id refers to an entity that does not exist.
    UnknownReference,
    /// A generation parameter is out of range.
    InvalidParameter,
    /// A fixed slot cannot refer to anything in this request.
    InvalidFixedSlot,
}

impl ValidationIssue {
    fn new(kind: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn check_unique<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a String>,
    errors: &mut Vec<ValidationIssue>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::DuplicateId,
                format!("Duplicate {kind} id: {id}"),
            ));
        }
    }
    seen
}

/// Validates a dataset together with the parameters it will be scheduled under.
///
/// # Returns
/// `Ok(())` if every check passes, `Err(issues)` with all detected issues.
pub fn validate_input(
    dataset: &Dataset,
    params: &GenerationParams,
) -> Result<(), Vec<ValidationIssue>> {
    let mut errors = Vec::new();

    for (name, value) in [
        ("days", params.days),
        ("periods_per_day", params.periods_per_day),
        ("num_variants", params.num_variants),
        ("max_classes_per_day", params.max_classes_per_day),
    ] {
        if value == 0 {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidParameter,
                format!("{name} must be at least 1"),
            ));
        }
    }
    let horizon = match params.days.checked_mul(params.periods_per_day) {
        Some(horizon) if horizon <= MAX_TIMESLOTS => horizon,
        _ => {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidParameter,
                format!(
                    "days ({}) x periods_per_day ({}) exceeds {MAX_TIMESLOTS} timeslots",
                    params.days, params.periods_per_day
                ),
            ));
            usize::MAX
        }
    };
    if params.undesirable_tail_periods > params.periods_per_day {
        errors.push(ValidationIssue::new(
            ValidationIssueKind::InvalidParameter,
            format!(
                "undesirable_tail_periods ({}) exceeds periods_per_day ({})",
                params.undesirable_tail_periods, params.periods_per_day
            ),
        ));
    }
    for (name, limit) in [
        ("time_limit_seconds", params.time_limit_seconds),
        ("request_time_limit_seconds", params.request_time_limit_seconds),
    ] {
        if limit.is_some_and(|limit| !(limit.is_finite() && limit > 0.0)) {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidParameter,
                format!("{name} must be a positive number of seconds"),
            ));
        }
    }

    let room_ids = check_unique("room", dataset.rooms.iter().map(|r| &r.id), &mut errors);
    let faculty_ids = check_unique(
        "faculty",
        dataset.faculties.iter().map(|f| &f.id),
        &mut errors,
    );
    check_unique("batch", dataset.batches.iter().map(|b| &b.id), &mut errors);
    let subject_ids = check_unique(
        "subject",
        dataset.subjects.iter().map(|s| &s.id),
        &mut errors,
    );

    for subject in &dataset.subjects {
        for room in &subject.allowed_rooms {
            if !room_ids.contains(room.as_str()) {
                errors.push(ValidationIssue::new(
                    ValidationIssueKind::UnknownReference,
                    format!("Subject {} allows unknown room {}", subject.id, room),
                ));
            }
        }
        for faculty in &subject.eligible_faculties {
            if !faculty_ids.contains(faculty.as_str()) {
                errors.push(ValidationIssue::new(
                    ValidationIssueKind::UnknownReference,
                    format!(
                        "Subject {} lists unknown faculty {}",
                        subject.id, faculty
                    ),
                ));
            }
        }
    }

    for faculty in &dataset.faculties {
        for subject in &faculty.subjects {
            if !subject_ids.contains(subject.as_str()) {
                errors.push(ValidationIssue::new(
                    ValidationIssueKind::UnknownReference,
                    format!("Faculty {} teaches unknown subject {}", faculty.id, subject),
                ));
            }
        }
        let outside = faculty
            .available_times
            .iter()
            .filter(|t| **t >= horizon)
            .count();
        if outside > 0 {
            debug!(
                "Faculty {} lists {} available timeslots beyond the {}-slot week; ignoring them.",
                faculty.id, outside, horizon
            );
        }
    }

    let hours: u64 = dataset
        .subjects
        .iter()
        .map(|s| u64::from(s.hours_per_week))
        .sum();
    let session_count = hours.saturating_mul(dataset.batches.len() as u64);
    for fixed in &dataset.fixed_slots {
        if fixed.session_idx as u64 >= session_count {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidFixedSlot,
                format!(
                    "Fixed slot refers to session {} but only {} sessions exist",
                    fixed.session_idx, session_count
                ),
            ));
        }
        if fixed.timeslot >= horizon {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidFixedSlot,
                format!(
                    "Fixed slot for session {} uses timeslot {} outside the {}-slot week",
                    fixed.session_idx, fixed.timeslot, horizon
                ),
            ));
        }
        if let Some(room) = fixed.room.as_ref().filter(|r| !room_ids.contains(r.as_str())) {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidFixedSlot,
                format!(
                    "Fixed slot for session {} uses unknown room {}",
                    fixed.session_idx, room
                ),
            ));
        }
        if let Some(faculty) = fixed
            .faculty
            .as_ref()
            .filter(|f| !faculty_ids.contains(f.as_str()))
        {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::InvalidFixedSlot,
                format!(
                    "Fixed slot for session {} uses unknown faculty {}",
                    fixed.session_idx, faculty
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
