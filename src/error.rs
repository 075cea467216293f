use crate::data::{BatchId, SessionId, SubjectId, Timeslot};
use crate::validation::ValidationIssue;
use itertools::Itertools;
use thiserror::Error;

/// Fatal problems found while building the constraint model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no feasible (timeslot, room, faculty) combination for session {session}; check room capacities and faculty availability")]
    NoFeasibleTuple { session: SessionId },

    #[error("no eligible faculty for session {session} under the strict fallback policy")]
    NoEligibleFaculty { session: SessionId },

    #[error("no variable matches fixed slot for session {session} at timeslot {timeslot}")]
    FixedSlotUnmatched {
        session: SessionId,
        timeslot: Timeslot,
    },

    #[error("batch {batch} needs {sessions} sessions but can attend at most {capacity} per week")]
    BatchOverloaded {
        batch: BatchId,
        sessions: usize,
        capacity: usize,
    },

    #[error("batch {batch} needs {sessions} sessions of subject {subject} but its faculty cover only {available} timeslots")]
    SubjectOverloaded {
        batch: BatchId,
        subject: SubjectId,
        sessions: usize,
        available: usize,
    },
}

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("invalid input: {}", .0.iter().map(|i| i.to_string()).join("; "))]
    Validation(Vec<ValidationIssue>),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl From<Vec<ValidationIssue>> for TimetableError {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        TimetableError::Validation(issues)
    }
}

pub type Result<T, E = TimetableError> = std::result::Result<T, E>;
