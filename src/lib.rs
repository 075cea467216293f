//! Academic timetable generation.
//!
//! Expands batches and subjects into weekly sessions, builds a 0-1 integer
//! model over (session, timeslot, room, faculty) tuples and asks HiGHS for
//! one or more pairwise-distinct timetables. See [`search::generate`].

pub mod config;
pub mod data;
pub mod eligibility;
pub mod error;
pub mod model;
pub mod objective;
pub mod report;
pub mod search;
pub mod server;
pub mod sessions;
pub mod solver;
pub mod validation;

pub use error::{ConfigurationError, TimetableError};
pub use search::generate;
