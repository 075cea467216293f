use crate::data::{Batch, Session, Subject};
use log::debug;

/// Expands every (batch, subject) pair into `hours_per_week` sessions.
///
/// Ids are dense and ordered batch-major, then subject, then occurrence,
/// so that fixed-slot indices from outside refer to the same sessions
/// on every call with the same input.
pub fn expand_sessions(batches: &[Batch], subjects: &[Subject]) -> Vec<Session> {
    let mut sessions = Vec::new();
    for batch in batches {
        for subject in subjects {
            for _ in 0..subject.hours_per_week {
                sessions.push(Session {
                    id: sessions.len(),
                    batch_id: batch.id.clone(),
                    subject_id: subject.id.clone(),
                    size: batch.size,
                    allowed_rooms: subject.allowed_rooms.clone(),
                    eligible_faculties: subject.eligible_faculties.clone(),
                });
            }
        }
    }
    debug!(
        "Expanded {} batches x {} subjects into {} sessions.",
        batches.len(),
        subjects.len(),
        sessions.len()
    );
    sessions
}
