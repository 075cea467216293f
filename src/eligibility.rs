use crate::data::{Faculty, FacultyFallback, Room, Session};
use log::warn;
use std::collections::HashSet;

/// Static candidate sets for one session, as indices into the dataset's
/// room and faculty lists (in dataset order).
///
/// Availability is not applied here; the model builder filters faculty
/// per timeslot when it creates variables. Every widening of a subject's
/// own lists is logged at `warn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub rooms: Vec<usize>,
    pub faculties: Vec<usize>,
}

pub fn resolve_eligibility(
    sessions: &[Session],
    rooms: &[Room],
    faculties: &[Faculty],
    policy: FacultyFallback,
) -> Vec<Eligibility> {
    sessions
        .iter()
        .map(|session| resolve_session(session, rooms, faculties, policy))
        .collect()
}

fn resolve_session(
    session: &Session,
    rooms: &[Room],
    faculties: &[Faculty],
    policy: FacultyFallback,
) -> Eligibility {
    let fits = |room: &Room| room.capacity >= session.size;

    let allowed: HashSet<&str> = session.allowed_rooms.iter().map(String::as_str).collect();
    let mut candidate_rooms: Vec<usize> = rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| allowed.contains(r.id.as_str()) && fits(*r))
        .map(|(i, _)| i)
        .collect();
    if candidate_rooms.is_empty() {
        candidate_rooms = rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| fits(*r))
            .map(|(i, _)| i)
            .collect();
        if !session.allowed_rooms.is_empty() {
            warn!(
                "Session {} ({} for {}): no allowed room seats {} students; falling back to {} room(s) of sufficient capacity.",
                session.id,
                session.subject_id,
                session.batch_id,
                session.size,
                candidate_rooms.len()
            );
        }
    }

    let eligible: HashSet<&str> = session
        .eligible_faculties
        .iter()
        .map(String::as_str)
        .collect();
    let listed: Vec<usize> = faculties
        .iter()
        .enumerate()
        .filter(|(_, f)| eligible.contains(f.id.as_str()))
        .map(|(i, _)| i)
        .collect();
    let widened = listed.is_empty() && policy != FacultyFallback::Strict;
    let candidate_faculties = if !listed.is_empty() {
        listed
    } else {
        match policy {
            FacultyFallback::AnyFaculty => (0..faculties.len()).collect(),
            FacultyFallback::Qualified => faculties
                .iter()
                .enumerate()
                .filter(|(_, f)| f.subjects.contains(&session.subject_id))
                .map(|(i, _)| i)
                .collect(),
            FacultyFallback::Strict => Vec::new(),
        }
    };
    if widened {
        warn!(
            "Session {} ({} for {}): subject lists no eligible faculty; {:?} policy admits {} faculty member(s).",
            session.id,
            session.subject_id,
            session.batch_id,
            policy,
            candidate_faculties.len()
        );
    }

    Eligibility {
        rooms: candidate_rooms,
        faculties: candidate_faculties,
    }
}
