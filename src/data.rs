use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// Type aliases for clarity
pub type RoomId = String;
pub type FacultyId = String;
pub type BatchId = String;
pub type SubjectId = String;
pub type SessionId = usize;
pub type Timeslot = usize;

/// Represents a physical room with a given capacity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub name: String,
    pub capacity: u32,
    #[serde(default, rename = "type")]
    pub room_type: Option<String>,
}

/// A faculty member, with the subjects they can teach and the timeslots they can attend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Faculty {
    pub id: FacultyId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: BTreeSet<SubjectId>,
    #[serde(default)]
    pub available_times: BTreeSet<Timeslot>,
}

/// A cohort of students that attends every subject together.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Batch {
    pub id: BatchId,
    #[serde(default)]
    pub name: String,
    pub size: u32,
}

/// A subject with its weekly-hour requirement and optional room/faculty lists.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    #[serde(default)]
    pub name: String,
    pub hours_per_week: u32,
    #[serde(default)]
    pub allowed_rooms: Vec<RoomId>,
    #[serde(default)]
    pub eligible_faculties: Vec<FacultyId>,
}

/// An external pin forcing one session into a timeslot.
///
/// `room` and `faculty` are optional; `None` means any eligible one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FixedSlot {
    pub session_idx: SessionId,
    pub timeslot: Timeslot,
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub faculty: Option<FacultyId>,
}

/// Read-only input snapshot for one generation request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Dataset {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub faculties: Vec<Faculty>,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub fixed_slots: Vec<FixedSlot>,
}

/// One required weekly occurrence of a subject for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub batch_id: BatchId,
    pub subject_id: SubjectId,
    pub size: u32,
    pub allowed_rooms: Vec<RoomId>,
    pub eligible_faculties: Vec<FacultyId>,
}

/// Represents a single scheduled session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
pub struct Assignment {
    pub session_id: SessionId,
    pub timeslot: Timeslot,
    pub room_id: RoomId,
    pub faculty_id: FacultyId,
}

impl Assignment {
    pub fn as_row(&self) -> (SessionId, Timeslot, RoomId, FacultyId) {
        (
            self.session_id,
            self.timeslot,
            self.room_id.clone(),
            self.faculty_id.clone(),
        )
    }
}

/// One complete timetable variant, sorted by session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub assignments: Vec<Assignment>,
}

impl Solution {
    pub fn new(mut assignments: Vec<Assignment>) -> Self {
        assignments.sort();
        Self { assignments }
    }

    pub fn assignment_for(&self, session: SessionId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.session_id == session)
    }
}

/// The weekly grid: `days * periods_per_day` timeslots, day-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    pub days: usize,
    pub periods_per_day: usize,
}

impl TimeGrid {
    pub fn new(days: usize, periods_per_day: usize) -> Self {
        Self {
            days,
            periods_per_day,
        }
    }

    pub fn len(&self) -> usize {
        self.days * self.periods_per_day
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn day_of(&self, t: Timeslot) -> usize {
        t / self.periods_per_day
    }

    pub fn period_of(&self, t: Timeslot) -> usize {
        t % self.periods_per_day
    }

    pub fn slots(&self) -> std::ops::Range<Timeslot> {
        0..self.len()
    }
}

/// What to do when a subject declares no eligible faculties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacultyFallback {
    /// Every faculty member may teach the subject.
    #[default]
    AnyFaculty,
    /// Only faculty listing the subject among their `subjects` may teach it.
    Qualified,
    /// Nobody may teach it; model construction fails.
    Strict,
}

fn default_days() -> usize {
    5
}

fn default_periods_per_day() -> usize {
    6
}

fn default_num_variants() -> usize {
    1
}

fn default_max_classes_per_day() -> usize {
    4
}

fn default_undesirable_tail_periods() -> usize {
    2
}

pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 30.0;
pub const DEFAULT_WORKERS: u32 = 1;
/// Largest accepted week: seven days of quarter-hour periods.
pub const MAX_TIMESLOTS: usize = 7 * 24 * 4;

/// Tunables for one generation request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationParams {
    #[serde(default = "default_days")]
    pub days: usize,
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: usize,
    #[serde(default = "default_num_variants")]
    pub num_variants: usize,
    #[serde(default = "default_max_classes_per_day")]
    pub max_classes_per_day: usize,
    /// The last N periods of every day count as undesirable.
    #[serde(default = "default_undesirable_tail_periods")]
    pub undesirable_tail_periods: usize,
    #[serde(default)]
    pub faculty_fallback: FacultyFallback,
    /// Wall-clock budget for each solver call.
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,
    /// Budget for the whole request; defaults to the per-variant budget times `num_variants`.
    #[serde(default)]
    pub request_time_limit_seconds: Option<f64>,
    /// Worker-count hint passed to the solver. Set by the service, never by a request:
    /// HiGHS fixes its thread pool per OS thread on first use.
    #[serde(skip)]
    pub workers: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            days: default_days(),
            periods_per_day: default_periods_per_day(),
            num_variants: default_num_variants(),
            max_classes_per_day: default_max_classes_per_day(),
            undesirable_tail_periods: default_undesirable_tail_periods(),
            faculty_fallback: FacultyFallback::default(),
            time_limit_seconds: None,
            request_time_limit_seconds: None,
            workers: None,
        }
    }
}

impl GenerationParams {
    pub fn grid(&self) -> TimeGrid {
        TimeGrid::new(self.days, self.periods_per_day)
    }

    pub fn per_variant_limit(&self) -> f64 {
        self.time_limit_seconds.unwrap_or(DEFAULT_TIME_LIMIT_SECONDS)
    }

    pub fn request_limit(&self) -> f64 {
        self.request_time_limit_seconds
            .unwrap_or(self.per_variant_limit() * self.num_variants as f64)
    }

    pub fn is_undesirable(&self, t: Timeslot) -> bool {
        let period = self.grid().period_of(t);
        period + self.undesirable_tail_periods >= self.periods_per_day
    }
}

/// Describes a soft constraint that was not met in a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmetSoftConstraint {
    pub constraint_type: String,
    pub description: String,
}

impl fmt::Display for UnmetSoftConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.constraint_type, self.description)
    }
}

/// Objective breakdown for one solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionReport {
    pub late_period_penalties: u32,
    pub room_mismatch_penalties: u32,
    pub load_spread: u32,
    pub objective: u32,
    pub unmet_soft_constraints: Vec<UnmetSoftConstraint>,
}

/// The final output of one generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub solutions: Vec<Solution>,
    pub sessions: Vec<Session>,
    pub requested_variants: usize,
    /// `false` when the search stopped before producing every requested variant.
    pub complete: bool,
    pub reports: Vec<SolutionReport>,
}
