use crate::data::{
    Dataset, FacultyFallback, FixedSlot, GenerationParams, Session, SessionId, Timeslot,
};
use crate::eligibility::Eligibility;
use crate::error::ConfigurationError;
use crate::solver::{LinearModel, Relation, SolveStatus, SolverLimits};
use good_lp::{Expression, Variable};
use log::{debug, info, trace};
use std::collections::{BTreeMap, BTreeSet};

/// (session, timeslot, room index, faculty index)
pub type Tuple = (SessionId, Timeslot, usize, usize);

/// Everything a model build reads. Borrowed from the caller for one request.
#[derive(Clone, Copy)]
pub struct ModelInput<'a> {
    pub dataset: &'a Dataset,
    pub params: &'a GenerationParams,
    pub sessions: &'a [Session],
    pub eligibility: &'a [Eligibility],
}

/// The feasible tuples of a request, computed once and shared by every variant.
#[derive(Debug, Clone)]
pub struct VariablePlan {
    tuples: Vec<Tuple>,
}

impl VariablePlan {
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}

/// Enumerates every (session, timeslot, room, faculty) combination that
/// respects eligibility and availability, and rejects requests that cannot
/// be satisfied whatever the solver does.
pub fn plan_variables(input: ModelInput<'_>) -> Result<VariablePlan, ConfigurationError> {
    let grid = input.params.grid();
    let faculties = &input.dataset.faculties;
    let mut tuples = Vec::new();

    // pre-filter for performance; implicitly handles availability and capacity
    for (session, eligible) in input.sessions.iter().zip(input.eligibility) {
        if eligible.faculties.is_empty()
            && input.params.faculty_fallback == FacultyFallback::Strict
        {
            return Err(ConfigurationError::NoEligibleFaculty {
                session: session.id,
            });
        }
        let before = tuples.len();
        for t in grid.slots() {
            for &r in &eligible.rooms {
                for &f in &eligible.faculties {
                    if faculties[f].available_times.contains(&t) {
                        tuples.push((session.id, t, r, f));
                    }
                }
            }
        }
        if tuples.len() == before {
            return Err(ConfigurationError::NoFeasibleTuple {
                session: session.id,
            });
        }
    }
    trace!(
        "Generated {} potential assignment variables out of a theoretical maximum of {}.",
        tuples.len(),
        input.sessions.len() * grid.len() * input.dataset.rooms.len() * faculties.len()
    );

    check_subject_slots(input, &tuples)?;
    check_fixed_slots(input, &tuples)?;

    Ok(VariablePlan { tuples })
}

fn weekly_capacity(params: &GenerationParams) -> usize {
    let grid = params.grid();
    grid.len()
        .min(grid.days.saturating_mul(params.max_classes_per_day))
}

/// Rejects requests where a batch needs more sessions than the week and the
/// daily cap can hold. Works on the raw dataset, before any session exists.
pub fn check_weekly_hours(
    dataset: &Dataset,
    params: &GenerationParams,
) -> Result<(), ConfigurationError> {
    let capacity = weekly_capacity(params);
    // every batch takes every subject, so all batches carry the same load
    let hours: u64 = dataset
        .subjects
        .iter()
        .map(|s| u64::from(s.hours_per_week))
        .sum();
    match dataset.batches.first() {
        Some(batch) if hours > capacity as u64 => Err(ConfigurationError::BatchOverloaded {
            batch: batch.id.clone(),
            sessions: usize::try_from(hours).unwrap_or(usize::MAX),
            capacity,
        }),
        _ => Ok(()),
    }
}

// pigeonhole check: more sessions of a subject than slots its faculty can offer
fn check_subject_slots(input: ModelInput<'_>, tuples: &[Tuple]) -> Result<(), ConfigurationError> {
    let mut group_sizes: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut group_slots: BTreeMap<(&str, &str), BTreeSet<Timeslot>> = BTreeMap::new();
    for session in input.sessions {
        *group_sizes
            .entry((session.batch_id.as_str(), session.subject_id.as_str()))
            .or_default() += 1;
    }
    for &(s, t, _, _) in tuples {
        let session = &input.sessions[s];
        group_slots
            .entry((session.batch_id.as_str(), session.subject_id.as_str()))
            .or_default()
            .insert(t);
    }
    for ((batch, subject), sessions) in group_sizes {
        let available = group_slots
            .get(&(batch, subject))
            .map_or(0, BTreeSet::len);
        if sessions > available {
            return Err(ConfigurationError::SubjectOverloaded {
                batch: batch.to_string(),
                subject: subject.to_string(),
                sessions,
                available,
            });
        }
    }
    Ok(())
}

fn check_fixed_slots(input: ModelInput<'_>, tuples: &[Tuple]) -> Result<(), ConfigurationError> {
    for fixed in &input.dataset.fixed_slots {
        let pin = FixedPin::resolve(input.dataset, fixed);
        if !tuples.iter().any(|tuple| pin.matches(tuple)) {
            return Err(ConfigurationError::FixedSlotUnmatched {
                session: fixed.session_idx,
                timeslot: fixed.timeslot,
            });
        }
    }
    Ok(())
}

/// A fixed slot with its room/faculty ids resolved to dataset indices.
struct FixedPin {
    session: SessionId,
    timeslot: Timeslot,
    room: Option<Option<usize>>,
    faculty: Option<Option<usize>>,
}

impl FixedPin {
    fn resolve(dataset: &Dataset, fixed: &FixedSlot) -> Self {
        Self {
            session: fixed.session_idx,
            timeslot: fixed.timeslot,
            room: fixed
                .room
                .as_ref()
                .map(|id| dataset.rooms.iter().position(|r| &r.id == id)),
            faculty: fixed
                .faculty
                .as_ref()
                .map(|id| dataset.faculties.iter().position(|f| &f.id == id)),
        }
    }

    fn matches(&self, &(s, t, r, f): &Tuple) -> bool {
        s == self.session
            && t == self.timeslot
            && self.room.is_none_or(|pinned| pinned == Some(r))
            && self.faculty.is_none_or(|pinned| pinned == Some(f))
    }
}

/// A freshly built model: the solver-side problem plus the tuple each
/// decision variable stands for.
pub struct TimetableModel {
    pub(crate) lp: LinearModel,
    assign: BTreeMap<Tuple, Variable>,
}

impl TimetableModel {
    pub fn variables(&self) -> impl Iterator<Item = (&Tuple, &Variable)> {
        self.assign.iter()
    }

    /// Requires at least one of `previous` to be false in any new solution.
    pub fn forbid(&mut self, previous: &[Tuple]) {
        let vars: Vec<Variable> = previous
            .iter()
            .filter_map(|tuple| self.assign.get(tuple).copied())
            .collect();
        if vars.is_empty() {
            return;
        }
        let bound = (vars.len() - 1) as f64;
        self.lp.post(vars.into_iter().sum(), Relation::Le, bound);
    }

    /// Solves the model and returns the tuples whose variable came out true.
    pub fn solve(self, limits: &SolverLimits) -> (SolveStatus, Vec<Tuple>) {
        let outcome = self.lp.solve(limits);
        let chosen = self
            .assign
            .iter()
            .filter(|(_, var)| outcome.value(**var).is_some_and(|v| v > 0.5))
            .map(|(tuple, _)| *tuple)
            .collect();
        (outcome.status(), chosen)
    }
}

fn sum(vars: &[Variable]) -> Expression {
    vars.iter().copied().sum()
}

/// Creates one boolean per planned tuple and posts every hard constraint.
pub fn build_model(input: ModelInput<'_>, plan: &VariablePlan) -> TimetableModel {
    let grid = input.params.grid();
    let cap = input.params.max_classes_per_day as f64;
    let mut lp = LinearModel::new();

    // x_strf = 1 if session s is taught at time t in room r by faculty f
    let mut assign = BTreeMap::new();
    for &(s, t, r, f) in plan.tuples() {
        let var = lp.new_bool_var(format!("a_s{s}_t{t}_r{r}_f{f}"));
        assign.insert((s, t, r, f), var);
    }

    let mut by_session: BTreeMap<SessionId, Vec<Variable>> = BTreeMap::new();
    let mut by_room: BTreeMap<(Timeslot, usize), Vec<Variable>> = BTreeMap::new();
    let mut by_faculty: BTreeMap<(Timeslot, usize), Vec<Variable>> = BTreeMap::new();
    let mut by_batch: BTreeMap<(Timeslot, &str), Vec<Variable>> = BTreeMap::new();
    let mut faculty_day: BTreeMap<(usize, usize), Vec<Variable>> = BTreeMap::new();
    let mut batch_day: BTreeMap<(usize, &str), Vec<Variable>> = BTreeMap::new();
    for (&(s, t, r, f), &var) in &assign {
        let batch = input.sessions[s].batch_id.as_str();
        let day = grid.day_of(t);
        by_session.entry(s).or_default().push(var);
        by_room.entry((t, r)).or_default().push(var);
        by_faculty.entry((t, f)).or_default().push(var);
        by_batch.entry((t, batch)).or_default().push(var);
        faculty_day.entry((day, f)).or_default().push(var);
        batch_day.entry((day, batch)).or_default().push(var);
    }

    info!("Adding 'session scheduled once' constraints...");
    for vars in by_session.values() {
        lp.post(sum(vars), Relation::Eq, 1.0);
    }

    info!("Adding 'no room, faculty or batch overlap' constraints...");
    for vars in by_room
        .values()
        .chain(by_faculty.values())
        .filter(|vars| vars.len() > 1)
    {
        lp.post(sum(vars), Relation::Le, 1.0);
    }
    for vars in by_batch.values().filter(|vars| vars.len() > 1) {
        lp.post(sum(vars), Relation::Le, 1.0);
    }

    info!("Adding 'max classes per day' constraints...");
    for vars in faculty_day
        .values()
        .chain(batch_day.values())
        .filter(|vars| vars.len() as f64 > cap)
    {
        lp.post(sum(vars), Relation::Le, cap);
    }

    info!("Adding fixed-slot constraints...");
    for fixed in &input.dataset.fixed_slots {
        let pin = FixedPin::resolve(input.dataset, fixed);
        let vars: Vec<Variable> = assign
            .iter()
            .filter(|(tuple, _)| pin.matches(tuple))
            .map(|(_, var)| *var)
            .collect();
        lp.post(sum(&vars), Relation::Eq, 1.0);
    }

    debug!(
        "Model has {} variables and {} hard constraints.",
        lp.num_variables(),
        lp.num_constraints()
    );
    TimetableModel { lp, assign }
}
