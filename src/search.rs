use crate::data::{
    Assignment, DEFAULT_WORKERS, Dataset, GenerationOutput, GenerationParams, Solution,
};
use crate::eligibility::resolve_eligibility;
use crate::error::Result;
use crate::model::{
    ModelInput, Tuple, VariablePlan, build_model, check_weekly_hours, plan_variables,
};
use crate::objective::compose_objective;
use crate::report::{audit, score_solution};
use crate::sessions::expand_sessions;
use crate::solver::{SolveStatus, SolverLimits};
use crate::validation::validate_input;
use itertools::Itertools;
use log::{info, warn};
use std::time::{Duration, Instant};

/// Generates up to `params.num_variants` pairwise-distinct timetables.
///
/// Invalid input and unsatisfiable configurations are errors. Running out of
/// solutions or time is not: the variants found so far are returned and
/// `complete` is `false`.
pub fn generate(dataset: &Dataset, params: &GenerationParams) -> Result<GenerationOutput> {
    let start_time = Instant::now();
    validate_input(dataset, params)?;
    check_weekly_hours(dataset, params)?;

    let sessions = expand_sessions(&dataset.batches, &dataset.subjects);
    let eligibility = resolve_eligibility(
        &sessions,
        &dataset.rooms,
        &dataset.faculties,
        params.faculty_fallback,
    );
    let input = ModelInput {
        dataset,
        params,
        sessions: &sessions,
        eligibility: &eligibility,
    };

    info!(
        "Setting up timetable model with {} sessions, {} rooms, {} faculty and {} timeslots...",
        sessions.len(),
        dataset.rooms.len(),
        dataset.faculties.len(),
        params.grid().len()
    );
    let plan = plan_variables(input)?;
    let solutions = search_variants(input, &plan);

    let reports = solutions
        .iter()
        .map(|s| score_solution(s, dataset, params, &sessions))
        .collect_vec();
    let complete = solutions.len() == params.num_variants;
    info!(
        "Generated {} of {} requested variants in {:.2?}",
        solutions.len(),
        params.num_variants,
        start_time.elapsed()
    );

    Ok(GenerationOutput {
        solutions,
        sessions,
        requested_variants: params.num_variants,
        complete,
        reports,
    })
}

/// Re-solves a fresh model per variant, each forbidding the exact tuple set
/// of every variant accepted before it. Stops at the first variant the
/// solver cannot produce or when the request budget is spent.
pub fn search_variants(input: ModelInput<'_>, plan: &VariablePlan) -> Vec<Solution> {
    let params = input.params;
    if plan.is_empty() {
        info!("Nothing to schedule; the empty timetable is the only variant.");
        return vec![Solution::new(Vec::new())];
    }
    let deadline = Duration::try_from_secs_f64(params.request_limit())
        .ok()
        .and_then(|budget| Instant::now().checked_add(budget));
    let mut solutions = Vec::new();
    let mut forbidden: Vec<Vec<Tuple>> = Vec::new();

    for variant in 0..params.num_variants {
        let remaining =
            deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()));
        if remaining.is_zero() {
            warn!(
                "Variant {}: request time budget exhausted; returning {} variant(s).",
                variant,
                solutions.len()
            );
            break;
        }

        let mut model = build_model(input, plan);
        compose_objective(&mut model, input);
        for previous in &forbidden {
            model.forbid(previous);
        }

        let limits = SolverLimits {
            time_limit_seconds: params.per_variant_limit().min(remaining.as_secs_f64()),
            workers: params.workers.unwrap_or(DEFAULT_WORKERS),
        };
        let (status, chosen) = model.solve(&limits);
        if !status.has_solution() {
            info!(
                "Variant {}: no feasible solution found ({:?}); stopping.",
                variant, status
            );
            break;
        }

        let solution = to_solution(input, &chosen);
        let violations = audit(&solution, input.dataset, params, input.sessions);
        if !violations.is_empty() {
            // a time-limited solve can stop before it holds a complete assignment
            warn!(
                "Variant {}: solver returned {:?} but the timetable is unusable ({}); stopping.",
                variant,
                status,
                violations.iter().join("; ")
            );
            break;
        }
        if status == SolveStatus::Feasible {
            info!("Variant {}: feasible timetable found (not proven optimal).", variant);
        } else {
            info!("Variant {}: optimal timetable found.", variant);
        }

        solutions.push(solution);
        forbidden.push(chosen);
    }

    solutions
}

fn to_solution(input: ModelInput<'_>, chosen: &[Tuple]) -> Solution {
    Solution::new(
        chosen
            .iter()
            .map(|&(s, t, r, f)| Assignment {
                session_id: s,
                timeslot: t,
                room_id: input.dataset.rooms[r].id.clone(),
                faculty_id: input.dataset.faculties[f].id.clone(),
            })
            .collect(),
    )
}
