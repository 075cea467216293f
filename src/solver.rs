//! Thin adapter exposing the MIP backend through a small, solver-agnostic
//! surface: variable creation, linear constraints, a minimisation objective
//! and a single solve call that reports a status.
//!
//! The backend is HiGHS through `good_lp`.

use good_lp::solvers::SolutionStatus;
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, default_solver, variable,
};
use log::{debug, info, warn};
use std::time::Instant;

/// Relation between a linear expression and a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

/// Outcome of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Per-call resource hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverLimits {
    pub time_limit_seconds: f64,
    pub workers: u32,
}

/// A model under construction. Consumed by [`LinearModel::solve`].
pub struct LinearModel {
    variables: ProblemVariables,
    constraints: Vec<Constraint>,
    objective: Expression,
    bool_vars: usize,
    int_vars: usize,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearModel {
    pub fn new() -> Self {
        Self {
            variables: ProblemVariables::new(),
            constraints: Vec::new(),
            objective: Expression::from(0.0),
            bool_vars: 0,
            int_vars: 0,
        }
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> Variable {
        self.bool_vars += 1;
        self.variables.add(variable().binary().name(name))
    }

    pub fn new_int_var(&mut self, lower: i32, upper: i32, name: impl Into<String>) -> Variable {
        self.int_vars += 1;
        self.variables
            .add(variable().integer().min(lower).max(upper).name(name))
    }

    pub fn post(&mut self, expr: Expression, relation: Relation, constant: f64) {
        let c = match relation {
            Relation::Eq => constraint!(expr == constant),
            Relation::Le => constraint!(expr <= constant),
            Relation::Ge => constraint!(expr >= constant),
        };
        self.constraints.push(c);
    }

    pub fn minimise(&mut self, expr: Expression) {
        self.objective = expr;
    }

    pub fn num_variables(&self) -> usize {
        self.bool_vars + self.int_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Hands the model to HiGHS and waits for it to finish or run out of time.
    pub fn solve(self, limits: &SolverLimits) -> SolveOutcome<impl Solution + use<>> {
        debug!(
            "Solving model with {} boolean and {} integer variables, {} constraints (limit {:.1}s, {} worker(s)).",
            self.bool_vars,
            self.int_vars,
            self.constraints.len(),
            limits.time_limit_seconds,
            limits.workers
        );
        let start_time = Instant::now();
        // fixed seed so identical inputs give identical timetables
        let mut model = self
            .variables
            .minimise(self.objective)
            .using(default_solver)
            .set_option("threads", limits.workers.max(1) as i32)
            .set_option("time_limit", limits.time_limit_seconds)
            .set_option("random_seed", 1234)
            .set_option("log_to_console", "false")
            .set_option("output_flag", "false");
        for c in self.constraints {
            model.add_constraint(c);
        }

        let outcome = match model.solve() {
            Ok(solution) => {
                let status = match solution.status() {
                    SolutionStatus::Optimal => SolveStatus::Optimal,
                    _ => SolveStatus::Feasible,
                };
                SolveOutcome {
                    status,
                    solution: Some(solution),
                }
            }
            Err(ResolutionError::Infeasible) => SolveOutcome {
                status: SolveStatus::Infeasible,
                solution: None,
            },
            Err(e) => {
                warn!("Solver stopped without a usable answer: {}", e);
                SolveOutcome {
                    status: SolveStatus::Unknown,
                    solution: None,
                }
            }
        };
        info!(
            "Solver finished with status {:?} in {:.2?}",
            outcome.status,
            start_time.elapsed()
        );
        outcome
    }
}

/// Status plus variable values, when the solver produced any.
pub struct SolveOutcome<S> {
    status: SolveStatus,
    solution: Option<S>,
}

impl<S: Solution> SolveOutcome<S> {
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Value of `var`; `None` unless the status is optimal or feasible.
    pub fn value(&self, var: Variable) -> Option<f64> {
        if !self.status.has_solution() {
            return None;
        }
        self.solution.as_ref().map(|s| s.value(var))
    }
}
