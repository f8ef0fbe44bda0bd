use log::debug;
use lpcalc_solver::{Rows, Solver, SolverOptions, SolverStatus, StandardForm};

use crate::canonical::{Block, CanonicalForm};

/// What a single solve produced, in minimization orientation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal {
        /// One value per variable, in input column order
        values: Vec<f64>,
        /// Value of the minimized (possibly negated) objective
        objective_value: f64,
    },
    Infeasible,
    Unbounded,
    SolverError {
        message: String,
    },
}

/// Hands canonical forms to the simplex solver and classifies its verdict.
///
/// The solver's domain is `x >= 0`, which supplies the nonnegativity bound
/// the canonical form leaves implicit.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    solver: Solver,
}

impl From<Block> for Rows {
    fn from(block: Block) -> Self {
        Rows::new(block.matrix, block.rhs)
    }
}

impl From<CanonicalForm> for StandardForm {
    fn from(form: CanonicalForm) -> Self {
        StandardForm::new(form.costs)
            .with_le(form.inequalities.map(Rows::from))
            .with_eq(form.equalities.map(Rows::from))
    }
}

impl Orchestrator {
    pub fn new(solver: Solver) -> Self {
        Self { solver }
    }

    pub fn from_options(options: SolverOptions) -> Self {
        Self::new(Solver::from_options(options))
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Run the solver once on `form`.
    pub fn run(&self, form: CanonicalForm) -> SolveOutcome {
        let standard = StandardForm::from(form);
        let outcome = match self.solver.solve(&standard) {
            SolverStatus::Optimal(vertex) => SolveOutcome::Optimal {
                values: vertex.values,
                objective_value: vertex.objective_value,
            },
            SolverStatus::Infeasible => SolveOutcome::Infeasible,
            SolverStatus::Unbounded => SolveOutcome::Unbounded,
            SolverStatus::Failed(failure) => SolveOutcome::SolverError {
                message: failure.to_string(),
            },
        };
        debug!("solve outcome: {:?}", outcome);
        outcome
    }
}

/// Run `form` through a solver with default options.
pub fn orchestrate(form: CanonicalForm) -> SolveOutcome {
    Orchestrator::default().run(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use crate::model::{Constraint, Objective, Problem, Relation};

    fn form(objective: Objective, constraints: Vec<Constraint>) -> CanonicalForm {
        canonicalize(&Problem::new(objective, constraints).unwrap())
    }

    #[test]
    fn test_standard_form_keeps_absent_blocks_absent() {
        let standard = StandardForm::from(form(Objective::maximize(vec![1.0, 2.0]), Vec::new()));
        assert_eq!(standard.costs, vec![-1.0, -2.0]);
        assert_eq!(standard.le, None);
        assert_eq!(standard.eq, None);
    }

    #[test]
    fn test_optimal_values_keep_column_order() {
        // Maximize 3x1 + 5x2 in minimization form
        let constraints = vec![
            Constraint::new(vec![1.0, 0.0], Relation::LessEq, 4.0),
            Constraint::new(vec![0.0, 2.0], Relation::LessEq, 12.0),
            Constraint::new(vec![3.0, 2.0], Relation::LessEq, 18.0),
        ];
        let outcome = orchestrate(form(Objective::maximize(vec![3.0, 5.0]), constraints));

        match outcome {
            SolveOutcome::Optimal {
                values,
                objective_value,
            } => {
                assert!((values[0] - 2.0).abs() < 1e-6, "x1 = {}", values[0]);
                assert!((values[1] - 6.0).abs() < 1e-6, "x2 = {}", values[1]);
                assert!((objective_value + 36.0).abs() < 1e-6, "obj = {}", objective_value);
            }
            other => panic!("Expected optimal, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_kinds_are_distinct() {
        let infeasible = form(
            Objective::minimize(vec![1.0]),
            vec![
                Constraint::new(vec![1.0], Relation::LessEq, 2.0),
                Constraint::new(vec![1.0], Relation::GreaterEq, 5.0),
            ],
        );
        assert_eq!(orchestrate(infeasible), SolveOutcome::Infeasible);

        let unbounded = form(Objective::maximize(vec![1.0]), Vec::new());
        assert_eq!(orchestrate(unbounded), SolveOutcome::Unbounded);

        let limited = form(
            Objective::maximize(vec![1.0]),
            vec![Constraint::new(vec![1.0], Relation::LessEq, 2.0)],
        );
        let orchestrator = Orchestrator::new(Solver::new().with_max_iterations(0));
        assert!(matches!(
            orchestrator.run(limited),
            SolveOutcome::SolverError { message } if message.contains("iteration limit")
        ));
    }

    #[test]
    fn test_non_finite_input_is_a_solver_error() {
        let form = form(
            Objective::minimize(vec![f64::INFINITY]),
            vec![Constraint::new(vec![1.0], Relation::LessEq, 2.0)],
        );
        assert!(matches!(orchestrate(form), SolveOutcome::SolverError { .. }));
    }
}
