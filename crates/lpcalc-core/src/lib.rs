//! Turns user-entered linear programs into standard form, solves them, and
//! reports the answer in the user's own orientation.
//!
//! The pipeline is [`parser`] → [`canonical`] → [`orchestrate`] → [`report`];
//! each stage is a plain function of its input.

pub mod canonical;
pub mod error;
pub mod lexer;
pub mod model;
pub mod orchestrate;
pub mod parser;
pub mod report;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use canonical::{Block, BlockKind, CanonicalForm, RowOrigin, canonicalize};
pub use error::{Error, Result};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use lpcalc_solver::{Solver, SolverOptions};
pub use model::{Constraint, Goal, ModelError, Objective, Problem, Relation};
pub use orchestrate::{Orchestrator, SolveOutcome, orchestrate};
pub use parser::{
    CountField, CountReason, FieldInput, FieldRow, LineInput, ParseError, Reason, parse_count,
    parse_document, parse_fields, parse_goal, parse_lines,
};
pub use report::{
    DECIMALS, DisplayResult, Failure, OptimalReport, VariableValue, format_value, interpret,
};

/// Solve `problem` with default solver options.
pub fn solve(problem: &Problem) -> DisplayResult {
    solve_with(problem, &Orchestrator::default())
}

pub fn solve_with(problem: &Problem, orchestrator: &Orchestrator) -> DisplayResult {
    let form = canonicalize(problem);
    let outcome = orchestrator.run(form);
    interpret(&outcome, problem.goal())
}

/// Build a problem from already-typed parts and solve it; arity violations
/// become the failure notice.
pub fn solve_model(objective: Objective, constraints: Vec<Constraint>) -> DisplayResult {
    match Problem::new(objective, constraints) {
        Ok(problem) => solve(&problem),
        Err(e) => DisplayResult::failed(e),
    }
}

/// Parse field-shaped input and solve it; parse errors become the failure notice.
pub fn solve_fields(input: &FieldInput) -> DisplayResult {
    match parse_fields(input) {
        Ok(problem) => solve(&problem),
        Err(e) => DisplayResult::failed(e),
    }
}

/// Parse line-shaped input and solve it; parse errors become the failure notice.
pub fn solve_lines(input: &LineInput) -> DisplayResult {
    match parse_lines(input) {
        Ok(problem) => solve(&problem),
        Err(e) => DisplayResult::failed(e),
    }
}

/// Parse a problem document and solve it with `orchestrator`.
pub fn solve_document(source: &str, orchestrator: &Orchestrator) -> DisplayResult {
    match parse_document(source) {
        Ok(problem) => solve_with(&problem, orchestrator),
        Err(e) => DisplayResult::failed(e),
    }
}
