mod problem;
mod simplex;
mod solution;

pub use problem::{Rows, StandardForm};
pub use simplex::{Solver, SolverOptions};
pub use solution::{SolverFailure, SolverStatus, Vertex};
