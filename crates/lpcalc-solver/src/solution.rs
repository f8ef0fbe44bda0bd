use thiserror::Error;

/// Outcome of a single simplex run
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SolverStatus {
    /// An optimal vertex was found
    Optimal(Vertex),
    /// No point satisfies every row and `x >= 0`
    Infeasible,
    /// The objective decreases without bound over the feasible region
    Unbounded,
    /// The run stopped before reaching a verdict
    Failed(SolverFailure),
}

/// An optimal basic solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Value of each variable, in column order
    pub values: Vec<f64>,
    /// `costs . values`
    pub objective_value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverFailure {
    #[error("problem has no variables")]
    NoVariables,
    #[error("{block} row {row} has {found} coefficients, expected {expected}")]
    RowLength {
        block: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{block} block has {rows} rows but {rhs} right-hand sides")]
    RhsLength {
        block: String,
        rows: usize,
        rhs: usize,
    },
    #[error("non-finite value in {0}")]
    NonFinite(String),
    #[error("iteration limit of {0} reached")]
    IterationLimit(usize),
    #[error("numerical breakdown: {0}")]
    NumericalBreakdown(String),
}
