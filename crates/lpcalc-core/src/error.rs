use thiserror::Error;

use crate::model::ModelError;
use crate::parser::ParseError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("the problem is infeasible")]
    Infeasible,
    #[error("the problem is unbounded")]
    Unbounded,
    #[error("solver error: {message}")]
    Solver { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse(ParseError::Count { .. }) => "count",
            Error::Parse(ParseError::Goal(_)) => "goal",
            Error::Parse(ParseError::Objective { .. }) => "objective",
            Error::Parse(ParseError::Constraint { .. }) => "constraint",
            Error::Model(_) => "model",
            Error::Infeasible => "infeasible",
            Error::Unbounded => "unbounded",
            Error::Solver { .. } => "solver",
        }
    }

    /// Whether the input was rejected before any solve was attempted
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Model(_))
    }
}
