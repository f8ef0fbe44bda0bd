use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Direction of optimization
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Minimize,
    Maximize,
}

/// Comparison between a constraint's left-hand side and its right-hand side
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    LessEq,
    /// Greater than or equal (>=)
    GreaterEq,
    /// Equal (=)
    Equal,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficient for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub goal: Goal,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficient for each variable
    pub lhs: Vec<f64>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

/// A linear program over nonnegative variables.
///
/// Every constraint has exactly as many coefficients as the objective, and
/// there is at least one variable. The fields are private so those invariants
/// hold for every value of this type.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    objective: Objective,
    constraints: Vec<Constraint>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("a problem needs at least one variable")]
    NoVariables,
    #[error("constraint {} has {found} coefficients, expected {expected}", .row + 1)]
    ConstraintArity {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl Goal {
    pub fn is_maximize(self) -> bool {
        self == Goal::Maximize
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "minimize" => Ok(Goal::Minimize),
            "max" | "maximize" => Ok(Goal::Maximize),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Minimize => write!(f, "Minimize"),
            Goal::Maximize => write!(f, "Maximize"),
        }
    }
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "=",
        }
    }
}

/// Only the exact symbols `<=`, `>=` and `=` are accepted.
impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(Relation::LessEq),
            ">=" => Ok(Relation::GreaterEq),
            "=" => Ok(Relation::Equal),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Objective {
    pub fn new(goal: Goal, coefficients: Vec<f64>) -> Self {
        Self { coefficients, goal }
    }

    pub fn minimize(coefficients: Vec<f64>) -> Self {
        Self::new(Goal::Minimize, coefficients)
    }

    pub fn maximize(coefficients: Vec<f64>) -> Self {
        Self::new(Goal::Maximize, coefficients)
    }
}

impl Constraint {
    pub fn new(lhs: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self { lhs, relation, rhs }
    }
}

impl Problem {
    pub fn new(objective: Objective, constraints: Vec<Constraint>) -> Result<Self, ModelError> {
        let n = objective.coefficients.len();
        if n == 0 {
            return Err(ModelError::NoVariables);
        }
        for (row, constraint) in constraints.iter().enumerate() {
            if constraint.lhs.len() != n {
                return Err(ModelError::ConstraintArity {
                    row,
                    expected: n,
                    found: constraint.lhs.len(),
                });
            }
        }
        Ok(Self { objective, constraints })
    }

    /// For callers that have already checked every arity.
    pub(crate) fn from_parts(objective: Objective, constraints: Vec<Constraint>) -> Self {
        debug_assert!(!objective.coefficients.is_empty());
        debug_assert!(
            constraints
                .iter()
                .all(|c| c.lhs.len() == objective.coefficients.len())
        );
        Self { objective, constraints }
    }

    pub fn num_variables(&self) -> usize {
        self.objective.coefficients.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn goal(&self) -> Goal {
        self.objective.goal
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}
