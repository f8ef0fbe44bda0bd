use std::fmt;

use crate::error::Error;
use crate::model::Goal;
use crate::orchestrate::SolveOutcome;

/// Decimal places used for every printed value
pub const DECIMALS: usize = 4;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    /// `x1`, `x2`, ... in input order
    pub label: String,
    pub value: f64,
}

/// An optimum expressed in the user's own orientation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalReport {
    pub goal: Goal,
    pub variables: Vec<VariableValue>,
    /// True optimum of the original objective (already un-negated for `Maximize`)
    pub objective_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub error: Error,
}

/// What the user sees after a solve request
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayResult {
    Optimal(OptimalReport),
    Failed(Failure),
}

/// Map a raw outcome back to the orientation of `goal`.
///
/// The solver always minimizes, so a maximization's objective value comes back
/// negated and is flipped here. Failures carry no partial values.
pub fn interpret(outcome: &SolveOutcome, goal: Goal) -> DisplayResult {
    match outcome {
        SolveOutcome::Optimal {
            values,
            objective_value,
        } => {
            let objective_value = match goal {
                Goal::Minimize => *objective_value,
                // Subtracting from zero keeps a zero optimum at +0.0
                Goal::Maximize => 0.0 - objective_value,
            };
            let variables = values
                .iter()
                .enumerate()
                .map(|(i, &value)| VariableValue {
                    label: format!("x{}", i + 1),
                    value,
                })
                .collect();
            DisplayResult::Optimal(OptimalReport {
                goal,
                variables,
                objective_value,
            })
        }
        SolveOutcome::Infeasible => DisplayResult::failed(Error::Infeasible),
        SolveOutcome::Unbounded => DisplayResult::failed(Error::Unbounded),
        SolveOutcome::SolverError { message } => DisplayResult::failed(Error::Solver {
            message: message.clone(),
        }),
    }
}

/// Fixed-point with [`DECIMALS`] places; values that round to zero print
/// without a minus sign.
pub fn format_value(value: f64) -> String {
    let text = format!("{:.*}", DECIMALS, value);
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

impl DisplayResult {
    pub fn failed(error: impl Into<Error>) -> Self {
        DisplayResult::Failed(Failure {
            error: error.into(),
        })
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, DisplayResult::Optimal(_))
    }

    pub fn report(&self) -> Option<&OptimalReport> {
        match self {
            DisplayResult::Optimal(report) => Some(report),
            DisplayResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            DisplayResult::Optimal(_) => None,
            DisplayResult::Failed(failure) => Some(&failure.error),
        }
    }

    /// Heading for a modal notice
    pub fn title(&self) -> &'static str {
        match self {
            DisplayResult::Optimal(_) => "Solution Found",
            DisplayResult::Failed(failure) if failure.error.is_input_error() => "Invalid input",
            DisplayResult::Failed(_) => "LP Error",
        }
    }
}

impl OptimalReport {
    pub fn values(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.value).collect()
    }
}

impl fmt::Display for OptimalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimal solution:")?;
        for variable in &self.variables {
            writeln!(f, "{} = {}", variable.label, format_value(variable.value))?;
        }
        write!(
            f,
            "Optimal value of the objective function: {}",
            format_value(self.objective_value)
        )
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error.is_input_error() {
            write!(f, "Invalid input: {}", self.error)
        } else {
            write!(f, "Couldn't find an optimal solution: {}", self.error)
        }
    }
}

impl fmt::Display for DisplayResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayResult::Optimal(report) => report.fmt(f),
            DisplayResult::Failed(failure) => failure.fmt(f),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Failure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Failure", 2)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseError, Reason};

    #[test]
    fn test_maximize_flips_objective_back() {
        let outcome = SolveOutcome::Optimal {
            values: vec![2.0, 6.0],
            objective_value: -36.0,
        };
        let result = interpret(&outcome, Goal::Maximize);
        let report = result.report().unwrap();

        assert_eq!(report.objective_value, 36.0);
        assert_eq!(report.values(), vec![2.0, 6.0]);
        assert_eq!(report.variables[0].label, "x1");
        assert_eq!(report.variables[1].label, "x2");
        assert_eq!(
            result.to_string(),
            "Optimal solution:\nx1 = 2.0000\nx2 = 6.0000\nOptimal value of the objective function: 36.0000"
        );
    }

    #[test]
    fn test_minimize_passes_objective_through() {
        let outcome = SolveOutcome::Optimal {
            values: vec![5.0],
            objective_value: 5.0,
        };
        let result = interpret(&outcome, Goal::Minimize);
        assert_eq!(result.report().unwrap().objective_value, 5.0);
        assert_eq!(result.title(), "Solution Found");
    }

    #[test]
    fn test_failures_have_no_values() {
        let cases = [
            (SolveOutcome::Infeasible, Error::Infeasible),
            (SolveOutcome::Unbounded, Error::Unbounded),
            (
                SolveOutcome::SolverError {
                    message: "boom".to_string(),
                },
                Error::Solver {
                    message: "boom".to_string(),
                },
            ),
        ];
        for (outcome, expected) in cases {
            let result = interpret(&outcome, Goal::Maximize);
            assert!(result.report().is_none());
            assert_eq!(result.error(), Some(&expected));
            assert_eq!(result.title(), "LP Error");
            assert_eq!(result.to_string().lines().count(), 1);
            assert!(result.to_string().starts_with("Couldn't find an optimal solution"));
        }
    }

    #[test]
    fn test_input_failure_notice() {
        let result = DisplayResult::failed(ParseError::Constraint {
            row: 2,
            reason: Reason::MissingRelation,
        });
        assert_eq!(result.title(), "Invalid input");
        assert_eq!(
            result.to_string(),
            "Invalid input: constraint 3: missing relation, expected <=, >= or ="
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(2.0), "2.0000");
        assert_eq!(format_value(1.0 / 3.0), "0.3333");
        assert_eq!(format_value(-1.23456), "-1.2346");
        assert_eq!(format_value(-0.0), "0.0000");
        assert_eq!(format_value(-0.00001), "0.0000");
    }

    #[test]
    fn test_zero_objective_under_maximize() {
        let outcome = SolveOutcome::Optimal {
            values: vec![0.0],
            objective_value: 0.0,
        };
        let result = interpret(&outcome, Goal::Maximize);
        assert!(result.to_string().ends_with(": 0.0000"));

        let value = result.report().unwrap().objective_value;
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive(), "objective value is {:?}", value);
    }
}
