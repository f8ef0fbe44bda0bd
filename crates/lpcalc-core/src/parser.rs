use std::fmt;

use log::debug;
use thiserror::Error;

use crate::lexer::{Lexer, Token, TokenKind};
use crate::model::{Constraint, Goal, Objective, Problem, Relation};

/// Which count a [`ParseError::Count`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountField {
    Variables,
    Constraints,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CountReason {
    #[error("must be a positive integer, got '{0}'")]
    NotPositive(String),
    #[error("is {declared} but {supplied} rows were supplied")]
    Mismatch { declared: usize, supplied: usize },
    #[error("is declared more than once")]
    Duplicate,
}

/// Why an objective or constraint was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Reason {
    /// Wrong number of values; for delimited lines the count includes the
    /// relation and right-hand side tokens
    #[error("expected {expected} values, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("'{0}' is not a finite number")]
    InvalidNumber(String),
    #[error("'{0}' is not a relation, expected <=, >= or =")]
    InvalidRelation(String),
    #[error("missing relation, expected <=, >= or =")]
    MissingRelation,
    #[error("empty value")]
    EmptyToken,
    /// `column` is the 1-based character position within the line
    #[error("unexpected '{text}' at column {column}")]
    UnexpectedToken { text: String, column: usize },
    #[error("missing")]
    Missing,
    #[error("given more than once")]
    Duplicate,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{field} {reason}")]
    Count { field: CountField, reason: CountReason },
    #[error("unknown goal '{0}', expected min or max")]
    Goal(String),
    #[error("objective: {reason}")]
    Objective { reason: Reason },
    /// `row` is 0-based; the message shows the 1-based row number
    #[error("constraint {}: {reason}", .row + 1)]
    Constraint { row: usize, reason: Reason },
}

/// One constraint row entered as separate fields
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRow {
    pub coefficients: Vec<String>,
    pub relation: String,
    pub rhs: String,
}

/// Input with one field per coefficient, as a form with entry boxes collects it
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldInput {
    pub variables: String,
    pub constraints: String,
    pub goal: String,
    pub objective: Vec<String>,
    pub rows: Vec<FieldRow>,
}

/// Input with the objective and each constraint on one delimited line
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineInput {
    pub variables: String,
    pub goal: String,
    pub objective: String,
    pub constraints: Vec<String>,
}

impl fmt::Display for CountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountField::Variables => write!(f, "number of variables"),
            CountField::Constraints => write!(f, "number of constraints"),
        }
    }
}

pub fn parse_count(field: CountField, text: &str) -> Result<usize, ParseError> {
    let trimmed = text.trim();
    match trimmed.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(ParseError::Count {
            field,
            reason: CountReason::NotPositive(trimmed.to_string()),
        }),
    }
}

pub fn parse_goal(text: &str) -> Result<Goal, ParseError> {
    text.parse().map_err(ParseError::Goal)
}

/// Parse the field-per-coefficient shape. Both counts must be positive and the
/// number of rows must match the declared constraint count.
pub fn parse_fields(input: &FieldInput) -> Result<Problem, ParseError> {
    let n = parse_count(CountField::Variables, &input.variables)?;
    let declared = parse_count(CountField::Constraints, &input.constraints)?;
    if input.rows.len() != declared {
        return Err(ParseError::Count {
            field: CountField::Constraints,
            reason: CountReason::Mismatch {
                declared,
                supplied: input.rows.len(),
            },
        });
    }
    let goal = parse_goal(&input.goal)?;

    let coefficients = parse_value_fields(&input.objective, n)
        .map_err(|reason| ParseError::Objective { reason })?;

    let mut constraints = Vec::with_capacity(input.rows.len());
    for (row, fields) in input.rows.iter().enumerate() {
        let constraint =
            parse_row_fields(fields, n).map_err(|reason| ParseError::Constraint { row, reason })?;
        constraints.push(constraint);
    }

    Ok(finish(Objective::new(goal, coefficients), constraints))
}

/// Parse the one-line-per-row shape. The constraint count is the number of
/// lines, so a problem without constraints is allowed here.
pub fn parse_lines(input: &LineInput) -> Result<Problem, ParseError> {
    let n = parse_count(CountField::Variables, &input.variables)?;
    let goal = parse_goal(&input.goal)?;

    let coefficients = parse_objective_line(&input.objective, n)
        .map_err(|reason| ParseError::Objective { reason })?;

    let mut constraints = Vec::with_capacity(input.constraints.len());
    for (row, line) in input.constraints.iter().enumerate() {
        let constraint = parse_constraint_line(line, n)
            .map_err(|reason| ParseError::Constraint { row, reason })?;
        constraints.push(constraint);
    }

    Ok(finish(Objective::new(goal, coefficients), constraints))
}

/// Parse a problem document:
///
/// ```text
/// # comment
/// variables 2
/// max: 3 5
/// 1 0 <= 4
/// 0, 2, <=, 12
/// 3 2<=18
/// ```
///
/// The `variables` line is optional; without it the number of variables is
/// the number of objective coefficients. Exactly one `min`/`max` line is
/// required. Every other non-blank line is a constraint.
pub fn parse_document(source: &str) -> Result<Problem, ParseError> {
    let mut variables: Option<String> = None;
    let mut objective: Option<(String, String)> = None;
    let mut constraints = Vec::new();

    for line in source.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let (head, rest) = split_directive(line);
        match head.to_ascii_lowercase().as_str() {
            "variables" | "vars" => {
                if variables.is_some() {
                    return Err(ParseError::Count {
                        field: CountField::Variables,
                        reason: CountReason::Duplicate,
                    });
                }
                variables = Some(rest.to_string());
            }
            "min" | "minimize" | "max" | "maximize" => {
                if objective.is_some() {
                    return Err(ParseError::Objective {
                        reason: Reason::Duplicate,
                    });
                }
                objective = Some((head.to_string(), rest.to_string()));
            }
            _ => constraints.push(line.to_string()),
        }
    }

    let Some((goal, objective)) = objective else {
        return Err(ParseError::Objective {
            reason: Reason::Missing,
        });
    };

    let variables = match variables {
        Some(variables) => variables,
        None => {
            let count = split_fields(&objective)
                .map_err(|reason| ParseError::Objective { reason })?
                .len();
            if count == 0 {
                return Err(ParseError::Objective {
                    reason: Reason::Missing,
                });
            }
            count.to_string()
        }
    };

    parse_lines(&LineInput {
        variables,
        goal,
        objective,
        constraints,
    })
}

fn finish(objective: Objective, constraints: Vec<Constraint>) -> Problem {
    debug!(
        "parsed problem: {} variables, {} constraints, {}",
        objective.coefficients.len(),
        constraints.len(),
        objective.goal
    );
    Problem::from_parts(objective, constraints)
}

/// Split a leading keyword off a document line: `max: 3 5` gives `("max", " 3 5")`.
/// Lines that do not start with a word give an empty head.
fn split_directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(line.len());
    let (head, rest) = line.split_at(end);
    match rest.chars().next() {
        None => (head, rest),
        Some(':') => (head, &rest[1..]),
        Some(c) if c.is_whitespace() => (head, rest),
        Some(_) => ("", line),
    }
}

/// Tokenize a delimited line, dropping separators. A separator with nothing
/// before it, nothing after it, or another separator next to it encloses an
/// empty value.
fn split_fields(line: &str) -> Result<Vec<Token>, Reason> {
    let mut fields = Vec::new();
    let mut previous: Option<TokenKind> = None;

    for token in Lexer::tokenize(line) {
        let kind = token.kind;
        match kind {
            TokenKind::Separator => {
                if matches!(previous, None | Some(TokenKind::Separator)) {
                    return Err(Reason::EmptyToken);
                }
            }
            TokenKind::Eof => {
                if previous == Some(TokenKind::Separator) {
                    return Err(Reason::EmptyToken);
                }
                break;
            }
            TokenKind::Literal | TokenKind::Relation => fields.push(token),
        }
        previous = Some(kind);
    }

    Ok(fields)
}

fn unexpected(line: &str, token: &Token) -> Reason {
    Reason::UnexpectedToken {
        text: token.text.clone(),
        column: line[..token.span.start].chars().count() + 1,
    }
}

fn parse_number(text: &str) -> Result<f64, Reason> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Reason::EmptyToken);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Reason::InvalidNumber(trimmed.to_string())),
    }
}

fn parse_relation(text: &str) -> Result<Relation, Reason> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Reason::EmptyToken);
    }
    trimmed.parse().map_err(Reason::InvalidRelation)
}

fn parse_objective_line(line: &str, n: usize) -> Result<Vec<f64>, Reason> {
    let fields = split_fields(line)?;
    if let Some(relation) = fields.iter().find(|t| t.kind == TokenKind::Relation) {
        return Err(unexpected(line, relation));
    }
    if fields.len() != n {
        return Err(Reason::Arity {
            expected: n,
            found: fields.len(),
        });
    }
    fields.iter().map(|t| parse_number(&t.text)).collect()
}

/// Expects `n` coefficients, one relation and one right-hand side.
fn parse_constraint_line(line: &str, n: usize) -> Result<Constraint, Reason> {
    let fields = split_fields(line)?;
    let expected = n + 2;

    let mut relations = fields
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::Relation);
    let relation_at = match (relations.next(), relations.next()) {
        (Some((i, _)), None) => i,
        (Some(_), Some((_, extra))) => return Err(unexpected(line, extra)),
        (None, _) => {
            // Something sits where the relation belongs but is not one
            if fields.len() == expected {
                return Err(Reason::InvalidRelation(fields[n].text.clone()));
            }
            if fields.len() == n + 1 {
                return Err(Reason::MissingRelation);
            }
            return Err(Reason::Arity {
                expected,
                found: fields.len(),
            });
        }
    };

    if fields.len() != expected {
        return Err(Reason::Arity {
            expected,
            found: fields.len(),
        });
    }
    if relation_at != n {
        return Err(unexpected(line, &fields[relation_at]));
    }

    let lhs = fields[..n]
        .iter()
        .map(|t| parse_number(&t.text))
        .collect::<Result<Vec<_>, _>>()?;
    let relation = parse_relation(&fields[n].text)?;
    let rhs = parse_number(&fields[n + 1].text)?;

    Ok(Constraint::new(lhs, relation, rhs))
}

fn parse_value_fields(fields: &[String], n: usize) -> Result<Vec<f64>, Reason> {
    if fields.len() != n {
        return Err(Reason::Arity {
            expected: n,
            found: fields.len(),
        });
    }
    fields.iter().map(|field| parse_number(field)).collect()
}

fn parse_row_fields(row: &FieldRow, n: usize) -> Result<Constraint, Reason> {
    let lhs = parse_value_fields(&row.coefficients, n)?;
    let relation = parse_relation(&row.relation)?;
    let rhs = parse_number(&row.rhs)?;
    Ok(Constraint::new(lhs, relation, rhs))
}
