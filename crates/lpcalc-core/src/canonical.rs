use log::debug;

use crate::model::{Goal, Problem, Relation};

/// Rows of one relation kind, `matrix * x (op) rhs`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Inequality,
    Equality,
}

/// Where a canonical row came from
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOrigin {
    pub block: BlockKind,
    /// Row index inside `block`
    pub row: usize,
    /// Index of the constraint in the problem
    pub constraint: usize,
    /// Whether the row was multiplied by -1 (a `>=` constraint)
    pub negated: bool,
}

/// A problem rewritten as: minimize `costs . x` subject to the inequality
/// block (`<=`), the equality block (`=`) and `x >= 0`.
///
/// A block with no rows is `None`. Nonnegativity is left to the solver's
/// domain and never appears as a row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalForm {
    pub costs: Vec<f64>,
    pub inequalities: Option<Block>,
    pub equalities: Option<Block>,
    origins: Vec<RowOrigin>,
}

impl Block {
    fn from_rows(rows: Vec<(Vec<f64>, f64)>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let (matrix, rhs) = rows.into_iter().unzip();
        Some(Self { matrix, rhs })
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

impl CanonicalForm {
    pub fn num_variables(&self) -> usize {
        self.costs.len()
    }

    /// One entry per canonical row: inequality rows first, then equality rows.
    pub fn row_origins(&self) -> &[RowOrigin] {
        &self.origins
    }
}

/// Rewrite `problem` into minimization form with `>=` rows flipped to `<=`.
///
/// Row order within each block follows the order of the constraints.
pub fn canonicalize(problem: &Problem) -> CanonicalForm {
    let objective = problem.objective();
    let costs = match objective.goal {
        Goal::Minimize => objective.coefficients.clone(),
        Goal::Maximize => objective.coefficients.iter().map(|c| -c).collect(),
    };

    let mut inequality_rows = Vec::new();
    let mut equality_rows = Vec::new();
    let mut inequality_origins = Vec::new();
    let mut equality_origins = Vec::new();

    for (index, constraint) in problem.constraints().iter().enumerate() {
        match constraint.relation {
            Relation::LessEq => {
                inequality_origins.push(RowOrigin {
                    block: BlockKind::Inequality,
                    row: inequality_rows.len(),
                    constraint: index,
                    negated: false,
                });
                inequality_rows.push((constraint.lhs.clone(), constraint.rhs));
            }
            Relation::GreaterEq => {
                inequality_origins.push(RowOrigin {
                    block: BlockKind::Inequality,
                    row: inequality_rows.len(),
                    constraint: index,
                    negated: true,
                });
                let lhs = constraint.lhs.iter().map(|a| -a).collect();
                inequality_rows.push((lhs, -constraint.rhs));
            }
            Relation::Equal => {
                equality_origins.push(RowOrigin {
                    block: BlockKind::Equality,
                    row: equality_rows.len(),
                    constraint: index,
                    negated: false,
                });
                equality_rows.push((constraint.lhs.clone(), constraint.rhs));
            }
        }
    }

    debug!(
        "canonical form: {} costs, {} inequality rows, {} equality rows",
        costs.len(),
        inequality_rows.len(),
        equality_rows.len()
    );

    let mut origins = inequality_origins;
    origins.extend(equality_origins);

    CanonicalForm {
        costs,
        inequalities: Block::from_rows(inequality_rows),
        equalities: Block::from_rows(equality_rows),
        origins,
    }
}
