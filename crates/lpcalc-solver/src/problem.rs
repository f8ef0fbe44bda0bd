/// A block of linear rows `matrix * x (op) rhs`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    /// One coefficient vector per row
    pub matrix: Vec<Vec<f64>>,
    /// Right-hand side for each row
    pub rhs: Vec<f64>,
}

/// A linear program in the shape the simplex expects:
///
/// ```text
/// minimize    costs . x
/// subject to  A_le x <= b_le
///             A_eq x  = b_eq
///             x >= 0
/// ```
///
/// A missing block means "no rows of that kind"; it is never an empty matrix.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StandardForm {
    /// Minimization costs, one per variable
    pub costs: Vec<f64>,
    /// Inequality rows (`<=`)
    pub le: Option<Rows>,
    /// Equality rows (`=`)
    pub eq: Option<Rows>,
}

impl Rows {
    pub fn new(matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> Self {
        Self { matrix, rhs }
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

impl StandardForm {
    pub fn new(costs: Vec<f64>) -> Self {
        Self {
            costs,
            le: None,
            eq: None,
        }
    }

    pub fn with_le(mut self, rows: Option<Rows>) -> Self {
        self.le = rows;
        self
    }

    pub fn with_eq(mut self, rows: Option<Rows>) -> Self {
        self.eq = rows;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.costs.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.le.as_ref().map_or(0, Rows::len) + self.eq.as_ref().map_or(0, Rows::len)
    }
}
