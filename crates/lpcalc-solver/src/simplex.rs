use log::{debug, trace, warn};

use crate::problem::{Rows, StandardForm};
use crate::solution::{SolverFailure, SolverStatus, Vertex};

/// Tunables for [`Solver`]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Maximum pivots across both phases
    pub max_iterations: usize,
    /// Magnitude below which a tableau entry counts as zero
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

/// Two-phase simplex solver for problems in [`StandardForm`]
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum iterations before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self::from_options(SolverOptions::default())
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: SolverOptions) -> Self {
        Self {
            max_iterations: options.max_iterations,
            tolerance: options.tolerance,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn options(&self) -> SolverOptions {
        SolverOptions {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }

    /// Minimize `costs . x` over the rows of `problem` with `x >= 0`.
    ///
    /// Entering and leaving variables follow Bland's rule, so the same input
    /// always walks the same sequence of vertices and the method cannot cycle.
    pub fn solve(&self, problem: &StandardForm) -> SolverStatus {
        if let Err(failure) = self.validate(problem) {
            return SolverStatus::Failed(failure);
        }

        let mut tableau = Tableau::build(problem);
        debug!(
            "simplex: {} variables, {} rows, {} slack, {} artificial",
            tableau.n_vars,
            tableau.n_constraints(),
            tableau.n_slack,
            tableau.n_artificial
        );

        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("simplex: infeasible after {} pivots", iterations);
                    return SolverStatus::Infeasible;
                }
                Err(failure) => return SolverStatus::Failed(failure),
            }
        }

        // Phase 2: Optimize
        match self.phase2(&mut tableau, &problem.costs, &mut iterations) {
            Ok(SimplexResult::Optimal) => {}
            Ok(SimplexResult::Unbounded) => {
                debug!("simplex: unbounded after {} pivots", iterations);
                return SolverStatus::Unbounded;
            }
            Err(failure) => return SolverStatus::Failed(failure),
        }

        debug!("simplex: optimal after {} pivots", iterations);
        SolverStatus::Optimal(self.extract_vertex(&tableau, &problem.costs))
    }

    fn validate(&self, problem: &StandardForm) -> Result<(), SolverFailure> {
        let n_vars = problem.num_variables();
        if n_vars == 0 {
            return Err(SolverFailure::NoVariables);
        }
        if problem.costs.iter().any(|c| !c.is_finite()) {
            return Err(SolverFailure::NonFinite("objective".to_string()));
        }

        for (block, rows) in [("inequality", &problem.le), ("equality", &problem.eq)] {
            let Some(rows) = rows else {
                continue;
            };
            if rows.rhs.len() != rows.matrix.len() {
                return Err(SolverFailure::RhsLength {
                    block: block.to_string(),
                    rows: rows.matrix.len(),
                    rhs: rows.rhs.len(),
                });
            }
            for (i, row) in rows.matrix.iter().enumerate() {
                if row.len() != n_vars {
                    return Err(SolverFailure::RowLength {
                        block: block.to_string(),
                        row: i,
                        expected: n_vars,
                        found: row.len(),
                    });
                }
                if row.iter().any(|a| !a.is_finite()) {
                    return Err(SolverFailure::NonFinite(format!("{} row {}", block, i)));
                }
            }
            if rows.rhs.iter().any(|b| !b.is_finite()) {
                return Err(SolverFailure::NonFinite(format!("{} right-hand side", block)));
            }
        }

        Ok(())
    }

    /// Returns `Ok(false)` when the artificials cannot all reach zero.
    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> Result<bool, SolverFailure> {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let rhs_col = n_cols - 1;
        let art_start = tableau.artificial_start();

        // Minimize the sum of artificials, priced out against the starting basis
        let mut objective = vec![0.0; n_cols];
        for cost in &mut objective[art_start..rhs_col] {
            *cost = 1.0;
        }
        for i in 0..tableau.n_constraints() {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    objective[j] -= tableau.data[i][j];
                }
            }
        }
        tableau.data[obj_row] = objective;

        if self.optimize(tableau, rhs_col, iterations)? == SimplexResult::Unbounded {
            return Err(SolverFailure::NumericalBreakdown(
                "phase 1 objective decreased below zero".to_string(),
            ));
        }

        // Absolute bound: a residual must not be excused by large right-hand sides
        let residual = -tableau.data[obj_row][rhs_col];
        if residual > self.feasibility_tolerance() {
            return Ok(false);
        }

        self.drive_out_artificials(tableau)
    }

    /// Largest phase-1 residual still treated as rounding noise.
    fn feasibility_tolerance(&self) -> f64 {
        self.tolerance * 1e3
    }

    /// Replace artificials left in the basis at zero level; rows that have no
    /// non-artificial entry to pivot on are linear combinations of the others
    /// and are dropped. Returns `Ok(false)` if a basic artificial still
    /// carries a positive value.
    fn drive_out_artificials(&self, tableau: &mut Tableau) -> Result<bool, SolverFailure> {
        let art_start = tableau.artificial_start();
        let rhs_col = tableau.n_cols() - 1;
        let mut i = 0;
        while i < tableau.n_constraints() {
            if tableau.basic_vars[i] < art_start {
                i += 1;
                continue;
            }
            if tableau.data[i][rhs_col].abs() > self.feasibility_tolerance() {
                debug!(
                    "simplex: artificial in row {} left at {}",
                    i, tableau.data[i][rhs_col]
                );
                return Ok(false);
            }
            let replacement = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance);
            match replacement {
                Some(col) => {
                    self.pivot(tableau, i, col)?;
                    i += 1;
                }
                None => {
                    debug!("simplex: dropping redundant row {}", i);
                    tableau.data.remove(i);
                    tableau.basic_vars.remove(i);
                }
            }
        }
        Ok(true)
    }

    fn phase2(
        &self,
        tableau: &mut Tableau,
        costs: &[f64],
        iterations: &mut usize,
    ) -> Result<SimplexResult, SolverFailure> {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();

        let mut objective = vec![0.0; n_cols];
        objective[..costs.len()].copy_from_slice(costs);
        for i in 0..tableau.n_constraints() {
            let basic = tableau.basic_vars[i];
            let cost = if basic < costs.len() { costs[basic] } else { 0.0 };
            if cost != 0.0 {
                for j in 0..n_cols {
                    objective[j] -= cost * tableau.data[i][j];
                }
            }
        }
        tableau.data[obj_row] = objective;

        // Artificial columns never re-enter
        let limit = tableau.artificial_start();
        self.optimize(tableau, limit, iterations)
    }

    fn optimize(
        &self,
        tableau: &mut Tableau,
        limit: usize,
        iterations: &mut usize,
    ) -> Result<SimplexResult, SolverFailure> {
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, limit) else {
                return Ok(SimplexResult::Optimal);
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return Ok(SimplexResult::Unbounded);
            };
            if *iterations >= self.max_iterations {
                warn!("simplex: iteration limit of {} reached", self.max_iterations);
                return Err(SolverFailure::IterationLimit(self.max_iterations));
            }
            *iterations += 1;
            trace!(
                "simplex: pivot {} on row {}, column {}",
                iterations,
                pivot_row,
                pivot_col
            );
            self.pivot(tableau, pivot_row, pivot_col)?;
        }
    }

    /// Smallest column below `limit` with a negative reduced cost.
    fn find_pivot_column(&self, tableau: &Tableau, limit: usize) -> Option<usize> {
        let obj_row = tableau.obj_row();
        (0..limit).find(|&j| tableau.data[obj_row][j] < -self.tolerance)
    }

    /// Minimum ratio test; ties go to the row whose basic variable has the
    /// smallest index.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.n_cols() - 1;
        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.n_constraints() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col] / val;
            let replace = match best {
                None => true,
                Some((row, min_ratio)) => {
                    ratio < min_ratio - self.tolerance
                        || (ratio <= min_ratio + self.tolerance
                            && tableau.basic_vars[i] < tableau.basic_vars[row])
                }
            };
            if replace {
                best = Some((i, ratio));
            }
        }

        best.map(|(row, _)| row)
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) -> Result<(), SolverFailure> {
        let n_cols = tableau.n_cols();
        let rhs_col = n_cols - 1;

        let pivot_val = tableau.data[row][col];
        if !pivot_val.is_finite() || pivot_val.abs() <= self.tolerance {
            return Err(SolverFailure::NumericalBreakdown(format!(
                "pivot element {} at row {}, column {}",
                pivot_val, row, col
            )));
        }

        // Update basic variable
        tableau.basic_vars[row] = col;

        // Scale pivot row
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }
        let pivot_row = tableau.data[row].clone();

        // Eliminate column in other rows
        for (i, other) in tableau.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n_cols {
                other[j] -= factor * pivot_row[j];
            }
        }

        if tableau.data.iter().any(|r| !r[rhs_col].is_finite()) {
            return Err(SolverFailure::NumericalBreakdown(
                "non-finite right-hand side after pivot".to_string(),
            ));
        }
        Ok(())
    }

    fn extract_vertex(&self, tableau: &Tableau, costs: &[f64]) -> Vertex {
        let rhs_col = tableau.n_cols() - 1;

        // Extract variable values
        let mut values = vec![0.0; tableau.n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < tableau.n_vars {
                values[basic] = tableau.data[i][rhs_col];
            }
        }
        for value in &mut values {
            if value.abs() <= self.tolerance {
                *value = 0.0;
            }
        }

        let mut objective_value: f64 = costs.iter().zip(&values).map(|(c, x)| c * x).sum();
        if objective_value.abs() <= self.tolerance {
            objective_value = 0.0;
        }

        Vertex {
            values,
            objective_value,
        }
    }
}

/// Dense simplex tableau. Constraint rows come first and the objective row is
/// last; the last column holds the right-hand side. Columns are ordered as
/// structural variables, one slack per inequality row, then artificials.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn build(problem: &StandardForm) -> Self {
        let n_vars = problem.num_variables();
        let le = problem.le.as_ref();
        let eq = problem.eq.as_ref();

        // Count slack and artificial variables needed
        let n_slack = le.map_or(0, Rows::len);
        let n_artificial = le.map_or(0, |rows| rows.rhs.iter().filter(|&&b| b < 0.0).count())
            + eq.map_or(0, Rows::len);
        let n_constraints = n_slack + eq.map_or(0, Rows::len);

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let rhs_col = total_cols - 1;

        let mut data = vec![vec![0.0; total_cols]; n_constraints + 1];
        let mut basic_vars = vec![0; n_constraints];
        let mut artificial_idx = n_vars + n_slack;

        let le_rows = le
            .into_iter()
            .flat_map(|rows| rows.matrix.iter().zip(&rows.rhs))
            .map(|(row, &rhs)| (row, rhs, true));
        let eq_rows = eq
            .into_iter()
            .flat_map(|rows| rows.matrix.iter().zip(&rows.rhs))
            .map(|(row, &rhs)| (row, rhs, false));

        for (i, (coefficients, rhs, is_le)) in le_rows.chain(eq_rows).enumerate() {
            // Keep every RHS non-negative so the starting basis is feasible
            let sign = if rhs < 0.0 { -1.0 } else { 1.0 };
            for (j, &coef) in coefficients.iter().enumerate() {
                data[i][j] = sign * coef;
            }
            data[i][rhs_col] = sign * rhs;

            if is_le {
                // Inequality rows come first, so row i owns slack column n_vars + i
                data[i][n_vars + i] = sign;
                if sign > 0.0 {
                    basic_vars[i] = n_vars + i;
                    continue;
                }
            }
            data[i][artificial_idx] = 1.0;
            basic_vars[i] = artificial_idx;
            artificial_idx += 1;
        }

        Self {
            data,
            basic_vars,
            n_vars,
            n_slack,
            n_artificial,
        }
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn n_constraints(&self) -> usize {
        self.data.len() - 1
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn artificial_start(&self) -> usize {
        self.n_vars + self.n_slack
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SimplexResult {
    Optimal,
    Unbounded,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> Option<Rows> {
        Some(Rows::new(matrix, rhs))
    }

    fn expect_vertex(status: &SolverStatus) -> &Vertex {
        match status {
            SolverStatus::Optimal(vertex) => vertex,
            other => panic!("Expected optimal, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y, i.e. minimize -3x - 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=-11
        let problem = StandardForm::new(vec![-3.0, -2.0]).with_le(rows(
            vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![4.0, 3.0, 3.0],
        ));

        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);

        assert!((vertex.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", vertex.values[0]);
        assert!((vertex.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", vertex.values[1]);
        assert!(
            (vertex.objective_value + 11.0).abs() < 1e-6,
            "obj = {} (expected -11)",
            vertex.objective_value
        );
    }

    #[test]
    fn test_minimization_with_negative_rhs() {
        // Minimize: 2x + 3y
        // Subject to:
        //   -x - y <= -4   (x + y >= 4)
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let problem = StandardForm::new(vec![2.0, 3.0]).with_le(rows(
            vec![vec![-1.0, -1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![-4.0, 3.0, 3.0],
        ));

        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);

        assert!((vertex.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", vertex.values[0]);
        assert!((vertex.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", vertex.values[1]);
        assert!(
            (vertex.objective_value - 9.0).abs() < 1e-6,
            "obj = {} (expected 9)",
            vertex.objective_value
        );
    }

    #[test]
    fn test_infeasible() {
        // x <= 3
        // x >= 5, written as -x <= -5
        let problem = StandardForm::new(vec![1.0])
            .with_le(rows(vec![vec![1.0], vec![-1.0]], vec![3.0, -5.0]));

        assert_eq!(Solver::new().solve(&problem), SolverStatus::Infeasible);
    }

    #[test]
    fn test_infeasible_with_large_rhs() {
        // x <= 1e9 and x >= 1e9 + 100 miss each other by 100
        let problem = StandardForm::new(vec![1.0]).with_le(rows(
            vec![vec![1.0], vec![-1.0]],
            vec![1e9, -(1e9 + 100.0)],
        ));

        assert_eq!(Solver::new().solve(&problem), SolverStatus::Infeasible);
    }

    #[test]
    fn test_feasible_with_large_rhs() {
        // 1e9 <= x <= 1e9 + 100, minimize x
        let problem = StandardForm::new(vec![1.0]).with_le(rows(
            vec![vec![1.0], vec![-1.0]],
            vec![1e9 + 100.0, -1e9],
        ));

        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);
        assert!((vertex.values[0] - 1e9).abs() < 1e-3, "x = {}", vertex.values[0]);
    }

    #[test]
    fn test_infeasible_by_a_small_margin() {
        // x = 1e6 and x >= 1e6 + 1e-3
        let problem = StandardForm::new(vec![1.0])
            .with_le(rows(vec![vec![-1.0]], vec![-(1e6 + 1e-3)]))
            .with_eq(rows(vec![vec![1.0]], vec![1e6]));

        assert_eq!(Solver::new().solve(&problem), SolverStatus::Infeasible);
    }

    #[test]
    fn test_unbounded_without_rows() {
        let problem = StandardForm::new(vec![-1.0]);
        assert_eq!(Solver::new().solve(&problem), SolverStatus::Unbounded);
    }

    #[test]
    fn test_zero_costs_without_rows() {
        let problem = StandardForm::new(vec![0.0, 0.0]);
        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);
        assert_eq!(vertex.values, vec![0.0, 0.0]);
        assert_eq!(vertex.objective_value, 0.0);
    }

    #[test]
    fn test_equality_rows() {
        // Minimize: x + 2y
        // Subject to:
        //   x + y = 3
        //   x <= 2
        // Optimal: x=2, y=1, obj=4
        let problem = StandardForm::new(vec![1.0, 2.0])
            .with_le(rows(vec![vec![1.0, 0.0]], vec![2.0]))
            .with_eq(rows(vec![vec![1.0, 1.0]], vec![3.0]));

        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);

        assert!((vertex.values[0] - 2.0).abs() < 1e-6);
        assert!((vertex.values[1] - 1.0).abs() < 1e-6);
        assert!((vertex.objective_value - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_redundant_equality_rows() {
        // x + y = 2 and 2x + 2y = 4 describe the same line
        let problem = StandardForm::new(vec![1.0, -1.0]).with_eq(rows(
            vec![vec![1.0, 1.0], vec![2.0, 2.0]],
            vec![2.0, 4.0],
        ));

        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);

        assert!(vertex.values[0].abs() < 1e-6);
        assert!((vertex.values[1] - 2.0).abs() < 1e-6);
        assert!((vertex.objective_value + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_inconsistent_equalities() {
        let problem = StandardForm::new(vec![1.0, 1.0]).with_eq(rows(
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            vec![2.0, 3.0],
        ));
        assert_eq!(Solver::new().solve(&problem), SolverStatus::Infeasible);
    }

    #[test]
    fn test_negative_equality_rhs() {
        // -x = -4 forces x = 4
        let problem = StandardForm::new(vec![1.0]).with_eq(rows(vec![vec![-1.0]], vec![-4.0]));
        let status = Solver::new().solve(&problem);
        let vertex = expect_vertex(&status);
        assert!((vertex.values[0] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_row_length_mismatch() {
        let problem = StandardForm::new(vec![1.0, 1.0])
            .with_le(rows(vec![vec![1.0, 1.0], vec![1.0]], vec![1.0, 1.0]));

        match Solver::new().solve(&problem) {
            SolverStatus::Failed(SolverFailure::RowLength { row, expected, found, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected row length failure, got {:?}", other),
        }
    }

    #[test]
    fn test_rhs_length_mismatch() {
        let problem = StandardForm::new(vec![1.0]).with_eq(rows(vec![vec![1.0]], vec![]));
        assert!(matches!(
            Solver::new().solve(&problem),
            SolverStatus::Failed(SolverFailure::RhsLength { rows: 1, rhs: 0, .. })
        ));
    }

    #[test]
    fn test_non_finite_input() {
        let problem = StandardForm::new(vec![f64::NAN]);
        assert!(matches!(
            Solver::new().solve(&problem),
            SolverStatus::Failed(SolverFailure::NonFinite(_))
        ));
    }

    #[test]
    fn test_no_variables() {
        let problem = StandardForm::new(Vec::new());
        assert_eq!(
            Solver::new().solve(&problem),
            SolverStatus::Failed(SolverFailure::NoVariables)
        );
    }

    #[test]
    fn test_iteration_limit() {
        let problem = StandardForm::new(vec![-3.0, -2.0])
            .with_le(rows(vec![vec![1.0, 1.0]], vec![4.0]));

        let status = Solver::new().with_max_iterations(0).solve(&problem);
        assert_eq!(status, SolverStatus::Failed(SolverFailure::IterationLimit(0)));
    }

    #[test]
    fn test_options_round_trip() {
        let solver = Solver::new().with_tolerance(1e-7).with_max_iterations(50);
        let options = solver.options();
        assert_eq!(options.max_iterations, 50);
        assert_eq!(options.tolerance, 1e-7);
        assert_eq!(Solver::from_options(options).options(), options);
    }
}
