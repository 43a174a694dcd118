use crate::dense::Mat;
use sparsetools::csc::CSC;
use spsolve::rlu::RLU;
use spsolve::Solver;

pub trait LinearSolver {
    /// Solves `A x = b` for a square matrix, overwriting `b` with `x`.
    fn solve(&self, a_mat: &CSC<usize, f64>, b: &mut [f64]) -> Result<(), String>;

    /// Solves for each column of `b`, overwriting `b` with the solutions.
    fn solve_n(&self, a_mat: &CSC<usize, f64>, b: &mut Mat<f64>) -> Result<(), String> {
        // work column by column on the transpose so each rhs is contiguous
        let mut bt = b.transpose();
        for k in 0..bt.rows() {
            self.solve(a_mat, bt.row_mut(k))?;
        }
        *b = bt.transpose();
        Ok(())
    }
}

impl LinearSolver for RLU {
    fn solve(&self, a_mat: &CSC<usize, f64>, b: &mut [f64]) -> Result<(), String> {
        <RLU as Solver<usize, f64>>::solve(
            self,
            a_mat.cols(),
            a_mat.rowidx(),
            a_mat.colptr(),
            a_mat.values(),
            b,
            false,
        )
        .map_err(|err| err.to_string())
    }

    /// Factors once and solves all right-hand sides in a single call. The
    /// transpose of `b` holds the columns back to back.
    fn solve_n(&self, a_mat: &CSC<usize, f64>, b: &mut Mat<f64>) -> Result<(), String> {
        if b.rows() == 0 || b.cols() == 0 {
            return Ok(());
        }
        let mut bt = b.transpose();
        LinearSolver::solve(self, a_mat, bt.values_mut())?;
        *b = bt.transpose();
        Ok(())
    }
}
