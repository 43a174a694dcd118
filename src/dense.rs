use num_traits::{One, Zero};
use sparsetools::csc::CSC;
use sparsetools::csr::CSR;
use std::ops::{AddAssign, Mul};

/// Dense matrix with element values stored in row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mat<T> {
    rows: usize,
    cols: usize,
    values: Vec<T>,
}

impl<T> Mat<T>
where
    T: Copy + Zero,
{
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![T::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self
    where
        T: One,
    {
        let mut mat = Self::zeros(n, n);
        for i in 0..n {
            mat.set(i, i, T::one());
        }
        mat
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    #[inline]
    fn ix(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(row < self.rows);
        assert!(col < self.cols);
        self.values[self.ix(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: T) {
        assert!(row < self.rows);
        assert!(col < self.cols);
        let i = self.ix(row, col);
        self.values[i] = v
    }

    #[inline]
    pub fn add(&mut self, row: usize, col: usize, v: T)
    where
        T: AddAssign,
    {
        let i = self.ix(row, col);
        self.values[i] += v
    }

    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows);
        &self.values[self.ix(row, 0)..self.ix(row, 0) + self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.rows);
        let i = self.ix(row, 0);
        &mut self.values[i..i + self.cols]
    }

    pub fn col(&self, col: usize) -> impl Iterator<Item = T> + '_ {
        assert!(col < self.cols);
        (0..self.rows).map(move |row| self.get(row, col))
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    pub fn mat_mat(&self, b: &Self) -> Self
    where
        T: Mul<Output = T> + AddAssign,
    {
        assert_eq!(
            self.cols, b.rows,
            "rows of b {} must equal columns of a {}",
            b.rows, self.cols
        );

        let mut c = Self::zeros(self.rows, b.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a_ik = self.get(i, k);
                if a_ik.is_zero() {
                    continue;
                }
                for j in 0..b.cols {
                    c.add(i, j, a_ik * b.get(k, j));
                }
            }
        }
        c
    }
}

/// Expands a CSR matrix. Duplicate entries are summed.
pub fn csr_to_mat(a: &CSR<usize, f64>) -> Mat<f64> {
    let mut m = Mat::zeros(a.rows(), a.cols());
    let (rowptr, colidx, values) = (a.rowptr(), a.colidx(), a.values());
    for i in 0..a.rows() {
        for k in rowptr[i]..rowptr[i + 1] {
            m.add(i, colidx[k], values[k]);
        }
    }
    m
}

/// Expands a CSC matrix. Duplicate entries are summed.
pub fn csc_to_mat(a: &CSC<usize, f64>) -> Mat<f64> {
    let mut m = Mat::zeros(a.rows(), a.cols());
    let (colptr, rowidx, values) = (a.colptr(), a.rowidx(), a.values());
    for j in 0..a.cols() {
        for k in colptr[j]..colptr[j + 1] {
            m.add(rowidx[k], j, values[k]);
        }
    }
    m
}
