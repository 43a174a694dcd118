use crate::dense::{csc_to_mat, Mat};
use crate::traits::LinearSolver;
use sparsetools::csc::CSC;

/// Dense LU decomposition with partial pivoting.
///
/// Factorizes once per call to `solve_n`, which suits inverting small
/// to medium susceptance matrices. A pivot smaller than `tol` times the
/// largest absolute matrix entry is treated as singular.
#[derive(Clone, Debug)]
pub struct DenseLU {
    pub tol: f64,
}

impl Default for DenseLU {
    fn default() -> Self {
        Self { tol: 1e-12 }
    }
}

struct Factors {
    lu: Mat<f64>,
    perm: Vec<usize>,
}

impl DenseLU {
    fn factor(&self, a_mat: &CSC<usize, f64>) -> Result<Factors, String> {
        if a_mat.rows() != a_mat.cols() {
            return Err(format!(
                "matrix must be square: {} x {}",
                a_mat.rows(),
                a_mat.cols()
            ));
        }
        let n = a_mat.rows();
        let mut lu = csc_to_mat(a_mat);
        let mut perm: Vec<usize> = (0..n).collect();

        let scale = lu.values().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let threshold = self.tol * scale.max(f64::MIN_POSITIVE);

        for k in 0..n {
            let (p, pivot) = (k..n)
                .map(|i| (i, lu.get(i, k).abs()))
                .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
            if pivot <= threshold {
                return Err(format!("matrix is singular: pivot {} at column {}", pivot, k));
            }
            if p != k {
                for j in 0..n {
                    let tmp = lu.get(k, j);
                    lu.set(k, j, lu.get(p, j));
                    lu.set(p, j, tmp);
                }
                perm.swap(k, p);
            }
            let d = lu.get(k, k);
            for i in k + 1..n {
                let l_ik = lu.get(i, k) / d;
                lu.set(i, k, l_ik);
                if l_ik == 0.0 {
                    continue;
                }
                for j in k + 1..n {
                    lu.add(i, j, -l_ik * lu.get(k, j));
                }
            }
        }
        Ok(Factors { lu, perm })
    }
}

impl Factors {
    fn solve(&self, b: &mut [f64]) {
        let n = self.perm.len();
        let mut x: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();

        // forward substitution with unit lower triangle
        for i in 0..n {
            let row = self.lu.row(i);
            let s: f64 = (0..i).map(|j| row[j] * x[j]).sum();
            x[i] -= s;
        }
        // back substitution
        for i in (0..n).rev() {
            let row = self.lu.row(i);
            let s: f64 = (i + 1..n).map(|j| row[j] * x[j]).sum();
            x[i] = (x[i] - s) / row[i];
        }
        b.copy_from_slice(&x);
    }
}

impl LinearSolver for DenseLU {
    fn solve(&self, a_mat: &CSC<usize, f64>, b: &mut [f64]) -> Result<(), String> {
        self.factor(a_mat)?.solve(b);
        Ok(())
    }

    fn solve_n(&self, a_mat: &CSC<usize, f64>, b: &mut Mat<f64>) -> Result<(), String> {
        let factors = self.factor(a_mat)?;
        let mut bt = b.transpose();
        for k in 0..bt.rows() {
            factors.solve(bt.row_mut(k));
        }
        *b = bt.transpose();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparsetools::coo::Coo;

    fn csc(rows: usize, entries: &[(usize, usize, f64)]) -> CSC<usize, f64> {
        let mut a = Coo::with_size(rows, rows);
        for &(i, j, v) in entries {
            a.push(i, j, v);
        }
        a.to_csr().to_csc()
    }

    #[test]
    fn test_solve() {
        // needs a row swap at the first column
        let a = csc(2, &[(0, 1, 2.0), (1, 0, 4.0), (1, 1, 1.0)]);
        let mut b = vec![4.0, 6.0];

        DenseLU::default().solve(&a, &mut b).unwrap();

        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!((b[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_n_inverse() {
        let a = csc(2, &[(0, 0, 4.0), (0, 1, 1.0), (1, 0, 2.0), (1, 1, 3.0)]);
        let mut x = Mat::identity(2);

        DenseLU::default().solve_n(&a, &mut x).unwrap();

        let prod = csc_to_mat(&a).mat_mat(&x);
        for i in 0..2 {
            for j in 0..2 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((prod.get(i, j) - expect).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_singular() {
        let a = csc(2, &[(0, 0, 1.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 1.0)]);
        let mut b = vec![1.0, 0.0];
        assert!(DenseLU::default().solve(&a, &mut b).is_err());
    }
}
