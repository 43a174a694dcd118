use crate::case::Branch;
use crate::error::{Error, Result};
use crate::order::BusOrder;
use sparsetools::coo::Coo;
use sparsetools::csr::CSR;
use std::collections::BTreeMap;

/// Branch-bus connection matrix. Row `i` holds `+1` at the from bus and
/// `-1` at the to bus of branch `i`.
pub struct IncidenceMatrix {
    /// Column labels, ascending bus numbers.
    pub buses: Vec<usize>,
    pub matrix: CSR<usize, f64>,
}

/// Bus susceptance matrix, rows and columns labeled by bus number.
pub struct SusceptanceMatrix {
    pub buses: Vec<usize>,
    pub matrix: CSR<usize, f64>,
}

/// Non-zero entries of row `i`.
pub(crate) fn row_entries(
    a: &CSR<usize, f64>,
    i: usize,
) -> impl Iterator<Item = (usize, f64)> + '_ {
    let (start, end) = (a.rowptr()[i], a.rowptr()[i + 1]);
    a.colidx()[start..end]
        .iter()
        .copied()
        .zip(a.values()[start..end].iter().copied())
}

// Absent entries are +0.0.
fn get(a: &CSR<usize, f64>, i: usize, j: usize) -> f64 {
    row_entries(a, i)
        .filter(|&(c, _)| c == j)
        .fold(0.0, |s, (_, v)| s + v)
}

fn label(buses: &[usize], bus: usize) -> Option<usize> {
    buses.binary_search(&bus).ok()
}

fn without(n: usize, skip: usize) -> Vec<usize> {
    (0..n).filter(|&i| i != skip).collect()
}

fn bus_index(order: &BusOrder, bus: usize) -> Result<usize> {
    order
        .index(bus)
        .ok_or_else(|| Error::Matrix(format!("bus {} is missing from the bus order", bus)))
}

// Entries are accumulated before conversion so that the CSR matrix holds
// one summed value per position.
fn assemble(rows: usize, cols: usize, entries: BTreeMap<(usize, usize), f64>) -> CSR<usize, f64> {
    let mut coo = Coo::with_size(rows, cols);
    for ((i, j), v) in entries {
        coo.push(i, j, v);
    }
    coo.to_csr()
}

/// Builds the signed incidence matrix, one row per branch and one column
/// per bus in `order`.
pub fn make_cft(branch: &[Branch], order: &BusOrder) -> Result<IncidenceMatrix> {
    let mut c_ft = BTreeMap::new();
    for (i, br) in branch.iter().enumerate() {
        let (f, t) = (bus_index(order, br.from_bus)?, bus_index(order, br.to_bus)?);
        *c_ft.entry((i, f)).or_insert(0.0) += 1.0;
        *c_ft.entry((i, t)).or_insert(0.0) -= 1.0;
    }
    Ok(IncidenceMatrix {
        buses: order.i2e.clone(),
        matrix: assemble(branch.len(), order.len(), c_ft),
    })
}

/// Builds the bus susceptance matrix.
///
/// Every branch adds its susceptance to the diagonal entries of both of
/// its buses and subtracts it from the two cross entries, so branches
/// between the same pair of buses accumulate.
pub fn make_bbus(branch: &[Branch], order: &BusOrder) -> Result<SusceptanceMatrix> {
    let mut b_bus = BTreeMap::new();
    for br in branch {
        let (f, t) = (bus_index(order, br.from_bus)?, bus_index(order, br.to_bus)?);
        let b = br.sus;

        *b_bus.entry((f, f)).or_insert(0.0) += b;
        *b_bus.entry((t, t)).or_insert(0.0) += b;
        *b_bus.entry((f, t)).or_insert(0.0) -= b;
        *b_bus.entry((t, f)).or_insert(0.0) -= b;
    }
    let nb = order.len();
    Ok(SusceptanceMatrix {
        buses: order.i2e.clone(),
        matrix: assemble(nb, nb, b_bus),
    })
}

impl IncidenceMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.matrix.rows(), self.matrix.cols())
    }

    /// Entry for branch row `row` and bus number `bus`.
    pub fn get(&self, row: usize, bus: usize) -> Option<f64> {
        let j = label(&self.buses, bus)?;
        if row >= self.matrix.rows() {
            return None;
        }
        Some(get(&self.matrix, row, j))
    }

    /// Drops the column at internal index `ref_idx`.
    pub fn reduce(&self, ref_idx: usize) -> Result<IncidenceMatrix> {
        let keep = without(self.buses.len(), ref_idx);
        let matrix = self
            .matrix
            .select(None, Some(&keep))
            .map_err(|err| Error::Matrix(err.to_string()))?;
        Ok(IncidenceMatrix {
            buses: keep.iter().map(|&i| self.buses[i]).collect(),
            matrix,
        })
    }
}

impl SusceptanceMatrix {
    pub fn dim(&self) -> usize {
        self.buses.len()
    }

    /// Entry for bus numbers `bus_i` and `bus_j`.
    pub fn get(&self, bus_i: usize, bus_j: usize) -> Option<f64> {
        let (i, j) = (label(&self.buses, bus_i)?, label(&self.buses, bus_j)?);
        Some(get(&self.matrix, i, j))
    }

    pub fn row_sum(&self, bus: usize) -> Option<f64> {
        let i = label(&self.buses, bus)?;
        Some(row_entries(&self.matrix, i).fold(0.0, |s, (_, v)| s + v))
    }

    /// Drops the row and column at internal index `ref_idx`.
    pub fn reduce(&self, ref_idx: usize) -> Result<SusceptanceMatrix> {
        let keep = without(self.buses.len(), ref_idx);
        let matrix = self
            .matrix
            .select(Some(&keep), Some(&keep))
            .map_err(|err| Error::Matrix(err.to_string()))?;
        Ok(SusceptanceMatrix {
            buses: keep.iter().map(|&i| self.buses[i]).collect(),
            matrix,
        })
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.dim();
        (0..n).all(|i| {
            row_entries(&self.matrix, i)
                .all(|(j, _)| (get(&self.matrix, i, j) - get(&self.matrix, j, i)).abs() <= tol)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::BranchClass;

    fn branch(from_bus: usize, to_bus: usize, sus: f64) -> Branch {
        Branch {
            from_bus,
            to_bus,
            class: BranchClass::Line,
            status: "In-Service".to_string(),
            name: format!("{}-{}", from_bus, to_bus),
            members: 1,
            hour: 1.0,
            from_kv: 138.0,
            to_kv: 138.0,
            b: 0.0,
            rate_a: 100.0,
            sus,
        }
    }

    fn triangle() -> (Vec<Branch>, BusOrder) {
        let branch = vec![branch(10, 20, 10.0), branch(20, 30, 10.0), branch(10, 30, 5.0)];
        let order = BusOrder::new([10, 20, 30]);
        (branch, order)
    }

    #[test]
    fn test_make_cft() {
        let (branch, order) = triangle();
        let c_ft = make_cft(&branch, &order).unwrap();

        assert_eq!(c_ft.shape(), (3, 3));
        assert_eq!(c_ft.get(0, 10), Some(1.0));
        assert_eq!(c_ft.get(0, 20), Some(-1.0));
        assert_eq!(c_ft.get(0, 30), Some(0.0));
        assert_eq!(c_ft.get(2, 30), Some(-1.0));
        assert_eq!(c_ft.get(0, 40), None);

        let reduced = c_ft.reduce(2).unwrap();
        assert_eq!(reduced.shape(), (3, 2));
        assert_eq!(reduced.buses, vec![10, 20]);
        assert_eq!(reduced.get(1, 20), Some(1.0));
    }

    #[test]
    fn test_make_bbus() {
        let (branch, order) = triangle();
        let b_bus = make_bbus(&branch, &order).unwrap();

        assert_eq!(b_bus.get(10, 10), Some(15.0));
        assert_eq!(b_bus.get(20, 20), Some(20.0));
        assert_eq!(b_bus.get(10, 20), Some(-10.0));
        assert_eq!(b_bus.get(30, 10), Some(-5.0));
        for &bus in &b_bus.buses {
            assert!(b_bus.row_sum(bus).unwrap().abs() < 1e-12);
        }
        assert!(b_bus.is_symmetric(0.0));

        let reduced = b_bus.reduce(0).unwrap();
        assert_eq!(reduced.buses, vec![20, 30]);
        assert_eq!(reduced.get(20, 30), Some(-10.0));
        assert_eq!(reduced.get(30, 30), Some(15.0));
        assert!(reduced.is_symmetric(0.0));
    }

    #[test]
    fn test_absent_entries_are_positive_zero() {
        let (branch, order) = triangle();
        let c_ft = make_cft(&branch, &order).unwrap();
        let b_bus = make_bbus(&branch[..2], &order).unwrap();

        let v = c_ft.get(0, 30).unwrap();
        assert_eq!(v, 0.0);
        assert!(v.is_sign_positive());

        let v = b_bus.get(10, 30).unwrap();
        assert_eq!(v, 0.0);
        assert!(v.is_sign_positive());
    }

    #[test]
    fn test_duplicate_pairs_accumulate() {
        let branch = vec![branch(1, 2, 5.0), branch(1, 2, 7.0)];
        let order = BusOrder::new([1, 2]);

        let b_bus = make_bbus(&branch, &order).unwrap();
        assert_eq!(b_bus.get(1, 1), Some(12.0));
        assert_eq!(b_bus.get(1, 2), Some(-12.0));

        let c_ft = make_cft(&branch, &order).unwrap();
        assert_eq!(c_ft.shape(), (2, 2));
        assert_eq!(c_ft.get(1, 1), Some(1.0));
    }
}
