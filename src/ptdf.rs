use crate::bus_types::ref_bus;
use crate::case::Branch;
use crate::dc::{make_bbus, make_cft, row_entries, IncidenceMatrix, SusceptanceMatrix};
use crate::dense::Mat;
use crate::diagnostics::Diagnostic;
use crate::error::{Error, Result};
use crate::network::NetworkSnapshot;
use crate::order::BusOrder;
use crate::sfopt::SFOpt;
use crate::traits::LinearSolver;
use petgraph::unionfind::UnionFind;

/// Shift factors (PTDF) for a single reference bus.
///
/// Row `b` gives the change in flow on branch `b` for a unit injection at
/// each non-reference bus, withdrawn at the reference bus.
#[derive(Clone, Debug)]
pub struct ShiftFactorMatrix {
    /// Column labels: bus numbers in ascending order without the reference.
    pub buses: Vec<usize>,
    pub values: Mat<f64>,
}

impl ShiftFactorMatrix {
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Sensitivity of branch row `row` to an injection at bus `bus`.
    pub fn get(&self, row: usize, bus: usize) -> Option<f64> {
        let j = self.buses.binary_search(&bus).ok()?;
        if row >= self.values.rows() {
            return None;
        }
        Some(self.values.get(row, j))
    }

    pub fn row(&self, row: usize) -> &[f64] {
        self.values.row(row)
    }
}

/// Everything produced for one snapshot.
pub struct ShiftFactors {
    /// Incidence matrix with the reference column removed.
    pub incidence: IncidenceMatrix,

    pub shift_factor: ShiftFactorMatrix,

    /// Aggregated branches, in matrix row order.
    pub branch: Vec<Branch>,

    pub ref_bus: usize,

    pub diagnostics: Vec<Diagnostic>,
}

/// Buses with no path to the bus at internal index `ref_idx`.
fn unreachable_buses(branch: &[Branch], order: &BusOrder, ref_idx: usize) -> Vec<usize> {
    let mut uf = UnionFind::new(order.len());
    for br in branch {
        if let (Some(f), Some(t)) = (order.index(br.from_bus), order.index(br.to_bus)) {
            uf.union(f, t);
        }
    }
    (0..order.len())
        .filter(|&i| !uf.equiv(i, ref_idx))
        .map(|i| order.i2e[i])
        .collect()
}

/// Inverts the reduced susceptance matrix by solving against the identity.
pub fn invert_bbus(b_bus: &SusceptanceMatrix, linsol: &dyn LinearSolver) -> Result<Mat<f64>> {
    let n = b_bus.dim();
    let mut x = Mat::identity(n);

    linsol
        .solve_n(&b_bus.matrix.to_csc(), &mut x)
        .map_err(|err| Error::SingularMatrix {
            detail: err,
            buses: b_bus.buses.clone(),
        })?;

    if x.values().iter().any(|v| !v.is_finite()) {
        return Err(Error::SingularMatrix {
            detail: "inverse has non-finite entries".to_string(),
            buses: b_bus.buses.clone(),
        });
    }
    Ok(x)
}

/// Builds the DC shift factor matrix for a network snapshot.
///
/// The reference bus is the single working bus whose type code equals
/// `opt.reference_type`. Its column is dropped from the incidence matrix,
/// its row and column from the bus susceptance matrix, and
///
/// ```text
/// H = diag(b) * Cft_r * inv(Bbus_r)
/// ```
///
/// is returned together with the reduced incidence matrix and the branches
/// that index its rows.
pub fn make_shift_factors(
    net: &NetworkSnapshot,
    opt: &SFOpt,
    linsol: &dyn LinearSolver,
) -> Result<ShiftFactors> {
    let nb = net.order.len();
    let nl = net.branch.len();
    log::debug!("building shift factors for {} branches and {} buses", nl, nb);

    let ref_bus = ref_bus(&net.bus, opt.reference_type)?;
    let ref_idx = net
        .order
        .index(ref_bus)
        .ok_or(Error::ReferenceNotConnected { bus: ref_bus })?;
    log::info!("reference bus: {}", ref_bus);

    let c_ft = make_cft(&net.branch, &net.order)?;
    let b_bus = make_bbus(&net.branch, &net.order)?;

    let b_bus = b_bus.reduce(ref_idx)?;
    let c_ft = c_ft.reduce(ref_idx)?;

    let islands = unreachable_buses(&net.branch, &net.order, ref_idx);
    if !islands.is_empty() {
        return Err(Error::SingularMatrix {
            detail: format!("no path to reference bus {}", ref_bus),
            buses: islands,
        });
    }

    let x = invert_bbus(&b_bus, linsol)?;

    // row i of Cft_r selects (at most) two rows of X
    let mut h = Mat::zeros(nl, nb - 1);
    for (i, br) in net.branch.iter().enumerate() {
        let h_i = h.row_mut(i);
        for (j, c_ij) in row_entries(&c_ft.matrix, i) {
            let scale = br.sus * c_ij;
            for (h_ik, &x_jk) in h_i.iter_mut().zip(x.row(j)) {
                *h_ik += scale * x_jk;
            }
        }
    }

    Ok(ShiftFactors {
        shift_factor: ShiftFactorMatrix {
            buses: c_ft.buses.clone(),
            values: h,
        },
        incidence: c_ft,
        branch: net.branch.clone(),
        ref_bus,
        diagnostics: net.diagnostics.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus_types::{PQ, PV, REF};
    use crate::case::{Bus, LineRecord};
    use crate::lu::DenseLU;
    use crate::network::build_network;
    use crate::sfopt::IN_SERVICE;
    use spsolve::rlu::RLU;

    fn line(from_bus: usize, to_bus: usize, x: f64) -> LineRecord {
        LineRecord {
            from_bus,
            to_bus,
            x,
            name: format!("{}-{}", from_bus, to_bus),
            status: IN_SERVICE.to_string(),
            rate_a: 100.0,
            ..Default::default()
        }
    }

    fn bus(bus_i: usize, ide: usize) -> Bus {
        Bus {
            bus_i,
            ide,
            ..Default::default()
        }
    }

    // 4 bus ring with a chord, reference at bus 4.
    fn meshed() -> (Vec<LineRecord>, Vec<Bus>) {
        let ln = vec![
            line(1, 2, 0.1),
            line(2, 3, 0.2),
            line(3, 4, 0.1),
            line(4, 1, 0.25),
            line(1, 3, 0.5),
        ];
        let bus = vec![bus(1, PQ), bus(2, PV), bus(3, PQ), bus(4, REF)];
        (ln, bus)
    }

    #[test]
    fn test_inverse() {
        let (ln, bus) = meshed();
        let net = build_network(&ln, &[], &bus, &SFOpt::default()).unwrap();
        let b_bus = make_bbus(&net.branch, &net.order).unwrap().reduce(3).unwrap();

        let x = invert_bbus(&b_bus, &DenseLU::default()).unwrap();

        let prod = crate::dense::csr_to_mat(&b_bus.matrix).mat_mat(&x);
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((prod.get(i, j) - expect).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_flow_conservation() {
        // Injection at bus 1: flows leaving bus 1 must sum to one.
        let (ln, bus) = meshed();
        let net = build_network(&ln, &[], &bus, &SFOpt::default()).unwrap();
        let sf = make_shift_factors(&net, &SFOpt::default(), &DenseLU::default()).unwrap();

        let mut out = 0.0;
        for (i, br) in sf.branch.iter().enumerate() {
            let h = sf.shift_factor.get(i, 1).unwrap();
            if br.from_bus == 1 {
                out += h;
            } else if br.to_bus == 1 {
                out -= h;
            }
        }
        assert!((out - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_solvers_agree() {
        let (ln, bus) = meshed();
        let net = build_network(&ln, &[], &bus, &SFOpt::default()).unwrap();

        let dense = make_shift_factors(&net, &SFOpt::default(), &DenseLU::default()).unwrap();
        let sparse = make_shift_factors(&net, &SFOpt::default(), &RLU::default()).unwrap();

        assert_eq!(dense.shift_factor.shape(), sparse.shift_factor.shape());
        for (a, b) in dense
            .shift_factor
            .values
            .values()
            .iter()
            .zip(sparse.shift_factor.values.values())
        {
            assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_reference_not_connected() {
        let ln = vec![line(1, 2, 0.1)];
        let bus = vec![bus(1, PQ), bus(2, PV), bus(3, REF)];
        let net = build_network(&ln, &[], &bus, &SFOpt::default()).unwrap();

        match make_shift_factors(&net, &SFOpt::default(), &DenseLU::default()) {
            Err(Error::ReferenceNotConnected { bus }) => assert_eq!(bus, 3),
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected an error"),
        }
    }
}
