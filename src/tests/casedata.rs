use crate::case::BranchClass;
use crate::diagnostics::Diagnostic;
use crate::loadcase::load_case;
use crate::lu::DenseLU;
use crate::network::build_network;
use crate::ptdf::make_shift_factors;
use crate::sfopt::{SFOpt, TableOpt};
use anyhow::Result;
use spsolve::rlu::RLU;
use std::env;
use std::path::Path;

#[test]
fn test_sample_case() -> Result<()> {
    let dir = Path::new(&env::var("CARGO_MANIFEST_DIR")?).join("casedata");
    let case = load_case(
        &dir.join("sample"),
        &dir.join("sample.raw"),
        1,
        &TableOpt::default(),
    )?;

    let opt = SFOpt::default();
    let net = build_network(&case.line, &case.transformer, &case.bus, &opt)?;

    assert_eq!(net.unique_buses(), &[101, 102, 103, 104]);
    assert_eq!(net.diagnostics, vec![Diagnostic::IslandedBuses(vec![106])]);
    assert_eq!(net.branch.len(), 3);

    let ln = &net.branch[0];
    assert_eq!((ln.from_bus, ln.to_bus), (101, 103));
    assert_eq!(ln.name, "NORTH_CENTRAL_1+NORTH_CENTRAL_2");
    assert!((ln.sus - 15.0).abs() < 1e-9);
    assert!((ln.rate_a - 180.0).abs() < 1e-9);
    assert!((ln.b - 0.03).abs() < 1e-9);

    let xf = &net.branch[2];
    assert_eq!(xf.class, BranchClass::Transformer);
    assert_eq!((xf.from_bus, xf.to_bus), (104, 102));
    assert!((xf.sus - 50.0).abs() < 1e-9);

    for sf in [
        make_shift_factors(&net, &opt, &RLU::default())?,
        make_shift_factors(&net, &opt, &DenseLU::default())?,
    ] {
        assert_eq!(sf.ref_bus, 103);
        assert_eq!(sf.shift_factor.buses, vec![101, 102, 104]);

        // hub and settlement point buses index shift factor columns,
        // except the reference bus which has none
        assert!(sf.shift_factor.get(0, case.hub[0].bus_i).is_some());
        assert!(sf.shift_factor.get(0, case.hub[1].bus_i).is_none());
        for sp in &case.settlement_point {
            assert!(sf.shift_factor.get(0, sp.bus_i).is_some());
        }

        let expect = [
            [1.0, 0.0, 0.0], // 101-103
            [0.0, 1.0, 1.0], // 102-103
            [0.0, 0.0, 1.0], // 104-102
        ];
        for (i, row) in expect.iter().enumerate() {
            for (h, e) in sf.shift_factor.row(i).iter().zip(row) {
                assert!((h - e).abs() < 1e-9, "row {}: {} != {}", i, h, e);
            }
        }
    }
    Ok(())
}
