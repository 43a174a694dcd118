use crate::case::Bus;
use crate::error::{Error, Result};

// define bus types
pub const PQ: usize = 1;
pub const PV: usize = 2;
pub const REF: usize = 3;
pub const NONE: usize = 4;

/// Returns the buses that take part in the network model, i.e. all buses
/// whose type code is not `isolated`.
pub fn working_buses(bus: &[Bus], isolated: usize) -> Vec<Bus> {
    bus.iter().filter(|b| b.ide != isolated).cloned().collect()
}

/// Finds the single reference bus.
///
/// Looks for buses with type code `code` and returns the bus number when
/// exactly one is found. Zero or multiple matches are an error that lists
/// every candidate.
pub fn ref_bus(bus: &[Bus], code: usize) -> Result<usize> {
    let candidates = bus
        .iter()
        .filter(|b| b.ide == code)
        .map(|b| b.bus_i)
        .collect::<Vec<usize>>();

    match candidates.as_slice() {
        [r] => Ok(*r),
        _ => Err(Error::ReferenceBus { code, candidates }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(bus_i: usize, ide: usize) -> Bus {
        Bus {
            bus_i,
            ide,
            ..Default::default()
        }
    }

    #[test]
    fn test_ref_bus() {
        let bus = vec![bus(1, PQ), bus(2, PV), bus(3, REF)];
        assert_eq!(ref_bus(&bus, REF).unwrap(), 3);
        assert_eq!(ref_bus(&bus, PV).unwrap(), 2);
    }

    #[test]
    fn test_ref_bus_lists_candidates() {
        let bus = vec![bus(1, REF), bus(2, PV), bus(7, REF)];
        match ref_bus(&bus, REF) {
            Err(Error::ReferenceBus { code, candidates }) => {
                assert_eq!(code, REF);
                assert_eq!(candidates, vec![1, 7]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_working_buses() {
        let bus = vec![bus(1, PQ), bus(2, NONE), bus(3, REF)];
        let working = working_buses(&bus, NONE);
        assert_eq!(
            working.iter().map(|b| b.bus_i).collect::<Vec<usize>>(),
            vec![1, 3]
        );
    }
}
