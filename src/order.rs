use std::collections::{BTreeSet, HashMap};

/// BusOrder maps external bus numbers to consecutive internal matrix
/// indices and back. Internal order is ascending bus number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BusOrder {
    pub e2i: HashMap<usize, usize>,
    pub i2e: Vec<usize>,
}

impl BusOrder {
    /// Builds the ordering from any collection of bus numbers. Duplicates
    /// are collapsed.
    pub fn new(buses: impl IntoIterator<Item = usize>) -> Self {
        let i2e: Vec<usize> = buses
            .into_iter()
            .collect::<BTreeSet<usize>>()
            .into_iter()
            .collect();
        let e2i = i2e.iter().enumerate().map(|(i, &e)| (e, i)).collect();
        Self { e2i, i2e }
    }

    pub fn len(&self) -> usize {
        self.i2e.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2e.is_empty()
    }

    /// Internal index of an external bus number.
    pub fn index(&self, bus: usize) -> Option<usize> {
        self.e2i.get(&bus).copied()
    }

    pub fn contains(&self, bus: usize) -> bool {
        self.e2i.contains_key(&bus)
    }
}
