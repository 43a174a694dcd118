use std::fmt;

/// Advisory findings raised while building or solving a snapshot. None of
/// these stop the computation.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// Buses in the working bus table that no in-service branch touches.
    IslandedBuses(Vec<usize>),

    /// A branch endpoint that is not in the working bus table.
    UnknownEndpoint {
        from_bus: usize,
        to_bus: usize,
        bus: usize,
    },

    /// Both (a, b) and (b, a) groups exist. They are kept as separate
    /// branches.
    ReversedParallel { from_bus: usize, to_bus: usize },

    /// A branch whose summed rating is zero.
    ZeroRating {
        from_bus: usize,
        to_bus: usize,
        name: String,
    },

    /// A branch with identical endpoints. It carries no flow.
    SelfLoop { bus: usize, name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::IslandedBuses(buses) => {
                write!(f, "buses not in the branch or transformer data: {:?}", buses)
            }
            Diagnostic::UnknownEndpoint {
                from_bus,
                to_bus,
                bus,
            } => write!(
                f,
                "branch {} -> {} references bus {} missing from the bus table",
                from_bus, to_bus, bus
            ),
            Diagnostic::ReversedParallel { from_bus, to_bus } => write!(
                f,
                "branches recorded in both directions between {} and {}",
                from_bus, to_bus
            ),
            Diagnostic::ZeroRating {
                from_bus,
                to_bus,
                name,
            } => write!(f, "branch {:?} ({} -> {}) has zero rating", name, from_bus, to_bus),
            Diagnostic::SelfLoop { bus, name } => {
                write!(f, "branch {:?} starts and ends at bus {}", name, bus)
            }
        }
    }
}

/// Logs each diagnostic at warn level.
pub(crate) fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        log::warn!("{}", d);
    }
}
