use crate::bus_types::{NONE, REF};
use derive_builder::Builder;

/// Status literal marking an element as in service.
pub const IN_SERVICE: &str = "In-Service";

/// Options controlling how a snapshot is built and reduced.
#[derive(Clone, Debug, Builder)]
#[builder(default)]
pub struct SFOpt {
    /// Bus type code of the reference bus. Default value is 3.
    pub reference_type: usize,

    /// Bus type code of isolated buses, which are left out of the
    /// working bus set. Default value is 4.
    pub isolated_type: usize,

    /// Status value that marks lines and transformers as in service.
    #[builder(setter(into))]
    pub in_service: String,

    /// Separator used when joining the names of merged parallel circuits.
    #[builder(setter(into))]
    pub name_separator: String,
}

impl Default for SFOpt {
    fn default() -> Self {
        Self {
            reference_type: REF,
            isolated_type: NONE,
            in_service: IN_SERVICE.to_string(),
            name_separator: "+".to_string(),
        }
    }
}

/// Selects which hour-ending tables a case load reads. Every table is
/// read by default; a disabled table is left empty.
#[derive(Clone, Debug, Builder)]
#[builder(default)]
pub struct TableOpt {
    /// Line table (`Ln`).
    pub line: bool,

    /// Transformer table (`Xf`).
    pub transformer: bool,

    /// Settlement point table (`Sp`).
    pub settlement_point: bool,

    /// Generator table (`Gn`).
    pub generator: bool,

    /// Hub table (`Hb`).
    pub hub: bool,

    /// Load table (`Ld`).
    pub load: bool,

    /// Bus data of the raw file.
    pub bus: bool,
}

impl Default for TableOpt {
    fn default() -> Self {
        Self {
            line: true,
            transformer: true,
            settlement_point: true,
            generator: true,
            hub: true,
            load: true,
            bus: true,
        }
    }
}

impl TableOpt {
    /// Only the tables needed to build the network.
    pub fn network() -> Self {
        Self {
            settlement_point: false,
            generator: false,
            hub: false,
            load: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let opt = SFOptBuilder::default().reference_type(2).build().unwrap();
        assert_eq!(opt.reference_type, 2);
        assert_eq!(opt.isolated_type, NONE);
        assert_eq!(opt.in_service, IN_SERVICE);
        assert_eq!(opt.name_separator, "+");
    }

    #[test]
    fn test_table_opt() {
        let all = TableOpt::default();
        assert!(all.line && all.transformer && all.bus);
        assert!(all.settlement_point && all.generator && all.hub && all.load);

        let net = TableOpt::network();
        assert!(net.line && net.transformer && net.bus);
        assert!(!net.generator && !net.load);

        let opt = TableOptBuilder::default().hub(false).build().unwrap();
        assert!(!opt.hub);
        assert!(opt.settlement_point);
    }
}
