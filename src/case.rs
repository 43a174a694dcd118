use crate::bus_types::NONE;
use crate::error::{Error, Result};

/// Case is one hour-ending snapshot of a PSS/E network export, as read
/// from the line, transformer and raw bus files.
#[derive(Clone, Debug, Default)]
pub struct Case {
    /// Transmission lines/cables, one row per circuit.
    pub line: Vec<LineRecord>,

    /// Two winding transformers, one row per circuit.
    pub transformer: Vec<TransformerRecord>,

    /// Bus catalogue.
    pub bus: Vec<Bus>,

    /// Settlement points and the buses they price.
    pub settlement_point: Vec<SettlementPointRecord>,

    /// Generating units.
    pub generator: Vec<GeneratorRecord>,

    /// Trading hub buses.
    pub hub: Vec<HubRecord>,

    /// Loads.
    pub load: Vec<LoadRecord>,
}

/// Bus is a node of the network as listed in the raw bus data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bus {
    /// PSS/E bus number.
    pub bus_i: usize,

    /// Station name/PSS/E bus name.
    pub name: String,

    /// Nominal voltage (kV).
    pub base_kv: f64,

    /// Bus type code (IDE): 1 load, 2 generator, 3 reference, 4 isolated.
    pub ide: usize,
}

impl Bus {
    pub fn is_isolated(&self) -> bool {
        self.ide == NONE
    }
}

/// LineRecord is a single row of the line branch table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineRecord {
    pub hour: f64,
    pub from_bus: usize,
    pub to_bus: usize,
    pub ckt: String,
    pub status: String,

    /// Monitoring flag as exported, e.g. `Y` or `N`.
    pub monitored: String,

    /// Monitored and secured flag.
    pub secured: String,

    pub from_name: String,
    pub from_kv: f64,
    pub to_name: String,
    pub to_kv: f64,
    pub name: String,

    /// Resistance (p.u.).
    pub r: f64,

    /// Reactance (p.u.).
    pub x: f64,

    /// Total line charging susceptance (p.u.).
    pub b: f64,

    /// MVA rating A (long term rating).
    pub rate_a: f64,

    /// MVA rating B (short term rating).
    pub rate_b: f64,

    /// MVA rating C (emergency rating).
    pub rate_c: f64,
}

/// TransformerRecord is a single row of the transformer table. It has no
/// line charging and a single thermal rating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformerRecord {
    pub hour: f64,
    pub from_bus: usize,
    pub to_bus: usize,
    pub ckt: String,
    pub status: String,

    /// Monitoring flag as exported, e.g. `Y` or `N`.
    pub monitored: String,

    /// Monitored and secured flag.
    pub secured: String,

    pub from_name: String,
    pub from_kv: f64,
    pub to_name: String,
    pub to_kv: f64,
    pub name: String,
    pub r: f64,
    pub x: f64,
    pub rate_a: f64,
}

/// SettlementPointRecord is a single row of the settlement point table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettlementPointRecord {
    pub hour: f64,
    pub name: String,

    /// Settlement point type, e.g. resource node or load zone.
    pub sp_type: String,

    pub status: String,

    /// Number of energized components behind the settlement point.
    pub energized: usize,

    pub bus_i: usize,
    pub bus_name: String,
    pub base_kv: f64,
}

/// GeneratorRecord is a single row of the generator table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratorRecord {
    pub hour: f64,

    /// Terminal bus number.
    pub bus_i: usize,

    pub bus_name: String,
    pub base_kv: f64,
    pub name: String,
    pub status: String,

    /// Resource node settlement point name.
    pub node_name: String,

    /// Resource node bus number, absent when the export leaves it blank.
    pub node_bus: Option<usize>,
}

/// HubRecord is a single row of the hub table, one row per hub bus.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HubRecord {
    pub hour: f64,
    pub bus_i: usize,
    pub bus_name: String,
    pub base_kv: f64,
    pub status: String,
    pub hub_bus_name: String,
    pub hub_name: String,
}

/// LoadRecord is a single row of the load table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadRecord {
    pub hour: f64,
    pub bus_i: usize,
    pub bus_name: String,
    pub base_kv: f64,
    pub name: String,
    pub status: String,
}

/// Series susceptance of a single element.
pub(crate) fn susceptance(from_bus: usize, to_bus: usize, name: &str, x: f64) -> Result<f64> {
    if x == 0.0 {
        return Err(Error::DivideByZero {
            from_bus,
            to_bus,
            name: name.to_string(),
        });
    }
    Ok(1.0 / x)
}

impl LineRecord {
    pub fn susceptance(&self) -> Result<f64> {
        susceptance(self.from_bus, self.to_bus, &self.name, self.x)
    }
}

impl TransformerRecord {
    pub fn susceptance(&self) -> Result<f64> {
        susceptance(self.from_bus, self.to_bus, &self.name, self.x)
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum BranchClass {
    Line,
    Transformer,
}

/// Branch is a line or transformer group after parallel circuits between
/// the same (from, to) pair have been merged.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    /// From bus number.
    pub from_bus: usize,

    /// To bus number.
    pub to_bus: usize,

    pub class: BranchClass,

    /// Status of the first member.
    pub status: String,

    /// Member names joined by the configured separator.
    pub name: String,

    /// Number of circuits merged into this branch.
    pub members: usize,

    /// Mean hour marker of the members.
    pub hour: f64,

    /// Mean from bus nominal voltage (kV).
    pub from_kv: f64,

    /// Mean to bus nominal voltage (kV).
    pub to_kv: f64,

    /// Summed line charging susceptance (p.u.), zero for transformers.
    pub b: f64,

    /// Summed MVA rating A.
    pub rate_a: f64,

    /// Summed series susceptance (p.u.).
    pub sus: f64,
}
