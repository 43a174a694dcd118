use crate::case::{
    Bus, Case, GeneratorRecord, HubRecord, LineRecord, LoadRecord, SettlementPointRecord,
    TransformerRecord,
};
use crate::error::{Error, Result};
use crate::sfopt::TableOpt;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Line table column layout. Source headers are replaced positionally.
pub const LINE_COLUMNS: [&str; 18] = [
    "Hour",
    "PSS/E From Bus Number",
    "PSS/E To Bus Number",
    "PSS/E Ckt Id",
    "Branch Status",
    "Monitored?",
    "Monitored and Secured?",
    "From Station Name/PSS/E Bus Name",
    "From PSS/E KV",
    "To Station Name/PSS/E Bus Name",
    "To PSS/E KV",
    "Branch Name",
    "r (p.u)",
    "x (p.u)",
    "b (p.u)",
    "RATEA",
    "RATEB",
    "RATEC",
];

/// Transformer table column layout.
pub const TRANSFORMER_COLUMNS: [&str; 15] = [
    "Hour",
    "PSS/E From Bus Number",
    "PSS/E To Bus Number",
    "PSS/E Ckt Id",
    "Transformer Status",
    "Monitored?",
    "Monitored and Secured?",
    "From Station Name/PSS/E Bus Name",
    "From PSS/E KV",
    "To Station Name/PSS/E Bus Name",
    "To PSS/E KV",
    "Branch Name",
    "r (p.u)",
    "x (p.u)",
    "RATEA",
];

pub const SETTLEMENT_POINT_COLUMNS: [&str; 8] = [
    "Hour",
    "Settlement Point Name",
    "Settlement Point Type",
    "Status",
    "Number of energized components",
    "PSS/E Bus Number",
    "Station Name/PSS/E Bus Name",
    "PSS/E KV",
];

/// Generator table column layout. The unit id is not kept.
pub const GENERATOR_COLUMNS: [&str; 9] = [
    "Hour",
    "PSS/E Bus Number",
    "PSS/E Gen Id",
    "Station Name/PSS/E Bus Name",
    "PSS/E KV",
    "Generator Name",
    "Generator Status",
    "Resource Node Settlement Point Name",
    "Resource Node PSS/E Bus Number",
];

pub const HUB_COLUMNS: [&str; 7] = [
    "Hour",
    "PSS/E Bus Number",
    "Station Name/PSS/E Bus Name",
    "PSS/E KV",
    "Bus Status",
    "Hub Bus Name",
    "Hub Name",
];

/// Load table column layout. The load id is not kept.
pub const LOAD_COLUMNS: [&str; 7] = [
    "Hour",
    "PSS/E Bus Number",
    "PSS/E Load Id",
    "Station Name/PSS/E Bus Name",
    "PSS/E KV",
    "Load Name",
    "Load Status",
];

/// Raw bus record layout. Only the first four fields are kept.
pub const BUS_COLUMNS: [&str; 11] = [
    "PSS/E Bus Number",
    "Station Name/PSS/E Bus Name",
    "PSS/E KV",
    "IDE",
    "GL",
    "BL",
    "AREA",
    "ZONE",
    "VM",
    "VA",
    "OWNER",
];

#[derive(Deserialize)]
struct LineRow(
    f64,
    usize,
    usize,
    String,
    String,
    String,
    String,
    String,
    f64,
    String,
    f64,
    String,
    f64,
    f64,
    f64,
    f64,
    f64,
    f64,
);

#[derive(Deserialize)]
struct TransformerRow(
    f64,
    usize,
    usize,
    String,
    String,
    String,
    String,
    String,
    f64,
    String,
    f64,
    String,
    f64,
    f64,
    f64,
);

#[derive(Deserialize)]
struct SettlementPointRow(f64, String, String, String, usize, usize, String, f64);

#[derive(Deserialize)]
struct GeneratorRow(
    f64,
    usize,
    IgnoredAny,
    String,
    f64,
    String,
    String,
    String,
    Option<usize>,
);

#[derive(Deserialize)]
struct HubRow(f64, usize, String, f64, String, String, String);

#[derive(Deserialize)]
struct LoadRow(f64, usize, IgnoredAny, String, f64, String, String);

impl From<SettlementPointRow> for SettlementPointRecord {
    fn from(row: SettlementPointRow) -> Self {
        SettlementPointRecord {
            hour: row.0,
            name: row.1,
            sp_type: row.2,
            status: row.3,
            energized: row.4,
            bus_i: row.5,
            bus_name: row.6,
            base_kv: row.7,
        }
    }
}

impl From<GeneratorRow> for GeneratorRecord {
    fn from(row: GeneratorRow) -> Self {
        GeneratorRecord {
            hour: row.0,
            bus_i: row.1,
            bus_name: row.3,
            base_kv: row.4,
            name: row.5,
            status: row.6,
            node_name: row.7,
            node_bus: row.8,
        }
    }
}

impl From<HubRow> for HubRecord {
    fn from(row: HubRow) -> Self {
        HubRecord {
            hour: row.0,
            bus_i: row.1,
            bus_name: row.2,
            base_kv: row.3,
            status: row.4,
            hub_bus_name: row.5,
            hub_name: row.6,
        }
    }
}

impl From<LoadRow> for LoadRecord {
    fn from(row: LoadRow) -> Self {
        LoadRecord {
            hour: row.0,
            bus_i: row.1,
            bus_name: row.3,
            base_kv: row.4,
            name: row.5,
            status: row.6,
        }
    }
}

impl From<LineRow> for LineRecord {
    fn from(row: LineRow) -> Self {
        LineRecord {
            hour: row.0,
            from_bus: row.1,
            to_bus: row.2,
            ckt: row.3,
            status: row.4,
            monitored: row.5,
            secured: row.6,
            from_name: row.7,
            from_kv: row.8,
            to_name: row.9,
            to_kv: row.10,
            name: row.11,
            r: row.12,
            x: row.13,
            b: row.14,
            rate_a: row.15,
            rate_b: row.16,
            rate_c: row.17,
        }
    }
}

impl From<TransformerRow> for TransformerRecord {
    fn from(row: TransformerRow) -> Self {
        TransformerRecord {
            hour: row.0,
            from_bus: row.1,
            to_bus: row.2,
            ckt: row.3,
            status: row.4,
            monitored: row.5,
            secured: row.6,
            from_name: row.7,
            from_kv: row.8,
            to_name: row.9,
            to_kv: row.10,
            name: row.11,
            r: row.12,
            x: row.13,
            rate_a: row.14,
        }
    }
}

/// Reads a headed CSV table whose columns are identified by position.
fn read_table<R, Row>(rdr: R, table: &str, columns: &[&str]) -> Result<Vec<Row>>
where
    R: Read,
    Row: DeserializeOwned,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(rdr);

    let found = rdr.headers()?.len();
    if found != columns.len() {
        return Err(Error::SchemaMismatch {
            table: table.to_string(),
            detail: format!("expected {} columns, found {}", columns.len(), found),
        });
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .deserialize(None)
            .map_err(|err| invalid(table, line, columns, &record, err))?;
        rows.push(row);
    }
    Ok(rows)
}

fn invalid(
    table: &str,
    line: u64,
    columns: &[&str],
    record: &StringRecord,
    err: csv::Error,
) -> Error {
    if let csv::ErrorKind::Deserialize { err: de, .. } = err.kind() {
        if let Some(field) = de.field() {
            let field = field as usize;
            return Error::InvalidField {
                table: table.to_string(),
                line,
                field: columns.get(field).unwrap_or(&"?").to_string(),
                value: record.get(field).unwrap_or_default().to_string(),
            };
        }
    }
    Error::Csv(err)
}

/// Reads the line branch table.
pub fn read_lines<R: Read>(rdr: R) -> Result<Vec<LineRecord>> {
    let rows: Vec<LineRow> = read_table(rdr, "line", &LINE_COLUMNS)?;
    Ok(rows.into_iter().map(LineRecord::from).collect())
}

/// Reads the transformer table.
pub fn read_transformers<R: Read>(rdr: R) -> Result<Vec<TransformerRecord>> {
    let rows: Vec<TransformerRow> = read_table(rdr, "transformer", &TRANSFORMER_COLUMNS)?;
    Ok(rows.into_iter().map(TransformerRecord::from).collect())
}

pub fn read_settlement_points<R: Read>(rdr: R) -> Result<Vec<SettlementPointRecord>> {
    let rows: Vec<SettlementPointRow> =
        read_table(rdr, "settlement point", &SETTLEMENT_POINT_COLUMNS)?;
    Ok(rows.into_iter().map(SettlementPointRecord::from).collect())
}

pub fn read_generators<R: Read>(rdr: R) -> Result<Vec<GeneratorRecord>> {
    let rows: Vec<GeneratorRow> = read_table(rdr, "generator", &GENERATOR_COLUMNS)?;
    Ok(rows.into_iter().map(GeneratorRecord::from).collect())
}

pub fn read_hubs<R: Read>(rdr: R) -> Result<Vec<HubRecord>> {
    let rows: Vec<HubRow> = read_table(rdr, "hub", &HUB_COLUMNS)?;
    Ok(rows.into_iter().map(HubRecord::from).collect())
}

pub fn read_loads<R: Read>(rdr: R) -> Result<Vec<LoadRecord>> {
    let rows: Vec<LoadRow> = read_table(rdr, "load", &LOAD_COLUMNS)?;
    Ok(rows.into_iter().map(LoadRecord::from).collect())
}

/// Splits a raw data record on whitespace or commas. Single-quoted
/// fields may contain either.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '\'' => {
                quoted = !quoted;
                pending = true;
            }
            c if !quoted && (c.is_whitespace() || c == ',') => {
                if pending {
                    fields.push(field.trim().to_string());
                    field.clear();
                    pending = false;
                }
            }
            c => {
                field.push(c);
                pending = true;
            }
        }
    }
    if pending {
        fields.push(field.trim().to_string());
    }
    fields
}

fn is_end_of_bus_data(line: &str) -> bool {
    let first = line
        .split(|c: char| c.is_whitespace() || c == ',' || c == '/')
        .find(|s| !s.is_empty());
    first == Some("0")
}

fn parse_field<T: std::str::FromStr>(value: &str, line: u64, field: usize) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidField {
        table: "bus".to_string(),
        line,
        field: BUS_COLUMNS[field].to_string(),
        value: value.to_string(),
    })
}

/// Reads the bus records of a PSS/E raw file.
///
/// The three case identification lines are skipped and records are read
/// up to the `0` line that terminates the bus data.
pub fn read_buses<R: BufRead>(rdr: R) -> Result<Vec<Bus>> {
    let mut bus = Vec::new();
    for (n, line) in rdr.lines().enumerate().skip(3) {
        let line = line?;
        let lineno = n as u64 + 1;
        if is_end_of_bus_data(&line) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(&line);
        if fields.len() != BUS_COLUMNS.len() {
            return Err(Error::SchemaMismatch {
                table: "bus".to_string(),
                detail: format!(
                    "expected {} fields at line {}, found {}",
                    BUS_COLUMNS.len(),
                    lineno,
                    fields.len()
                ),
            });
        }
        bus.push(Bus {
            bus_i: parse_field(&fields[0], lineno, 0)?,
            name: fields[1].clone(),
            base_kv: parse_field(&fields[2], lineno, 2)?,
            ide: parse_field(&fields[3], lineno, 3)?,
        });
    }
    Ok(bus)
}

/// Path of an hour-ending export, e.g. `prefix_Ln_007.csv`.
pub fn table_path(prefix: &Path, kind: &str, hour_ending: u32) -> PathBuf {
    PathBuf::from(format!("{}_{}_{:03}.csv", prefix.display(), kind, hour_ending))
}

/// Opens and reads the `kind` table of one hour ending, or returns an
/// empty table when `enabled` is false.
fn read_hourly<T, F>(
    prefix: &Path,
    kind: &str,
    hour_ending: u32,
    enabled: bool,
    read: F,
) -> Result<Vec<T>>
where
    F: FnOnce(File) -> Result<Vec<T>>,
{
    if !enabled {
        return Ok(Vec::new());
    }
    let path = table_path(prefix, kind, hour_ending);
    log::debug!("reading {}", path.display());
    read(File::open(&path)?)
}

/// Loads the hour-ending tables selected by `tables` together with the
/// bus data of the raw file.
pub fn load_case(
    prefix: &Path,
    raw_path: &Path,
    hour_ending: u32,
    tables: &TableOpt,
) -> Result<Case> {
    let he = hour_ending;
    let line = read_hourly(prefix, "Ln", he, tables.line, read_lines)?;
    let transformer = read_hourly(prefix, "Xf", he, tables.transformer, read_transformers)?;
    let settlement_point =
        read_hourly(prefix, "Sp", he, tables.settlement_point, read_settlement_points)?;
    let generator = read_hourly(prefix, "Gn", he, tables.generator, read_generators)?;
    let hub = read_hourly(prefix, "Hb", he, tables.hub, read_hubs)?;
    let load = read_hourly(prefix, "Ld", he, tables.load, read_loads)?;

    let bus = if tables.bus {
        log::debug!("reading {}", raw_path.display());
        read_buses(BufReader::new(File::open(raw_path)?))?
    } else {
        Vec::new()
    };

    log::info!(
        "loaded {} lines, {} transformers and {} buses",
        line.len(),
        transformer.len(),
        bus.len()
    );
    log::debug!(
        "{} settlement points, {} generators, {} hub buses, {} loads",
        settlement_point.len(),
        generator.len(),
        hub.len(),
        load.len()
    );
    Ok(Case {
        line,
        transformer,
        bus,
        settlement_point,
        generator,
        hub,
        load,
    })
}
