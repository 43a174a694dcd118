use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions. Any of these aborts the computation for the snapshot.
#[derive(Debug, Error)]
pub enum Error {
    #[error("schema mismatch in {table} table: {detail}")]
    SchemaMismatch { table: String, detail: String },

    #[error("invalid {field} {value:?} in {table} table at line {line}")]
    InvalidField {
        table: String,
        line: u64,
        field: String,
        value: String,
    },

    #[error("expected exactly one reference bus of type {code}, found {}: {candidates:?}", candidates.len())]
    ReferenceBus { code: usize, candidates: Vec<usize> },

    #[error("reference bus {bus} is not connected to any in-service branch")]
    ReferenceNotConnected { bus: usize },

    #[error("zero reactance on branch {name:?} ({from_bus} -> {to_bus})")]
    DivideByZero {
        from_bus: usize,
        to_bus: usize,
        name: String,
    },

    #[error("singular susceptance matrix: {detail} (buses: {buses:?})")]
    SingularMatrix { detail: String, buses: Vec<usize> },

    #[error("matrix error: {0}")]
    Matrix(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
