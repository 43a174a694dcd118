use crate::ptdf::ShiftFactorMatrix;
use pretty_dtoa::{dtoa, FmtFloatConfig};

const FLOAT_CONFIG: FmtFloatConfig = FmtFloatConfig::default()
    .add_point_zero(false)
    .max_significant_digits(9);

pub fn format_f64(f: f64) -> String {
    dtoa(f, FLOAT_CONFIG)
}

pub fn format_f64_vec(v: &[f64]) -> String {
    let a: Vec<String> = v.iter().map(|f| format_f64(*f)).collect();
    format!("[{}]", a.join(", "))
}

/// Formats the first `max_rows` rows of a shift factor matrix, one row
/// per line prefixed with the row label.
pub fn format_shift_factors(h: &ShiftFactorMatrix, labels: &[String], max_rows: usize) -> String {
    let mut s = format!("bus {}\n", format_usize_vec(&h.buses));
    for (i, label) in labels.iter().enumerate().take(max_rows.min(h.shape().0)) {
        s.push_str(&format!("{} {}\n", label, format_f64_vec(h.row(i))));
    }
    s
}

fn format_usize_vec(v: &[usize]) -> String {
    let a: Vec<String> = v.iter().map(|i| i.to_string()).collect();
    format!("[{}]", a.join(", "))
}
