use crate::bus_types::working_buses;
use crate::case::{Branch, BranchClass, Bus, LineRecord, TransformerRecord};
use crate::diagnostics::{log_diagnostics, Diagnostic};
use crate::error::Result;
use crate::order::BusOrder;
use crate::sfopt::SFOpt;
use std::collections::{BTreeMap, HashSet};

/// NetworkSnapshot is the in-service network after parallel circuits
/// have been merged.
#[derive(Clone, Debug)]
pub struct NetworkSnapshot {
    /// Lines followed by transformers, each group in ascending
    /// (from, to) order.
    pub branch: Vec<Branch>,

    /// Working bus table (isolated buses removed).
    pub bus: Vec<Bus>,

    /// Buses referenced by at least one branch, ascending.
    pub order: BusOrder,

    pub diagnostics: Vec<Diagnostic>,
}

impl NetworkSnapshot {
    /// Sorted unique list of buses referenced by branches.
    pub fn unique_buses(&self) -> &[usize] {
        &self.order.i2e
    }
}

// Common view of a line or transformer row.
struct Member<'a> {
    from_bus: usize,
    to_bus: usize,
    status: &'a str,
    name: &'a str,
    hour: f64,
    from_kv: f64,
    to_kv: f64,
    b: f64,
    rate_a: f64,
    sus: f64,
}

impl<'a> Member<'a> {
    fn from_line(ln: &'a LineRecord) -> Result<Self> {
        Ok(Self {
            from_bus: ln.from_bus,
            to_bus: ln.to_bus,
            status: &ln.status,
            name: &ln.name,
            hour: ln.hour,
            from_kv: ln.from_kv,
            to_kv: ln.to_kv,
            b: ln.b,
            rate_a: ln.rate_a,
            sus: ln.susceptance()?,
        })
    }

    fn from_transformer(xf: &'a TransformerRecord) -> Result<Self> {
        Ok(Self {
            from_bus: xf.from_bus,
            to_bus: xf.to_bus,
            status: &xf.status,
            name: &xf.name,
            hour: xf.hour,
            from_kv: xf.from_kv,
            to_kv: xf.to_kv,
            b: 0.0,
            rate_a: xf.rate_a,
            sus: xf.susceptance()?,
        })
    }
}

/// Merges members sharing the same (from, to) pair. Direction is kept as
/// recorded, so (a, b) and (b, a) form two groups.
fn aggregate(members: Vec<Member>, class: BranchClass, separator: &str) -> Vec<Branch> {
    let mut groups: BTreeMap<(usize, usize), Vec<Member>> = BTreeMap::new();
    for m in members {
        groups.entry((m.from_bus, m.to_bus)).or_default().push(m);
    }

    groups
        .into_iter()
        .map(|((from_bus, to_bus), group)| {
            let n = group.len() as f64;
            Branch {
                from_bus,
                to_bus,
                class,
                status: group[0].status.to_string(),
                name: group
                    .iter()
                    .map(|m| m.name)
                    .collect::<Vec<&str>>()
                    .join(separator),
                members: group.len(),
                hour: group.iter().map(|m| m.hour).sum::<f64>() / n,
                from_kv: group.iter().map(|m| m.from_kv).sum::<f64>() / n,
                to_kv: group.iter().map(|m| m.to_kv).sum::<f64>() / n,
                b: group.iter().map(|m| m.b).sum(),
                rate_a: group.iter().map(|m| m.rate_a).sum(),
                sus: group.iter().map(|m| m.sus).sum(),
            }
        })
        .collect()
}

/// Builds the network snapshot from the line, transformer and bus tables.
///
/// Out-of-service rows are dropped, parallel circuits between the same
/// (from, to) pair are merged and the unique bus list is derived from the
/// remaining branch endpoints. Advisory findings are collected in the
/// snapshot's diagnostics and logged.
pub fn build_network(
    line: &[LineRecord],
    transformer: &[TransformerRecord],
    bus: &[Bus],
    opt: &SFOpt,
) -> Result<NetworkSnapshot> {
    let bus = working_buses(bus, opt.isolated_type);

    let ln = line
        .iter()
        .filter(|ln| ln.status == opt.in_service)
        .map(Member::from_line)
        .collect::<Result<Vec<Member>>>()?;
    let xf = transformer
        .iter()
        .filter(|xf| xf.status == opt.in_service)
        .map(Member::from_transformer)
        .collect::<Result<Vec<Member>>>()?;
    log::debug!(
        "{} of {} lines and {} of {} transformers in service",
        ln.len(),
        line.len(),
        xf.len(),
        transformer.len()
    );

    let mut branch = aggregate(ln, BranchClass::Line, &opt.name_separator);
    branch.extend(aggregate(xf, BranchClass::Transformer, &opt.name_separator));

    let order = BusOrder::new(branch.iter().flat_map(|br| [br.from_bus, br.to_bus]));

    let diagnostics = check_network(&branch, &bus, &order);
    log_diagnostics(&diagnostics);

    Ok(NetworkSnapshot {
        branch,
        bus,
        order,
        diagnostics,
    })
}

fn check_network(branch: &[Branch], bus: &[Bus], order: &BusOrder) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut islanded = bus
        .iter()
        .map(|b| b.bus_i)
        .filter(|&i| !order.contains(i))
        .collect::<Vec<usize>>();
    if !islanded.is_empty() {
        islanded.sort_unstable();
        islanded.dedup();
        diagnostics.push(Diagnostic::IslandedBuses(islanded));
    }

    let bs: HashSet<usize> = bus.iter().map(|b| b.bus_i).collect();
    let pairs: HashSet<(usize, usize)> = branch.iter().map(|br| (br.from_bus, br.to_bus)).collect();
    let mut reversed = HashSet::new();

    for br in branch {
        let (f, t) = (br.from_bus, br.to_bus);
        for end in [f, t] {
            if !bs.contains(&end) {
                diagnostics.push(Diagnostic::UnknownEndpoint {
                    from_bus: f,
                    to_bus: t,
                    bus: end,
                });
            }
        }
        if f == t {
            diagnostics.push(Diagnostic::SelfLoop {
                bus: f,
                name: br.name.clone(),
            });
        } else if pairs.contains(&(t, f)) && reversed.insert((f.min(t), f.max(t))) {
            diagnostics.push(Diagnostic::ReversedParallel {
                from_bus: f.min(t),
                to_bus: f.max(t),
            });
        }
        if br.rate_a == 0.0 {
            diagnostics.push(Diagnostic::ZeroRating {
                from_bus: f,
                to_bus: t,
                name: br.name.clone(),
            });
        }
    }
    diagnostics
}
