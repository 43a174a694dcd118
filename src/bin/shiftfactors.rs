use anyhow::Result;
use clap::{Parser, ValueEnum};
use shiftfactors::debug::format_shift_factors;
use shiftfactors::{
    build_network, load_case, make_shift_factors, BranchClass, DenseLU, LinearSolver, SFOpt,
    SFOptBuilder, TableOpt, REF,
};
use spsolve::rlu::RLU;
use std::path::PathBuf;

/// DC shift factors (PTDF) for an hour-ending PSS/E network export.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path prefix of the branch tables, e.g. `data/case` for
    /// `data/case_Ln_001.csv` and `data/case_Xf_001.csv`.
    #[arg(required = true)]
    prefix: PathBuf,

    /// PSS/E raw file holding the bus data.
    #[arg(long, required = true)]
    raw: PathBuf,

    /// Hour ending of the snapshot.
    #[arg(long, default_value_t = 1)]
    hour: u32,

    /// Bus type code of the reference bus.
    #[arg(long, default_value_t = REF)]
    ref_type: usize,

    /// Linear solver used to invert the bus susceptance matrix.
    #[arg(long, value_enum, default_value_t = Solver::Rlu)]
    solver: Solver,

    /// Read only the line, transformer and bus data, skipping the
    /// settlement point, generator, hub and load tables.
    #[arg(long, default_value_t = false)]
    network_only: bool,

    /// Number of shift factor rows to print.
    #[arg(long, default_value_t = 10)]
    branches: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Solver {
    /// Sparse LU.
    Rlu,
    /// Dense LU with partial pivoting.
    Dense,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_level(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(_) => {
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(2);
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let tables = if cli.network_only {
        TableOpt::network()
    } else {
        TableOpt::default()
    };
    let case = load_case(&cli.prefix, &cli.raw, cli.hour, &tables)?;

    let opt: SFOpt = SFOptBuilder::default().reference_type(cli.ref_type).build()?;

    let linsol: Box<dyn LinearSolver> = match cli.solver {
        Solver::Rlu => Box::new(RLU::default()),
        Solver::Dense => Box::new(DenseLU::default()),
    };

    let net = build_network(&case.line, &case.transformer, &case.bus, &opt)?;
    let sf = make_shift_factors(&net, &opt, linsol.as_ref())?;

    for d in &sf.diagnostics {
        println!("warning: {}", d);
    }
    println!("reference bus: {}", sf.ref_bus);

    let (nl, nb) = sf.shift_factor.shape();
    println!("shift factors: {} branches x {} buses", nl, nb);

    let labels: Vec<String> = sf
        .branch
        .iter()
        .map(|br| {
            let class = match br.class {
                BranchClass::Line => "Ln",
                BranchClass::Transformer => "Xf",
            };
            format!("{} {}-{}", class, br.from_bus, br.to_bus)
        })
        .collect();
    print!("{}", format_shift_factors(&sf.shift_factor, &labels, cli.branches));

    Ok(())
}
