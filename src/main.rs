use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use log::{debug, LevelFilter};
use nanosat::{dimacs, Outcome, Solver};

/// Decides satisfiability of a DIMACS CNF formula.
#[derive(Parser, Debug)]
#[command(name = "nanosat", version, about)]
struct Cli {
    /// DIMACS CNF file; standard input when omitted
    input: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print search counters after the result
    #[arg(long)]
    stats: bool,
}

fn main() -> nanosat::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input: Box<dyn BufRead> = match cli.input {
        Some(ref path) => {
            debug!("Reading {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    let formula = dimacs::parse(input)?;

    let mut solver = Solver::new(&formula);
    match solver.solve() {
        Outcome::Satisfiable(model) => {
            println!("Sat");
            println!();
            println!("{}", model);
        }
        Outcome::Unsatisfiable => println!("Unsat"),
    }

    if cli.stats {
        let stats = solver.stats();
        println!("c decisions  {}", stats.decisions);
        println!("c implied    {}", stats.implied);
        println!("c conflicts  {}", stats.conflicts);
        println!("c backtracks {}", stats.backtracks);
    }
    Ok(())
}

// RUST_LOG takes precedence over -v.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
