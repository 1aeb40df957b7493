mod backend;
mod check;
mod export;
mod generator;
mod stats;
mod sweep;

use anyhow::Result;
use backend::SolverKind;
use clap::{Args, Parser, Subcommand};
use qsat_core::{CardinalityMethod, EncodingConfig, ParityEncoder, XorEncoding};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qsat", about = "SAT-based failure checks for surface-code error models")]
struct Cli {
    /// Log encoding details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct EncodingArgs {
    /// Parity encoding: chain_tseitin, tree_tseitin or native_xor
    #[arg(long, default_value_t = XorEncoding::ChainTseitin)]
    method: XorEncoding,

    /// Largest parity arity encoded by blocking clauses
    #[arg(long, default_value_t = ParityEncoder::DEFAULT_BRUTE_FORCE_LIMIT)]
    base_len: usize,

    /// Error budget encoding: totalizer or seqcounter
    #[arg(long, default_value_t = CardinalityMethod::Totalizer)]
    cardinality: CardinalityMethod,

    /// Require a triggered observable to use an error from every detector column
    #[arg(long)]
    connectivity: bool,

    /// Solver back end: varisat, or cryptominisat for native_xor
    #[arg(long, default_value_t = SolverKind::Varisat)]
    solver: SolverKind,
}

impl From<EncodingArgs> for EncodingConfig {
    fn from(args: EncodingArgs) -> Self {
        EncodingConfig {
            xor_encoding: args.method,
            brute_force_limit: args.base_len,
            cardinality: args.cardinality,
            connectivity: args.connectivity,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether at most K errors can cause an undetected logical error
    Check {
        #[arg(short, long)]
        dem: PathBuf,
        #[arg(short = 'k', long)]
        max_errors: usize,
        #[command(flatten)]
        encoding: EncodingArgs,
        /// Write the failing pattern as a .b8 record
        #[arg(long)]
        witness_out: Option<PathBuf>,
    },
    /// Run every combination of models, budgets and encodings in parallel
    Sweep {
        #[arg(short, long, num_args = 1.., required = true)]
        dem: Vec<PathBuf>,
        #[arg(short = 'k', long, num_args = 1.., required = true)]
        max_errors: Vec<usize>,
        #[arg(long, num_args = 1.., default_values_t = [XorEncoding::ChainTseitin, XorEncoding::TreeTseitin])]
        methods: Vec<XorEncoding>,
        #[arg(long, num_args = 1.., default_values_t = [ParityEncoder::DEFAULT_BRUTE_FORCE_LIMIT])]
        base_lens: Vec<usize>,
        #[arg(long, default_value_t = CardinalityMethod::Totalizer)]
        cardinality: CardinalityMethod,
        #[arg(long)]
        connectivity: bool,
        #[arg(long, default_value_t = SolverKind::Varisat)]
        solver: SolverKind,
        #[arg(short, long, default_value = "perf.csv")]
        out: PathBuf,
    },
    /// Find the lightest undetected logical error
    MinWeight {
        #[arg(short, long)]
        dem: PathBuf,
        #[command(flatten)]
        encoding: EncodingArgs,
        #[arg(long)]
        witness_out: Option<PathBuf>,
    },
    /// Write the constraint set in DIMACS form
    Export {
        #[arg(short, long)]
        dem: PathBuf,
        #[arg(short = 'k', long)]
        max_errors: usize,
        #[command(flatten)]
        encoding: EncodingArgs,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Replay error patterns from a .b8 file against a model
    Verify {
        #[arg(short, long)]
        dem: PathBuf,
        #[arg(short, long)]
        errors: PathBuf,
        /// Reject patterns heavier than this
        #[arg(short = 'k', long)]
        max_errors: Option<usize>,
    },
    /// Generate a phenomenological repetition-code memory model
    Gen {
        #[arg(long, default_value_t = 3)]
        distance: u32,
        #[arg(long, default_value_t = 3)]
        rounds: u32,
        #[arg(long, default_value_t = 0.001)]
        p: f64,
        #[arg(long, default_value = "bench.dem")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            dem,
            max_errors,
            encoding,
            witness_out,
        } => {
            check::run_check(
                &dem,
                max_errors,
                &encoding.into(),
                encoding.solver,
                witness_out.as_deref(),
            )?;
        }
        Commands::Sweep {
            dem,
            max_errors,
            methods,
            base_lens,
            cardinality,
            connectivity,
            solver,
            out,
        } => {
            let plan = sweep::SweepPlan {
                dems: dem,
                max_errors,
                methods,
                base_lens,
                cardinality,
                connectivity,
                solver,
            };
            sweep::run_sweep(&plan, &out)?;
        }
        Commands::MinWeight {
            dem,
            encoding,
            witness_out,
        } => {
            check::run_min_weight(&dem, &encoding.into(), encoding.solver, witness_out.as_deref())?;
        }
        Commands::Export {
            dem,
            max_errors,
            encoding,
            out,
        } => {
            export::run_export(&dem, max_errors, &encoding.into(), &out)?;
        }
        Commands::Verify {
            dem,
            errors,
            max_errors,
        } => {
            check::run_verify(&dem, &errors, max_errors)?;
        }
        Commands::Gen {
            distance,
            rounds,
            p,
            out,
        } => {
            generator::generate_repetition_dem(&out, distance, rounds, p)?;
        }
    }
    Ok(())
}
