use std::path::PathBuf;

use clap::{Parser, Subcommand};
use client_recon::matching::MatchConfig;
use client_recon::pipeline;
use client_recon::{ReconError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Reconcile(args) => execute_reconcile(args),
    }
}

fn execute_reconcile(args: ReconcileArgs) -> Result<()> {
    for path in [&args.appointments, &args.roster, &args.source_a, &args.source_b] {
        if !path.exists() {
            return Err(ReconError::MissingInput(path.clone()));
        }
    }

    let config = MatchConfig {
        threshold: args.threshold,
    };
    let summary = pipeline::reconcile_files(
        &args.appointments,
        &args.roster,
        &args.source_a,
        &args.source_b,
        &args.output,
        &config,
    )?;

    println!("Unique clients exported: {}", summary.clients);
    println!("Output file: {}", args.output.display());
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| ReconError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile client identity and status across record sources into one master table."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the deduplicated master client table from four workbooks.
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args)]
struct ReconcileArgs {
    /// Appointment/billing workbook (Client ID, Insurance ID, Appt. Date).
    #[arg(long)]
    appointments: PathBuf,

    /// Client roster workbook (Client ID, Client, Status).
    #[arg(long)]
    roster: PathBuf,

    /// First external status workbook (Client, Insurance ID, Status).
    #[arg(long)]
    source_a: PathBuf,

    /// Second external status workbook (Client, Insurance ID, Status).
    #[arg(long)]
    source_b: PathBuf,

    /// Output workbook path.
    #[arg(long)]
    output: PathBuf,

    /// Minimum fuzzy name score (0-100) accepted as a match.
    #[arg(long, default_value_t = 90)]
    threshold: u32,
}
