//! `gwplace` command-line entry point.

use clap::{Parser, Subcommand};
use gwplace_dem::{ElevationGrid, DEFAULT_LOS_SAMPLES};
use gwplace_runner::{
    format_los_text, format_solve_json, format_solve_text, point_from_args, run_los, run_solve,
    OutputFormat, RunConfig, RunnerError, SolveOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gwplace", author, version, about = "LoRaWAN gateway placement", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Place gateways so every end device is covered.
    Solve {
        /// Elevation CSV (`lat,lng,alt`).
        #[arg(long)]
        elevation: PathBuf,

        /// Network GeoJSON with gateway and end_device points.
        #[arg(long)]
        network: PathBuf,

        /// YAML run configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        /// attractor, kmeans, clustering or annealing.
        #[arg(long)]
        optimizer: Option<String>,

        /// Iteration budget (proposals per temperature for annealing).
        #[arg(long)]
        iterations: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Maximum link range in meters.
        #[arg(long = "max-range")]
        max_range: Option<f64>,

        /// Require Fresnel-zone clearance.
        #[arg(long)]
        fresnel: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Write the solved network as GeoJSON.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check line of sight between two points.
    Los {
        /// Elevation CSV (`lat,lng,alt`).
        #[arg(long)]
        elevation: PathBuf,

        /// LAT LNG [HEIGHT]
        #[arg(long, num_args = 2..=3, value_names = ["LAT", "LNG", "HEIGHT"], allow_negative_numbers = true, required = true)]
        from: Vec<f64>,

        /// LAT LNG [HEIGHT]
        #[arg(long, num_args = 2..=3, value_names = ["LAT", "LNG", "HEIGHT"], allow_negative_numbers = true, required = true)]
        to: Vec<f64>,

        /// Segments along the path.
        #[arg(long, default_value_t = DEFAULT_LOS_SAMPLES)]
        samples: usize,

        /// YAML run configuration (its `link` section sets Fresnel factor and band).
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> gwplace_runner::Result<()> {
    match command {
        Command::Solve {
            elevation,
            network,
            config,
            optimizer,
            iterations,
            seed,
            max_range,
            fresnel,
            output,
            out,
        } => {
            let opts = SolveOptions {
                elevation,
                network,
                config,
                optimizer,
                iterations,
                seed,
                max_range_m: max_range,
                fresnel,
                out,
            };
            let outcome = run_solve(&opts)?;
            match output {
                OutputFormat::Text => print!("{}", format_solve_text(&outcome)),
                OutputFormat::Json => println!("{}", format_solve_json(&outcome)?),
            }
        }
        Command::Los {
            elevation,
            from,
            to,
            samples,
            config,
            output,
        } => {
            let link = match config {
                Some(path) => RunConfig::from_path(path)?.link,
                None => RunConfig::default().link,
            };
            let from = point_from_args(&from)?;
            let to = point_from_args(&to)?;
            let grid = ElevationGrid::from_csv_path(&elevation)?;
            let report = run_los(&grid, from, to, samples, &link)?;
            match output {
                OutputFormat::Text => print!("{}", format_los_text(&report)),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&report).map_err(RunnerError::from)?
                ),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    gwplace_metrics::describe_metrics();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
