//! The `solve` command: load terrain and network, optimize, export.

use crate::{Result, RunConfig, RunnerError};
use gwplace_dem::ElevationGrid;
use gwplace_network::{FeatureCollection, Network};
use gwplace_optimize::{OptimizationReport, Optimizer};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Inputs and command-line overrides for one `solve` run.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// `lat,lng,alt` elevation CSV.
    pub elevation: PathBuf,
    /// GeoJSON feature collection of gateways and end devices.
    pub network: PathBuf,
    /// Optional YAML run configuration.
    pub config: Option<PathBuf>,
    /// Optimizer name overriding the configured one.
    pub optimizer: Option<String>,
    /// Iteration budget override.
    pub iterations: Option<usize>,
    /// Seed override.
    pub seed: Option<u64>,
    /// Maximum link range override (meters).
    pub max_range_m: Option<f64>,
    /// Force Fresnel clearance on.
    pub fresnel: bool,
    /// Where to write the solved network as GeoJSON.
    pub out: Option<PathBuf>,
}

impl SolveOptions {
    /// Load the configuration file (if any) and apply the overrides.
    pub fn resolve_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_path(path)?,
            None => RunConfig::default(),
        };

        if let Some(name) = &self.optimizer {
            config.select_optimizer(name)?;
        }
        if let Some(iterations) = self.iterations {
            if iterations == 0 {
                return Err(RunnerError::InvalidArgument(
                    "--iterations must be at least 1".into(),
                ));
            }
            config.optimizer.set_max_iterations(iterations);
        }
        if let Some(seed) = self.seed {
            config.optimizer.set_seed(seed);
        }
        if let Some(max_range_m) = self.max_range_m {
            config.link.max_range_m = max_range_m;
        }
        if self.fresnel {
            config.link.fresnel = true;
        }

        config.link.validate()?;
        config.optimizer.validate()?;
        Ok(config)
    }
}

/// A solved network and the optimizer's report.
#[derive(Debug)]
pub struct SolveOutcome {
    pub report: OptimizationReport,
    pub network: Network,
}

/// Run the whole pipeline.
pub fn run_solve(opts: &SolveOptions) -> Result<SolveOutcome> {
    let config = opts.resolve_config()?;

    let grid = Arc::new(ElevationGrid::from_csv_path(&opts.elevation)?);
    let fc = FeatureCollection::from_path(&opts.network)?;
    let mut network = Network::from_feature_collection(&fc, grid, config.link.clone())?;
    network.set_histogram_bin(config.histogram_bin_m)?;

    let report = {
        let mut optimizer = Optimizer::new(&mut network, config.optimizer)?;
        info!(optimizer = optimizer.name(), "Starting optimization");
        optimizer.run()
    };

    if let Some(out) = &opts.out {
        network.to_feature_collection().write_to_path(out)?;
        info!(path = %out.display(), "Wrote solved network");
    }

    Ok(SolveOutcome { report, network })
}

/// Human-readable summary of a solved network.
pub fn format_solve_text(outcome: &SolveOutcome) -> String {
    let report = &outcome.report;
    let network = &outcome.network;
    let total = report.connected + report.unconnected;

    let mut out = String::new();
    let _ = writeln!(out, "Optimizer:       {}", report.optimizer);
    let _ = writeln!(
        out,
        "Converged:       {}",
        if report.converged { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Iterations:      {}", report.iterations);
    let _ = writeln!(
        out,
        "Gateways:        {} ({} added)",
        report.gateways, report.gateways_added
    );
    let _ = writeln!(out, "Connected:       {} / {}", report.connected, total);
    let _ = writeln!(out, "Total distance:  {:.1} m", report.total_distance);
    let _ = writeln!(out, "Longest link:    {:.1} m", network.max_distance());

    for gw in network.gateways() {
        let _ = writeln!(
            out,
            "  {:<12} {:>10.6} {:>11.6} {:>5.1} m  {} devices",
            gw.id,
            gw.location.lat,
            gw.location.lng,
            gw.location.alt,
            gw.num_connected()
        );
    }
    out
}

/// Machine-readable summary: the report plus final gateway positions.
pub fn format_solve_json(outcome: &SolveOutcome) -> Result<String> {
    let gateways: Vec<_> = outcome
        .network
        .gateways()
        .iter()
        .map(|gw| {
            serde_json::json!({
                "id": gw.id,
                "lat": gw.location.lat,
                "lng": gw.location.lng,
                "height": gw.location.alt,
                "connected_devices": gw.num_connected(),
            })
        })
        .collect();
    let value = serde_json::json!({
        "report": outcome.report,
        "max_distance": outcome.network.max_distance(),
        "gateways": gateways,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
