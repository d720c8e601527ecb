//! Metrics for the gateway placement solver.
//!
//! Every metric emitted by gwplace is declared once here as a [`Metric`]
//! constant so names cannot drift between the code that records them and the
//! code that describes them. The `metrics` crate is re-exported; without an
//! installed recorder all recording calls are no-ops.
//!
//! # Example
//!
//! ```rust
//! use gwplace_metrics::{describe_metrics, metric_defs, OPTIMIZER_LABEL};
//!
//! describe_metrics();
//!
//! metrics::counter!(metric_defs::CONNECT_CALLS.name).increment(1);
//! metrics::counter!(metric_defs::OPTIMIZER_ITERATIONS.name, OPTIMIZER_LABEL => "attractor")
//!     .increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// Label key identifying which optimizer recorded a metric.
pub const OPTIMIZER_LABEL: &str = "optimizer";

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use gwplace_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const SWEEPS: Metric = Metric::counter("gwplace.example.sweeps")
///     .with_description("Completed sweeps")
///     .with_unit(Unit::Count)
///     .with_labels(&["optimizer"]);
///
/// assert_eq!(SWEEPS.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "gwplace.network.connect_calls").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// Unit of measurement, if any.
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Declares a counter.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// Declares a gauge.
    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    /// Declares a histogram.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions.
pub mod metric_defs {
    use super::{Metric, Unit, OPTIMIZER_LABEL};

    // ========================================================================
    // Connectivity Engine
    // ========================================================================

    /// Number of `Network::connect` evaluations.
    pub const CONNECT_CALLS: Metric = Metric::counter("gwplace.network.connect_calls")
        .with_description("Connectivity evaluations performed")
        .with_unit(Unit::Count);

    /// Wall time of one connectivity evaluation.
    pub const CONNECT_DURATION: Metric = Metric::histogram("gwplace.network.connect_duration_us")
        .with_description("Time spent in one connectivity evaluation")
        .with_unit(Unit::Microseconds);

    /// End devices with a gateway after the last evaluation.
    pub const CONNECTED_DEVICES: Metric = Metric::gauge("gwplace.network.connected_devices")
        .with_description("End devices assigned to a gateway")
        .with_unit(Unit::Count);

    /// End devices without a gateway after the last evaluation.
    pub const UNCONNECTED_DEVICES: Metric = Metric::gauge("gwplace.network.unconnected_devices")
        .with_description("End devices with no reachable gateway")
        .with_unit(Unit::Count);

    /// Sum of link distances after the last evaluation, in meters.
    pub const TOTAL_DISTANCE: Metric = Metric::gauge("gwplace.network.total_distance_m")
        .with_description("Sum of assigned link distances in meters");

    // ========================================================================
    // Optimizers
    // ========================================================================

    /// Optimizer iterations.
    ///
    /// Labels: optimizer
    pub const OPTIMIZER_ITERATIONS: Metric = Metric::counter("gwplace.optimizer.iterations")
        .with_description("Optimizer iterations executed")
        .with_unit(Unit::Count)
        .with_labels(&[OPTIMIZER_LABEL]);

    /// Gateways inserted by an optimizer.
    ///
    /// Labels: optimizer
    pub const GATEWAYS_ADDED: Metric = Metric::counter("gwplace.optimizer.gateways_added")
        .with_description("Gateways inserted by an optimizer")
        .with_unit(Unit::Count)
        .with_labels(&[OPTIMIZER_LABEL]);

    /// Proposals accepted by simulated annealing.
    ///
    /// Labels: optimizer
    pub const MOVES_ACCEPTED: Metric = Metric::counter("gwplace.optimizer.moves_accepted")
        .with_description("Gateway moves kept by an optimizer")
        .with_unit(Unit::Count)
        .with_labels(&[OPTIMIZER_LABEL]);

    /// Moves undone because they reduced coverage.
    ///
    /// Labels: optimizer
    pub const MOVES_REVERTED: Metric = Metric::counter("gwplace.optimizer.moves_reverted")
        .with_description("Gateway moves undone by an optimizer")
        .with_unit(Unit::Count)
        .with_labels(&[OPTIMIZER_LABEL]);

    /// Every declared metric.
    pub const ALL: &[Metric] = &[
        CONNECT_CALLS,
        CONNECT_DURATION,
        CONNECTED_DEVICES,
        UNCONNECTED_DEVICES,
        TOTAL_DISTANCE,
        OPTIMIZER_ITERATIONS,
        GATEWAYS_ADDED,
        MOVES_ACCEPTED,
        MOVES_REVERTED,
    ];
}

/// Register descriptions for every metric in [`metric_defs::ALL`].
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_builder() {
        const M: Metric = Metric::gauge("gwplace.test")
            .with_description("desc")
            .with_unit(Unit::Count)
            .with_labels(&["a"]);
        assert_eq!(M.name, "gwplace.test");
        assert_eq!(M.kind, MetricKind::Gauge);
        assert_eq!(M.description, "desc");
        assert_eq!(M.unit, Some(Unit::Count));
        assert_eq!(M.labels, &["a"]);
    }

    #[test]
    fn test_metric_names_are_unique_and_namespaced() {
        let mut seen = HashSet::new();
        for metric in metric_defs::ALL {
            assert!(metric.name.starts_with("gwplace."), "{}", metric.name);
            assert!(!metric.description.is_empty(), "{}", metric.name);
            assert!(seen.insert(metric.name), "duplicate {}", metric.name);
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MetricKind::Histogram.to_string(), "histogram");
        assert_eq!(metric_defs::CONNECT_CALLS.kind, MetricKind::Counter);
    }

    #[test]
    fn test_describe_without_recorder() {
        describe_metrics();
    }
}
