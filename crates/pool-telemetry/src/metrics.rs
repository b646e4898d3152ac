//! Prometheus metrics for the collateral pool.
//!
//! All metrics follow the naming convention: `pool_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: operations, rejections, rollbacks, redeemed backing asset
//! - **Gauge**: pool totals after the last committed operation
//! - **Histogram**: operation latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // OPERATION METRICS
    // =========================================================================

    /// Operations by kind and outcome
    pub static ref POOL_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("pool_operations_total", "Pool operations by kind and outcome"),
        &["operation", "outcome"]  // outcome: ok/rejected
    ).expect("metric creation failed");

    /// Rejected operations by error family
    pub static ref POOL_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("pool_rejections_total", "Rejected pool operations by error family"),
        &["operation", "family"]  // family: validation/invariant/collaborator/authorization
    ).expect("metric creation failed");

    /// Operations rolled back after a collaborator failure
    pub static ref POOL_ROLLBACKS: Counter = Counter::new(
        "pool_rollbacks_total",
        "Operations rolled back after a mutation"
    ).expect("metric creation failed");

    /// Backing asset redeemed through self-close exits
    pub static ref POOL_SELF_CLOSE_REDEEMED: Counter = Counter::new(
        "pool_self_close_redeemed_total",
        "Backing asset redeemed by self-close exits"
    ).expect("metric creation failed");

    /// Operation latency
    pub static ref POOL_OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pool_operation_duration_seconds",
            "Time spent in pool operations"
        ).buckets(exponential_buckets(0.00001, 2.0, 15).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // POOL TOTALS
    // =========================================================================

    /// Collateral attributable to the pool
    pub static ref POOL_TOTAL_COLLATERAL: Gauge = Gauge::new(
        "pool_total_collateral",
        "Collateral attributable to the pool"
    ).expect("metric creation failed");

    /// Backing-asset fees held
    pub static ref POOL_FEE_RESERVE: Gauge = Gauge::new(
        "pool_fee_reserve",
        "Backing-asset fee income held for holders"
    ).expect("metric creation failed");

    /// Outstanding holder fee debt
    pub static ref POOL_FEE_DEBT: Gauge = Gauge::new(
        "pool_fee_debt",
        "Sum of holder fee debt"
    ).expect("metric creation failed");

    /// Shares outstanding
    pub static ref POOL_SHARE_SUPPLY: Gauge = Gauge::new(
        "pool_share_supply",
        "Pool shares outstanding"
    ).expect("metric creation failed");
}

/// Handle keeping the registry alive.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Operations
        Box::new(POOL_OPERATIONS.clone()),
        Box::new(POOL_REJECTIONS.clone()),
        Box::new(POOL_ROLLBACKS.clone()),
        Box::new(POOL_SELF_CLOSE_REDEEMED.clone()),
        Box::new(POOL_OPERATION_DURATION.clone()),
        // Totals
        Box::new(POOL_TOTAL_COLLATERAL.clone()),
        Box::new(POOL_FEE_RESERVE.clone()),
        Box::new(POOL_FEE_DEBT.clone()),
        Box::new(POOL_SHARE_SUPPLY.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Count a committed operation.
pub fn record_success(operation: &str) {
    POOL_OPERATIONS.with_label_values(&[operation, "ok"]).inc();
}

/// Count a rejected operation under its error family.
pub fn record_rejection(operation: &str, family: &str) {
    POOL_OPERATIONS
        .with_label_values(&[operation, "rejected"])
        .inc();
    POOL_REJECTIONS.with_label_values(&[operation, family]).inc();
}

/// Publish pool totals. Amounts are exported as floats.
pub fn set_pool_totals(collateral: u128, fee_reserve: u128, fee_debt: u128, supply: u128) {
    POOL_TOTAL_COLLATERAL.set(collateral as f64);
    POOL_FEE_RESERVE.set(fee_reserve as f64);
    POOL_FEE_DEBT.set(fee_debt as f64);
    POOL_SHARE_SUPPLY.set(supply as f64);
}

/// Timer guard observing an operation's latency on drop.
pub struct OperationTimer {
    operation: &'static str,
    start: std::time::Instant,
}

impl OperationTimer {
    /// Start timing `operation`.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        POOL_OPERATION_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
