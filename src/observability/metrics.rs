use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Refresh cycle metrics
    pub refresh_attempts: IntCounterVec,
    pub refresh_failures: IntCounterVec,
    pub refresh_skipped: IntCounterVec,
    pub refresh_duration: HistogramVec,

    // Interceptor metrics
    pub requests_intercepted: IntCounter,
    pub preemptive_refreshes: IntCounter,
    pub auth_retries: IntCounter,

    // Token state
    pub token_expiry_unix: IntGauge,
    pub token_held: IntGauge,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenkeeper".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Refresh
            refresh_attempts: IntCounterVec::new(Opts::new("refresh_attempts_total", "Refresh cycles started by trigger"), &["trigger"]).unwrap(),
            refresh_failures: IntCounterVec::new(Opts::new("refresh_failures_total", "Refresh failures by reason"), &["reason"]).unwrap(),
            refresh_skipped: IntCounterVec::new(Opts::new("refresh_skipped_total", "Refresh cycles skipped by reason"), &["reason"]).unwrap(),
            refresh_duration: HistogramVec::new(HistogramOpts::new("refresh_duration_seconds", "Refresh cycle duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["trigger"]).unwrap(),

            // Interceptor
            requests_intercepted: IntCounter::new("requests_intercepted_total", "Outgoing calls passed through the pipeline").unwrap(),
            preemptive_refreshes: IntCounter::new("preemptive_refreshes_total", "Pre-send refreshes of a near-expired token").unwrap(),
            auth_retries: IntCounter::new("auth_retries_total", "Calls resubmitted after an authorization failure").unwrap(),

            // Token state
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry timestamp of the held token").unwrap(),
            token_held: IntGauge::new("token_held", "1 while a token is held").unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.refresh_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_failures.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_skipped.clone())).unwrap();
        reg.register(Box::new(metrics.refresh_duration.clone())).unwrap();
        reg.register(Box::new(metrics.requests_intercepted.clone())).unwrap();
        reg.register(Box::new(metrics.preemptive_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.auth_retries.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.token_held.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
