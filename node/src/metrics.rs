//! # Prometheus Metrics
//!
//! Scraped at `/metrics` on the metrics listener. All metrics live in a
//! dedicated [`prometheus::Registry`] under the `sismo` prefix.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct VerifierMetrics {
    registry: Registry,
    /// Every verification attempt, successful or not.
    pub verifications_total: IntCounter,
    /// Rejections, labelled with the error kind.
    pub verification_failures_total: IntCounterVec,
    /// Wall time of a full verification.
    pub verification_duration_seconds: Histogram,
}

impl VerifierMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("sismo".into()), None)?;

        let verifications_total =
            IntCounter::new("verifications_total", "Total number of verification attempts")?;
        registry.register(Box::new(verifications_total.clone()))?;

        let verification_failures_total = IntCounterVec::new(
            Opts::new(
                "verification_failures_total",
                "Total number of rejected responses, by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(verification_failures_total.clone()))?;

        let verification_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "verification_duration_seconds",
                "Time spent verifying one response, in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0]),
        )?;
        registry.register(Box::new(verification_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            verifications_total,
            verification_failures_total,
            verification_duration_seconds,
        })
    }

    /// Record one verification outcome. `failure` is the error kind.
    pub fn observe(&self, elapsed: Duration, failure: Option<&str>) {
        self.verifications_total.inc();
        self.verification_duration_seconds.observe(elapsed.as_secs_f64());
        if let Some(kind) = failure {
            self.verification_failures_total.with_label_values(&[kind]).inc();
        }
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<VerifierMetrics>;

/// `GET /metrics`
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
