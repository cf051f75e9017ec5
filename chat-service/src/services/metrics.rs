use crate::models::ReplySource;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;

/// Install the global Prometheus recorder. Call once, from the binary.
pub fn init_metrics() -> Result<PrometheusHandle, AppError> {
    PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })
}

/// Count a reply by where it came from.
pub fn record_reply(source: ReplySource) {
    counter!("chat_replies_total", "source" => source.as_str()).increment(1);
}
