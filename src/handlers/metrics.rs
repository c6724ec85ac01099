use prometheus::{Encoder, TextEncoder};
use tracing::error;

use crate::error::ApiError;

pub async fn metrics_handler() -> Result<String, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        ApiError::Internal("Failed to encode metrics")
    })?;
    String::from_utf8(buffer).map_err(|e| {
        error!(error = %e, "Metrics output is not UTF-8");
        ApiError::Internal("Failed to encode metrics")
    })
}
