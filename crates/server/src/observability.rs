use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static KV_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "kv_requests_total",
        "Record commands handled, by command and outcome",
        &["command", "outcome"]
    )
    .expect("register kv_requests_total")
});

pub static SLACK_ALERTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "slack_alerts_total",
        "Slack alerts attempted, by outcome",
        &["outcome"]
    )
    .expect("register slack_alerts_total")
});

pub fn record_command(command: &str, outcome: &str) {
    KV_REQUESTS_TOTAL.with_label_values(&[command, outcome]).inc();
}

pub fn record_alert(delivered: bool) {
    let outcome = if delivered { "delivered" } else { "failed" };
    SLACK_ALERTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        record_command("CREATE", "ok");
        record_alert(false);
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("kv_requests_total"));
        assert!(body.contains("slack_alerts_total"));
    }
}
