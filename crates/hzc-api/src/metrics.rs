//! Prometheus metrics for request traffic and review activity.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hzc_srs::Track;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ],
    )?;

    Ok(builder.install_recorder()?)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

static UUID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").ok()
});

/// Replace ids in a path with `:id` so label cardinality stays bounded.
///
/// Card and category ids are usually UUIDs, but imported ones can be any
/// string, so every segment after a collection name is treated as an id.
fn normalize_path(path: &str) -> String {
    let path = match UUID_RE.as_ref() {
        Some(re) => re.replace_all(path, ":id").into_owned(),
        None => path.to_string(),
    };

    let mut segments: Vec<&str> = path.split('/').collect();
    for i in 1..segments.len() {
        let parent = segments[i - 1];
        let is_id = match parent {
            "flashcards" => segments[i] != "translate",
            "categories" | "sessions" => true,
            // /reviews/{track}/{card_id}
            _ => {
                i >= 3
                    && segments[i - 2] == "reviews"
                    && !matches!(segments[i], "sessions" | "due")
            }
        };
        if is_id && !segments[i].is_empty() {
            segments[i] = ":id";
        }
    }
    segments.join("/")
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Count a recorded review outcome
pub fn record_review(track: Track, successful: bool) {
    let outcome = if successful { "success" } else { "failure" };

    counter!(
        "reviews_recorded_total",
        "track" => track.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
