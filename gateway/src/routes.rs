use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

use crate::{analyze, AnalyzeConfig, AppState};

pub fn router(metric_handle: PrometheusHandle) -> Router<AppState> {
  Router::new()
    .route("/", get(root))
    .route("/status/v1", get(status_v1))
    .route(
      "/metrics",
      get(move || {
        let handle = metric_handle.clone();
        async move { handle.render() }
      }),
    )
    .merge(analyze::router())
}

async fn root() -> String {
  format!("Sightline API {}", env!("CARGO_PKG_VERSION"))
}

async fn status_v1(State(options): State<AnalyzeConfig>) -> Json<serde_json::Value> {
  Json(json!({
    "version": env!("CARGO_PKG_VERSION"),
    "analyze": {
      "draw_backend": options.draw_backend,
      "translate_labels": options.translate_labels,
      "validate_boxes": options.validate_boxes,
      "target_language": options.target_language,
    }
  }))
}
