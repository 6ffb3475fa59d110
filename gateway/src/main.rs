use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use ab_glyph::FontArc;
use anyhow::Result;
use axum::{extract::FromRef, Router};
use http::{header, request, HeaderValue, Method, Request};
use hyper::Body;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::{
  compression::CompressionLayer,
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use tracing_subscriber::prelude::*;

use crate::{
  analyze::{AnalyzeOptions, DrawBackend},
  draw::AnnotatorInner,
  services::{
    detect::LabelDetectorInner, speech::SpeechSynthesizerInner, translate::TranslatorInner,
  },
};

mod analyze;
mod draw;
mod error;
mod images;
mod routes;
mod services;

pub type HttpClient = reqwest::Client;
pub type LabelDetector = Arc<LabelDetectorInner>;
pub type Translator = Arc<TranslatorInner>;
pub type SpeechSynthesizer = Arc<SpeechSynthesizerInner>;
pub type Annotator = Arc<AnnotatorInner>;
pub type AnalyzeConfig = Arc<AnalyzeOptions>;

#[derive(Clone, FromRef)]
pub struct AppState {
  detector: LabelDetector,
  translator: Translator,
  speech: SpeechSynthesizer,
  annotator: Annotator,
  options: AnalyzeConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
  // initialize tracing
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "sightline_gateway=debug,tower_http=debug".into()),
    ))
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::debug!("starting sightline gateway");

  let metric_handle = PrometheusBuilder::new().install_recorder()?;

  // http client, shared by all upstream service clients
  let http = HttpClient::new();

  // upstream service clients
  let detector = Arc::new(LabelDetectorInner::new(
    http.clone(),
    env::var("DETECTOR_BASE")?,
    env::var("DETECTOR_SECRET")?,
  ));
  let translator = Arc::new(TranslatorInner::new(
    http.clone(),
    env::var("TRANSLATOR_BASE")?,
    env::var("TRANSLATOR_SECRET")?,
  ));
  let speech = Arc::new(SpeechSynthesizerInner::new(
    http,
    env::var("SPEECH_BASE")?,
    env::var("SPEECH_SECRET")?,
    env::var("SPEECH_VOICE").unwrap_or_else(|_| "Kazuha".into()),
    env::var("SPEECH_ENGINE").unwrap_or_else(|_| "neural".into()),
  ));

  let options = Arc::new(AnalyzeOptions {
    draw_backend: match env::var("DRAW_BACKEND") {
      Ok(backend) => backend.parse()?,
      Err(_) => DrawBackend::Vector,
    },
    translate_labels: env_flag("TRANSLATE_LABELS", true)?,
    validate_boxes: env_flag("VALIDATE_BOXES", true)?,
    source_language: env::var("SOURCE_LANGUAGE").unwrap_or_else(|_| "en".into()),
    target_language: env::var("TARGET_LANGUAGE").unwrap_or_else(|_| "ja".into()),
  });

  let font = caption_font();
  if font.is_none() {
    tracing::warn!("no caption font loaded, captions are drawn without text");
  }
  let annotator = Arc::new(AnnotatorInner::new(options.draw_backend, font));

  let state = AppState {
    detector,
    translator,
    speech,
    annotator,
    options,
  };

  let router = Router::new()
    .merge(routes::router(metric_handle))
    .with_state(state)
    .layer(
      CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(AllowOrigin::predicate(
          |origin: &HeaderValue, _request_parts: &request::Parts| {
            let origin = origin.as_bytes();
            origin == b"http://localhost"
              || origin == b"https://localhost"
              || origin.starts_with(b"http://localhost:")
              || origin.starts_with(b"https://localhost:")
          },
        ))
        .allow_credentials(true)
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60) * 5),
    )
    .layer(
      TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::debug_span!(
          "request",
          id = %cuid::cuid().unwrap(),
          method = %request.method(),
          uri = %request.uri(),
          version = ?request.version()
        )
      }),
    )
    .layer(CompressionLayer::new());

  let port = match env::var("PORT") {
    Ok(port) => port.parse()?,
    Err(_) => 3000,
  };
  let addr = SocketAddr::from(([0, 0, 0, 0], port));
  tracing::info!("listening on http://localhost:{}", port);
  axum::Server::bind(&addr)
    .serve(router.into_make_service())
    .await?;

  Ok(())
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
  match env::var(name) {
    Ok(value) => Ok(value.parse()?),
    Err(_) => Ok(default),
  }
}

fn caption_font() -> Option<FontArc> {
  let path = env::var("CAPTION_FONT").ok()?;
  match std::fs::read(&path) {
    Ok(data) => match FontArc::try_from_vec(data) {
      Ok(font) => Some(font),
      Err(error) => {
        tracing::warn!(path = %path, error = %error, "invalid caption font");
        None
      }
    },
    Err(error) => {
      tracing::warn!(path = %path, error = %error, "failed to read caption font");
      None
    }
  }
}
