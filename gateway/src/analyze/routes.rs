use std::time::Instant;

use axum::{
  body::Bytes,
  extract::{DefaultBodyLimit, State},
  routing::post,
  Json, Router,
};
use image::{DynamicImage, ImageError};
use metrics::{counter, histogram, increment_counter};
use tokio::task::spawn_blocking;

use crate::{
  draw::{self, PixelBox},
  error::{AppError, AppJsonResult},
  images, AnalyzeConfig, Annotator, AppState, LabelDetector, SpeechSynthesizer, Translator,
};

use super::{
  report::{self, ReportedLabel},
  AnalyzeRequest, AnalyzeResponse,
};

/// Only this many of the returned labels are reported, translated and drawn.
const TOP_LABELS: usize = 5;

pub fn router() -> Router<AppState> {
  Router::new()
    .route("/analyze", post(analyze))
    .layer(DefaultBodyLimit::max(1024 * 1024 * 20))
}

async fn analyze(
  State(detector): State<LabelDetector>,
  State(translator): State<Translator>,
  State(speech): State<SpeechSynthesizer>,
  State(annotator): State<Annotator>,
  State(options): State<AnalyzeConfig>,
  body: String,
) -> AppJsonResult<AnalyzeResponse> {
  increment_counter!("analyze_requests_total");

  // the body is parsed by hand so a malformed request still produces the
  // `{"error"}` shape instead of an axum rejection
  let payload: AnalyzeRequest = serde_json::from_str(&body)?;

  let image_bytes = Bytes::from(images::decode_base64(images::split_data_url(
    &payload.image,
  )?)?);

  let decoded = {
    let bytes = image_bytes.clone();
    spawn_blocking(move || images::load_bytes_guessed(&bytes)).await??
  };
  let (img_w, img_h) = (decoded.width(), decoded.height());

  let started = Instant::now();
  let labels = detector
    .detect(&image_bytes)
    .await
    .map_err(AppError::DetectError)?;
  histogram!("detect_duration_seconds", started.elapsed().as_secs_f64());
  counter!("labels_detected_total", labels.len() as u64);
  tracing::debug!(labels = labels.len(), width = img_w, height = img_h, "labels detected");

  let mut reported: Vec<ReportedLabel> = Vec::with_capacity(TOP_LABELS);
  let mut boxes: Vec<(String, PixelBox)> = Vec::new();

  for label in labels.iter().take(TOP_LABELS) {
    let display_name = if options.translate_labels {
      let started = Instant::now();
      let translated = translator
        .translate(&label.name, &options.source_language, &options.target_language)
        .await
        .map_err(AppError::TranslateError)?;
      histogram!("translate_duration_seconds", started.elapsed().as_secs_f64());
      translated
    } else {
      label.name.clone()
    };

    let mut degenerate = 0;
    for instance in &label.instances {
      let bbox = draw::scale_box(&instance.bounding_box, img_w, img_h);
      if bbox.is_degenerate() {
        degenerate += 1;
        continue;
      }
      boxes.push((display_name.clone(), bbox));
    }

    reported.push(ReportedLabel {
      name: label.name.clone(),
      display_name,
      confidence: label.confidence,
      instances: label.instances.len(),
      degenerate,
    });
  }

  let sentence = report::speech_sentence(&reported);
  let text = report::render(&reported, options.validate_boxes);

  let started = Instant::now();
  let audio = speech
    .synthesize(&sentence)
    .await
    .map_err(AppError::SpeechError)?;
  histogram!("speech_duration_seconds", started.elapsed().as_secs_f64());

  counter!("boxes_drawn_total", boxes.len() as u64);

  let jpeg = spawn_blocking(move || -> Result<Vec<u8>, ImageError> {
    let mut canvas = decoded.to_rgb8();
    for (caption, bbox) in &boxes {
      annotator.annotate(&mut canvas, bbox, caption);
    }
    images::encode_jpeg(&DynamicImage::ImageRgb8(canvas))
  })
  .await??;

  Ok(Json(AnalyzeResponse {
    image: images::to_data_url(&jpeg),
    text,
    audio: images::encode_base64(&audio),
  }))
}
