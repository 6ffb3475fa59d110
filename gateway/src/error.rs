use std::fmt;

use axum::{
  response::{IntoResponse, Response},
  Json,
};
use hyper::StatusCode;
use image::ImageError;
use metrics::increment_counter;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;

use crate::images::ParseDataUrlError;

pub type AppResult<T> = Result<T, AppError>;
pub type AppJsonResult<T> = AppResult<Json<T>>;

#[derive(Debug, Error)]
pub enum AppError {
  DataUrlError(ParseDataUrlError),
  Base64Error(base64::DecodeError),
  ImageError(ImageError),
  DetectError(reqwest::Error),
  TranslateError(reqwest::Error),
  SpeechError(reqwest::Error),
  TokioJoinError(JoinError),
  SerdeJSONError(serde_json::Error),
}

impl From<ParseDataUrlError> for AppError {
  fn from(error: ParseDataUrlError) -> Self {
    AppError::DataUrlError(error)
  }
}

impl From<base64::DecodeError> for AppError {
  fn from(error: base64::DecodeError) -> Self {
    AppError::Base64Error(error)
  }
}

impl From<ImageError> for AppError {
  fn from(error: ImageError) -> Self {
    AppError::ImageError(error)
  }
}

impl From<JoinError> for AppError {
  fn from(error: JoinError) -> Self {
    AppError::TokioJoinError(error)
  }
}

impl From<serde_json::Error> for AppError {
  fn from(error: serde_json::Error) -> Self {
    AppError::SerdeJSONError(error)
  }
}

impl AppError {
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::DataUrlError(_) => "data_url",
      AppError::Base64Error(_) => "base64",
      AppError::ImageError(_) => "image",
      AppError::DetectError(_) => "detect",
      AppError::TranslateError(_) => "translate",
      AppError::SpeechError(_) => "speech",
      AppError::TokioJoinError(_) => "join",
      AppError::SerdeJSONError(_) => "request",
    }
  }

  fn public_message(&self) -> &'static str {
    match self {
      AppError::DataUrlError(_) | AppError::Base64Error(_) => "could not decode the uploaded image data",
      AppError::ImageError(_) => "could not process the image",
      AppError::DetectError(_) => "label detection failed",
      AppError::TranslateError(_) => "translation failed",
      AppError::SpeechError(_) => "speech synthesis failed",
      AppError::TokioJoinError(_) => "internal error",
      AppError::SerdeJSONError(_) => "invalid request body",
    }
  }
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let id = cuid::cuid().unwrap();
    let text = format!("{self:#?}");
    tracing::debug!(id = %id, kind = self.kind(), error = %text, "analyze error");
    write!(f, "{}", self.public_message())
  }
}

// Every failure collapses to the same observable shape: HTTP 200 with a
// JSON error object. The variant only feeds logs and metrics.
impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    increment_counter!("analyze_errors_total", "kind" => self.kind());
    (StatusCode::OK, Json(json!({ "error": message }))).into_response()
  }
}
