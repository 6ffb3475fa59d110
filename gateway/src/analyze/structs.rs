use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeRequest {
  /// Data-URL-embedded base64 image, as produced by `canvas.toDataURL()`.
  pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeResponse {
  /// Annotated image as a `data:image/jpeg;base64,` URL.
  pub image: String,
  /// Multi-line, human-readable report of the top labels.
  pub text: String,
  /// Base64 mp3 bytes of the spoken description.
  pub audio: String,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrawBackend {
  #[serde(rename = "vector")]
  Vector,
  #[serde(rename = "raster")]
  Raster,
}

#[derive(Error, Debug, Clone)]
#[error("Invalid draw backend: {0}")]
pub struct InvalidDrawBackendError(String);

impl FromStr for DrawBackend {
  type Err = InvalidDrawBackendError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "vector" => Ok(DrawBackend::Vector),
      "raster" => Ok(DrawBackend::Raster),
      _ => Err(InvalidDrawBackendError(s.to_string())),
    }
  }
}

impl fmt::Display for DrawBackend {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DrawBackend::Vector => write!(f, "vector"),
      DrawBackend::Raster => write!(f, "raster"),
    }
  }
}

/// Per-process feature variants, fixed at startup.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
  pub draw_backend: DrawBackend,
  pub translate_labels: bool,
  pub validate_boxes: bool,
  pub source_language: String,
  pub target_language: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_draw_backend_from_str() {
    assert_eq!("vector".parse::<DrawBackend>().unwrap(), DrawBackend::Vector);
    assert_eq!("raster".parse::<DrawBackend>().unwrap(), DrawBackend::Raster);
    assert!("opencv".parse::<DrawBackend>().is_err());
  }
}
