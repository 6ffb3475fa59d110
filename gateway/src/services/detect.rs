use axum::body::Bytes;
use reqwest::Result;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of labels requested per image.
pub const MAX_LABELS: u32 = 20;
/// Labels below this confidence (percent) are never returned.
pub const MIN_CONFIDENCE: u32 = 50;

/// Bounding box expressed as fractions (0-1) of image width/height.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalizedBox {
  pub left: f32,
  pub top: f32,
  pub width: f32,
  pub height: f32,
}

/// One concrete occurrence of a label within the image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instance {
  #[serde(rename = "box")]
  pub bounding_box: NormalizedBox,
}

/// A detected concept. Confidence is 0-100; order of the returned list is the
/// detection service's own ranking and is trusted as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
  pub name: String,
  pub confidence: f32,
  #[serde(default)]
  pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DetectLabelsResponse {
  labels: Vec<Label>,
}

#[derive(Debug)]
pub struct LabelDetectorInner {
  client: reqwest::Client,
  base: String,
  secret: String,
}

impl LabelDetectorInner {
  pub fn new(client: reqwest::Client, base: String, secret: String) -> Self {
    Self {
      client,
      base,
      secret,
    }
  }

  pub async fn detect(&self, image: &Bytes) -> Result<Vec<Label>> {
    let res: DetectLabelsResponse = self
      .client
      .post(format!("{}/v1/labels", self.base))
      .query(&[("max_labels", MAX_LABELS), ("min_confidence", MIN_CONFIDENCE)])
      .header("x-secret", &self.secret)
      .body(image.clone())
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(res.labels)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_labels_response() {
    let json = r#"{
      "labels": [
        {
          "name": "Dog",
          "confidence": 97.3,
          "instances": [
            { "box": { "left": 0.1, "top": 0.2, "width": 0.3, "height": 0.4 } }
          ]
        },
        { "name": "Sky", "confidence": 88.0 }
      ]
    }"#;

    let res: DetectLabelsResponse = serde_json::from_str(json).unwrap();
    assert_eq!(res.labels.len(), 2);
    assert_eq!(res.labels[0].name, "Dog");
    assert_eq!(res.labels[0].instances.len(), 1);
    assert_eq!(res.labels[0].instances[0].bounding_box.left, 0.1);
    // instances default to empty when the service omits them
    assert!(res.labels[1].instances.is_empty());
  }
}
