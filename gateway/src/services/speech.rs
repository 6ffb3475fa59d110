use axum::body::Bytes;
use reqwest::Result;
use serde::Serialize;

/// Compressed output keeps the base64 payload sent back to the browser small.
pub const OUTPUT_FORMAT: &str = "mp3";

#[derive(Debug, Clone, Serialize)]
struct SynthesizeSpeechRequest<'a> {
  text: &'a str,
  output_format: &'a str,
  voice_id: &'a str,
  engine: &'a str,
}

#[derive(Debug)]
pub struct SpeechSynthesizerInner {
  client: reqwest::Client,
  base: String,
  secret: String,
  voice_id: String,
  engine: String,
}

impl SpeechSynthesizerInner {
  pub fn new(
    client: reqwest::Client,
    base: String,
    secret: String,
    voice_id: String,
    engine: String,
  ) -> Self {
    Self {
      client,
      base,
      secret,
      voice_id,
      engine,
    }
  }

  /// Synthesizes one sentence, returning the raw audio bytes.
  pub async fn synthesize(&self, text: &str) -> Result<Bytes> {
    self
      .client
      .post(format!("{}/v1/synthesize", self.base))
      .header("x-secret", &self.secret)
      .json(&SynthesizeSpeechRequest {
        text,
        output_format: OUTPUT_FORMAT,
        voice_id: &self.voice_id,
        engine: &self.engine,
      })
      .send()
      .await?
      .error_for_status()?
      .bytes()
      .await
  }
}
