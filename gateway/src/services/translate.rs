use reqwest::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
struct TranslateTextRequest<'a> {
  text: &'a str,
  source_language: &'a str,
  target_language: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslateTextResponse {
  translated_text: String,
}

#[derive(Debug)]
pub struct TranslatorInner {
  client: reqwest::Client,
  base: String,
  secret: String,
}

impl TranslatorInner {
  pub fn new(client: reqwest::Client, base: String, secret: String) -> Self {
    Self {
      client,
      base,
      secret,
    }
  }

  pub async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
    let res: TranslateTextResponse = self
      .client
      .post(format!("{}/v1/translate", self.base))
      .header("x-secret", &self.secret)
      .json(&TranslateTextRequest {
        text,
        source_language: source,
        target_language: target,
      })
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(res.translated_text)
  }
}
