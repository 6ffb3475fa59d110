use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
#[error("Invalid data url: {0}")]
pub struct ParseDataUrlError(String);

/// Strips the `data:<mime>;base64,` prefix off a browser data URL.
pub fn split_data_url(data_url: &str) -> Result<&str, ParseDataUrlError> {
  let Some((header, payload)) = data_url.split_once(',') else {
    return Err(ParseDataUrlError(data_url.to_string()));
  };
  if !header.starts_with("data:") || !header.ends_with(";base64") {
    return Err(ParseDataUrlError(header.to_string()));
  }
  Ok(payload)
}

pub fn decode_base64(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
  STANDARD.decode(payload)
}

pub fn encode_base64(bytes: &[u8]) -> String {
  STANDARD.encode(bytes)
}

pub fn load_bytes_guessed(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
  Ok(
    ImageReader::new(Cursor::new(bytes))
      .with_guessed_format()?
      .decode()?,
  )
}

pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
  let mut buf = Vec::new();
  image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)?;
  Ok(buf)
}

pub fn to_data_url(jpeg: &[u8]) -> String {
  format!("data:image/jpeg;base64,{}", encode_base64(jpeg))
}

#[cfg(test)]
mod tests {
  use image::RgbImage;

  use super::*;

  #[test]
  fn test_split_data_url() {
    let payload = split_data_url("data:image/jpeg;base64,aGVsbG8=").unwrap();
    assert_eq!(payload, "aGVsbG8=");
    assert_eq!(decode_base64(payload).unwrap(), b"hello");
  }

  #[test]
  fn test_split_data_url_rejects_missing_comma() {
    assert!(split_data_url("data:image/jpeg;base64").is_err());
  }

  #[test]
  fn test_split_data_url_rejects_foreign_prefix() {
    assert!(split_data_url("blob:image/jpeg;base64,aGVsbG8=").is_err());
    assert!(split_data_url("data:image/jpeg,aGVsbG8=").is_err());
  }

  #[test]
  fn test_jpeg_round_trip_preserves_dimensions() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, image::Rgb([40, 90, 200])));
    let jpeg = encode_jpeg(&image).unwrap();
    let decoded = load_bytes_guessed(&jpeg).unwrap();
    assert_eq!(decoded.width(), 32);
    assert_eq!(decoded.height(), 24);
  }

  #[test]
  fn test_to_data_url_prefix() {
    assert!(to_data_url(b"\xff\xd8").starts_with("data:image/jpeg;base64,"));
  }
}
