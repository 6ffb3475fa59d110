use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::analyze::DrawBackend;
use crate::services::detect::NormalizedBox;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CAPTION_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const CAPTION_FONT_SIZE: f32 = 24.0;
const CAPTION_HEIGHT: i32 = 28;
const CAPTION_CHAR_WIDTH: f32 = 12.0; // rough per-glyph estimate
const CAPTION_PADDING: i32 = 5;
const VECTOR_BORDER: i32 = 2;
const RASTER_BORDER: i32 = 5;

/// A bounding box scaled to pixel coordinates, `(x1, y1)` top-left and
/// `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
}

impl PixelBox {
  pub fn is_degenerate(&self) -> bool {
    self.x2 <= self.x1 || self.y2 <= self.y1
  }
}

/// Scales a normalized box (fractions of image dimensions) to pixels.
pub fn scale_box(bbox: &NormalizedBox, width: u32, height: u32) -> PixelBox {
  let (w, h) = (width as f32, height as f32);
  PixelBox {
    x1: (bbox.left * w).floor() as i32,
    y1: (bbox.top * h).floor() as i32,
    x2: ((bbox.left + bbox.width) * w).floor() as i32,
    y2: ((bbox.top + bbox.height) * h).floor() as i32,
  }
}

pub struct AnnotatorInner {
  backend: DrawBackend,
  font: Option<FontArc>,
  font_scale: PxScale,
}

impl AnnotatorInner {
  pub fn new(backend: DrawBackend, font: Option<FontArc>) -> Self {
    Self {
      backend,
      font,
      font_scale: PxScale::from(CAPTION_FONT_SIZE),
    }
  }

  /// Draws one box outline plus its caption. Degenerate boxes are never drawn.
  pub fn annotate(&self, image: &mut RgbImage, bbox: &PixelBox, caption: &str) {
    if bbox.is_degenerate() {
      return;
    }
    match self.backend {
      DrawBackend::Vector => self.annotate_vector(image, bbox, caption),
      DrawBackend::Raster => self.annotate_raster(image, bbox, caption),
    }
  }

  fn annotate_vector(&self, image: &mut RgbImage, bbox: &PixelBox, caption: &str) {
    for inset in 0..VECTOR_BORDER {
      let width = bbox.x2 - bbox.x1 - 2 * inset;
      let height = bbox.y2 - bbox.y1 - 2 * inset;
      if width <= 0 || height <= 0 {
        break;
      }
      draw_hollow_rect_mut(
        image,
        Rect::at(bbox.x1 + inset, bbox.y1 + inset).of_size(width as u32, height as u32),
        BOX_COLOR,
      );
    }

    // filled caption background above the top-left corner
    let text_width = (caption.chars().count() as f32 * CAPTION_CHAR_WIDTH) as i32;
    let bg_width = (text_width + 2 * CAPTION_PADDING).max(1) as u32;
    let bg_y = (bbox.y1 - CAPTION_HEIGHT).max(0);
    draw_filled_rect_mut(
      image,
      Rect::at(bbox.x1, bg_y).of_size(bg_width, CAPTION_HEIGHT as u32),
      BOX_COLOR,
    );

    if let Some(font) = &self.font {
      draw_text_mut(
        image,
        CAPTION_COLOR,
        bbox.x1 + CAPTION_PADDING,
        bg_y + 2,
        self.font_scale,
        font,
        caption,
      );
    }
  }

  fn annotate_raster(&self, image: &mut RgbImage, bbox: &PixelBox, caption: &str) {
    let w = image.width() as i32;
    let h = image.height() as i32;

    let x_min = bbox.x1.clamp(0, w - 1);
    let y_min = bbox.y1.clamp(0, h - 1);
    let x_max = bbox.x2.clamp(0, w - 1);
    let y_max = bbox.y2.clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    for thickness in 0..RASTER_BORDER {
      let x_min_t = (x_min + thickness).min(w - 1);
      let y_min_t = (y_min + thickness).min(h - 1);
      let x_max_t = (x_max - thickness).max(0);
      let y_max_t = (y_max - thickness).max(0);

      // top and bottom edges
      for x in x_min_t..=x_max_t {
        image.put_pixel(x as u32, y_min_t as u32, BOX_COLOR);
        image.put_pixel(x as u32, y_max_t as u32, BOX_COLOR);
      }

      // left and right edges
      for y in y_min_t..=y_max_t {
        image.put_pixel(x_min_t as u32, y as u32, BOX_COLOR);
        image.put_pixel(x_max_t as u32, y as u32, BOX_COLOR);
      }
    }

    let text_width = (caption.chars().count() as f32 * CAPTION_CHAR_WIDTH) as i32;
    let bg_width = (text_width + 2 * CAPTION_PADDING).max(1) as u32;
    let bg_y = (y_min - CAPTION_HEIGHT).max(0);
    draw_filled_rect_mut(
      image,
      Rect::at(x_min, bg_y).of_size(bg_width, CAPTION_HEIGHT as u32),
      BOX_COLOR,
    );

    if let Some(font) = &self.font {
      draw_text_mut(
        image,
        CAPTION_COLOR,
        x_min + CAPTION_PADDING,
        bg_y + 2,
        self.font_scale,
        font,
        caption,
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn boxed(left: f32, top: f32, width: f32, height: f32) -> NormalizedBox {
    NormalizedBox {
      left,
      top,
      width,
      height,
    }
  }

  #[test]
  fn test_scale_box() {
    let scaled = scale_box(&boxed(0.1, 0.1, 0.5, 0.5), 100, 100);
    assert_eq!(
      scaled,
      PixelBox {
        x1: 10,
        y1: 10,
        x2: 60,
        y2: 60
      }
    );
    assert!(!scaled.is_degenerate());
  }

  #[test]
  fn test_zero_area_box_is_degenerate() {
    assert!(scale_box(&boxed(0.5, 0.5, 0.0, 0.2), 100, 100).is_degenerate());
    assert!(scale_box(&boxed(0.5, 0.5, 0.2, 0.0), 100, 100).is_degenerate());
    // sub-pixel boxes collapse after flooring
    assert!(scale_box(&boxed(0.5, 0.5, 0.001, 0.001), 100, 100).is_degenerate());
  }

  #[test]
  fn test_degenerate_box_leaves_image_unmodified() {
    for backend in [DrawBackend::Vector, DrawBackend::Raster] {
      let annotator = AnnotatorInner::new(backend, None);
      let mut image = RgbImage::new(100, 100);
      let before = image.clone();
      annotator.annotate(
        &mut image,
        &PixelBox {
          x1: 60,
          y1: 10,
          x2: 60,
          y2: 50,
        },
        "cup",
      );
      assert_eq!(image.as_raw(), before.as_raw());
    }
  }

  #[test]
  fn test_vector_outline_and_caption_background() {
    let annotator = AnnotatorInner::new(DrawBackend::Vector, None);
    let mut image = RgbImage::new(100, 100);
    annotator.annotate(
      &mut image,
      &PixelBox {
        x1: 10,
        y1: 40,
        x2: 60,
        y2: 90,
      },
      "dog",
    );

    // outline corners
    assert_eq!(*image.get_pixel(10, 40), BOX_COLOR);
    assert_eq!(*image.get_pixel(59, 89), BOX_COLOR);
    // caption background sits above the top-left corner
    assert_eq!(*image.get_pixel(12, 20), BOX_COLOR);
    // interior untouched
    assert_eq!(*image.get_pixel(35, 65), Rgb([0, 0, 0]));
  }

  #[test]
  fn test_raster_border_is_clamped_to_image_bounds() {
    let annotator = AnnotatorInner::new(DrawBackend::Raster, None);
    let mut image = RgbImage::new(100, 100);
    annotator.annotate(
      &mut image,
      &PixelBox {
        x1: -20,
        y1: -20,
        x2: 150,
        y2: 150,
      },
      "train",
    );

    assert_eq!(*image.get_pixel(0, 0), BOX_COLOR);
    assert_eq!(*image.get_pixel(99, 99), BOX_COLOR);
    assert_eq!(*image.get_pixel(50, 50), Rgb([0, 0, 0]));
  }
}
