use std::fmt::Write;

/// Spoken when detection returns no labels at all.
pub const NOTHING_IDENTIFIED: &str = "I could not identify anything";

/// One top-5 label after translation and box scaling, ready for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedLabel {
  pub name: String,
  /// Translated name when label translation is on, otherwise `name`.
  pub display_name: String,
  pub confidence: f32,
  /// Total instance boxes the detector returned for this label.
  pub instances: usize,
  /// Boxes that collapsed to zero area after pixel scaling.
  pub degenerate: usize,
}

impl ReportedLabel {
  fn status(&self, validate_boxes: bool) -> String {
    if self.instances == 0 {
      return "no box".to_string();
    }
    if validate_boxes && self.degenerate > 0 {
      return format!("box, {} degenerate skipped", self.degenerate);
    }
    "box".to_string()
  }
}

/// Picks the single sentence sent to speech synthesis.
///
/// The first label (in detection order) with at least one instance box wins.
/// Without any boxed label the top label is spoken with hedged phrasing, and
/// with no labels at all a fixed sentence is used.
pub fn speech_sentence(labels: &[ReportedLabel]) -> String {
  if let Some(main) = labels.iter().find(|label| label.instances > 0) {
    return format!("Found a {}", main.display_name);
  }
  match labels.first() {
    Some(top) => format!("I think it's a {}", top.display_name),
    None => NOTHING_IDENTIFIED.to_string(),
  }
}

/// Renders the multi-line report returned in the response `text` field.
pub fn render(labels: &[ReportedLabel], validate_boxes: bool) -> String {
  let mut out = String::from("Analysis complete\n--- Top 5 ---");

  if labels.is_empty() {
    out.push_str("\nNo labels were found");
    return out;
  }

  for (index, label) in labels.iter().enumerate() {
    let _ = write!(out, "\n{}. {}", index + 1, label.name);
    if label.display_name != label.name {
      let _ = write!(out, " -> {}", label.display_name);
    }
    let _ = write!(
      out,
      " ({:.1}%, {})",
      label.confidence,
      label.status(validate_boxes)
    );
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn label(name: &str, instances: usize) -> ReportedLabel {
    ReportedLabel {
      name: name.to_string(),
      display_name: name.to_string(),
      confidence: 90.0,
      instances,
      degenerate: 0,
    }
  }

  #[test]
  fn test_first_boxed_label_is_spoken() {
    let labels = vec![label("Sky", 0), label("Dog", 1), label("Cat", 2)];
    assert_eq!(speech_sentence(&labels), "Found a Dog");
  }

  #[test]
  fn test_top_label_fallback_without_boxes() {
    let labels = vec![label("Sky", 0), label("Cloud", 0)];
    assert_eq!(speech_sentence(&labels), "I think it's a Sky");
  }

  #[test]
  fn test_fixed_sentence_without_labels() {
    assert_eq!(speech_sentence(&[]), NOTHING_IDENTIFIED);
  }

  #[test]
  fn test_translated_name_is_spoken() {
    let mut dog = label("Dog", 1);
    dog.display_name = "犬".to_string();
    assert_eq!(speech_sentence(&[dog]), "Found a 犬");
  }

  #[test]
  fn test_report_shows_box_status() {
    let labels = vec![label("Dog", 1), label("Sky", 0)];
    let text = render(&labels, true);
    assert!(text.contains("1. Dog (90.0%, box)"));
    assert!(text.contains("2. Sky (90.0%, no box)"));
  }

  #[test]
  fn test_report_shows_translation() {
    let mut dog = label("Dog", 1);
    dog.display_name = "犬".to_string();
    let text = render(&[dog], true);
    assert!(text.contains("1. Dog -> 犬 (90.0%, box)"));
  }

  #[test]
  fn test_report_flags_degenerate_boxes_only_when_validating() {
    let mut dog = label("Dog", 2);
    dog.degenerate = 1;
    assert!(render(std::slice::from_ref(&dog), true).contains("box, 1 degenerate skipped"));
    assert!(!render(std::slice::from_ref(&dog), false).contains("degenerate"));
  }

  #[test]
  fn test_report_states_when_nothing_was_found() {
    assert!(render(&[], true).contains("No labels were found"));
  }
}
