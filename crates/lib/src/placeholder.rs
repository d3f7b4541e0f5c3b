//! Placeholder parsing and positional substitution.
//!
//! Snippet text marks the values a builder is expected to adapt with
//! `<code>...</code>` markers (the book's "replaceable" elements). An
//! adjustments file supplies, per snippet, an ordered list of values which
//! replace the markers left to right.
//!
//! # Matching
//!
//! A marker opens with `<code>` and closes at the first `</code>` on the same
//! line. An opening tag without a closing tag on its line is literal text.
//! Nothing else in the text is interpreted: `$VAR`, backslashes and quotes
//! pass through unchanged.
//!
//! # Example
//!
//! ```
//! use lfscript_lib::placeholder::substitute;
//!
//! let text = "mkfs -v -t ext4 /dev/<code>xxx</code>";
//! let values = vec!["sda3".to_string()];
//! assert_eq!(substitute(text, &values).unwrap(), "mkfs -v -t ext4 /dev/sda3");
//! ```

use thiserror::Error;

use crate::consts::{MARKER_CLOSE, MARKER_OPEN};

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no markers)
  Literal(String),

  /// A marker, holding the text found between the tags
  Marker(String),
}

/// Errors that can occur during substitution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
  #[error("not enough values ({values}) for {markers} placeholder(s) in text \"{text}\"")]
  NotEnoughValues { text: String, markers: usize, values: usize },
}

/// Byte offsets of one marker: `(start, inner_start, inner_end, end)`.
fn find_marker(input: &str) -> Option<(usize, usize, usize, usize)> {
  let mut from = 0;

  while let Some(rel) = input[from..].find(MARKER_OPEN) {
    let start = from + rel;
    let inner_start = start + MARKER_OPEN.len();
    let line_end = input[inner_start..]
      .find('\n')
      .map_or(input.len(), |n| inner_start + n);

    if let Some(close) = input[inner_start..line_end].find(MARKER_CLOSE) {
      let inner_end = inner_start + close;
      return Some((start, inner_start, inner_end, inner_end + MARKER_CLOSE.len()));
    }

    // No closing tag on this line, try the next opening tag
    from = start + 1;
  }

  None
}

/// Parse a string into literal and marker segments.
pub fn parse(input: &str) -> Vec<Segment> {
  let mut segments = Vec::new();
  let mut rest = input;

  while let Some((start, inner_start, inner_end, end)) = find_marker(rest) {
    if start > 0 {
      segments.push(Segment::Literal(rest[..start].to_string()));
    }
    segments.push(Segment::Marker(rest[inner_start..inner_end].to_string()));
    rest = &rest[end..];
  }

  if !rest.is_empty() {
    segments.push(Segment::Literal(rest.to_string()));
  }

  segments
}

/// Number of markers in a string.
pub fn marker_count(input: &str) -> usize {
  parse(input)
    .iter()
    .filter(|s| matches!(s, Segment::Marker(_)))
    .count()
}

/// Whether a string holds at least one marker.
pub fn has_markers(input: &str) -> bool {
  find_marker(input).is_some()
}

/// Replace markers left to right with `values`.
///
/// Extra values are ignored. Text without markers is returned unchanged,
/// whatever the number of values.
///
/// # Errors
///
/// Returns [`SubstitutionError::NotEnoughValues`] when the text holds more
/// markers than there are values. The error carries the original text.
pub fn substitute(input: &str, values: &[String]) -> Result<String, SubstitutionError> {
  let segments = parse(input);
  substitute_segments(input, &segments, values)
}

/// Substitute values into pre-parsed segments of `input`.
pub fn substitute_segments(input: &str, segments: &[Segment], values: &[String]) -> Result<String, SubstitutionError> {
  let markers = segments.iter().filter(|s| matches!(s, Segment::Marker(_))).count();
  if markers > values.len() {
    return Err(SubstitutionError::NotEnoughValues {
      text: input.to_string(),
      markers,
      values: values.len(),
    });
  }

  let mut result = String::with_capacity(input.len());
  let mut values = values.iter();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Marker(_) => {
        // Counted above, there is always a value left here
        if let Some(value) = values.next() {
          result.push_str(value);
        }
      }
    }
  }

  Ok(result)
}
