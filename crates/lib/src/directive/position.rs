use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fractional digits a position may carry.
const SUB_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
  #[error("invalid position: '{0}'")]
  Invalid(String),

  #[error("position cannot be negative: '{0}'")]
  Negative(String),

  #[error("position '{0}' has more than 3 fractional digits")]
  TooPrecise(String),
}

/// Where a directive applies among the snippets of a section.
///
/// `sub == 0` designates snippet `index` itself. Any other `sub` is an
/// insertion point between snippet `index` and snippet `index + 1`, the
/// fractional part in thousandths: `2.5` is `(2, 500)` and sorts before
/// `2.75`, which is `(2, 750)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PositionRepr", into = "String")]
pub struct Position {
  index: usize,
  sub: u16,
}

impl Position {
  /// The position of snippet `index`.
  pub fn at(index: usize) -> Self {
    Self { index, sub: 0 }
  }

  /// An insertion point after snippet `index`, `sub` thousandths of the way
  /// to the next one.
  pub fn between(index: usize, sub: u16) -> Self {
    debug_assert!(sub > 0 && sub < 1000);
    Self { index, sub }
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn sub(&self) -> u16 {
    self.sub
  }

  /// Whether this position designates a snippet rather than a gap.
  pub fn is_exact(&self) -> bool {
    self.sub == 0
  }
}

impl FromStr for Position {
  type Err = PositionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let text = s.trim();
    if text.starts_with('-') {
      return Err(PositionError::Negative(s.to_string()));
    }

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let is_digits = |t: &str| t.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !is_digits(whole) || !is_digits(frac) {
      return Err(PositionError::Invalid(s.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > SUB_DIGITS {
      return Err(PositionError::TooPrecise(s.to_string()));
    }

    let index = whole.parse().map_err(|_| PositionError::Invalid(s.to_string()))?;
    let sub = if frac.is_empty() {
      0
    } else {
      format!("{frac:0<width$}", width = SUB_DIGITS)
        .parse()
        .map_err(|_| PositionError::Invalid(s.to_string()))?
    };

    Ok(Self { index, sub })
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.sub == 0 {
      write!(f, "{}", self.index)
    } else {
      let frac = format!("{:03}", self.sub);
      write!(f, "{}.{}", self.index, frac.trim_end_matches('0'))
    }
  }
}

impl From<Position> for String {
  fn from(p: Position) -> Self {
    p.to_string()
  }
}

/// The forms a position takes in an adjustments file.
#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
  Int(i64),
  Float(f64),
  Text(String),
}

impl TryFrom<PositionRepr> for Position {
  type Error = PositionError;

  fn try_from(repr: PositionRepr) -> Result<Self, Self::Error> {
    match repr {
      PositionRepr::Int(n) if n < 0 => Err(PositionError::Negative(n.to_string())),
      PositionRepr::Int(n) => Ok(Position::at(n as usize)),
      PositionRepr::Float(x) if !x.is_finite() => Err(PositionError::Invalid(x.to_string())),
      // Shortest round-trip text of the float, so 0.55 stays "0.55"
      PositionRepr::Float(x) => x.to_string().parse(),
      PositionRepr::Text(s) => s.parse(),
    }
  }
}
