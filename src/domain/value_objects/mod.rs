//! Value Objects for the print shop

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical label for small stickers.
pub const SMALL_SIZE_KEY: &str = "chico";
/// Canonical label for large stickers.
pub const LARGE_SIZE_KEY: &str = "grande";
/// Bucket for sticker products that carry no size label.
pub const UNKNOWN_SIZE_KEY: &str = "unknown";

/// Default unit area of a `chico` sticker (50 x 50 mm).
pub const SMALL_DEFAULT_AREA_MM2: f64 = 50.0 * 50.0;
/// Default unit area of a `grande` sticker (100 x 100 mm).
pub const LARGE_DEFAULT_AREA_MM2: f64 = 100.0 * 100.0;

const MAX_SIZE_KEY_LEN: usize = 50;

/// Size key value object.
///
/// Either a canonical label (`chico`, `grande`, ...) or a literal `WxH`
/// millimetre size. Products and plate quantities are joined on it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SizeKey(String);

impl SizeKey {
    pub fn new(value: impl Into<String>) -> Result<Self, SizeKeyError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(SizeKeyError::Empty); }
        if value.len() > MAX_SIZE_KEY_LEN { return Err(SizeKeyError::TooLong); }
        Ok(Self(value))
    }

    pub fn unknown() -> Self { Self(UNKNOWN_SIZE_KEY.to_string()) }
    pub fn small() -> Self { Self(SMALL_SIZE_KEY.to_string()) }
    pub fn large() -> Self { Self(LARGE_SIZE_KEY.to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Default area for the canonical labels, matched case-insensitively.
    pub fn default_area(&self) -> Option<f64> {
        if self.0.eq_ignore_ascii_case(SMALL_SIZE_KEY) {
            Some(SMALL_DEFAULT_AREA_MM2)
        } else if self.0.eq_ignore_ascii_case(LARGE_SIZE_KEY) {
            Some(LARGE_DEFAULT_AREA_MM2)
        } else {
            None
        }
    }

    /// Dimensions encoded in the key itself, e.g. `"70x40"`.
    pub fn dimensions(&self) -> Option<Dimensions> { Dimensions::parse(&self.0) }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for SizeKey {
    type Error = SizeKeyError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<SizeKey> for String {
    fn from(key: SizeKey) -> Self { key.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeKeyError {
    #[error("size key is empty")]
    Empty,
    #[error("size key is longer than 50 characters")]
    TooLong,
}

/// Physical sticker dimensions in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Dimensions {
    pub fn new(width_mm: f64, height_mm: f64) -> Self { Self { width_mm, height_mm } }

    pub fn area_mm2(&self) -> f64 { self.width_mm * self.height_mm }

    /// Parses `<number>x<number>`. The separator is case-insensitive,
    /// decimals are allowed and surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.trim().to_ascii_lowercase();
        let (width, height) = lowered.split_once('x')?;
        Some(Self::new(parse_millimetres(width)?, parse_millimetres(height)?))
    }
}

/// Accepts `123` or `12.5`; rejects signs, exponents and `inf`/`nan`
/// that `f64::from_str` would otherwise take.
fn parse_millimetres(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || frac_part.is_some_and(|f| !all_digits(f)) { return None; }
    raw.parse::<f64>().ok().filter(|v| *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_key_trims() {
        let key = SizeKey::new("  chico ").unwrap();
        assert_eq!(key.as_str(), "chico");
        assert_eq!(SizeKey::new("   "), Err(SizeKeyError::Empty));
    }

    #[test]
    fn test_default_area_is_case_insensitive() {
        assert_eq!(SizeKey::new("CHICO").unwrap().default_area(), Some(2500.0));
        assert_eq!(SizeKey::new("Grande").unwrap().default_area(), Some(10000.0));
        assert_eq!(SizeKey::new("mediano").unwrap().default_area(), None);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(Dimensions::parse("70x40"), Some(Dimensions::new(70.0, 40.0)));
        assert_eq!(Dimensions::parse("12.5X8"), Some(Dimensions::new(12.5, 8.0)));
        assert_eq!(Dimensions::parse(" 30 x 30 ").map(|d| d.area_mm2()), Some(900.0));
    }

    #[test]
    fn test_parse_dimensions_rejects_garbage() {
        for text in ["chico", "x40", "70x", "70x40x2", "-5x3", "1e3x2", "infxinf", "7.x3", "0x10"] {
            assert_eq!(Dimensions::parse(text), None, "{text}");
        }
    }

    #[test]
    fn test_size_key_serde_as_string() {
        let key: SizeKey = serde_json::from_str("\" 60x60 \"").unwrap();
        assert_eq!(key.as_str(), "60x60");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"60x60\"");
        assert!(serde_json::from_str::<SizeKey>("\"\"").is_err());
    }
}
