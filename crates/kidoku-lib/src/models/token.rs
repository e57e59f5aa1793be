use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Canonical chapter identity, stable across scraper formats.
///
/// Derived from the chapter number when one is known (`num:12`, `num:12.5`)
/// and from the lowercased, trimmed label otherwise (`label:extra oneshot`).
/// Number-first derivation keeps label formatting drift between polls
/// ("Ch. 12" vs "Chapter 12") from looking like a new chapter.
// no Ord on purpose: the canonical string would order num:9 above num:15,
// chapter comparisons must go through number()
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Derive a token from a raw `(label, number)` observation. Returns
    /// `None` when neither part is usable; such observations carry no
    /// identity and must be dropped by the caller.
    pub fn derive(label: Option<&str>, number: Option<f64>) -> Option<Self> {
        if let Some(number) = number.filter(|n| n.is_finite()) {
            // f64 Display is exact here: 12.0 renders as "12", 12.5 as "12.5"
            return Some(Self(format!("num:{number}")));
        }

        let label = label.map(str::trim).filter(|label| !label.is_empty())?;

        Some(Self(format!("label:{}", label.to_lowercase())))
    }

    pub fn from_number(number: f64) -> Option<Self> {
        Self::derive(None, Some(number))
    }

    /// The numeric chapter value, when this token encodes one.
    pub fn number(&self) -> Option<f64> {
        self.0.strip_prefix("num:")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(number) = s.strip_prefix("num:") {
            return number
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .and_then(Self::from_number)
                .ok_or(Error::InvalidToken);
        }

        match s.strip_prefix("label:") {
            Some(label) if !label.trim().is_empty() => {
                Ok(Self(format!("label:{}", label.trim().to_lowercase())))
            }
            _ => Err(Error::InvalidToken),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
