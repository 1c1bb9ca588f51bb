//! Chilean RUT (Rol Único Tributario).
//!
//! A RUT is a 7-8 digit body followed by a check digit (`0`-`9` or `K`)
//! computed with the modulo-11 rule. Users type it in many shapes
//! (`12.345.678-5`, `12345678-5`, `123456785`); [`Rut::parse`] accepts all
//! of them and normalizes to `12345678-5`.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static RUT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}(?:\.?\d{3}){2})-?([\dkK])$").expect("Invalid regex")
});

/// Errors that can occur when parsing a [`Rut`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RutError {
    /// The input is empty.
    #[error("el RUT es obligatorio")]
    Empty,
    /// The input does not look like a RUT.
    #[error("el RUT debe tener el formato 12.345.678-5")]
    Format,
    /// The check digit does not match the body.
    #[error("el dígito verificador del RUT no es válido")]
    CheckDigit,
}

/// A validated RUT.
///
/// ```
/// use huerto_hogar_core::Rut;
///
/// let rut = Rut::parse("11.111.111-1").unwrap();
/// assert_eq!(rut.to_string(), "11111111-1");
/// assert_eq!(rut.formatted(), "11.111.111-1");
///
/// assert!(Rut::parse("11.111.111-2").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rut {
    body: u32,
    check: char,
}

impl Rut {
    /// Parse and verify a RUT.
    ///
    /// # Errors
    ///
    /// Returns [`RutError::Format`] for malformed input and
    /// [`RutError::CheckDigit`] when the check digit does not match.
    pub fn parse(input: &str) -> Result<Self, RutError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RutError::Empty);
        }

        let caps = RUT_PATTERN.captures(input).ok_or(RutError::Format)?;
        let digits: String = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let body: u32 = digits.parse().map_err(|_| RutError::Format)?;
        if body < 1_000_000 {
            return Err(RutError::Format);
        }

        let given = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase())
            .ok_or(RutError::Format)?;

        let check = check_digit(body);
        if given != check {
            return Err(RutError::CheckDigit);
        }

        Ok(Self { body, check })
    }

    /// Numeric body of the RUT.
    #[must_use]
    pub const fn body(&self) -> u32 {
        self.body
    }

    /// Check digit (`0`-`9` or `K`).
    #[must_use]
    pub const fn check_digit(&self) -> char {
        self.check
    }

    /// RUT with thousands dots, e.g. `12.345.678-5`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let digits = self.body.to_string();
        let mut out = String::with_capacity(digits.len() + 4);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(c);
        }
        out.push('-');
        out.push(self.check);
        out
    }
}

/// Compute the modulo-11 check digit for a RUT body.
///
/// Digits are multiplied right to left by the cycling weights 2..=7.
#[must_use]
pub fn check_digit(body: u32) -> char {
    let mut remaining = body;
    let mut sum = 0;
    let mut weight = 2;
    while remaining > 0 {
        sum += (remaining % 10) * weight;
        remaining /= 10;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check)
    }
}

impl std::str::FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
