//! Product review primitives: star rating and bounded comment body.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Error for a star rating outside 1..=5.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("la calificación debe estar entre {min} y {max} estrellas", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError(pub i64);

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Create a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if `stars` is outside 1..=5.
    pub fn new(stars: i64) -> Result<Self, RatingError> {
        u8::try_from(stars)
            .ok()
            .filter(|s| (Self::MIN..=Self::MAX).contains(s))
            .map(Self)
            .ok_or(RatingError(stars))
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }

    /// Filled and empty stars for display, e.g. `★★★☆☆`.
    #[must_use]
    pub fn display_stars(self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors for an invalid comment body.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommentBodyError {
    /// Nothing but whitespace.
    #[error("el comentario no puede estar vacío")]
    Empty,
    /// More characters than allowed.
    #[error("el comentario debe tener como máximo {max} caracteres (tiene {len})")]
    TooLong {
        /// Maximum allowed characters.
        max: usize,
        /// Characters in the input.
        len: usize,
    },
}

/// Comment text, trimmed, 1 to 100 characters.
///
/// Length is counted in characters, not bytes, so accented text is not
/// penalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentBody(String);

impl CommentBody {
    /// Maximum number of characters in a comment.
    pub const MAX_CHARS: usize = 100;

    /// Parse a comment body.
    ///
    /// # Errors
    ///
    /// Returns [`CommentBodyError`] if the trimmed text is empty or longer
    /// than [`Self::MAX_CHARS`] characters.
    pub fn parse(text: &str) -> Result<Self, CommentBodyError> {
        let text = text.trim();
        let len = text.chars().count();
        if len == 0 {
            return Err(CommentBodyError::Empty);
        }
        if len > Self::MAX_CHARS {
            return Err(CommentBodyError::TooLong {
                max: Self::MAX_CHARS,
                len,
            });
        }
        Ok(Self(text.to_owned()))
    }

    /// The comment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CommentBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for CommentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().stars(), 1);
        assert_eq!(Rating::new(5).unwrap().stars(), 5);
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert!(Rating::new(300).is_err());
    }

    #[test]
    fn test_rating_display_stars() {
        assert_eq!(Rating::new(3).unwrap().display_stars(), "★★★☆☆");
        assert_eq!(Rating::new(5).unwrap().display_stars(), "★★★★★");
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_comment_body_length_cap() {
        assert!(CommentBody::parse(&"a".repeat(100)).is_ok());
        assert_eq!(
            CommentBody::parse(&"a".repeat(101)),
            Err(CommentBodyError::TooLong { max: 100, len: 101 })
        );
    }

    #[test]
    fn test_comment_body_counts_characters() {
        // 100 two-byte characters is still within the cap
        assert!(CommentBody::parse(&"ñ".repeat(100)).is_ok());
    }

    #[test]
    fn test_comment_body_trims_and_rejects_blank() {
        assert_eq!(CommentBody::parse("   "), Err(CommentBodyError::Empty));
        assert_eq!(
            CommentBody::parse("  ¡Muy frescas!  ").unwrap().as_str(),
            "¡Muy frescas!"
        );
    }
}
