//! Statblock marker recognition.
//!
//! A vault note opts into the bestiary by carrying a `statblock` key in its
//! front matter. Only three values are recognized; anything else (including
//! an absent key) means the note is not a statblock source.
//!
//! | front-matter value | marker |
//! |--------------------|--------|
//! | `true` (boolean)   | [`Marker::FrontMatter`] |
//! | `"true"` (string)  | [`Marker::FrontMatter`] |
//! | `"inline"`         | [`Marker::Inline`] |

use serde::{Deserialize, Serialize};

/// The kind of statblock a marked note contains.
///
/// Determines where the parser looks for the creature definition: the
/// front-matter block itself, or a fenced `statblock` code block embedded
/// in the note body.
///
/// # Examples
///
/// ```
/// use bestiary_core::Marker;
///
/// assert_eq!(Marker::from_bool(true), Some(Marker::FrontMatter));
/// assert_eq!(Marker::from_bool(false), None);
/// assert_eq!(Marker::from_token("true"), Some(Marker::FrontMatter));
/// assert_eq!(Marker::from_token("inline"), Some(Marker::Inline));
/// assert_eq!(Marker::from_token("yes"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// The creature definition lives in the note's front matter.
    FrontMatter,

    /// The creature definition lives in a fenced block in the note body.
    Inline,
}

impl Marker {
    /// Interprets a boolean marker value.
    ///
    /// Only `true` is a recognized marker token.
    #[inline]
    #[must_use]
    pub const fn from_bool(value: bool) -> Option<Self> {
        if value { Some(Self::FrontMatter) } else { None }
    }

    /// Interprets a string marker token.
    ///
    /// Recognized tokens are exactly `"true"` and `"inline"`; matching is
    /// case-sensitive to mirror the host's behavior.
    #[inline]
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "true" => Some(Self::FrontMatter),
            "inline" => Some(Self::Inline),
            _ => None,
        }
    }

    /// Returns `true` for the inline marker kind.
    #[inline]
    #[must_use]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Inline)
    }
}
