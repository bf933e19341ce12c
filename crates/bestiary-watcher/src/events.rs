//! Event types for vault change notifications.
//!
//! The coordinator consumes three kinds of events, mirroring the callbacks
//! a host application exposes: a file's content or metadata changed, a file
//! moved to a new path, or a file disappeared. The watcher maps raw notify
//! event kinds onto these before they ever reach the async side.

use camino::{Utf8Path, Utf8PathBuf};

/// A change observed in the vault file tree.
///
/// # Examples
///
/// ```
/// use bestiary_watcher::VaultEvent;
/// use camino::Utf8PathBuf;
///
/// let event = VaultEvent::Changed(Utf8PathBuf::from("bestiary/goblin.md"));
/// assert_eq!(event.path().as_str(), "bestiary/goblin.md");
/// assert!(event.is_markdown());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A file was created or its content/metadata changed.
    Changed(Utf8PathBuf),

    /// A file moved from one path to another.
    Renamed {
        /// The path the file previously lived at.
        from: Utf8PathBuf,
        /// The path the file now lives at.
        to: Utf8PathBuf,
    },

    /// A file was removed.
    Deleted(Utf8PathBuf),
}

impl VaultEvent {
    /// Returns the primary path of this event.
    ///
    /// For renames this is the destination; the source is available via
    /// the variant's `from` field.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Changed(path) | Self::Deleted(path) => path,
            Self::Renamed { to, .. } => to,
        }
    }

    /// Returns `true` if any path involved has a `.md` extension.
    #[must_use]
    pub fn is_markdown(&self) -> bool {
        match self {
            Self::Changed(path) | Self::Deleted(path) => path.extension() == Some("md"),
            Self::Renamed { from, to } => {
                from.extension() == Some("md") || to.extension() == Some("md")
            }
        }
    }
}
