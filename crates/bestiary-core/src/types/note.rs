//! Vault note metadata.

use std::time::SystemTime;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Metadata identifying a vault note at a point in time.
///
/// Travels alongside note content through the parsing pipeline so the
/// resulting creature record can be stamped with its origin. The
/// modification time is the value observed when the content was read;
/// the index later compares it against the live file to skip unchanged
/// notes.
///
/// # Examples
///
/// ```
/// use bestiary_core::NoteMeta;
/// use camino::Utf8PathBuf;
/// use std::time::SystemTime;
///
/// let meta = NoteMeta::new(Utf8PathBuf::from("bestiary/goblin.md"), SystemTime::now());
/// assert_eq!(meta.basename, "goblin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    /// Vault-relative path of the note.
    pub path: Utf8PathBuf,

    /// File name without directory or the `.md` extension.
    pub basename: String,

    /// Modification time observed when the note was read.
    pub mtime: SystemTime,
}

impl NoteMeta {
    /// Creates note metadata, deriving the basename from the path.
    #[must_use]
    pub fn new(path: Utf8PathBuf, mtime: SystemTime) -> Self {
        let basename = path.file_stem().unwrap_or(path.as_str()).to_owned();
        Self {
            path,
            basename,
            mtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_derivation() {
        let meta = NoteMeta::new(
            Utf8PathBuf::from("bestiary/dragons/red dragon.md"),
            SystemTime::UNIX_EPOCH,
        );
        assert_eq!(meta.basename, "red dragon");
        assert_eq!(meta.path.as_str(), "bestiary/dragons/red dragon.md");
    }

    #[test]
    fn test_basename_without_extension() {
        let meta = NoteMeta::new(Utf8PathBuf::from("notes/README"), SystemTime::UNIX_EPOCH);
        assert_eq!(meta.basename, "README");
    }
}
