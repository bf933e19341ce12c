//! Root-scoped access to vault files.
//!
//! [`Vault`] is the file accessor the coordinator serves worker pulls from.
//! All paths handed to consumers are vault-relative; conversion to and from
//! absolute paths (as emitted by the file watcher) happens here. Reads are
//! deliberately forgiving: a vanished or unreadable note is `None`, because
//! every caller treats that as "skip this file".

use std::fs;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::ScanError;

/// A note's content paired with the modification time observed at read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText {
    /// Full markdown text of the note.
    pub content: String,

    /// Modification time at the moment the content was read.
    pub mtime: SystemTime,
}

/// Root-scoped accessor for a vault directory.
///
/// # Examples
///
/// ```no_run
/// use bestiary_scanner::Vault;
/// use camino::Utf8Path;
///
/// # fn example() -> Result<(), bestiary_scanner::ScanError> {
/// let vault = Vault::open(Utf8Path::new("/path/to/vault"))?;
/// if let Some(note) = vault.read(Utf8Path::new("bestiary/goblin.md")) {
///     println!("{} bytes", note.content.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Vault {
    /// Canonicalized vault root.
    root: Utf8PathBuf,
}

impl Vault {
    /// Opens a vault rooted at the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::VaultRoot`] if the path is missing or not a
    /// directory.
    pub fn open(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::VaultRoot(root.to_owned()));
        }
        let root = root
            .canonicalize_utf8()
            .map_err(|_| ScanError::VaultRoot(root.to_owned()))?;
        Ok(Self { root })
    }

    /// Returns the canonicalized vault root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Joins a vault-relative path onto the root.
    #[must_use]
    pub fn absolute(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.root.join(path)
    }

    /// Converts an absolute path inside the vault to a vault-relative one.
    ///
    /// Returns `None` for paths outside the vault root.
    #[must_use]
    pub fn relativize(&self, path: &Utf8Path) -> Option<Utf8PathBuf> {
        path.strip_prefix(&self.root).ok().map(Utf8Path::to_owned)
    }

    /// Returns `true` if the vault-relative path exists as a file.
    #[must_use]
    pub fn exists(&self, path: &Utf8Path) -> bool {
        self.absolute(path).is_file()
    }

    /// Returns the live modification time of a vault-relative path.
    #[must_use]
    pub fn mtime(&self, path: &Utf8Path) -> Option<SystemTime> {
        fs::metadata(self.absolute(path))
            .and_then(|m| m.modified())
            .ok()
    }

    /// Reads a note's content and modification time.
    ///
    /// Returns `None` when the note doesn't exist or can't be read; the
    /// reason is logged at debug level and the caller skips the file.
    #[must_use]
    pub fn read(&self, path: &Utf8Path) -> Option<NoteText> {
        let absolute = self.absolute(path);
        let metadata = match fs::metadata(&absolute) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return None,
            Err(error) => {
                debug!(path = %path, error = %error, "Stat failed, skipping note");
                return None;
            }
        };
        let mtime = metadata.modified().ok()?;
        match fs::read_to_string(&absolute) {
            Ok(content) => Some(NoteText { content, mtime }),
            Err(error) => {
                debug!(path = %path, error = %error, "Read failed, skipping note");
                None
            }
        }
    }
}
