//! Error types for the bestiary-watcher crate.

use camino::Utf8PathBuf;

/// Errors that can occur during vault watching operations.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): fatal, the watcher stops
/// - **Path not found** ([`WatchError::PathNotFound`]): fatal, the vault root must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): fatal, the consumer is gone
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): recoverable, the event is skipped
/// - **I/O errors** ([`WatchError::Io`]): fatal
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The vault root does not exist.
    #[error("vault path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path in an event is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred during path validation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if this error is recoverable (watching can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found() {
        let err = WatchError::path_not_found("vault/missing");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("vault/missing"));
    }

    #[test]
    fn test_non_utf8_recoverable() {
        let err = WatchError::NonUtf8Path(std::path::PathBuf::from("x"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_channel_closed_display() {
        assert!(
            WatchError::ChannelClosed
                .to_string()
                .contains("channel closed")
        );
    }
}
