//! Error types for the bestiary-scanner crate.
//!
//! # Error Recovery Strategy
//!
//! - **Walk errors** ([`ScanError::Walk`]): fatal for that scan request;
//!   the scan is abandoned and reported once.
//! - **Read errors**: never surface here - an unreadable note is answered
//!   to the worker as an absent file and skipped.
//! - **Vault root errors** ([`ScanError::VaultRoot`]): fatal at setup.

use camino::Utf8PathBuf;

/// Errors that can occur during scanning operations.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk the vault directory tree.
    #[error("failed to walk vault: {0}")]
    Walk(#[from] ignore::Error),

    /// The vault root does not exist or is not a directory.
    #[error("vault root is not a directory: {0}")]
    VaultRoot(Utf8PathBuf),

    /// A path inside the vault is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The parsing worker is no longer reachable.
    ///
    /// Derived-tier parsing is unavailable for the rest of the session;
    /// user- and reference-tier lookups keep working.
    #[error("parsing worker is unavailable")]
    WorkerUnavailable,
}
