//! Message types between the scan coordinator and the parsing worker.
//!
//! The worker owns no file access and the coordinator does no parsing; the
//! boundary between them is these two enums. The flow is strictly pull-based:
//! the coordinator pushes only batches of paths ([`WorkerRequest::Queue`]),
//! and the worker asks for one file's content at a time
//! ([`WorkerReply::Get`]), which the coordinator answers with
//! [`WorkerRequest::File`]. An absent answer (`File(None)`) means "skip this
//! one" - missing file, unchanged mtime, or no statblock marker - and the
//! coordinator never says which.

use bestiary_core::{Creature, Marker, NoteMeta};
use camino::Utf8PathBuf;

/// A note's content bundled with what the worker needs to parse it.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteFile {
    /// Full markdown text of the note.
    pub content: String,

    /// The statblock marker found in the note's front matter.
    pub marker: Marker,

    /// Path, basename, and observed mtime of the note.
    pub meta: NoteMeta,
}

/// Messages from the coordinator to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRequest {
    /// Append these vault-relative paths to the worker's parse queue.
    Queue(Vec<Utf8PathBuf>),

    /// Answer to the worker's most recent [`WorkerReply::Get`].
    ///
    /// `None` tells the worker to move on without parsing.
    File(Option<NoteFile>),

    /// Toggle verbose per-file logging inside the worker.
    Debug(bool),
}

/// Messages from the worker back to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerReply {
    /// Request the content of the next queued path.
    Get(Utf8PathBuf),

    /// A note parsed successfully; merge this record into the index.
    Update {
        /// Vault-relative path the record was derived from.
        path: Utf8PathBuf,
        /// The parsed creature record.
        creature: Creature,
    },

    /// The parse queue drained; the current batch is complete.
    Save,
}
