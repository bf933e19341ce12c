//! File filtering for watch events.
//!
//! Events are filtered in the blocking watcher thread before they are sent
//! to the channel; filtering at the source keeps non-vault noise (editor
//! swap files, attachments) out of the coordinator entirely.

use camino::Utf8Path;

/// A predicate deciding which file events to forward.
///
/// Filters run on the blocking watcher thread, so implementations must be
/// [`Send`] + [`Sync`] + `'static`.
///
/// For rename events the filter sees both sides and the event is forwarded
/// when either side passes, so a note renamed away from `.md` still reaches
/// the coordinator for retraction.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if an event for the file at `path` should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts every file.
///
/// # Examples
///
/// ```
/// use bestiary_watcher::{AcceptAllFilter, FileFilter};
/// use camino::Utf8Path;
///
/// assert!(AcceptAllFilter.should_process(Utf8Path::new("anything.bin")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// A filter for markdown notes (`.md`), skipping hidden files.
///
/// This is the filter the bestiary uses in production: only markdown leaves
/// can carry statblocks, and dot-files are editor or sync artifacts.
///
/// # Examples
///
/// ```
/// use bestiary_watcher::{FileFilter, MarkdownFilter};
/// use camino::Utf8Path;
///
/// assert!(MarkdownFilter.should_process(Utf8Path::new("bestiary/goblin.md")));
/// assert!(!MarkdownFilter.should_process(Utf8Path::new("art/goblin.png")));
/// assert!(!MarkdownFilter.should_process(Utf8Path::new(".trash/old.md")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFilter;

impl FileFilter for MarkdownFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        if path.extension() != Some("md") {
            return false;
        }
        !path
            .components()
            .any(|c| c.as_str().starts_with('.') && c.as_str().len() > 1)
    }
}
