//! Scope-aware traversal of the vault tree.
//!
//! Full rescans need the set of candidate notes up front. [`NoteWalker`]
//! produces that set: every markdown file under the vault root that falls
//! inside the configured scope prefixes, as sorted vault-relative paths.
//! Hidden directories (`.obsidian`, `.git`) and gitignored files are
//! skipped by the underlying walker.

use bestiary_core::ParseConfig;
use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::ScanError;
use crate::vault::Vault;

/// Walks a vault and collects in-scope markdown note paths.
///
/// # Examples
///
/// ```no_run
/// use bestiary_core::ParseConfig;
/// use bestiary_scanner::{NoteWalker, Vault};
/// use camino::Utf8Path;
///
/// # fn example() -> Result<(), bestiary_scanner::ScanError> {
/// let vault = Vault::open(Utf8Path::new("/path/to/vault"))?;
/// let scope = ParseConfig {
///     scope_paths: vec!["bestiary".to_owned()],
///     ..ParseConfig::default()
/// };
/// let notes = NoteWalker::with_scope(&vault, &scope).collect()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NoteWalker<'a> {
    vault: &'a Vault,
    scope: ParseConfig,
}

impl<'a> NoteWalker<'a> {
    /// Creates a walker over the whole vault, no scope restriction.
    #[must_use]
    pub fn new(vault: &'a Vault) -> Self {
        Self {
            vault,
            scope: ParseConfig::default(),
        }
    }

    /// Creates a walker restricted to the scope prefixes in `config`.
    #[must_use]
    pub fn with_scope(vault: &'a Vault, config: &ParseConfig) -> Self {
        Self {
            vault,
            scope: config.clone(),
        }
    }

    /// Collects every in-scope markdown note, sorted by vault-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if the directory traversal itself fails,
    /// or [`ScanError::NonUtf8Path`] for a path that cannot be represented
    /// in UTF-8.
    pub fn collect(&self) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let mut paths = Vec::new();
        for entry in WalkBuilder::new(self.vault.root())
            .follow_links(false)
            .build()
        {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = Utf8Path::from_path(entry.path())
                .ok_or_else(|| ScanError::NonUtf8Path(entry.path().to_owned()))?;
            if path.extension() != Some("md") {
                continue;
            }
            let Some(relative) = self.vault.relativize(path) else {
                continue;
            };
            if !self.scope.contains_path(relative.as_str()) {
                continue;
            }
            paths.push(relative);
        }
        paths.sort_unstable();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn vault_with_notes(notes: &[&str]) -> (TempDir, Vault) {
        let dir = TempDir::new().expect("temp dir");
        for note in notes {
            let path = dir.path().join(note);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(path, "---\nstatblock: true\n---\n").expect("write note");
        }
        let root = Utf8Path::from_path(dir.path()).expect("utf8 path").to_owned();
        let vault = Vault::open(&root).expect("open vault");
        (dir, vault)
    }

    #[test]
    fn test_collects_markdown_only() {
        let (_dir, vault) = vault_with_notes(&["goblin.md", "orc.md", "map.png", "notes.txt"]);

        let paths = NoteWalker::new(&vault).collect().expect("walk");
        let names: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["goblin.md", "orc.md"]);
    }

    #[test]
    fn test_sorted_and_recursive() {
        let (_dir, vault) =
            vault_with_notes(&["z.md", "bestiary/dragons/red.md", "bestiary/a.md"]);

        let paths = NoteWalker::new(&vault).collect().expect("walk");
        let names: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["bestiary/a.md", "bestiary/dragons/red.md", "z.md"]);
    }

    #[test]
    fn test_scope_prefix_filters() {
        let (_dir, vault) =
            vault_with_notes(&["bestiary/goblin.md", "npcs/lich.md", "journal/day1.md"]);

        let scope = ParseConfig {
            scope_paths: vec!["bestiary".to_owned(), "npcs".to_owned()],
            ..ParseConfig::default()
        };
        let paths = NoteWalker::with_scope(&vault, &scope).collect().expect("walk");
        let names: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["bestiary/goblin.md", "npcs/lich.md"]);
    }

    #[test]
    fn test_root_scope_matches_everything() {
        let (_dir, vault) = vault_with_notes(&["bestiary/goblin.md", "journal/day1.md"]);

        let scope = ParseConfig {
            scope_paths: vec!["/".to_owned()],
            ..ParseConfig::default()
        };
        let paths = NoteWalker::with_scope(&vault, &scope).collect().expect("walk");
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_hidden_directories_skipped() {
        let (_dir, vault) = vault_with_notes(&["goblin.md", ".obsidian/workspace.md"]);

        let paths = NoteWalker::new(&vault).collect().expect("walk");
        let names: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["goblin.md"]);
    }
}
