//! Front-matter block extraction.
//!
//! A front-matter block is a YAML document delimited by `---` lines at the
//! very start of a note:
//!
//! ```text
//! ---
//! statblock: true
//! name: Goblin
//! ---
//! The note body starts here.
//! ```
//!
//! Extraction is purely textual; YAML interpretation happens later in
//! [`statblock`](crate::statblock) so that a malformed block can still be
//! reported with its raw text available.

/// The borrowed pieces of a note split around its front-matter block.
///
/// # Examples
///
/// ```
/// use bestiary_parser::frontmatter;
///
/// let note = "---\nname: Goblin\n---\nBody text.\n";
/// let fm = frontmatter::extract(note).unwrap();
/// assert_eq!(fm.block.trim(), "name: Goblin");
/// assert_eq!(fm.body.trim(), "Body text.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// The YAML text between the delimiters, without the delimiters.
    pub block: &'a str,

    /// The note body after the closing delimiter.
    pub body: &'a str,
}

/// Splits a note into its front-matter block and body.
///
/// Returns `None` when the note does not open with a `---` delimiter line
/// or the closing delimiter is missing. A note without front matter is a
/// normal case, not an error.
#[must_use]
pub fn extract(content: &str) -> Option<FrontMatter<'_>> {
    // Tolerate a UTF-8 BOM before the opening delimiter.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    let rest = rest.strip_prefix('\n')?;

    // The closing delimiter must sit on its own line.
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if matches!(line.trim_end(), "---" | "...") {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some(FrontMatter { block, body });
        }
        offset += line.len();
    }
    None
}
