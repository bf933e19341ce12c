//! Error types for the bestiary-parser crate.
//!
//! Every variant here is recoverable per-file: the worker logs the failure
//! at debug level and moves to the next queued path. No parse error ever
//! reaches the user or aborts a batch.

/// Errors that can occur while parsing a note into a creature record.
///
/// # Examples
///
/// ```
/// use bestiary_parser::ParseError;
///
/// let err = ParseError::MissingFrontMatter;
/// assert!(err.to_string().contains("front-matter"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The note has no front-matter block to parse.
    #[error("note has no front-matter block")]
    MissingFrontMatter,

    /// The marker asked for an inline statblock but the body has no
    /// fenced `statblock` code block.
    #[error("note has no inline statblock code block")]
    MissingInlineBlock,

    /// The statblock body is not valid YAML.
    #[error("malformed statblock YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The statblock body parsed but is not a key/value mapping.
    #[error("statblock body is not a key/value mapping")]
    NotAMapping,
}
