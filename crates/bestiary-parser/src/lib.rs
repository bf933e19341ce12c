//! Front-matter and inline statblock parsing for vault notes.
//!
//! This crate turns raw markdown text into [`Creature`](bestiary_core::Creature)
//! records. It is pure with respect to the rest of the system: it reads only
//! the content handed to it and performs no I/O, which is what lets the
//! parsing worker run it in an isolated task with no shared state.
//!
//! # Overview
//!
//! Parsing happens in two stages:
//!
//! 1. **Marker detection** ([`statblock::marker_of`]): the front-matter block
//!    is inspected for a `statblock` key. Only the tokens `true`, `"true"`,
//!    and `"inline"` qualify; anything else means the note is not a
//!    statblock source.
//! 2. **Record mapping** ([`statblock::parse_note`]): depending on the
//!    marker kind, either the front-matter mapping or a fenced `statblock`
//!    code block in the body is parsed as YAML and normalized into the
//!    creature field shape.
//!
//! # Example
//!
//! ```
//! use bestiary_core::{Marker, NoteMeta};
//! use bestiary_parser::{frontmatter, statblock};
//! use camino::Utf8PathBuf;
//! use std::time::SystemTime;
//!
//! let note = "---\nstatblock: true\nname: Goblin\nhp: 7\n---\nA nasty little creature.\n";
//!
//! let fm = frontmatter::extract(note).unwrap();
//! let marker = statblock::marker_of(fm.block).unwrap();
//! assert_eq!(marker, Marker::FrontMatter);
//!
//! let meta = NoteMeta::new(Utf8PathBuf::from("bestiary/goblin.md"), SystemTime::now());
//! let creature = statblock::parse_note(note, marker, &meta).unwrap();
//! assert_eq!(creature.name, "Goblin");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod frontmatter;
pub mod statblock;

pub use error::ParseError;
pub use frontmatter::FrontMatter;
