//! Creature records and their provenance tiers.
//!
//! This module provides [`Creature`], the structured record describing a
//! named statblock, and [`Provenance`], the tier a record belongs to.
//!
//! A creature's statblock attributes are kept as an open field map rather
//! than a fixed struct: layouts downstream decide which keys they render,
//! and homebrew notes routinely carry keys no schema anticipates.

use std::time::SystemTime;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The provenance tier of a creature record.
///
/// Tiers partition the index and define lookup precedence:
/// user > derived > reference.
///
/// # Examples
///
/// ```
/// use bestiary_core::Provenance;
///
/// assert!(Provenance::User.shadows(Provenance::Derived));
/// assert!(Provenance::Derived.shadows(Provenance::Reference));
/// assert!(!Provenance::Reference.shadows(Provenance::User));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Explicitly created or edited by the user; persisted by the host.
    User,

    /// Derived from a vault note by the parsing pipeline.
    Derived,

    /// Loaded once at startup from the bundled reference set.
    Reference,
}

impl Provenance {
    /// Returns `true` if a record in this tier shadows a record with the
    /// same name in `other`.
    ///
    /// Precedence is a documented policy of the index, expressed here in
    /// one place: user beats derived beats reference.
    #[inline]
    #[must_use]
    pub const fn shadows(self, other: Self) -> bool {
        (self.rank()) < (other.rank())
    }

    /// Lookup rank, lower wins.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Derived => 1,
            Self::Reference => 2,
        }
    }
}

/// A structured record describing a named statblock.
///
/// The name is the unique, case-sensitive key within the record's tier.
/// File-backed records (derived tier) carry their source path and the
/// modification time observed when they were parsed; user and reference
/// records usually carry neither.
///
/// # Snapshot Semantics
///
/// Consumers receive cloned records from the index, never live references.
/// Mutating a returned record has no effect on the index.
///
/// # Examples
///
/// ```
/// use bestiary_core::{Creature, Provenance};
/// use serde_json::json;
///
/// let mut goblin = Creature::new("Goblin", Provenance::Derived);
/// goblin.fields.insert("hp".to_owned(), json!(7));
/// goblin.fields.insert("ac".to_owned(), json!(15));
///
/// assert_eq!(goblin.name, "Goblin");
/// assert_eq!(goblin.fields.get("hp"), Some(&json!(7)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    /// Unique name within the record's tier.
    pub name: String,

    /// Provenance tier this record belongs to.
    pub provenance: Provenance,

    /// Vault-relative path of the source note, if file-backed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,

    /// Modification time of the source note when last parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<SystemTime>,

    /// Identifier of the layout used to render this creature, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    /// Open map of statblock attributes.
    #[serde(default, flatten)]
    pub fields: Map<String, Value>,
}

impl Creature {
    /// Creates a new creature with the given name and provenance and no
    /// other data.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary_core::{Creature, Provenance};
    ///
    /// let c = Creature::new("Owlbear", Provenance::User);
    /// assert!(c.path.is_none());
    /// assert!(c.fields.is_empty());
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            provenance,
            path: None,
            mtime: None,
            layout: None,
            fields: Map::new(),
        }
    }

    /// Sets the source path, consuming and returning the record.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the source modification time, consuming and returning the record.
    #[must_use]
    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Returns the value of a statblock attribute, if present.
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if this record was derived from a vault note.
    #[inline]
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.provenance == Provenance::Derived
    }
}
