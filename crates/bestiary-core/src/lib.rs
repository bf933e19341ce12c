//! Core types, errors, and utilities for the vault-bestiary workspace.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Error types for consistent error handling
//! - Configuration structures
//! - Domain types ([`Creature`], [`Provenance`], [`Marker`], [`NoteMeta`])
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)
//!
//! # Crate Dependencies
//!
//! ```text
//! bestiary-cli ──► bestiary-scanner ──► bestiary-parser ──► bestiary-core
//!              ├─► bestiary-watcher ──────────────────────────────────►
//!              └─► bestiary-index ────────────────────────────────────►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{Config, ParseConfig, WatchConfig};
pub use error::ConfigError;
pub use hash::{fx_hash_map, fx_hash_set, FxBuildHasher, FxHashMap, FxHashSet};
pub use types::{Creature, Marker, NoteMeta, Provenance};
