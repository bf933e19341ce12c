//! Domain types for the vault-bestiary system.
//!
//! This module contains the core domain types used throughout the workspace
//! for representing creature records, their provenance, statblock markers,
//! and note metadata.
//!
//! # Module Organization
//!
//! - [`creature`] - Creature records and provenance tiers
//! - [`marker`] - Statblock marker recognition
//! - [`note`] - Vault note metadata
//!
//! # Re-exports
//!
//! All public types are re-exported at this module level and at the crate
//! root for convenience:
//!
//! ```
//! use bestiary_core::{Creature, Marker, NoteMeta, Provenance};
//! ```

pub mod creature;
pub mod marker;
pub mod note;

pub use creature::{Creature, Provenance};
pub use marker::Marker;
pub use note::NoteMeta;
