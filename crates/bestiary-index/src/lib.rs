//! Three-tier creature index with settled-state signalling.
//!
//! This crate provides [`CreatureIndex`], the in-memory store at the heart of
//! vault-bestiary. The index merges three provenance tiers by precedence
//! (user > derived > reference), answers name lookups from any number of
//! concurrent readers, and exposes a settled signal that consumers can await
//! to observe a consistent view between scan batches.
//!
//! # Architecture
//!
//! ```text
//!                lookup(name)
//!                     │
//!                     ▼
//!   ┌───────── CreatureIndex ─────────┐
//!   │  user tier      (host edits)    │   single writer: the
//!   │  derived tier   (scan pipeline) │ ◄─ scan coordinator
//!   │  reference tier (bundled set)   │
//!   └───────────────┬─────────────────┘
//!                   │
//!            SettledSignal
//!      (generation counter + wait)
//! ```
//!
//! # Usage
//!
//! ```
//! use bestiary_index::CreatureIndex;
//! use bestiary_core::{Creature, Provenance};
//!
//! let index = CreatureIndex::new();
//! index.upsert_user(Creature::new("Goblin", Provenance::User));
//! index.upsert_derived(Creature::new("Goblin", Provenance::Derived));
//!
//! // User tier shadows derived for the same name
//! let found = index.get("Goblin").unwrap();
//! assert_eq!(found.provenance, Provenance::User);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod index;
pub mod reference;
pub mod settled;

pub use index::CreatureIndex;
pub use settled::SettledSignal;
