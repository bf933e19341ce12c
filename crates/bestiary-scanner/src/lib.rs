//! Scan coordinator and pull-based parsing worker for vault notes.
//!
//! This crate keeps the [`CreatureIndex`](bestiary_index::CreatureIndex)
//! consistent with a continuously mutating vault without blocking
//! interactive use. File change events are filtered and batched by the
//! [`ScanCoordinator`], parsed off the event loop by a [`worker`] task, and
//! merged back into the index with per-path ownership tracking so deletes
//! and renames retract cleanly.
//!
//! # Architecture
//!
//! ```text
//!  vault events ──► ScanCoordinator ──Queue──► ParsingWorker
//!                       │   ▲                      │
//!                       │   └──────File────────────┤ Get (pull, one
//!                       │                          │  path at a time)
//!          CreatureIndex◄──upsert/retract──Update──┤
//!                       ▲                          │
//!                       └─────mark settled────Save─┘
//! ```
//!
//! The two sides share no memory; every interaction is a typed message
//! ([`protocol`]). The worker pulls content path by path, which gives
//! natural backpressure: the coordinator never reads ahead of the worker's
//! own consumption rate.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use bestiary_core::Config;
//! use bestiary_index::CreatureIndex;
//! use bestiary_scanner::{ScanCommand, ScanCoordinator, Vault};
//! use camino::Utf8Path;
//! use parking_lot::RwLock;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), bestiary_scanner::ScanError> {
//! let index = Arc::new(CreatureIndex::new());
//! let vault = Vault::open(Utf8Path::new("/path/to/vault"))?;
//! let config = Arc::new(RwLock::new(Config::default()));
//!
//! let coordinator = ScanCoordinator::new(Arc::clone(&index), vault, config);
//! let (command_tx, command_rx) = mpsc::channel(8);
//! let (_event_tx, event_rx) = mpsc::channel(100);
//! tokio::spawn(coordinator.run(event_rx, command_rx));
//!
//! command_tx.send(ScanCommand::Rescan { announce: false }).await.ok();
//! index.await_settled().await;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod coordinator;
pub mod error;
pub mod protocol;
pub mod vault;
pub mod walker;
pub mod worker;

pub use coordinator::{Notice, ScanCommand, ScanCoordinator};
pub use error::ScanError;
pub use protocol::{NoteFile, WorkerReply, WorkerRequest};
pub use vault::Vault;
pub use walker::NoteWalker;
