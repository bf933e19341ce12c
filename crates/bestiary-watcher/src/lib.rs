//! Vault file watcher with async event streaming.
//!
//! This crate bridges the synchronous `notify` file watcher to the async
//! tokio runtime, producing typed [`VaultEvent`]s (changed, renamed,
//! deleted) for the scan coordinator. It plays the role the host
//! application's metadata-cache and vault callbacks play when the bestiary
//! runs embedded: a change-event source the coordinator only ever
//! subscribes to.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                   Blocking Thread (spawn_blocking)             │
//! │  ┌───────────────────┐   ┌───────────────┐   ┌─────────────┐  │
//! │  │ RecommendedWatcher│ → │ kind mapping  │ → │ filter +    │  │
//! │  │ (notify)          │   │ (VaultEvent)  │   │ debounce    │  │
//! │  └───────────────────┘   └───────────────┘   └──────┬──────┘  │
//! └──────────────────────────────────────────────────────│─────────┘
//!                                         blocking_send  │
//!                                                        ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                   Async Runtime (tokio)                        │
//! │  ┌───────────────────┐   ┌────────────────┐                    │
//! │  │ VaultWatcher      │   │ mpsc::Receiver │ → ScanCoordinator  │
//! │  │ (shutdown ctrl)   │   │ (events)       │                    │
//! │  └───────────────────┘   └────────────────┘                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use bestiary_watcher::{MarkdownFilter, VaultWatcher};
//! use bestiary_core::WatchConfig;
//! use camino::Utf8Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bestiary_watcher::WatchError> {
//!     let config = WatchConfig::default();
//!     let mut watcher = VaultWatcher::new(
//!         Utf8Path::new("/path/to/vault"),
//!         &config,
//!         MarkdownFilter,
//!     ).await?;
//!
//!     while let Some(event) = watcher.recv().await {
//!         println!("vault event: {event:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use error::WatchError;
pub use events::VaultEvent;
pub use filter::{AcceptAllFilter, FileFilter, MarkdownFilter};
pub use watcher::VaultWatcher;
