//! Vault watcher bridging notify to the async runtime.
//!
//! The synchronous `notify` watcher runs on a blocking thread; raw event
//! kinds are mapped to [`VaultEvent`]s, filtered, debounced, and forwarded
//! over a bounded tokio channel for async consumption.

use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use bestiary_core::{FxHashMap, WatchConfig};

use crate::error::WatchError;
use crate::events::VaultEvent;
use crate::filter::FileFilter;

/// Default channel capacity for vault events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// A vault watcher that streams typed events to an async context.
///
/// # Lifecycle
///
/// 1. **Creation**: [`VaultWatcher::new`] validates the vault root, creates
///    channels, and spawns a blocking task running the notify watcher.
/// 2. **Event reception**: use [`recv`](Self::recv) or
///    [`events`](Self::events) to consume [`VaultEvent`]s; they are already
///    filtered and debounced.
/// 3. **Shutdown**: call [`shutdown`](Self::shutdown) for graceful teardown,
///    or drop the watcher to signal the blocking task asynchronously.
///
/// # Examples
///
/// ```no_run
/// use bestiary_watcher::{MarkdownFilter, VaultWatcher};
/// use bestiary_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), bestiary_watcher::WatchError> {
/// let mut watcher = VaultWatcher::new(
///     Utf8Path::new("./vault"),
///     &WatchConfig::default(),
///     MarkdownFilter,
/// ).await?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("vault event: {event:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct VaultWatcher {
    /// Shutdown signal sender; `None` once shutdown has been initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking watcher task.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<VaultEvent>,

    /// The vault root being watched.
    vault_root: Utf8PathBuf,
}

impl std::fmt::Debug for VaultWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultWatcher")
            .field("vault_root", &self.vault_root)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl VaultWatcher {
    /// Creates a new watcher over the given vault root.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the root doesn't exist and
    /// [`WatchError::Notify`] if the underlying watcher fails to start.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: FileFilter>(
        root: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        if !root.exists() {
            return Err(WatchError::path_not_found(root));
        }
        let vault_root = root.canonicalize_utf8().map_err(WatchError::Io)?;

        let (event_tx, event_rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_root = vault_root.clone();
        let debounce_ms = config.debounce_ms;
        let recursive = config.recursive;

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_root, debounce_ms, recursive, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            vault_root,
        })
    }

    /// Receives the next vault event.
    ///
    /// Returns `None` when the watcher has been shut down.
    pub async fn recv(&mut self) -> Option<VaultEvent> {
        self.event_rx.recv().await
    }

    /// Tries to receive a vault event without waiting.
    pub fn try_recv(&mut self) -> Result<VaultEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns a mutable reference to the event receiver, for use with
    /// `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<VaultEvent> {
        &mut self.event_rx
    }

    /// Returns the canonicalized vault root being watched.
    #[must_use]
    pub fn vault_root(&self) -> &Utf8Path {
        &self.vault_root
    }

    /// Returns `true` if the watcher is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Gracefully shuts down the watcher and awaits the blocking task.
    ///
    /// # Errors
    ///
    /// Returns any error the watcher thread encountered during operation.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if the receiver is already gone
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }
        Ok(())
    }
}

impl Drop for VaultWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Drop is sync; the blocking task stops when it sees the signal.
    }
}

/// Runs the notify watcher loop in a blocking context.
#[allow(clippy::needless_pass_by_value)] // Root must be owned for the task lifetime
fn run_watcher_loop<F: FileFilter>(
    root: Utf8PathBuf,
    debounce_ms: u64,
    recursive: bool,
    event_tx: mpsc::Sender<VaultEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let debounce = Duration::from_millis(debounce_ms);
    let mut last_changed: FxHashMap<Utf8PathBuf, Instant> = FxHashMap::default();
    let tx = event_tx;

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let event = match res {
            Ok(event) => event,
            Err(error) => {
                tracing::warn!(error = %error, "Watcher error");
                return;
            }
        };

        for vault_event in map_event(event) {
            if !passes(&filter, &vault_event) {
                tracing::trace!(event = ?vault_event, "Filtered out vault event");
                continue;
            }

            // Debounce rapid change bursts (saves during typing) per path.
            if let VaultEvent::Changed(path) = &vault_event {
                let now = Instant::now();
                if let Some(last) = last_changed.get(path) {
                    if now.duration_since(*last) < debounce {
                        continue;
                    }
                }
                last_changed.insert(path.clone(), now);
            }

            if tx.blocking_send(vault_event).is_err() {
                tracing::debug!("Event channel closed, stopping watcher");
                return;
            }
        }
    })?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(root.as_std_path(), mode)?;

    tracing::info!(root = %root, recursive, "Vault watcher started");

    // Block until the shutdown signal arrives.
    let _ = shutdown_rx.blocking_recv();

    tracing::info!(root = %root, "Vault watcher stopped");
    Ok(())
}

/// Maps a raw notify event onto zero or more vault events.
fn map_event(event: Event) -> Vec<VaultEvent> {
    let mut paths = Vec::with_capacity(event.paths.len());
    for path in event.paths {
        match Utf8PathBuf::try_from(path) {
            Ok(path) => paths.push(path),
            Err(error) => {
                tracing::warn!(
                    path = %error.as_path().display(),
                    "Skipping non-UTF-8 path in vault event"
                );
            }
        }
    }

    match event.kind {
        EventKind::Modify(ModifyKind::Name(mode)) => map_rename(mode, paths),
        EventKind::Create(_) | EventKind::Modify(_) => {
            paths.into_iter().map(VaultEvent::Changed).collect()
        }
        EventKind::Remove(_) => paths.into_iter().map(VaultEvent::Deleted).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// Maps a rename event, whose shape varies by platform backend.
fn map_rename(mode: RenameMode, mut paths: Vec<Utf8PathBuf>) -> Vec<VaultEvent> {
    match mode {
        // One event carrying both sides of the rename.
        RenameMode::Both | RenameMode::Any if paths.len() == 2 => {
            let to = paths.pop().unwrap_or_default();
            let from = paths.pop().unwrap_or_default();
            vec![VaultEvent::Renamed { from, to }]
        }
        // Split events: the old path vanished, the new one appeared.
        RenameMode::From => paths.into_iter().map(VaultEvent::Deleted).collect(),
        RenameMode::To => paths.into_iter().map(VaultEvent::Changed).collect(),
        // Single-path renames with unknown direction: report what exists.
        _ => paths
            .into_iter()
            .map(|p| {
                if p.exists() {
                    VaultEvent::Changed(p)
                } else {
                    VaultEvent::Deleted(p)
                }
            })
            .collect(),
    }
}

/// Applies the filter, letting rename events through when either side passes.
fn passes<F: FileFilter>(filter: &F, event: &VaultEvent) -> bool {
    match event {
        VaultEvent::Changed(path) | VaultEvent::Deleted(path) => filter.should_process(path),
        VaultEvent::Renamed { from, to } => {
            filter.should_process(from) || filter.should_process(to)
        }
    }
}
