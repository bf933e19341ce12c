//! The scan coordinator event loop.
//!
//! One task owns everything mutable here: the watch table mapping tracked
//! note paths to the creature names they produced, the worker channels, and
//! the currently active scan. Vault events, host commands, and worker
//! replies all funnel into [`ScanCoordinator::run`], which is the only
//! writer of the index's derived tier.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use bestiary_core::{Config, FxHashMap};
use bestiary_index::CreatureIndex;
use bestiary_parser::{frontmatter, statblock};
use bestiary_watcher::VaultEvent;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{NoteFile, WorkerRequest, WorkerReply};
use crate::vault::Vault;
use crate::walker::NoteWalker;
use crate::worker;

/// Channel capacity for both directions of the worker protocol.
const WORKER_CHANNEL_CAPACITY: usize = 64;

/// Host commands accepted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanCommand {
    /// Walk the vault and re-parse every in-scope note.
    Rescan {
        /// Whether to emit a [`Notice::ScanComplete`] when the batch settles.
        announce: bool,
    },

    /// Toggle verbose per-file logging in the coordinator and worker.
    SetDebug(bool),

    /// Stop the event loop.
    Shutdown,
}

/// User-facing announcements emitted by the coordinator.
///
/// Delivery is best-effort: if the host isn't listening, notices are
/// dropped rather than blocking the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An announced scan finished and the index is settled.
    ScanComplete {
        /// Number of derived-tier records after the scan.
        creatures: usize,
        /// Wall-clock time from scan start to settle.
        elapsed: Duration,
    },

    /// The parsing worker died; derived records will no longer refresh.
    WorkerLost,
}

/// A note currently contributing a derived record.
#[derive(Debug, Clone)]
struct TrackedNote {
    /// Name of the creature record this note produced.
    name: String,

    /// Modification time observed when the record was parsed.
    mtime: Option<SystemTime>,
}

/// An in-flight scan batch.
#[derive(Debug)]
struct ActiveScan {
    announce: bool,
    started_at: Instant,
}

/// Owns the watch table and drives the parse pipeline.
///
/// Construct with [`ScanCoordinator::new`] (inside a Tokio runtime; the
/// worker task is spawned immediately), then hand the coordinator to
/// [`run`](ScanCoordinator::run) along with the event and command channels.
pub struct ScanCoordinator {
    index: Arc<CreatureIndex>,
    vault: Vault,
    config: Arc<RwLock<Config>>,

    /// Tracked notes: vault-relative path to the record it produced.
    watch_paths: FxHashMap<Utf8PathBuf, TrackedNote>,

    to_worker: mpsc::Sender<WorkerRequest>,
    from_worker: Option<mpsc::Receiver<WorkerReply>>,

    active: Option<ActiveScan>,
    notices: Option<mpsc::Sender<Notice>>,
    worker_lost: bool,
}

impl ScanCoordinator {
    /// Creates a coordinator and spawns its parsing worker.
    ///
    /// Must be called within a Tokio runtime.
    #[must_use]
    pub fn new(index: Arc<CreatureIndex>, vault: Vault, config: Arc<RwLock<Config>>) -> Self {
        let (request_tx, request_rx) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        let (reply_tx, reply_rx) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        tokio::spawn(worker::run(request_rx, reply_tx));

        Self {
            index,
            vault,
            config,
            watch_paths: FxHashMap::default(),
            to_worker: request_tx,
            from_worker: Some(reply_rx),
            active: None,
            notices: None,
            worker_lost: false,
        }
    }

    /// Attaches a channel for user-facing notices.
    #[must_use]
    pub fn with_notices(mut self, notices: mpsc::Sender<Notice>) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Runs the event loop until [`ScanCommand::Shutdown`] arrives or the
    /// command channel closes.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<VaultEvent>,
        mut commands: mpsc::Receiver<ScanCommand>,
    ) {
        let Some(mut from_worker) = self.from_worker.take() else {
            return;
        };
        let mut events_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ScanCommand::Rescan { announce }) => self.start_scan(announce).await,
                    Some(ScanCommand::SetDebug(enabled)) => self.set_debug(enabled).await,
                    Some(ScanCommand::Shutdown) | None => break,
                },
                reply = from_worker.recv(), if !self.worker_lost => match reply {
                    Some(reply) => self.handle_reply(reply).await,
                    None => self.worker_gone(),
                },
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_event(event).await,
                    None => events_open = false,
                },
            }
        }
    }

    /// Walks the vault and queues every in-scope note for parsing.
    async fn start_scan(&mut self, announce: bool) {
        let parse = self.config.read().parse.clone();
        let vault = self.vault.clone();
        let walked =
            tokio::task::spawn_blocking(move || NoteWalker::with_scope(&vault, &parse).collect())
                .await;

        match walked {
            Ok(Ok(paths)) => {
                info!(files = paths.len(), "Starting vault scan");
                self.queue(paths, announce).await;
            }
            Ok(Err(error)) => {
                warn!(error = %error, "Vault walk failed, scan abandoned");
            }
            Err(error) => {
                warn!(error = %error, "Vault walk task failed, scan abandoned");
            }
        }
    }

    /// Queues a batch of paths and opens (or extends) the active scan.
    async fn queue(&mut self, paths: Vec<Utf8PathBuf>, announce: bool) {
        if self.worker_lost {
            return;
        }
        self.index.mark_batch_started();

        // Overlapping scans coalesce in the worker's FIFO; only the most
        // recently started scan's announce intent and start time survive.
        let was_idle = self.active.is_none();
        self.active = Some(ActiveScan {
            announce,
            started_at: Instant::now(),
        });

        if paths.is_empty() {
            // Nothing to parse. If the worker is mid-batch its eventual
            // Save covers this generation; otherwise settle immediately.
            if was_idle {
                self.finish_scan();
            }
            return;
        }

        if self.to_worker.send(WorkerRequest::Queue(paths)).await.is_err() {
            self.worker_gone();
        }
    }

    /// Reacts to one vault change event.
    async fn handle_event(&mut self, event: VaultEvent) {
        let parse = self.config.read().parse.clone();
        if !parse.auto_parse {
            return;
        }

        match event {
            VaultEvent::Changed(path) => {
                let Some(relative) = self.vault.relativize(&path) else {
                    return;
                };
                if relative.extension() == Some("md") && parse.contains_path(relative.as_str()) {
                    self.queue(vec![relative], false).await;
                }
            }
            VaultEvent::Deleted(path) => {
                if let Some(relative) = self.vault.relativize(&path) {
                    self.retract(&relative);
                }
            }
            VaultEvent::Renamed { from, to } => {
                // Untracked sources never trigger work; the destination
                // surfaces later through an ordinary change event.
                let was_tracked = self
                    .vault
                    .relativize(&from)
                    .is_some_and(|relative| self.retract(&relative));
                if !was_tracked {
                    return;
                }
                let Some(relative) = self.vault.relativize(&to) else {
                    return;
                };
                if relative.extension() == Some("md") && parse.contains_path(relative.as_str()) {
                    self.queue(vec![relative], false).await;
                }
            }
        }
    }

    /// Handles one message from the worker.
    async fn handle_reply(&mut self, reply: WorkerReply) {
        match reply {
            WorkerReply::Get(path) => {
                let served = self.serve_content(&path);
                if self.to_worker.send(WorkerRequest::File(served)).await.is_err() {
                    self.worker_gone();
                }
            }
            WorkerReply::Update { path, creature } => {
                debug!(path = %path, name = %creature.name, "Indexing derived record");
                let tracked = TrackedNote {
                    name: creature.name.clone(),
                    mtime: creature.mtime,
                };
                if let Some(previous) = self.watch_paths.insert(path, tracked) {
                    // The note now describes a different creature; the old
                    // record has no remaining source.
                    if previous.name != creature.name {
                        self.index.remove_derived(&previous.name);
                    }
                }
                self.index.upsert_derived(creature);
            }
            WorkerReply::Save => self.finish_scan(),
        }
    }

    /// Answers a worker content pull.
    ///
    /// `None` covers every skip case: the file is gone or unreadable, its
    /// mtime matches the record we already hold, or it carries no statblock
    /// marker. The first and last of those also retract any record the
    /// path was contributing.
    fn serve_content(&mut self, path: &Utf8Path) -> Option<NoteFile> {
        let debug_enabled = self.config.read().parse.debug;

        let Some(note) = self.vault.read(path) else {
            // Vanished between queueing and the pull.
            self.retract(path);
            return None;
        };

        if let Some(tracked) = self.watch_paths.get(path) {
            if tracked.mtime == Some(note.mtime) {
                if debug_enabled {
                    debug!(path = %path, "Unchanged since last parse, skipping");
                }
                return None;
            }
        }

        let marker = frontmatter::extract(&note.content)
            .and_then(|front_matter| statblock::marker_of(front_matter.block));
        let Some(marker) = marker else {
            if debug_enabled {
                debug!(path = %path, "No statblock marker, skipping");
            }
            self.retract(path);
            return None;
        };

        let meta = bestiary_core::NoteMeta::new(path.to_owned(), note.mtime);
        Some(NoteFile {
            content: note.content,
            marker,
            meta,
        })
    }

    /// Removes a tracked note's derived record, if it has one.
    ///
    /// Returns `true` if the path was tracked.
    fn retract(&mut self, path: &Utf8Path) -> bool {
        if let Some(tracked) = self.watch_paths.remove(path) {
            debug!(path = %path, name = %tracked.name, "Retracting derived record");
            self.index.remove_derived(&tracked.name);
            return true;
        }
        false
    }

    /// Settles the current batch and announces it if requested.
    fn finish_scan(&mut self) {
        self.index.mark_batch_settled();
        if let Some(active) = self.active.take() {
            let elapsed = active.started_at.elapsed();
            let creatures = self.index.derived_len();
            info!(
                creatures,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "Vault scan settled"
            );
            if active.announce {
                self.notify(Notice::ScanComplete { creatures, elapsed });
            }
        }
    }

    /// Toggles debug logging here and in the worker.
    async fn set_debug(&mut self, enabled: bool) {
        self.config.write().parse.debug = enabled;
        if !self.worker_lost
            && self
                .to_worker
                .send(WorkerRequest::Debug(enabled))
                .await
                .is_err()
        {
            self.worker_gone();
        }
    }

    /// Marks the worker as lost and settles any scan waiters.
    ///
    /// The derived tier freezes at its current contents; user- and
    /// reference-tier lookups continue to work.
    fn worker_gone(&mut self) {
        if self.worker_lost {
            return;
        }
        self.worker_lost = true;
        warn!("Parsing worker is gone; derived records will no longer refresh");
        self.notify(Notice::WorkerLost);
        self.finish_scan();
    }

    /// Best-effort notice delivery.
    fn notify(&self, notice: Notice) {
        if let Some(notices) = &self.notices {
            if notices.try_send(notice).is_err() {
                debug!("Notice dropped, no listener");
            }
        }
    }
}
