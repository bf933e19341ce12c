//! The pull-based parsing worker task.
//!
//! The worker keeps a FIFO of queued paths and processes them one at a
//! time: request content, parse, emit an update, repeat. New
//! [`Queue`](WorkerRequest::Queue) batches arriving mid-file are appended
//! to the FIFO, so overlapping scans coalesce into one run and produce a
//! single [`Save`](WorkerReply::Save) when the queue finally drains.
//!
//! Parse failures are deliberately quiet. A malformed note must never stall
//! the queue or poison the batch; it is logged (verbosely only when debug
//! is on) and skipped.

use std::collections::VecDeque;

use bestiary_parser::statblock;
use camino::Utf8PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::protocol::{NoteFile, WorkerRequest, WorkerReply};

/// Runs the parsing worker until the request channel closes.
///
/// Spawned once by the coordinator; the two communicate exclusively via
/// the given channels. Returns when either channel disconnects.
pub async fn run(
    mut requests: mpsc::Receiver<WorkerRequest>,
    replies: mpsc::Sender<WorkerReply>,
) {
    let mut pending: VecDeque<Utf8PathBuf> = VecDeque::new();
    let mut debug_enabled = false;

    loop {
        let Some(path) = pending.pop_front() else {
            // Idle: wait for work.
            match requests.recv().await {
                Some(WorkerRequest::Queue(paths)) => pending.extend(paths),
                Some(WorkerRequest::Debug(enabled)) => debug_enabled = enabled,
                // No Get is outstanding, so a File here is stale; drop it.
                Some(WorkerRequest::File(_)) => {}
                None => return,
            }
            continue;
        };

        if replies.send(WorkerReply::Get(path.clone())).await.is_err() {
            return;
        }

        // Wait for the content answer, folding in anything else that
        // arrives meanwhile.
        let note = loop {
            match requests.recv().await {
                Some(WorkerRequest::File(note)) => break note,
                Some(WorkerRequest::Queue(paths)) => pending.extend(paths),
                Some(WorkerRequest::Debug(enabled)) => debug_enabled = enabled,
                None => return,
            }
        };

        match note {
            Some(note) => {
                if process_note(&path, note, debug_enabled, &replies)
                    .await
                    .is_err()
                {
                    return;
                }
            }
            None => {
                if debug_enabled {
                    debug!(path = %path, "No content served, skipping");
                }
            }
        }

        if pending.is_empty() && replies.send(WorkerReply::Save).await.is_err() {
            return;
        }
    }
}

/// Parses one served note and emits an update on success.
///
/// `Err(())` means the reply channel is gone and the worker should exit.
async fn process_note(
    path: &Utf8PathBuf,
    note: NoteFile,
    debug_enabled: bool,
    replies: &mpsc::Sender<WorkerReply>,
) -> Result<(), ()> {
    match statblock::parse_note(&note.content, note.marker, &note.meta) {
        Ok(creature) => {
            trace!(path = %path, name = %creature.name, "Parsed note");
            replies
                .send(WorkerReply::Update {
                    path: path.clone(),
                    creature,
                })
                .await
                .map_err(|_| ())
        }
        Err(error) => {
            if debug_enabled {
                debug!(path = %path, error = %error, "Note failed to parse, skipping");
            }
            Ok(())
        }
    }
}
