//! End-to-end pipeline tests: vault on disk, coordinator event loop,
//! parsing worker, and index, wired the way a host would wire them.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use bestiary_core::{Config, Creature, Provenance};
use bestiary_index::CreatureIndex;
use bestiary_scanner::{Notice, ScanCommand, ScanCoordinator, Vault};
use bestiary_watcher::VaultEvent;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

const GOBLIN: &str = "---\nstatblock: true\nname: Goblin\nhp: 7\nac: 15\n---\nSneaky.\n";
const ORC_INLINE: &str = "---\nstatblock: inline\n---\n```statblock\nname: Orc\nhp: 15\n```\n";
const PLAIN_NOTE: &str = "---\ntitle: session notes\n---\nNo creatures here.\n";

struct Pipeline {
    _dir: TempDir,
    vault: Vault,
    index: Arc<CreatureIndex>,
    commands: mpsc::Sender<ScanCommand>,
    events: mpsc::Sender<VaultEvent>,
    notices: mpsc::Receiver<Notice>,
}

impl Pipeline {
    fn start(notes: &[(&str, &str)]) -> Self {
        Self::start_with_index(notes, CreatureIndex::new())
    }

    fn start_with_index(notes: &[(&str, &str)], index: CreatureIndex) -> Self {
        let dir = TempDir::new().expect("temp dir");
        for (name, content) in notes {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(path, content).expect("write note");
        }
        let root = Utf8Path::from_path(dir.path()).expect("utf8 path").to_owned();
        let vault = Vault::open(&root).expect("open vault");

        let index = Arc::new(index);
        let config = Arc::new(RwLock::new(Config::default()));
        let (notice_tx, notice_rx) = mpsc::channel(16);
        let coordinator =
            ScanCoordinator::new(Arc::clone(&index), vault.clone(), config).with_notices(notice_tx);

        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);
        tokio::spawn(coordinator.run(event_rx, command_rx));

        Self {
            _dir: dir,
            vault,
            index,
            commands: command_tx,
            events: event_tx,
            notices: notice_rx,
        }
    }

    fn absolute(&self, note: &str) -> Utf8PathBuf {
        self.vault.root().join(note)
    }

    fn write_note(&self, note: &str, content: &str) {
        fs::write(self.absolute(note).as_std_path(), content).expect("write note");
    }

    async fn rescan_and_settle(&self) {
        self.commands
            .send(ScanCommand::Rescan { announce: false })
            .await
            .expect("send rescan");
        self.settle().await;
    }

    /// Waits for the in-flight work to drain and the index to settle.
    async fn settle(&self) {
        // Give the coordinator a beat to mark the batch started, then gate
        // on the settled signal.
        sleep(Duration::from_millis(50)).await;
        timeout(WAIT, self.index.await_settled())
            .await
            .expect("index settles in time");
    }
}

#[tokio::test]
async fn test_full_scan_indexes_marked_notes_only() {
    let pipeline = Pipeline::start(&[
        ("a.md", GOBLIN),
        ("b.md", ORC_INLINE),
        ("c.md", PLAIN_NOTE),
    ]);

    pipeline.rescan_and_settle().await;

    let goblin = pipeline.index.get("Goblin").expect("goblin indexed");
    assert!(goblin.is_derived());
    assert_eq!(goblin.field("hp"), Some(&serde_json::json!(7)));
    assert_eq!(goblin.path.as_deref().map(Utf8Path::as_str), Some("a.md"));

    let orc = pipeline.index.get("Orc").expect("orc indexed from inline block");
    assert_eq!(orc.field("hp"), Some(&serde_json::json!(15)));

    assert_eq!(pipeline.index.derived_len(), 2);
}

#[tokio::test]
async fn test_note_without_name_uses_basename() {
    let pipeline = Pipeline::start(&[(
        "bestiary/cave troll.md",
        "---\nstatblock: true\nhp: 84\n---\n",
    )]);

    pipeline.rescan_and_settle().await;

    let troll = pipeline.index.get("cave troll").expect("named after the file");
    assert_eq!(troll.field("hp"), Some(&serde_json::json!(84)));
}

#[tokio::test]
async fn test_rescan_is_idempotent() {
    let pipeline = Pipeline::start(&[("a.md", GOBLIN), ("b.md", ORC_INLINE)]);

    pipeline.rescan_and_settle().await;
    let first = pipeline.index.get("Goblin").expect("goblin indexed");

    // Nothing on disk changed; a second scan must converge to the same
    // state without disturbing the records.
    pipeline.rescan_and_settle().await;
    let second = pipeline.index.get("Goblin").expect("goblin still indexed");

    assert_eq!(first, second);
    assert_eq!(pipeline.index.derived_len(), 2);
}

#[tokio::test]
async fn test_user_tier_shadows_derived_and_reference() {
    let reference = vec![
        Creature::new("Goblin", Provenance::Reference),
        Creature::new("Skeleton", Provenance::Reference),
    ];
    let pipeline =
        Pipeline::start_with_index(&[("a.md", GOBLIN)], CreatureIndex::with_reference(reference));

    pipeline.rescan_and_settle().await;

    // Derived beats reference for the same name.
    let goblin = pipeline.index.get("Goblin").expect("goblin resolves");
    assert!(goblin.is_derived());

    // User beats both.
    let mut custom = Creature::new("Goblin", Provenance::User);
    custom.fields.insert("hp".to_owned(), serde_json::json!(99));
    pipeline.index.upsert_user(custom);

    let goblin = pipeline.index.get("Goblin").expect("goblin resolves");
    assert_eq!(goblin.provenance, Provenance::User);
    assert_eq!(goblin.field("hp"), Some(&serde_json::json!(99)));

    // Untouched reference names still resolve.
    assert!(pipeline.index.has("Skeleton"));
}

#[tokio::test]
async fn test_delete_event_retracts_record() {
    let pipeline = Pipeline::start(&[("a.md", GOBLIN), ("b.md", ORC_INLINE)]);
    pipeline.rescan_and_settle().await;
    assert!(pipeline.index.has("Goblin"));

    fs::remove_file(pipeline.absolute("a.md").as_std_path()).expect("delete note");
    pipeline
        .events
        .send(VaultEvent::Deleted(pipeline.absolute("a.md")))
        .await
        .expect("send event");

    pipeline.settle().await;
    assert!(!pipeline.index.has("Goblin"));
    assert!(pipeline.index.has("Orc"));
}

#[tokio::test]
async fn test_rename_event_moves_record() {
    let pipeline = Pipeline::start(&[("a.md", GOBLIN)]);
    pipeline.rescan_and_settle().await;

    let from = pipeline.absolute("a.md");
    let to = pipeline.absolute("renamed.md");
    fs::rename(from.as_std_path(), to.as_std_path()).expect("rename note");
    pipeline
        .events
        .send(VaultEvent::Renamed {
            from: from.clone(),
            to: to.clone(),
        })
        .await
        .expect("send event");

    pipeline.settle().await;
    let goblin = pipeline.index.get("Goblin").expect("goblin survives the move");
    assert_eq!(
        goblin.path.as_deref().map(Utf8Path::as_str),
        Some("renamed.md")
    );
}

#[tokio::test]
async fn test_marker_removal_retracts_record() {
    let pipeline = Pipeline::start(&[("a.md", GOBLIN)]);
    pipeline.rescan_and_settle().await;
    assert!(pipeline.index.has("Goblin"));

    pipeline.write_note("a.md", PLAIN_NOTE);
    pipeline
        .events
        .send(VaultEvent::Changed(pipeline.absolute("a.md")))
        .await
        .expect("send event");

    pipeline.settle().await;
    assert!(!pipeline.index.has("Goblin"));
}

#[tokio::test]
async fn test_change_event_reindexes_note() {
    let pipeline = Pipeline::start(&[("a.md", GOBLIN)]);
    pipeline.rescan_and_settle().await;

    pipeline.write_note("a.md", "---\nstatblock: true\nname: Goblin\nhp: 12\n---\n");
    pipeline
        .events
        .send(VaultEvent::Changed(pipeline.absolute("a.md")))
        .await
        .expect("send event");

    pipeline.settle().await;
    let goblin = pipeline.index.get("Goblin").expect("goblin still indexed");
    assert_eq!(goblin.field("hp"), Some(&serde_json::json!(12)));
}

#[tokio::test]
async fn test_malformed_note_is_skipped_silently() {
    let pipeline = Pipeline::start(&[
        ("good.md", GOBLIN),
        ("bad.md", "---\nstatblock: true\n: [unbalanced\n---\n"),
    ]);

    pipeline.rescan_and_settle().await;

    // The bad note neither appears nor blocks the batch.
    assert!(pipeline.index.has("Goblin"));
    assert_eq!(pipeline.index.derived_len(), 1);
}

#[tokio::test]
async fn test_announced_rescan_emits_notice() {
    let mut pipeline = Pipeline::start(&[("a.md", GOBLIN)]);

    pipeline
        .commands
        .send(ScanCommand::Rescan { announce: true })
        .await
        .expect("send rescan");

    let notice = timeout(WAIT, pipeline.notices.recv())
        .await
        .expect("notice in time")
        .expect("channel open");
    match notice {
        Notice::ScanComplete { creatures, .. } => assert_eq!(creatures, 1),
        other => panic!("expected scan-complete notice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_out_of_scope_note_is_ignored() {
    let dir = TempDir::new().expect("temp dir");
    fs::create_dir_all(dir.path().join("bestiary")).expect("mkdir");
    fs::create_dir_all(dir.path().join("journal")).expect("mkdir");
    fs::write(dir.path().join("bestiary/goblin.md"), GOBLIN).expect("write note");
    fs::write(dir.path().join("journal/orc.md"), ORC_INLINE).expect("write note");

    let root = Utf8Path::from_path(dir.path()).expect("utf8 path").to_owned();
    let vault = Vault::open(&root).expect("open vault");
    let index = Arc::new(CreatureIndex::new());
    let mut config = Config::default();
    config.parse.scope_paths = vec!["bestiary".to_owned()];
    let config = Arc::new(RwLock::new(config));

    let coordinator = ScanCoordinator::new(Arc::clone(&index), vault, config);
    let (command_tx, command_rx) = mpsc::channel(16);
    let (_event_tx, event_rx) = mpsc::channel::<VaultEvent>(16);
    tokio::spawn(coordinator.run(event_rx, command_rx));

    command_tx
        .send(ScanCommand::Rescan { announce: false })
        .await
        .expect("send rescan");
    sleep(Duration::from_millis(50)).await;
    timeout(WAIT, index.await_settled()).await.expect("settles");

    assert!(index.has("Goblin"));
    assert!(!index.has("Orc"));
}
