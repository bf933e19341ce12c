//! The three-tier creature store.
//!
//! # Safety Pattern
//!
//! To keep lookups safe from any thread, the index:
//!
//! - **Never exposes guard types** publicly
//! - **Clones records** on `get()` operations
//! - **Uses short-lived lock scopes** internally
//!
//! Mutation is reserved for a single writer (the scan coordinator for the
//! derived tier, the host for the user tier); reads may come from anywhere.
//! A read taken mid-batch may be stale - consumers needing a consistent view
//! call [`CreatureIndex::await_settled`] first.

use bestiary_core::{Creature, FxHashMap, Provenance};
use parking_lot::RwLock;
use tracing::debug;

use crate::settled::SettledSignal;

/// In-memory store merging three provenance tiers by precedence.
///
/// Within one tier names are unique: a later insert of the same name
/// replaces the prior record. Across tiers, lookup precedence is
/// user > derived > reference - a name present in a higher tier shadows
/// lower tiers entirely.
///
/// The index is an explicitly constructed, explicitly lifetime-scoped
/// service: the host owns it (typically behind an `Arc`) and passes it by
/// reference to consumers. It is not a global.
///
/// # Examples
///
/// ```
/// use bestiary_index::CreatureIndex;
/// use bestiary_core::{Creature, Provenance};
///
/// let index = CreatureIndex::new();
/// index.upsert_derived(Creature::new("Goblin", Provenance::Derived));
///
/// assert!(index.has("Goblin"));
/// assert!(!index.is_user("Goblin"));
/// ```
#[derive(Debug, Default)]
pub struct CreatureIndex {
    /// The tier tables, behind one lock so cross-tier lookups are coherent.
    tables: RwLock<Tables>,

    /// Settled-state signal advanced by the scan coordinator.
    settled: SettledSignal,
}

#[derive(Debug, Default)]
struct Tables {
    user: FxHashMap<String, Creature>,
    derived: FxHashMap<String, Creature>,
    reference: FxHashMap<String, Creature>,
}

impl CreatureIndex {
    /// Creates an empty index with no reference records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index pre-loaded with reference-tier records.
    ///
    /// The reference tier is immutable for the process lifetime; this is
    /// the only way records enter it.
    #[must_use]
    pub fn with_reference(records: impl IntoIterator<Item = Creature>) -> Self {
        let index = Self::default();
        {
            let mut tables = index.tables.write();
            for mut record in records {
                record.provenance = Provenance::Reference;
                tables.reference.insert(record.name.clone(), record);
            }
        }
        index
    }

    // -------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------

    /// Returns `true` if any tier contains a record with this name.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        let tables = self.tables.read();
        tables.user.contains_key(name)
            || tables.derived.contains_key(name)
            || tables.reference.contains_key(name)
    }

    /// Resolves a name through tier precedence and returns a snapshot.
    ///
    /// Absence is not an error; `None` simply means no tier knows the name.
    /// The returned record is a clone - a point-in-time snapshot, never a
    /// live reference into the index.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Creature> {
        let tables = self.tables.read();
        tables
            .user
            .get(name)
            .or_else(|| tables.derived.get(name))
            .or_else(|| tables.reference.get(name))
            .cloned()
    }

    /// Returns `true` iff a user-tier record with this name exists.
    #[must_use]
    pub fn is_user(&self, name: &str) -> bool {
        self.tables.read().user.contains_key(name)
    }

    /// Returns every known creature name, resolved through precedence.
    ///
    /// Names are deduplicated across tiers; ordering is unspecified.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let tables = self.tables.read();
        let mut names: Vec<String> = tables
            .user
            .keys()
            .chain(tables.derived.keys())
            .chain(tables.reference.keys())
            .cloned()
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Returns the number of records in the derived tier.
    #[must_use]
    pub fn derived_len(&self) -> usize {
        self.tables.read().derived.len()
    }

    /// Returns the number of records in the user tier.
    #[must_use]
    pub fn user_len(&self) -> usize {
        self.tables.read().user.len()
    }

    /// Returns the number of records in the reference tier.
    #[must_use]
    pub fn reference_len(&self) -> usize {
        self.tables.read().reference.len()
    }

    // -------------------------------------------------------------------
    // Mutations (single-writer discipline)
    // -------------------------------------------------------------------

    /// Inserts or replaces a user-tier record.
    ///
    /// The record's provenance is normalized to [`Provenance::User`].
    pub fn upsert_user(&self, mut record: Creature) {
        record.provenance = Provenance::User;
        let mut tables = self.tables.write();
        tables.user.insert(record.name.clone(), record);
    }

    /// Removes a user-tier record. Removing an absent name is a no-op.
    pub fn remove_user(&self, name: &str) {
        self.tables.write().user.remove(name);
    }

    /// Inserts or replaces a derived-tier record.
    ///
    /// Called only by the scan coordinator when applying a worker update.
    /// The record's provenance is normalized to [`Provenance::Derived`].
    pub fn upsert_derived(&self, mut record: Creature) {
        record.provenance = Provenance::Derived;
        debug!(name = %record.name, path = ?record.path, "Upserting derived creature");
        let mut tables = self.tables.write();
        tables.derived.insert(record.name.clone(), record);
    }

    /// Removes a derived-tier record. Removing an absent name is a no-op.
    ///
    /// Derived records leave the index only through this retraction path
    /// (delete, rename-away, or marker loss) - never because a parse failed.
    pub fn remove_derived(&self, name: &str) {
        debug!(name, "Retracting derived creature");
        self.tables.write().derived.remove(name);
    }

    // -------------------------------------------------------------------
    // Settled signal
    // -------------------------------------------------------------------

    /// Records that a scan batch has been posted to the worker.
    pub fn mark_batch_started(&self) {
        self.settled.mark_started();
    }

    /// Records that every posted batch has drained.
    pub fn mark_batch_settled(&self) {
        self.settled.mark_settled();
    }

    /// Returns `true` if no scan batch is currently in flight.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled.is_settled()
    }

    /// Waits until the scans in flight at the time of the call complete.
    ///
    /// Returns immediately when the index is already settled, regardless of
    /// how many overlapping batches were coalesced along the way.
    pub async fn await_settled(&self) {
        self.settled.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestiary_core::Creature;
    use std::time::Duration;
    use tokio::time::timeout;

    fn derived(name: &str) -> Creature {
        Creature::new(name, Provenance::Derived)
    }

    #[test]
    fn test_empty_index() {
        let index = CreatureIndex::new();
        assert!(!index.has("Goblin"));
        assert!(index.get("Goblin").is_none());
        assert!(!index.is_user("Goblin"));
        assert!(index.names().is_empty());
    }

    #[test]
    fn test_user_shadows_derived_and_reference() {
        let index = CreatureIndex::with_reference([Creature::new("Goblin", Provenance::Reference)]);
        index.upsert_derived(derived("Goblin"));
        index.upsert_user(Creature::new("Goblin", Provenance::User));

        let found = index.get("Goblin").unwrap();
        assert_eq!(found.provenance, Provenance::User);
        assert!(index.is_user("Goblin"));
    }

    #[test]
    fn test_derived_shadows_reference() {
        let index = CreatureIndex::with_reference([Creature::new("Goblin", Provenance::Reference)]);
        index.upsert_derived(derived("Goblin"));

        let found = index.get("Goblin").unwrap();
        assert_eq!(found.provenance, Provenance::Derived);
    }

    #[test]
    fn test_reference_visible_when_unshadowed() {
        let index = CreatureIndex::with_reference([Creature::new("Owlbear", Provenance::Reference)]);
        let found = index.get("Owlbear").unwrap();
        assert_eq!(found.provenance, Provenance::Reference);
        assert_eq!(index.reference_len(), 1);
    }

    #[test]
    fn test_shadowed_record_reappears_after_removal() {
        let index = CreatureIndex::with_reference([Creature::new("Goblin", Provenance::Reference)]);
        index.upsert_derived(derived("Goblin"));
        index.remove_derived("Goblin");

        let found = index.get("Goblin").unwrap();
        assert_eq!(found.provenance, Provenance::Reference);
    }

    #[test]
    fn test_upsert_replaces_within_tier() {
        let index = CreatureIndex::new();
        index.upsert_derived(derived("Goblin").with_path("a.md"));
        index.upsert_derived(derived("Goblin").with_path("b.md"));

        assert_eq!(index.derived_len(), 1);
        let found = index.get("Goblin").unwrap();
        assert_eq!(found.path.as_deref().map(|p| p.as_str()), Some("b.md"));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let index = CreatureIndex::new();
        index.remove_derived("Nobody");
        index.remove_user("Nobody");
        assert!(!index.has("Nobody"));
    }

    #[test]
    fn test_provenance_normalized_on_upsert() {
        let index = CreatureIndex::new();
        // Record claims to be user-tier but goes through the derived path.
        index.upsert_derived(Creature::new("Goblin", Provenance::User));
        let found = index.get("Goblin").unwrap();
        assert_eq!(found.provenance, Provenance::Derived);
    }

    #[test]
    fn test_get_returns_snapshot() {
        let index = CreatureIndex::new();
        index.upsert_derived(derived("Goblin"));

        let mut snapshot = index.get("Goblin").unwrap();
        snapshot.name = "Hobgoblin".to_owned();

        // Mutating the snapshot must not affect the index.
        assert!(index.has("Goblin"));
        assert!(!index.has("Hobgoblin"));
    }

    #[test]
    fn test_names_deduplicated_across_tiers() {
        let index = CreatureIndex::with_reference([
            Creature::new("Goblin", Provenance::Reference),
            Creature::new("Owlbear", Provenance::Reference),
        ]);
        index.upsert_derived(derived("Goblin"));
        index.upsert_user(Creature::new("Lich", Provenance::User));

        let names = index.names();
        assert_eq!(names, vec!["Goblin", "Lich", "Owlbear"]);
    }

    #[tokio::test]
    async fn test_settled_gating() {
        let index = CreatureIndex::new();
        timeout(Duration::from_millis(100), index.await_settled())
            .await
            .expect("fresh index must be settled");

        index.mark_batch_started();
        let blocked = timeout(Duration::from_millis(50), index.await_settled()).await;
        assert!(blocked.is_err(), "await_settled must block mid-batch");

        index.mark_batch_settled();
        timeout(Duration::from_millis(100), index.await_settled())
            .await
            .expect("settle must release waiters");
    }
}
