//! The bundled reference bestiary.
//!
//! A small set of well-known creatures ships embedded in the binary and is
//! loaded once at process start into the reference tier, where it stays
//! immutable for the process lifetime. Any user- or derived-tier record with
//! the same name shadows it.

use bestiary_core::Creature;

/// The embedded reference set, serialized as JSON at build time.
const REFERENCE_JSON: &str = include_str!("reference.json");

/// Deserializes the bundled reference set.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the embedded data is malformed, which
/// indicates a packaging defect rather than a runtime condition.
///
/// # Examples
///
/// ```
/// let records = bestiary_index::reference::builtin().unwrap();
/// assert!(records.iter().any(|c| c.name == "Goblin"));
/// ```
pub fn builtin() -> Result<Vec<Creature>, serde_json::Error> {
    serde_json::from_str(REFERENCE_JSON)
}
