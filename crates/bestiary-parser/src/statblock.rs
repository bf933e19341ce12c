//! Marker detection and creature record mapping.
//!
//! The `statblock` front-matter key gates everything: a note with no
//! recognized marker never becomes a creature, no matter what its body
//! contains. Once a note qualifies, the marker kind decides where the
//! definition lives - the front matter itself, or a fenced `statblock`
//! code block in the body.

use bestiary_core::{Creature, Marker, NoteMeta, Provenance};
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::frontmatter;

/// The front-matter key that opts a note into the bestiary.
const MARKER_KEY: &str = "statblock";

/// The front-matter key naming the layout used to render the creature.
const LAYOUT_KEY: &str = "layout";

/// The fence language tag of an inline statblock code block.
const INLINE_FENCE: &str = "statblock";

/// Inspects front-matter YAML for a recognized statblock marker.
///
/// Returns `None` when the block is malformed, the `statblock` key is
/// absent, or its value is not one of the recognized tokens (boolean
/// `true`, string `"true"`, string `"inline"`). Callers cannot distinguish
/// "no marker" from "unrecognized marker"; both mean the note is skipped.
///
/// # Examples
///
/// ```
/// use bestiary_core::Marker;
/// use bestiary_parser::statblock::marker_of;
///
/// assert_eq!(marker_of("statblock: true"), Some(Marker::FrontMatter));
/// assert_eq!(marker_of("statblock: \"true\""), Some(Marker::FrontMatter));
/// assert_eq!(marker_of("statblock: inline"), Some(Marker::Inline));
/// assert_eq!(marker_of("statblock: false"), None);
/// assert_eq!(marker_of("name: Goblin"), None);
/// ```
#[must_use]
pub fn marker_of(front_matter: &str) -> Option<Marker> {
    let mapping: serde_yaml::Mapping = serde_yaml::from_str(front_matter).ok()?;
    match mapping.get(serde_yaml::Value::String(MARKER_KEY.to_owned()))? {
        serde_yaml::Value::Bool(b) => Marker::from_bool(*b),
        serde_yaml::Value::String(s) => Marker::from_token(s),
        _ => None,
    }
}

/// Parses note content into a derived-tier creature record.
///
/// For [`Marker::FrontMatter`], the front-matter mapping itself is the
/// statblock. For [`Marker::Inline`], the definition is read from the first
/// fenced `statblock` code block in the note body.
///
/// The record is stamped with the note's path and modification time. A
/// missing `name` key defaults to the note's basename; a `layout` key is
/// lifted out of the field map into the dedicated record field.
///
/// # Errors
///
/// Returns a [`ParseError`] when the expected block is missing, is not
/// valid YAML, or is not a key/value mapping. All of these are recoverable
/// per-file conditions.
pub fn parse_note(
    content: &str,
    marker: Marker,
    meta: &NoteMeta,
) -> Result<Creature, ParseError> {
    let fm = frontmatter::extract(content).ok_or(ParseError::MissingFrontMatter)?;

    let source = if marker.is_inline() {
        inline_block(fm.body).ok_or(ParseError::MissingInlineBlock)?
    } else {
        fm.block
    };

    let mapping: serde_yaml::Value = serde_yaml::from_str(source)?;
    let serde_yaml::Value::Mapping(mapping) = mapping else {
        return Err(ParseError::NotAMapping);
    };

    let mut fields = Map::new();
    for (key, value) in mapping {
        let serde_yaml::Value::String(key) = key else {
            // Non-string keys cannot be creature attributes; drop them.
            continue;
        };
        if key == MARKER_KEY {
            continue;
        }
        fields.insert(key, yaml_to_json(value));
    }

    let name = match fields.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => meta.basename.clone(),
    };

    let layout = match fields.remove(LAYOUT_KEY) {
        Some(Value::String(layout)) => Some(layout),
        Some(other) => {
            // Put non-string layout values back; they are ordinary fields.
            fields.insert(LAYOUT_KEY.to_owned(), other);
            None
        }
        None => None,
    };

    let mut creature = Creature::new(name, Provenance::Derived)
        .with_path(meta.path.clone())
        .with_mtime(meta.mtime);
    creature.layout = layout;
    creature.fields = fields;
    Ok(creature)
}

/// Locates the first fenced `statblock` code block in a note body.
///
/// Recognizes three-or-more backtick fences whose info string is exactly
/// `statblock` and returns the text between the fences.
#[must_use]
pub fn inline_block(body: &str) -> Option<&str> {
    let mut search_from = 0;
    loop {
        let open = body[search_from..].find("```")? + search_from;
        let line_end = body[open..]
            .find('\n')
            .map_or(body.len(), |i| open + i + 1);
        let info = body[open..line_end].trim_start_matches('`').trim();

        if info == INLINE_FENCE {
            let block_start = line_end;
            let close = body[block_start..].find("```")?;
            return Some(&body[block_start..block_start + close]);
        }

        // Not our fence; skip past this line and keep looking.
        if line_end >= body.len() {
            return None;
        }
        search_from = line_end;
    }
}

/// Converts a YAML value into the normalized JSON field shape.
///
/// Mapping keys that are not strings are dropped; YAML tags are stripped.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::from)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                if let serde_yaml::Value::String(key) = key {
                    map.insert(key, yaml_to_json(value));
                }
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use serde_json::json;
    use std::time::SystemTime;

    fn meta(path: &str) -> NoteMeta {
        NoteMeta::new(Utf8PathBuf::from(path), SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn test_marker_of_recognized_tokens() {
        assert_eq!(marker_of("statblock: true"), Some(Marker::FrontMatter));
        assert_eq!(marker_of("statblock: \"true\""), Some(Marker::FrontMatter));
        assert_eq!(marker_of("statblock: inline"), Some(Marker::Inline));
    }

    #[test]
    fn test_marker_of_rejected_values() {
        assert_eq!(marker_of("statblock: false"), None);
        assert_eq!(marker_of("statblock: yes"), None);
        assert_eq!(marker_of("statblock: 1"), None);
        assert_eq!(marker_of("statblock: [true]"), None);
        assert_eq!(marker_of("name: Goblin"), None);
        assert_eq!(marker_of(""), None);
    }

    #[test]
    fn test_marker_of_malformed_yaml() {
        assert_eq!(marker_of("statblock: [unclosed"), None);
        assert_eq!(marker_of(": : :"), None);
    }

    #[test]
    fn test_parse_front_matter_note() {
        let note = "---\nstatblock: true\nname: Goblin\nhp: 7\nac: 15\n---\nBody.\n";
        let creature = parse_note(note, Marker::FrontMatter, &meta("bestiary/goblin.md")).unwrap();

        assert_eq!(creature.name, "Goblin");
        assert_eq!(creature.provenance, Provenance::Derived);
        assert_eq!(creature.path.as_deref().map(|p| p.as_str()), Some("bestiary/goblin.md"));
        assert_eq!(creature.mtime, Some(SystemTime::UNIX_EPOCH));
        assert_eq!(creature.field("hp"), Some(&json!(7)));
        assert_eq!(creature.field("ac"), Some(&json!(15)));
        // The marker flag is not a statblock attribute.
        assert_eq!(creature.field("statblock"), None);
    }

    #[test]
    fn test_parse_name_defaults_to_basename() {
        let note = "---\nstatblock: true\nhp: 7\n---\n";
        let creature = parse_note(note, Marker::FrontMatter, &meta("bestiary/cave troll.md")).unwrap();
        assert_eq!(creature.name, "cave troll");
    }

    #[test]
    fn test_parse_layout_lifted() {
        let note = "---\nstatblock: true\nname: Lich\nlayout: Basic 5e Layout\n---\n";
        let creature = parse_note(note, Marker::FrontMatter, &meta("lich.md")).unwrap();
        assert_eq!(creature.layout.as_deref(), Some("Basic 5e Layout"));
        assert_eq!(creature.field("layout"), None);
    }

    #[test]
    fn test_parse_inline_note() {
        let note = concat!(
            "---\nstatblock: inline\n---\n",
            "Some prose about the monster.\n\n",
            "```statblock\nname: Bone Golem\nhp: 90\n```\n",
            "More prose.\n",
        );
        let creature = parse_note(note, Marker::Inline, &meta("golems/bone.md")).unwrap();
        assert_eq!(creature.name, "Bone Golem");
        assert_eq!(creature.field("hp"), Some(&json!(90)));
    }

    #[test]
    fn test_parse_inline_skips_other_fences() {
        let note = concat!(
            "---\nstatblock: inline\n---\n",
            "```python\nprint('not a statblock')\n```\n",
            "```statblock\nname: Mimic\n```\n",
        );
        let creature = parse_note(note, Marker::Inline, &meta("mimic.md")).unwrap();
        assert_eq!(creature.name, "Mimic");
    }

    #[test]
    fn test_parse_inline_missing_block() {
        let note = "---\nstatblock: inline\n---\nNo fenced block here.\n";
        let err = parse_note(note, Marker::Inline, &meta("x.md")).unwrap_err();
        assert!(matches!(err, ParseError::MissingInlineBlock));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let note = "---\nstatblock: true\nname: [unclosed\n---\n";
        let err = parse_note(note, Marker::FrontMatter, &meta("x.md")).unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }

    #[test]
    fn test_parse_non_mapping_inline_block() {
        let note = "---\nstatblock: inline\n---\n```statblock\n- just\n- a\n- list\n```\n";
        let err = parse_note(note, Marker::Inline, &meta("x.md")).unwrap_err();
        assert!(matches!(err, ParseError::NotAMapping));
    }

    #[test]
    fn test_parse_missing_front_matter() {
        let err = parse_note("no front matter", Marker::FrontMatter, &meta("x.md")).unwrap_err();
        assert!(matches!(err, ParseError::MissingFrontMatter));
    }

    #[test]
    fn test_yaml_values_normalized() {
        let note = concat!(
            "---\nstatblock: true\nname: Dragon\n",
            "stats: [30, 10, 29]\n",
            "traits:\n  - name: Legendary Resistance\n    desc: Rerolls.\n",
            "cr: '24'\n",
            "fly: true\n---\n",
        );
        let creature = parse_note(note, Marker::FrontMatter, &meta("dragon.md")).unwrap();
        assert_eq!(creature.field("stats"), Some(&json!([30, 10, 29])));
        assert_eq!(
            creature.field("traits"),
            Some(&json!([{"name": "Legendary Resistance", "desc": "Rerolls."}]))
        );
        assert_eq!(creature.field("cr"), Some(&json!("24")));
        assert_eq!(creature.field("fly"), Some(&json!(true)));
    }

    #[test]
    fn test_inline_block_extraction() {
        assert_eq!(inline_block("```statblock\nhp: 1\n```"), Some("hp: 1\n"));
        assert_eq!(inline_block("no fence"), None);
        assert_eq!(inline_block("```statblock\nunterminated"), None);
    }
}
