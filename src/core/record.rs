//! Canonical document records built from parsed front-matter.
//!
//! The builder is a validating deserializer: it walks the untyped mapping
//! once and collects every field-level problem for the document instead of
//! failing on the first. Structural problems (missing required field, bad
//! enum, non-positive reading time) reject the document; unrecognized
//! persona tags are recorded and surfaced as warnings only.

use crate::core::diagnostics::{Diagnostic, DiagnosticKind};
use crate::core::frontmatter::Mapping;
use crate::core::persona::PersonaTag;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Three-level granularity tag. The variant order is the depth total order:
/// surface < mid-depth < deep-water.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Depth {
    Surface,
    MidDepth,
    DeepWater,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Surface => "surface",
            Depth::MidDepth => "mid-depth",
            Depth::DeepWater => "deep-water",
        }
    }

    /// Case-insensitive parse to the canonical lowercase form.
    pub fn parse(value: &str) -> Option<Depth> {
        match value.trim().to_lowercase().as_str() {
            "surface" => Some(Depth::Surface),
            "mid-depth" => Some(Depth::MidDepth),
            "deep-water" => Some(Depth::DeepWater),
            _ => None,
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One markdown file, normalized. Immutable value object after construction.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    /// Path relative to the content root, `/`-separated, `.md` stripped.
    pub id: String,
    /// Final path component of the id; short reference form.
    pub slug: String,
    /// Source path relative to the content root, extension kept.
    pub path: String,
    pub title: String,
    pub phase: String,
    pub topic: String,
    pub depth: Depth,
    pub reading_time_minutes: Option<u32>,
    pub prerequisites: BTreeSet<String>,
    pub related_topics: BTreeSet<String>,
    pub personas: BTreeSet<PersonaTag>,
    /// Persona tags outside the fixed enumeration, kept verbatim.
    pub unknown_personas: BTreeSet<String>,
    pub updated: Option<String>,
    /// SHA-256 of the raw file content, for drift checks between builds.
    pub source_digest: String,
}

/// Derive `(id, slug)` from a content-root-relative path.
///
/// Convention: separators normalized to `/`, `.md` extension stripped, the
/// final component doubles as the short slug. This is the de-duplication
/// key and the reference-resolution namespace.
pub fn derive_id(rel_path: &Path) -> (String, String) {
    let joined = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let id = joined.strip_suffix(".md").unwrap_or(&joined).to_string();
    let slug = id.rsplit('/').next().unwrap_or(&id).to_string();
    (id, slug)
}

/// Build a validated record from parsed front-matter.
///
/// Returns the record (when structurally valid) together with every
/// diagnostic raised for this document. A `None` record means at least one
/// fatal structural diagnostic is present.
pub fn from_front_matter(
    rel_path: &Path,
    fields: &Mapping,
    raw: &str,
) -> (Option<DocumentRecord>, Vec<Diagnostic>) {
    let (id, slug) = derive_id(rel_path);
    let mut diagnostics = Vec::new();

    let title = required_string(fields, "title", &id, &mut diagnostics);
    let phase = required_string(fields, "phase", &id, &mut diagnostics);
    let topic = required_string(fields, "topic", &id, &mut diagnostics);

    let depth = match required_string(fields, "depth", &id, &mut diagnostics) {
        Some(value) => match Depth::parse(&value) {
            Some(depth) => Some(depth),
            None => {
                diagnostics.push(Diagnostic::fatal(
                    DiagnosticKind::InvalidEnum,
                    id.clone(),
                    format!(
                        "field `depth` value `{value}` is not one of surface, mid-depth, deep-water"
                    ),
                ));
                None
            }
        },
        None => None,
    };

    let reading_time_minutes = reading_time(fields, &id, &mut diagnostics);

    if let Some(topic) = topic.as_deref() {
        // Slug discipline is advisory; a badly formed topic still indexes.
        let slug_re = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
        if !slug_re.is_match(topic) {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::InvalidValue,
                id.clone(),
                format!("field `topic` value `{topic}` is not a lowercase hyphenated slug"),
            ));
        }
    }

    let prerequisites = string_set(fields, "prerequisites", &id, &mut diagnostics);
    let related_topics = string_set(fields, "related_topics", &id, &mut diagnostics);

    let mut personas = BTreeSet::new();
    let mut unknown_personas = BTreeSet::new();
    if let Some(tags) = string_set(fields, "personas", &id, &mut diagnostics) {
        for tag in tags {
            match PersonaTag::parse(&tag) {
                Some(parsed) => {
                    personas.insert(parsed);
                }
                None => {
                    diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::UnknownPersona,
                        id.clone(),
                        format!("persona `{tag}` is not in the persona enumeration"),
                    ));
                    unknown_personas.insert(tag);
                }
            }
        }
    }

    let updated = match fields.get("updated") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::InvalidValue,
                id.clone(),
                format!("field `updated` should be a date string, got `{other}`"),
            ));
            None
        }
        None => None,
    };

    if diagnostics.iter().any(Diagnostic::is_fatal) {
        return (None, diagnostics);
    }

    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let source_digest = format!("{:x}", hasher.finalize());

    let record = DocumentRecord {
        id,
        slug,
        path: rel_path.to_string_lossy().replace('\\', "/"),
        // Required fields are present when no fatal diagnostic was raised.
        title: title.unwrap_or_default(),
        phase: phase.unwrap_or_default(),
        topic: topic.unwrap_or_default(),
        depth: depth.unwrap_or(Depth::Surface),
        reading_time_minutes,
        prerequisites: prerequisites.unwrap_or_default(),
        related_topics: related_topics.unwrap_or_default(),
        personas,
        unknown_personas,
        updated,
        source_digest,
    };
    (Some(record), diagnostics)
}

fn required_string(
    fields: &Mapping,
    key: &str,
    id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(other) => {
            diagnostics.push(Diagnostic::fatal(
                DiagnosticKind::InvalidValue,
                id.to_string(),
                format!("field `{key}` must be a non-empty string, got `{other}`"),
            ));
            None
        }
        None => {
            diagnostics.push(Diagnostic::fatal(
                DiagnosticKind::MissingField,
                id.to_string(),
                format!("required field `{key}` is missing"),
            ));
            None
        }
    }
}

fn reading_time(fields: &Mapping, id: &str, diagnostics: &mut Vec<Diagnostic>) -> Option<u32> {
    let value = fields.get("reading_time")?;
    let minutes = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match minutes {
        Some(m) if m > 0 && m <= u32::MAX as i64 => Some(m as u32),
        _ => {
            diagnostics.push(Diagnostic::fatal(
                DiagnosticKind::InvalidValue,
                id.to_string(),
                format!("field `reading_time` must be a positive integer, got `{value}`"),
            ));
            None
        }
    }
}

/// Optional sequence-of-strings field. Absent and empty both come back as
/// an empty set; a present non-sequence value is a structural error.
fn string_set(
    fields: &Mapping,
    key: &str,
    id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<BTreeSet<String>> {
    match fields.get(key) {
        None => Some(BTreeSet::new()),
        Some(Value::Array(items)) => {
            let mut out = BTreeSet::new();
            let mut ok = true;
            for item in items {
                match item {
                    Value::String(s) => {
                        out.insert(s.trim().to_string());
                    }
                    other => {
                        diagnostics.push(Diagnostic::fatal(
                            DiagnosticKind::InvalidValue,
                            id.to_string(),
                            format!("field `{key}` must contain only strings, got `{other}`"),
                        ));
                        ok = false;
                    }
                }
            }
            ok.then_some(out)
        }
        Some(other) => {
            diagnostics.push(Diagnostic::fatal(
                DiagnosticKind::InvalidValue,
                id.to_string(),
                format!("field `{key}` must be a sequence of strings, got `{other}`"),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frontmatter;

    fn parse(front: &str) -> Mapping {
        let raw = format!("---\n{front}---\nbody\n");
        frontmatter::extract(&raw).unwrap().0
    }

    fn build(front: &str) -> (Option<DocumentRecord>, Vec<Diagnostic>) {
        let fields = parse(front);
        from_front_matter(Path::new("02-design/architecture.md"), &fields, front)
    }

    const VALID: &str = "title: Architecture\nphase: 02-design\ntopic: architecture-design\ndepth: surface\n";

    #[test]
    fn valid_document_builds_cleanly() {
        let (record, diagnostics) = build(VALID);
        let record = record.unwrap();
        assert_eq!(record.id, "02-design/architecture");
        assert_eq!(record.slug, "architecture");
        assert_eq!(record.depth, Depth::Surface);
        assert!(diagnostics.is_empty());
        assert_eq!(record.source_digest.len(), 64);
    }

    #[test]
    fn depth_parses_case_insensitively() {
        for spelling in ["Surface", "SURFACE", "surface"] {
            assert_eq!(Depth::parse(spelling), Some(Depth::Surface));
        }
        assert_eq!(Depth::parse("Mid-Depth"), Some(Depth::MidDepth));
        assert_eq!(Depth::parse("DEEP-WATER"), Some(Depth::DeepWater));
        assert_eq!(Depth::parse("abyssal"), None);
    }

    #[test]
    fn depth_total_order() {
        assert!(Depth::Surface < Depth::MidDepth);
        assert!(Depth::MidDepth < Depth::DeepWater);
    }

    #[test]
    fn all_field_errors_are_collected_in_one_pass() {
        let (record, diagnostics) =
            build("depth: bottomless\nreading_time: -3\ntopic: architecture-design\n");
        assert!(record.is_none());
        let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
        // title and phase missing, depth invalid, reading_time non-positive
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == DiagnosticKind::MissingField)
                .count(),
            2
        );
        assert!(kinds.contains(&DiagnosticKind::InvalidEnum));
        assert!(kinds.contains(&DiagnosticKind::InvalidValue));
    }

    #[test]
    fn unknown_persona_is_a_warning_not_a_failure() {
        let front = format!("{VALID}personas:\n  - busy-developer\n  - staff-engineer\n");
        let (record, diagnostics) = build(&front);
        let record = record.unwrap();
        assert!(record.personas.contains(&PersonaTag::BusyDeveloper));
        assert!(record.unknown_personas.contains("staff-engineer"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnknownPersona);
        assert!(!diagnostics[0].is_fatal());
    }

    #[test]
    fn absent_and_empty_sequences_both_normalize_to_empty() {
        let (absent, _) = build(VALID);
        let (empty, _) = build(&format!("{VALID}prerequisites: []\n"));
        assert_eq!(absent.unwrap().prerequisites, empty.unwrap().prerequisites);
    }

    #[test]
    fn non_sequence_list_field_is_structural() {
        let (record, diagnostics) = build(&format!("{VALID}prerequisites: api-design\n"));
        assert!(record.is_none());
        assert!(diagnostics.iter().any(Diagnostic::is_fatal));
    }

    #[test]
    fn reading_time_accepts_numbers_and_numeric_strings() {
        let (record, _) = build(&format!("{VALID}reading_time: 15\n"));
        assert_eq!(record.unwrap().reading_time_minutes, Some(15));
        let (record, _) = build(&format!("{VALID}reading_time: \"20\"\n"));
        assert_eq!(record.unwrap().reading_time_minutes, Some(20));
        let (record, diagnostics) = build(&format!("{VALID}reading_time: 0\n"));
        assert!(record.is_none());
        assert!(diagnostics.iter().any(Diagnostic::is_fatal));
    }

    #[test]
    fn id_derivation_strips_extension_and_normalizes_separators() {
        let (id, slug) = derive_id(Path::new("03-development/error-handling/deep-water.md"));
        assert_eq!(id, "03-development/error-handling/deep-water");
        assert_eq!(slug, "deep-water");
    }
}
