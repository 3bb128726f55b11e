//! Corpus loading: directory scan, parse, validate, index.
//!
//! The scan result is sorted before parsing so ingestion order never
//! depends on filesystem enumeration order. Per-file parsing shares no
//! mutable state and fans out across rayon; correctness does not depend
//! on the parallelism.

use crate::core::config::CorpusConfig;
use crate::core::diagnostics::{Diagnostic, DiagnosticKind};
use crate::core::error::CoursemapError;
use crate::core::frontmatter;
use crate::core::index::CorpusIndex;
use crate::core::record::{self, DocumentRecord};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Build a corpus index from a directory tree of markdown files.
///
/// Returns the index plus all non-aborting diagnostics, or a corpus-fatal
/// error carrying everything collected up to the failure. Documents with
/// structural problems are excluded individually; the build proceeds.
pub fn build_corpus(root: &Path) -> Result<(CorpusIndex, Vec<Diagnostic>), CoursemapError> {
    if !root.is_dir() {
        return Err(CoursemapError::NotFound(format!(
            "corpus root {} is not a directory",
            root.display()
        )));
    }
    let config = CorpusConfig::load(root)?;

    let mut files = Vec::new();
    collect_md_files(root, root, &config, &mut files);
    files.sort();

    let parsed: Vec<(Option<DocumentRecord>, Vec<Diagnostic>)> = files
        .par_iter()
        .map(|rel| parse_document(root, rel))
        .collect();

    let mut diagnostics = Vec::new();
    let mut records = Vec::new();
    for (record, mut diags) in parsed {
        diagnostics.append(&mut diags);
        if let Some(record) = record {
            records.push(record);
        }
    }

    CorpusIndex::build(records, diagnostics)
}

fn collect_md_files(root: &Path, dir: &Path, config: &CorpusConfig, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !config.follow_symlinks
            && entry
                .file_type()
                .map(|ft| ft.is_symlink())
                .unwrap_or(false)
        {
            continue;
        }
        if path.is_dir() {
            let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            if config.is_ignored_dir(name) {
                continue;
            }
            collect_md_files(root, &path, config, out);
        } else if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
    }
}

fn parse_document(root: &Path, rel: &Path) -> (Option<DocumentRecord>, Vec<Diagnostic>) {
    let (id, _) = record::derive_id(rel);

    let raw = match fs::read_to_string(root.join(rel)) {
        Ok(raw) => raw,
        Err(e) => {
            return (
                None,
                vec![Diagnostic::fatal(
                    DiagnosticKind::UnreadableFile,
                    id,
                    format!("could not read {}: {}", rel.display(), e),
                )],
            );
        }
    };

    let (fields, _body) = match frontmatter::extract(&raw) {
        Ok(extracted) => extracted,
        Err(e) => {
            return (
                None,
                vec![Diagnostic::fatal(
                    DiagnosticKind::MalformedFrontMatter,
                    id,
                    e.to_string(),
                )],
            );
        }
    };

    record::from_front_matter(rel, &fields, &raw)
}
