//! Prerequisite and related-topic graph resolution.
//!
//! References in front-matter are free-form slugs. Each one is resolved
//! against the corpus (full id, then unique document slug, then topic
//! slug); what does not resolve becomes a `DanglingReference` warning.
//! The prerequisite graph must be acyclic — no linear reading order exists
//! over a cycle — so a detected cycle is the one corpus-level hard failure
//! this module produces.

use crate::core::diagnostics::{Diagnostic, DiagnosticKind};
use crate::core::record::DocumentRecord;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

/// Resolved edges plus the recommended total order.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    /// Document id -> ids of its prerequisite documents.
    pub prerequisites: BTreeMap<String, BTreeSet<String>>,
    /// Document id -> ids of documents covering its related topics.
    pub related: BTreeMap<String, BTreeSet<String>>,
    /// Topological order over `prerequisites`; ties broken by
    /// `(phase, topic, id)` so the order is stable across platforms.
    pub order: Vec<String>,
}

/// Resolve both graphs for a built record set.
///
/// Warnings are appended to `diagnostics`. `Err` carries the members of a
/// prerequisite cycle (in traversal order) after pushing the matching
/// fatal diagnostic.
pub fn resolve(
    records: &BTreeMap<String, DocumentRecord>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<RelationGraph, Vec<String>> {
    let mut by_slug: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut by_topic: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records.values() {
        by_slug.entry(&record.slug).or_default().push(&record.id);
        by_topic.entry(&record.topic).or_default().push(&record.id);
    }

    let mut graph = RelationGraph::default();

    for record in records.values() {
        let mut prereq_targets = BTreeSet::new();
        for entry in &record.prerequisites {
            for target in resolve_reference(
                records,
                &by_slug,
                &by_topic,
                record,
                entry,
                "prerequisites",
                diagnostics,
            ) {
                prereq_targets.insert(target);
            }
        }
        graph.prerequisites.insert(record.id.clone(), prereq_targets);

        let mut related_targets = BTreeSet::new();
        for entry in &record.related_topics {
            for target in resolve_reference(
                records,
                &by_slug,
                &by_topic,
                record,
                entry,
                "related_topics",
                diagnostics,
            ) {
                related_targets.insert(target);
            }
        }
        graph.related.insert(record.id.clone(), related_targets);
    }

    if let Some(cycle) = find_cycle(&graph.prerequisites) {
        diagnostics.push(Diagnostic::fatal(
            DiagnosticKind::PrerequisiteCycle,
            None,
            format!("prerequisite cycle: {}", cycle.join(" -> ")),
        ));
        return Err(cycle);
    }

    graph.order = topological_order(records, &graph.prerequisites);
    Ok(graph)
}

/// Resolve one reference entry to zero or more document ids.
///
/// A topic slug fans out to every document carrying that topic. A bare
/// slug shared by several documents with no topic of that name is
/// ambiguous and reported as dangling rather than guessed at.
fn resolve_reference(
    records: &BTreeMap<String, DocumentRecord>,
    by_slug: &BTreeMap<&str, Vec<&str>>,
    by_topic: &BTreeMap<&str, Vec<&str>>,
    source: &DocumentRecord,
    entry: &str,
    field: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let targets: Vec<String> = if records.contains_key(entry) {
        vec![entry.to_string()]
    } else if let Some(ids) = by_slug.get(entry).filter(|ids| ids.len() == 1) {
        vec![ids[0].to_string()]
    } else if let Some(ids) = by_topic.get(entry) {
        ids.iter().map(|id| id.to_string()).collect()
    } else {
        let detail = if by_slug.contains_key(entry) {
            format!("`{field}` entry `{entry}` is ambiguous: several documents share that slug")
        } else {
            format!("`{field}` entry `{entry}` does not resolve to any document or topic")
        };
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::DanglingReference,
            source.id.clone(),
            detail,
        ));
        return Vec::new();
    };

    targets
        .into_iter()
        .filter(|target| {
            if target == &source.id {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::DanglingReference,
                    source.id.clone(),
                    format!("`{field}` entry `{entry}` refers to the document itself; dropped"),
                ));
                false
            } else {
                true
            }
        })
        .collect()
}

/// Three-color DFS cycle detection: unvisited / visiting / visited.
/// Returns the members of the first cycle found, extracted from the
/// traversal path, or `None` for an acyclic graph.
fn find_cycle(edges: &BTreeMap<String, BTreeSet<String>>) -> Option<Vec<String>> {
    let mut visiting: FxHashSet<&str> = FxHashSet::default();
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut path: Vec<&str> = Vec::new();

    for node in edges.keys() {
        if !visited.contains(node.as_str()) {
            if let Some(cycle) = dfs(node, edges, &mut visiting, &mut visited, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs<'a>(
    node: &'a str,
    edges: &'a BTreeMap<String, BTreeSet<String>>,
    visiting: &mut FxHashSet<&'a str>,
    visited: &mut FxHashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if visiting.contains(node) {
        let start = path.iter().position(|n| *n == node)?;
        return Some(path[start..].iter().map(|n| n.to_string()).collect());
    }
    if visited.contains(node) {
        return None;
    }

    visiting.insert(node);
    path.push(node);

    if let Some(targets) = edges.get(node) {
        for next in targets {
            if let Some(cycle) = dfs(next, edges, visiting, visited, path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    visiting.remove(node);
    visited.insert(node);
    None
}

/// Kahn's algorithm with a sorted ready set. Every prerequisite precedes
/// its dependents; among ready documents the `(phase, topic, id)` minimum
/// is emitted first.
fn topological_order(
    records: &BTreeMap<String, DocumentRecord>,
    prerequisites: &BTreeMap<String, BTreeSet<String>>,
) -> Vec<String> {
    let sort_key = |id: &str| -> (String, String, String) {
        match records.get(id) {
            Some(r) => (r.phase.clone(), r.topic.clone(), r.id.clone()),
            None => (String::new(), String::new(), id.to_string()),
        }
    };

    let mut remaining: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, prereqs) in prerequisites {
        remaining.insert(id, prereqs.len());
        for prereq in prereqs {
            dependents.entry(prereq).or_default().push(id);
        }
    }

    let mut ready: BTreeSet<(String, String, String)> = remaining
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(id, _)| sort_key(id))
        .collect();

    let mut order = Vec::with_capacity(remaining.len());
    while let Some(key) = ready.pop_first() {
        let id = key.2;
        if let Some(deps) = dependents.get(id.as_str()) {
            for dep in deps {
                let count = remaining.get_mut(dep).expect("dependent is a known node");
                *count -= 1;
                if *count == 0 {
                    ready.insert(sort_key(dep));
                }
            }
        }
        order.push(id);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Depth;
    use std::collections::BTreeSet;

    fn doc(id: &str, topic: &str, prereqs: &[&str]) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            slug: id.rsplit('/').next().unwrap().to_string(),
            path: format!("{id}.md"),
            title: id.to_string(),
            phase: "02-design".to_string(),
            topic: topic.to_string(),
            depth: Depth::Surface,
            reading_time_minutes: None,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
            related_topics: BTreeSet::new(),
            personas: BTreeSet::new(),
            unknown_personas: BTreeSet::new(),
            updated: None,
            source_digest: String::new(),
        }
    }

    fn corpus(docs: Vec<DocumentRecord>) -> BTreeMap<String, DocumentRecord> {
        docs.into_iter().map(|d| (d.id.clone(), d)).collect()
    }

    #[test]
    fn linear_chain_orders_prerequisites_first() {
        let records = corpus(vec![
            doc("c", "topic-c", &["b"]),
            doc("a", "topic-a", &[]),
            doc("b", "topic-b", &["a"]),
        ]);
        let mut diagnostics = Vec::new();
        let graph = resolve(&records, &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(graph.order, vec!["a", "b", "c"]);
    }

    #[test]
    fn cycle_is_fatal_and_names_its_members() {
        let records = corpus(vec![
            doc("a", "topic-a", &["c"]),
            doc("b", "topic-b", &["a"]),
            doc("c", "topic-c", &["b"]),
        ]);
        let mut diagnostics = Vec::new();
        let cycle = resolve(&records, &mut diagnostics).unwrap_err();
        let members: BTreeSet<&str> = cycle.iter().map(|s| s.as_str()).collect();
        assert_eq!(members, BTreeSet::from(["a", "b", "c"]));
        assert!(diagnostics.iter().any(|d| d.is_fatal()));
    }

    #[test]
    fn dangling_reference_is_a_warning() {
        let records = corpus(vec![doc("a", "topic-a", &["nonexistent-topic"])]);
        let mut diagnostics = Vec::new();
        let graph = resolve(&records, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DanglingReference);
        assert!(!diagnostics[0].is_fatal());
        assert!(graph.prerequisites["a"].is_empty());
    }

    #[test]
    fn topic_reference_fans_out_to_all_documents_of_that_topic() {
        let records = corpus(vec![
            doc("design/x", "shared-topic", &[]),
            doc("design/y", "shared-topic", &[]),
            doc("dev/z", "topic-z", &["shared-topic"]),
        ]);
        let mut diagnostics = Vec::new();
        let graph = resolve(&records, &mut diagnostics).unwrap();
        assert_eq!(
            graph.prerequisites["dev/z"],
            BTreeSet::from(["design/x".to_string(), "design/y".to_string()])
        );
    }

    #[test]
    fn self_reference_warns_and_drops_the_edge() {
        let records = corpus(vec![doc("a", "topic-a", &["a"])]);
        let mut diagnostics = Vec::new();
        let graph = resolve(&records, &mut diagnostics).unwrap();
        assert!(graph.prerequisites["a"].is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DanglingReference);
    }

    #[test]
    fn ambiguous_slug_is_dangling_not_guessed() {
        let records = corpus(vec![
            doc("design/intro", "topic-x", &[]),
            doc("dev/intro", "topic-y", &[]),
            doc("a", "topic-a", &["intro"]),
        ]);
        let mut diagnostics = Vec::new();
        let graph = resolve(&records, &mut diagnostics).unwrap();
        assert!(graph.prerequisites["a"].is_empty());
        assert!(diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DanglingReference
                && d.detail.contains("ambiguous")));
    }

    #[test]
    fn related_topics_resolve_without_affecting_order() {
        let mut b = doc("b", "topic-b", &[]);
        b.related_topics.insert("topic-a".to_string());
        let records = corpus(vec![doc("a", "topic-a", &[]), b]);
        let mut diagnostics = Vec::new();
        let graph = resolve(&records, &mut diagnostics).unwrap();
        assert_eq!(graph.related["b"], BTreeSet::from(["a".to_string()]));
        assert_eq!(graph.order, vec!["a", "b"]);
    }
}
