//! The corpus index: exclusive owner of all document records plus the
//! derived lookup views and the recommended reading order.
//!
//! Views are rebuilt from scratch on every `build`; ingestion is batch,
//! so there is no incremental-update surface. The index is immutable once
//! built — a rebuild produces a new index to swap in whole.

use crate::core::diagnostics::{Diagnostic, DiagnosticKind};
use crate::core::error::CoursemapError;
use crate::core::persona::PersonaTag;
use crate::core::record::{Depth, DocumentRecord};
use crate::core::relations::{self, RelationGraph};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct CorpusIndex {
    records: BTreeMap<String, DocumentRecord>,
    by_phase: BTreeMap<String, BTreeSet<String>>,
    by_topic: BTreeMap<String, BTreeSet<String>>,
    by_depth: BTreeMap<Depth, BTreeSet<String>>,
    by_persona: BTreeMap<PersonaTag, BTreeSet<String>>,
    relations: RelationGraph,
}

impl CorpusIndex {
    /// Build an index from normalized records.
    ///
    /// Success returns the index plus every diagnostic raised during
    /// relation resolution. Duplicate ids and prerequisite cycles abort
    /// the build; the error carries `prior` plus everything collected up
    /// to the failure.
    pub fn build(
        records: Vec<DocumentRecord>,
        prior: Vec<Diagnostic>,
    ) -> Result<(CorpusIndex, Vec<Diagnostic>), CoursemapError> {
        let mut diagnostics = prior;
        let mut owned: BTreeMap<String, DocumentRecord> = BTreeMap::new();

        for record in records {
            match owned.entry(record.id.clone()) {
                std::collections::btree_map::Entry::Vacant(e) => {
                    e.insert(record);
                }
                std::collections::btree_map::Entry::Occupied(e) => {
                    let first = e.get().path.clone();
                    diagnostics.push(Diagnostic::fatal(
                        DiagnosticKind::DuplicateDocument,
                        record.id.clone(),
                        format!(
                            "documents {} and {} both derive id `{}`",
                            first, record.path, record.id
                        ),
                    ));
                    return Err(CoursemapError::DuplicateDocument {
                        id: record.id,
                        first,
                        second: record.path,
                        diagnostics,
                    });
                }
            }
        }

        let relations = match relations::resolve(&owned, &mut diagnostics) {
            Ok(graph) => graph,
            Err(cycle) => {
                return Err(CoursemapError::PrerequisiteCycle { cycle, diagnostics });
            }
        };

        let mut by_phase: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut by_topic: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut by_depth: BTreeMap<Depth, BTreeSet<String>> = BTreeMap::new();
        let mut by_persona: BTreeMap<PersonaTag, BTreeSet<String>> = BTreeMap::new();
        for record in owned.values() {
            by_phase
                .entry(record.phase.clone())
                .or_default()
                .insert(record.id.clone());
            by_topic
                .entry(record.topic.clone())
                .or_default()
                .insert(record.id.clone());
            by_depth
                .entry(record.depth)
                .or_default()
                .insert(record.id.clone());
            for persona in &record.personas {
                by_persona
                    .entry(*persona)
                    .or_default()
                    .insert(record.id.clone());
            }
        }

        let index = CorpusIndex {
            records: owned,
            by_phase,
            by_topic,
            by_depth,
            by_persona,
            relations,
        };
        Ok((index, diagnostics))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.records.get(id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.records.values()
    }

    /// Recommended reading order over the whole corpus (topological over
    /// prerequisites, deterministic tie-break).
    pub fn reading_order(&self) -> &[String] {
        &self.relations.order
    }

    /// Persona-filtered recommended reading order; see
    /// [`crate::core::matcher::match_persona`].
    pub fn recommended_order(
        &self,
        persona: PersonaTag,
        max_depth: Option<Depth>,
    ) -> Vec<&DocumentRecord> {
        crate::core::matcher::match_persona(self, persona, max_depth)
    }

    /// Prerequisite documents of `id`, resolved.
    pub fn prerequisites_of(&self, id: &str) -> Vec<&DocumentRecord> {
        self.edge_records(&self.relations.prerequisites, id)
    }

    /// Documents covering the related topics of `id`.
    pub fn related_to(&self, id: &str) -> Vec<&DocumentRecord> {
        self.edge_records(&self.relations.related, id)
    }

    pub fn by_phase(&self, phase: &str) -> Vec<&DocumentRecord> {
        self.view(self.by_phase.get(phase))
    }

    pub fn by_topic(&self, topic: &str) -> Vec<&DocumentRecord> {
        self.view(self.by_topic.get(topic))
    }

    pub fn by_depth(&self, depth: Depth) -> Vec<&DocumentRecord> {
        self.view(self.by_depth.get(&depth))
    }

    pub fn by_persona(&self, persona: PersonaTag) -> Vec<&DocumentRecord> {
        self.view(self.by_persona.get(&persona))
    }

    fn edge_records(
        &self,
        edges: &BTreeMap<String, BTreeSet<String>>,
        id: &str,
    ) -> Vec<&DocumentRecord> {
        let mut out: Vec<&DocumentRecord> = edges
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|target| self.records.get(target))
            .collect();
        out.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        out
    }

    fn view(&self, ids: Option<&BTreeSet<String>>) -> Vec<&DocumentRecord> {
        let mut out: Vec<&DocumentRecord> = ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.records.get(id))
            .collect();
        out.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        out
    }
}

/// Deterministic query ordering, independent of filesystem enumeration.
fn sort_key(record: &DocumentRecord) -> (&str, &str, Depth, &str) {
    (&record.phase, &record.topic, record.depth, &record.id)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "coursemap",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Metadata index over a markdown learning corpus",
        "commands": [
            { "name": "build", "description": "Build the index and report diagnostics" },
            { "name": "query phase|topic|depth|persona", "description": "Deterministic filtered views" },
            { "name": "order", "description": "Persona-filtered recommended reading order" },
            { "name": "personas", "description": "Persona reference profiles" }
        ],
        "storage": []
    })
}
