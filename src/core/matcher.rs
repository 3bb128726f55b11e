//! Persona-aware document selection.

use crate::core::index::CorpusIndex;
use crate::core::persona::PersonaTag;
use crate::core::record::{Depth, DocumentRecord};
use rustc_hash::FxHashMap;

/// Documents tagged for `persona`, optionally capped at `max_depth`
/// (inclusive ceiling under surface < mid-depth < deep-water), ordered by
/// the corpus reading order restricted to the filtered set.
///
/// An empty result is a valid state, not an error.
pub fn match_persona<'a>(
    index: &'a CorpusIndex,
    persona: PersonaTag,
    max_depth: Option<Depth>,
) -> Vec<&'a DocumentRecord> {
    let rank: FxHashMap<&str, usize> = index
        .reading_order()
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut matched: Vec<&DocumentRecord> = index
        .by_persona(persona)
        .into_iter()
        .filter(|record| max_depth.is_none_or(|ceiling| record.depth <= ceiling))
        .collect();

    matched.sort_by_key(|record| rank.get(record.id.as_str()).copied().unwrap_or(usize::MAX));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::DocumentRecord;
    use std::collections::BTreeSet;

    fn doc(id: &str, depth: Depth, prereqs: &[&str]) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            slug: id.to_string(),
            path: format!("{id}.md"),
            title: id.to_string(),
            phase: "02-design".to_string(),
            topic: format!("topic-{id}"),
            depth,
            reading_time_minutes: None,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
            related_topics: BTreeSet::new(),
            personas: BTreeSet::from([PersonaTag::BusyDeveloper]),
            unknown_personas: BTreeSet::new(),
            updated: None,
            source_digest: String::new(),
        }
    }

    #[test]
    fn depth_ceiling_is_inclusive_and_filters_deeper_documents() {
        let docs = vec![
            doc("shallow", Depth::Surface, &[]),
            doc("middle", Depth::MidDepth, &[]),
            doc("deep", Depth::DeepWater, &[]),
        ];
        let (index, _) = CorpusIndex::build(docs, Vec::new()).unwrap();

        let surface_only = match_persona(&index, PersonaTag::BusyDeveloper, Some(Depth::Surface));
        assert!(surface_only.iter().all(|r| r.depth == Depth::Surface));

        let up_to_mid = match_persona(&index, PersonaTag::BusyDeveloper, Some(Depth::MidDepth));
        assert!(up_to_mid.iter().all(|r| r.depth <= Depth::MidDepth));
        assert_eq!(up_to_mid.len(), 2);
    }

    #[test]
    fn results_follow_prerequisite_order() {
        let docs = vec![
            doc("third", Depth::Surface, &["second"]),
            doc("first", Depth::Surface, &[]),
            doc("second", Depth::Surface, &["first"]),
        ];
        let (index, _) = CorpusIndex::build(docs, Vec::new()).unwrap();
        let ids: Vec<&str> = match_persona(&index, PersonaTag::BusyDeveloper, None)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn no_match_is_an_empty_sequence() {
        let (index, _) =
            CorpusIndex::build(vec![doc("only", Depth::Surface, &[])], Vec::new()).unwrap();
        assert!(match_persona(&index, PersonaTag::YoloDev, None).is_empty());
    }
}
