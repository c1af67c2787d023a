//! In-memory `AtlasRepository` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use common::errors::{AppError, AppResult};
use common::models::concept::{
    ConceptClassRecord, ConceptRecord, ConceptSummary, RelationshipRecord,
};
use common::models::structure::{StructureNode, StructureRecord, SynonymDetail};

use super::AtlasRepository;

struct Edge {
    child: i64,
    parent: i64,
    model: String,
}

#[derive(Default)]
pub struct InMemoryAtlas {
    structures: Vec<StructureRecord>,
    synonyms: HashMap<i64, Vec<SynonymDetail>>,
    edges: Vec<Edge>,
    concepts: Vec<(String, ConceptRecord)>,
    classes: HashMap<String, ConceptClassRecord>,
    relationships: HashMap<String, Vec<RelationshipRecord>>,
    failing_node: Option<i64>,
    queries: AtomicUsize,
    edge_lookups: AtomicUsize,
}

impl InMemoryAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_structure(mut self, id: i64, name: &str) -> Self {
        self.structures.push(StructureRecord {
            id,
            neuronames_id: None,
            standard_name: name.to_string(),
            standard_acronym: None,
            definition: None,
            brain_info_url: None,
            structure_type: None,
        });
        self
    }

    pub fn with_record(mut self, record: StructureRecord) -> Self {
        self.structures.push(record);
        self
    }

    /// Adds `child -> parent` under `model`.
    pub fn with_edge(mut self, child: i64, parent: i64, model: &str) -> Self {
        self.edges.push(Edge {
            child,
            parent,
            model: model.to_string(),
        });
        self
    }

    pub fn with_synonym(mut self, structure_id: i64, synonym: SynonymDetail) -> Self {
        self.synonyms.entry(structure_id).or_default().push(synonym);
        self
    }

    pub fn with_concept(mut self, concept_id: &str, name: &str, class_id: Option<&str>) -> Self {
        self.concepts.push((
            concept_id.to_string(),
            ConceptRecord {
                name: name.to_string(),
                definition_text: Some(format!("Definition of {}", name)),
                concept_class: class_id.map(String::from),
            },
        ));
        self
    }

    pub fn with_class(mut self, class_id: &str, name: &str, description: Option<&str>) -> Self {
        self.classes.insert(
            class_id.to_string(),
            ConceptClassRecord {
                name: name.to_string(),
                description: description.map(String::from),
            },
        );
        self
    }

    pub fn with_relationship(mut self, concept_id: &str, record: RelationshipRecord) -> Self {
        self.relationships
            .entry(concept_id.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Edge lookups touching this node fail with a query error.
    pub fn failing_at(mut self, structure_id: i64) -> Self {
        self.failing_node = Some(structure_id);
        self
    }

    /// Total number of repository calls.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of `parents`/`children` calls.
    pub fn edge_lookups(&self) -> usize {
        self.edge_lookups.load(Ordering::SeqCst)
    }

    fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn node(&self, id: i64) -> Option<StructureNode> {
        self.structures
            .iter()
            .find(|s| s.id == id)
            .map(summary)
    }

    fn neighbours(
        &self,
        structure_id: i64,
        model: Option<&str>,
        pick: impl Fn(&Edge) -> Option<i64>,
    ) -> AppResult<Vec<StructureNode>> {
        self.record_query();
        self.edge_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing_node == Some(structure_id) {
            return Err(AppError::DatabaseQuery("connection reset by peer".into()));
        }
        Ok(self
            .edges
            .iter()
            .filter(|e| model.map_or(true, |m| e.model == m))
            .filter_map(&pick)
            .filter_map(|id| self.node(id))
            .collect())
    }
}

fn summary(record: &StructureRecord) -> StructureNode {
    StructureNode {
        structure_id: record.id,
        name: record.standard_name.clone(),
    }
}

/// Emulates `ILIKE '%term%'`.
fn matches(pattern: &str, value: &str) -> bool {
    let term = pattern.trim_matches('%').to_lowercase();
    value.to_lowercase().contains(&term)
}

#[async_trait]
impl AtlasRepository for InMemoryAtlas {
    async fn search_concepts(&self, pattern: &str) -> AppResult<Vec<ConceptSummary>> {
        self.record_query();
        Ok(self
            .concepts
            .iter()
            .filter(|(_, c)| matches(pattern, &c.name))
            .map(|(id, c)| ConceptSummary {
                concept_id: id.clone(),
                name: c.name.clone(),
            })
            .collect())
    }

    async fn find_concept(&self, concept_id: &str) -> AppResult<Option<ConceptRecord>> {
        self.record_query();
        Ok(self
            .concepts
            .iter()
            .find(|(id, _)| id == concept_id)
            .map(|(_, c)| c.clone()))
    }

    async fn find_concept_class(&self, class_id: &str) -> AppResult<Option<ConceptClassRecord>> {
        self.record_query();
        Ok(self.classes.get(class_id).cloned())
    }

    async fn concept_relationships(&self, concept_id: &str) -> AppResult<Vec<RelationshipRecord>> {
        self.record_query();
        Ok(self
            .relationships
            .get(concept_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_structures_by_name(&self, pattern: &str) -> AppResult<Vec<StructureNode>> {
        self.record_query();
        Ok(self
            .structures
            .iter()
            .filter(|s| matches(pattern, &s.standard_name))
            .map(summary)
            .collect())
    }

    async fn search_structures_by_synonym(&self, pattern: &str) -> AppResult<Vec<StructureNode>> {
        self.record_query();
        Ok(self
            .synonyms
            .iter()
            .filter(|(_, list)| list.iter().any(|s| matches(pattern, &s.name)))
            .filter_map(|(id, _)| self.node(*id))
            .collect())
    }

    async fn find_structure(&self, structure_id: i64) -> AppResult<Option<StructureRecord>> {
        self.record_query();
        Ok(self.structures.iter().find(|s| s.id == structure_id).cloned())
    }

    async fn synonyms(&self, structure_id: i64) -> AppResult<Vec<SynonymDetail>> {
        self.record_query();
        Ok(self.synonyms.get(&structure_id).cloned().unwrap_or_default())
    }

    async fn hierarchy_models_for(&self, structure_id: i64) -> AppResult<Vec<String>> {
        self.record_query();
        let mut models: Vec<String> = Vec::new();
        for edge in &self.edges {
            let touches = edge.child == structure_id || edge.parent == structure_id;
            if touches && !models.contains(&edge.model) {
                models.push(edge.model.clone());
            }
        }
        Ok(models)
    }

    async fn hierarchy_models(&self) -> AppResult<Vec<String>> {
        self.record_query();
        let mut models: Vec<String> = self.edges.iter().map(|e| e.model.clone()).collect();
        models.sort();
        models.dedup();
        Ok(models)
    }

    async fn parents(
        &self,
        structure_id: i64,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>> {
        self.neighbours(structure_id, model, |e| {
            (e.child == structure_id).then_some(e.parent)
        })
    }

    async fn children(
        &self,
        structure_id: i64,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>> {
        self.neighbours(structure_id, model, |e| {
            (e.parent == structure_id).then_some(e.child)
        })
    }
}
