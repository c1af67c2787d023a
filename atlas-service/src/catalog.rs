//! Flat lookups over concepts and structures.

use std::collections::HashSet;

use common::errors::AppResult;
use common::models::{ConceptClass, ConceptDetails, ConceptRelationship, ConceptSummary, StructureNode};

use crate::repository::{contains_pattern, AtlasRepository};

pub struct CatalogService<R> {
    repo: R,
}

impl<R: AtlasRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn search_concepts(&self, query: &str) -> AppResult<Vec<ConceptSummary>> {
        self.repo.search_concepts(&contains_pattern(query)).await
    }

    /// Concept with its class and relationships, or `None` if the id is unknown.
    pub async fn concept_details(&self, concept_id: &str) -> AppResult<Option<ConceptDetails>> {
        let Some(concept) = self.repo.find_concept(concept_id).await? else {
            return Ok(None);
        };

        let class = match concept.concept_class.as_deref() {
            Some(class_id) => self.repo.find_concept_class(class_id).await?,
            None => None,
        }
        .map(ConceptClass::from)
        .unwrap_or_else(ConceptClass::unknown);

        let relationships = self
            .repo
            .concept_relationships(concept_id)
            .await?
            .into_iter()
            .map(ConceptRelationship::from)
            .collect();

        Ok(Some(ConceptDetails {
            name: concept.name,
            definition: concept.definition_text,
            class,
            relationships,
        }))
    }

    /// Name matches first, then synonym matches, each structure once.
    pub async fn search_structures(&self, query: &str) -> AppResult<Vec<StructureNode>> {
        let pattern = contains_pattern(query);
        let by_name = self.repo.search_structures_by_name(&pattern).await?;
        let by_synonym = self.repo.search_structures_by_synonym(&pattern).await?;

        let mut seen = HashSet::new();
        Ok(by_name
            .into_iter()
            .chain(by_synonym)
            .filter(|node| seen.insert(node.structure_id))
            .collect())
    }

    pub async fn hierarchy_models(&self) -> AppResult<Vec<String>> {
        self.repo.hierarchy_models().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::InMemoryAtlas;
    use common::models::concept::RelationshipRecord;
    use common::models::SynonymDetail;

    fn synonym(name: &str) -> SynonymDetail {
        SynonymDetail {
            name: name.into(),
            language: None,
            organism: None,
            source: None,
            source_title: None,
            pubmed_hit_count: None,
        }
    }

    #[tokio::test]
    async fn test_search_concepts_is_case_insensitive() {
        let catalog = CatalogService::new(
            InMemoryAtlas::new()
                .with_concept("trm_1", "Working Memory", None)
                .with_concept("trm_2", "attention", None),
        );

        let hits = catalog.search_concepts("MEMORY").await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].concept_id, "trm_1");
    }

    #[tokio::test]
    async fn test_concept_details_with_class_and_relationships() {
        let catalog = CatalogService::new(
            InMemoryAtlas::new()
                .with_concept("trm_1", "working memory", Some("ctp_1"))
                .with_class("ctp_1", "Memory", Some("Memory processes"))
                .with_relationship(
                    "trm_1",
                    RelationshipRecord {
                        relationship: Some("KINDOF".into()),
                        direction: Some("parent".into()),
                        concept_name: Some("memory".into()),
                        task_name: None,
                    },
                )
                .with_relationship(
                    "trm_1",
                    RelationshipRecord {
                        relationship: Some("MEASUREDBY".into()),
                        direction: Some("child".into()),
                        concept_name: None,
                        task_name: None,
                    },
                ),
        );

        let details = catalog.concept_details("trm_1").await.unwrap().unwrap();

        assert_eq!(details.name, "working memory");
        assert_eq!(details.definition.as_deref(), Some("Definition of working memory"));
        assert_eq!(details.class.name, "Memory");
        assert_eq!(details.class.description, "Memory processes");
        let targets: Vec<_> = details.relationships.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["memory", "[Unnamed]"]);
    }

    #[tokio::test]
    async fn test_concept_class_falls_back_to_unknown() {
        let catalog = CatalogService::new(
            InMemoryAtlas::new()
                .with_concept("trm_1", "orphan", Some("ctp_missing"))
                .with_concept("trm_2", "classless", None),
        );

        for id in ["trm_1", "trm_2"] {
            let details = catalog.concept_details(id).await.unwrap().unwrap();
            assert_eq!(details.class.name, "Unknown");
            assert_eq!(details.class.description, "");
            assert!(details.relationships.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_concept_is_none() {
        let catalog = CatalogService::new(InMemoryAtlas::new());
        assert!(catalog.concept_details("trm_404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_structures_merges_and_dedups() {
        let catalog = CatalogService::new(
            InMemoryAtlas::new()
                .with_structure(1, "hippocampus")
                .with_structure(2, "dentate gyrus")
                .with_structure(3, "subiculum")
                .with_synonym(1, synonym("hippocampal formation"))
                .with_synonym(2, synonym("hippocampal dentate")),
        );

        let hits = catalog.search_structures("hippocamp").await.unwrap();

        let ids: Vec<i64> = hits.iter().map(|n| n.structure_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(hits[1].name, "dentate gyrus");
    }

    #[tokio::test]
    async fn test_hierarchy_models_sorted() {
        let catalog = CatalogService::new(
            InMemoryAtlas::new()
                .with_structure(1, "a")
                .with_structure(2, "b")
                .with_edge(1, 2, "Swanson")
                .with_edge(2, 1, "NeuroNames")
                .with_edge(2, 1, "Swanson"),
        );

        assert_eq!(
            catalog.hierarchy_models().await.unwrap(),
            vec!["NeuroNames".to_string(), "Swanson".to_string()]
        );
    }
}
