//! Read-only queries against the atlas schema.
//!
//! `AtlasRepository` is the seam the services depend on; `PgAtlasRepository`
//! runs each call as one parameterized statement on the shared pool, so a
//! connection is held only for the duration of that statement.

use async_trait::async_trait;
use common::errors::AppResult;
use common::models::concept::{
    ConceptClassRecord, ConceptRecord, ConceptSummary, RelationshipRecord,
};
use common::models::structure::{StructureNode, StructureRecord, SynonymDetail};
use sqlx::PgPool;

#[cfg(test)]
pub(crate) mod memory;

/// Maximum rows returned by each search query.
pub const SEARCH_LIMIT: i64 = 20;

/// Parameterized reads used by the catalog and hierarchy services.
#[async_trait]
pub trait AtlasRepository: Send + Sync {
    /// Concepts whose name matches the `ILIKE` pattern.
    async fn search_concepts(&self, pattern: &str) -> AppResult<Vec<ConceptSummary>>;

    async fn find_concept(&self, concept_id: &str) -> AppResult<Option<ConceptRecord>>;

    async fn find_concept_class(&self, class_id: &str) -> AppResult<Option<ConceptClassRecord>>;

    async fn concept_relationships(&self, concept_id: &str) -> AppResult<Vec<RelationshipRecord>>;

    /// Structures whose standard name matches the `ILIKE` pattern.
    async fn search_structures_by_name(&self, pattern: &str) -> AppResult<Vec<StructureNode>>;

    /// Structures with a synonym matching the `ILIKE` pattern.
    async fn search_structures_by_synonym(&self, pattern: &str) -> AppResult<Vec<StructureNode>>;

    async fn find_structure(&self, structure_id: i64) -> AppResult<Option<StructureRecord>>;

    async fn synonyms(&self, structure_id: i64) -> AppResult<Vec<SynonymDetail>>;

    /// Distinct models with an edge where the structure is parent or child.
    async fn hierarchy_models_for(&self, structure_id: i64) -> AppResult<Vec<String>>;

    /// Every model name, sorted.
    async fn hierarchy_models(&self) -> AppResult<Vec<String>>;

    /// Immediate parents, optionally restricted to one model.
    async fn parents(
        &self,
        structure_id: i64,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>>;

    /// Immediate children, optionally restricted to one model.
    async fn children(
        &self,
        structure_id: i64,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>>;
}

/// Wraps a search term for substring matching.
pub fn contains_pattern(query: &str) -> String {
    format!("%{}%", query)
}

/// `AtlasRepository` over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgAtlasRepository {
    pool: PgPool,
}

impl PgAtlasRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AtlasRepository for PgAtlasRepository {
    async fn search_concepts(&self, pattern: &str) -> AppResult<Vec<ConceptSummary>> {
        let rows = sqlx::query_as::<_, ConceptSummary>(
            "SELECT concept_id, name
             FROM cognitive_concepts
             WHERE name ILIKE $1
             LIMIT $2",
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_concept(&self, concept_id: &str) -> AppResult<Option<ConceptRecord>> {
        let row = sqlx::query_as::<_, ConceptRecord>(
            "SELECT name, definition_text, concept_class
             FROM cognitive_concepts
             WHERE concept_id = $1",
        )
        .bind(concept_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_concept_class(&self, class_id: &str) -> AppResult<Option<ConceptClassRecord>> {
        let row = sqlx::query_as::<_, ConceptClassRecord>(
            "SELECT name, description
             FROM concept_classes
             WHERE concept_class_id = $1",
        )
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn concept_relationships(&self, concept_id: &str) -> AppResult<Vec<RelationshipRecord>> {
        let rows = sqlx::query_as::<_, RelationshipRecord>(
            "SELECT r.relationship, r.direction,
                    c.name AS concept_name, t.name AS task_name
             FROM relationships r
             LEFT JOIN cognitive_concepts c ON r.related_concept_id = c.concept_id
             LEFT JOIN tasks t ON r.related_concept_id = t.task_id
             WHERE r.concept_id = $1",
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search_structures_by_name(&self, pattern: &str) -> AppResult<Vec<StructureNode>> {
        let rows = sqlx::query_as::<_, StructureNode>(
            "SELECT id::BIGINT AS id, standard_name
             FROM brain_structures
             WHERE standard_name ILIKE $1
             LIMIT $2",
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search_structures_by_synonym(&self, pattern: &str) -> AppResult<Vec<StructureNode>> {
        let rows = sqlx::query_as::<_, StructureNode>(
            "SELECT bs.id::BIGINT AS id, bs.standard_name
             FROM brain_structures bs
             JOIN synonyms ss ON bs.id = ss.brain_structure_id
             WHERE ss.synonym_name ILIKE $1
             LIMIT $2",
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_structure(&self, structure_id: i64) -> AppResult<Option<StructureRecord>> {
        let row = sqlx::query_as::<_, StructureRecord>(
            "SELECT id::BIGINT AS id, neuronames_id::BIGINT AS neuronames_id,
                    standard_name, standard_acronym, definition, brain_info_url, structure_type
             FROM brain_structures
             WHERE id = $1",
        )
        .bind(structure_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn synonyms(&self, structure_id: i64) -> AppResult<Vec<SynonymDetail>> {
        let rows = sqlx::query_as::<_, SynonymDetail>(
            "SELECT synonym_name, synonym_language, organism, synonym_source, source_title,
                    pubmed_hit_count::BIGINT AS pubmed_hit_count
             FROM synonyms
             WHERE brain_structure_id = $1",
        )
        .bind(structure_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn hierarchy_models_for(&self, structure_id: i64) -> AppResult<Vec<String>> {
        let models = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT hierarchy_model_name
             FROM structure_parents
             WHERE (child_id = $1 OR parent_id = $1)
               AND hierarchy_model_name IS NOT NULL",
        )
        .bind(structure_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(models)
    }

    async fn hierarchy_models(&self) -> AppResult<Vec<String>> {
        let models = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT hierarchy_model_name
             FROM structure_parents
             WHERE hierarchy_model_name IS NOT NULL
             ORDER BY hierarchy_model_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(models)
    }

    async fn parents(
        &self,
        structure_id: i64,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>> {
        let rows = sqlx::query_as::<_, StructureNode>(
            "SELECT p.id::BIGINT AS id, p.standard_name
             FROM brain_structures p
             JOIN structure_parents sr ON p.id = sr.parent_id
             WHERE sr.child_id = $1
               AND ($2::TEXT IS NULL OR sr.hierarchy_model_name = $2)",
        )
        .bind(structure_id)
        .bind(model)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn children(
        &self,
        structure_id: i64,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>> {
        let rows = sqlx::query_as::<_, StructureNode>(
            "SELECT c.id::BIGINT AS id, c.standard_name
             FROM brain_structures c
             JOIN structure_parents sr ON c.id = sr.child_id
             WHERE sr.parent_id = $1
               AND ($2::TEXT IS NULL OR sr.hierarchy_model_name = $2)",
        )
        .bind(structure_id)
        .bind(model)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("hippo"), "%hippo%");
        assert_eq!(contains_pattern(""), "%%");
    }
}
