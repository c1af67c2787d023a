//! Brain structure models.
//!
//! Nodes, synonyms and the hierarchy result assembled per request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A brain structure reference: id plus display name.
///
/// Identity is the id; the name is informational.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct StructureNode {
    /// Structure identifier.
    #[sqlx(rename = "id")]
    pub structure_id: i64,
    /// Standard name.
    #[sqlx(rename = "standard_name")]
    pub name: String,
}

/// Full attributes of a brain structure row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StructureRecord {
    pub id: i64,
    pub neuronames_id: Option<i64>,
    pub standard_name: String,
    pub standard_acronym: Option<String>,
    pub definition: Option<String>,
    pub brain_info_url: Option<String>,
    pub structure_type: Option<String>,
}

/// A synonym with its provenance.
///
/// Absent provenance fields stay `null` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SynonymDetail {
    /// Synonym text.
    #[sqlx(rename = "synonym_name")]
    pub name: String,
    /// Language of the synonym.
    #[sqlx(rename = "synonym_language")]
    pub language: Option<String>,
    /// Organism the synonym applies to.
    pub organism: Option<String>,
    /// Source of the synonym.
    #[sqlx(rename = "synonym_source")]
    pub source: Option<String>,
    /// Title of the source.
    pub source_title: Option<String>,
    /// PubMed hit count.
    pub pubmed_hit_count: Option<i64>,
}

/// Transitive closure in both directions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HierarchyTree {
    /// Every structure reachable by following parent edges.
    pub ancestors: Vec<StructureNode>,
    /// Every structure reachable by following child edges.
    pub descendants: Vec<StructureNode>,
}

/// Details of a brain structure together with its hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StructureDetails {
    pub structure_id: i64,
    pub name: String,
    pub acronym: Option<String>,
    pub description: Option<String>,
    pub brain_info_url: Option<String>,
    pub structure_type: Option<String>,
    pub neuronames_id: Option<i64>,
    /// Synonym names only.
    pub synonyms: Vec<String>,
    pub synonym_details: Vec<SynonymDetail>,
    /// Immediate parents under the selected model.
    pub parents: Vec<StructureNode>,
    /// Immediate children under the selected model.
    pub children: Vec<StructureNode>,
    pub hierarchy: HierarchyTree,
    /// Models with at least one edge touching this structure.
    pub hierarchy_models: Vec<String>,
    /// Model the hierarchy was computed under, if any.
    pub current_hierarchy_model: Option<String>,
}
