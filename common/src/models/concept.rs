//! Cognitive concept models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Search hit for a concept.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ConceptSummary {
    pub concept_id: String,
    pub name: String,
}

/// Concept row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConceptRecord {
    pub name: String,
    pub definition_text: Option<String>,
    pub concept_class: Option<String>,
}

/// Concept class row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConceptClassRecord {
    pub name: String,
    pub description: Option<String>,
}

/// Relationship row joined with the names of its target.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RelationshipRecord {
    pub relationship: Option<String>,
    pub direction: Option<String>,
    pub concept_name: Option<String>,
    pub task_name: Option<String>,
}

/// Class a concept belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptClass {
    pub name: String,
    pub description: String,
}

impl ConceptClass {
    /// Placeholder used when the concept's class row is missing.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            description: String::new(),
        }
    }
}

impl From<ConceptClassRecord> for ConceptClass {
    fn from(record: ConceptClassRecord) -> Self {
        Self {
            name: record.name,
            description: record.description.unwrap_or_default(),
        }
    }
}

/// A relationship from a concept to another concept or a task.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptRelationship {
    pub relationship: Option<String>,
    pub direction: Option<String>,
    /// Name of the related concept, else the related task, else `[Unnamed]`.
    pub target: String,
}

impl From<RelationshipRecord> for ConceptRelationship {
    fn from(record: RelationshipRecord) -> Self {
        let target = record
            .concept_name
            .filter(|name| !name.is_empty())
            .or(record.task_name.filter(|name| !name.is_empty()))
            .unwrap_or_else(|| "[Unnamed]".to_string());
        Self {
            relationship: record.relationship,
            direction: record.direction,
            target,
        }
    }
}

/// Concept details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptDetails {
    pub name: String,
    pub definition: Option<String>,
    pub class: ConceptClass,
    pub relationships: Vec<ConceptRelationship>,
}
