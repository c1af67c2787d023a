//! Shared data models.

pub mod concept;
pub mod connection;
pub mod structure;

// Re-export commonly used types
pub use concept::{ConceptClass, ConceptDetails, ConceptRelationship, ConceptSummary};
pub use connection::{ConnectResult, ConnectionParams, ConnectionStatus};
pub use structure::{HierarchyTree, StructureDetails, StructureNode, SynonymDetail};
