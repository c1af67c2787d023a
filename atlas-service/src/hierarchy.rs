//! Brain structure hierarchy reconstruction.
//!
//! Edges live in `structure_parents` and are partitioned by hierarchy model.
//! The graph is a DAG in well-formed data but may contain cycles, so both
//! closures expand each structure id at most once.

use std::collections::HashSet;

use common::errors::{AppError, AppResult};
use common::models::structure::{HierarchyTree, StructureDetails, StructureNode};

use crate::repository::AtlasRepository;

/// Parses a structure id from a path segment.
pub fn parse_structure_id(raw: &str) -> AppResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        AppError::InvalidArgument(format!(
            "Invalid structure ID: {} - must be an integer",
            raw
        ))
    })
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Builds structure details together with ancestor and descendant closures.
pub struct HierarchyService<R> {
    repo: R,
}

impl<R: AtlasRepository> HierarchyService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns `None` when the structure does not exist.
    ///
    /// Without a `hierarchy_model` (or with an empty one) the first model
    /// touching the structure is used; a structure without edges is resolved
    /// with no model filter.
    pub async fn structure_details(
        &self,
        structure_id: i64,
        hierarchy_model: Option<&str>,
    ) -> AppResult<Option<StructureDetails>> {
        let Some(structure) = self.repo.find_structure(structure_id).await? else {
            tracing::debug!(structure_id, "Brain structure not found");
            return Ok(None);
        };

        let synonyms = self.repo.synonyms(structure_id).await?;
        let hierarchy_models = self.repo.hierarchy_models_for(structure_id).await?;

        let selected = hierarchy_model
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| hierarchy_models.first().cloned());
        let model = selected.as_deref();

        let parents = self.repo.parents(structure_id, model).await?;
        let children = self.repo.children(structure_id, model).await?;

        let ancestors = self.closure(parents.clone(), Direction::Up, model).await?;
        let descendants = self.closure(children.clone(), Direction::Down, model).await?;

        tracing::debug!(
            structure_id,
            model = ?model,
            ancestors = ancestors.len(),
            descendants = descendants.len(),
            "Hierarchy resolved"
        );

        Ok(Some(StructureDetails {
            structure_id: structure.id,
            name: structure.standard_name,
            acronym: structure.standard_acronym,
            description: structure.definition,
            brain_info_url: structure.brain_info_url,
            structure_type: structure.structure_type,
            neuronames_id: structure.neuronames_id,
            synonyms: synonyms.iter().map(|s| s.name.clone()).collect(),
            synonym_details: synonyms,
            parents,
            children,
            hierarchy: HierarchyTree {
                ancestors,
                descendants,
            },
            hierarchy_models,
            current_hierarchy_model: selected,
        }))
    }

    /// Breadth-first expansion from `start`, one lookup per distinct id.
    ///
    /// Nodes come back in discovery order. The starting structure itself is
    /// not pre-marked, so it shows up when a cycle leads back to it.
    async fn closure(
        &self,
        start: Vec<StructureNode>,
        direction: Direction,
        model: Option<&str>,
    ) -> AppResult<Vec<StructureNode>> {
        let mut visited: HashSet<i64> = HashSet::new();
        let mut found = Vec::new();
        let mut frontier = start;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in frontier {
                if !visited.insert(node.structure_id) {
                    continue;
                }
                let neighbours = match direction {
                    Direction::Up => self.repo.parents(node.structure_id, model).await?,
                    Direction::Down => self.repo.children(node.structure_id, model).await?,
                };
                next.extend(
                    neighbours
                        .into_iter()
                        .filter(|n| !visited.contains(&n.structure_id)),
                );
                found.push(node);
            }
            frontier = next;
        }

        Ok(found)
    }
}
