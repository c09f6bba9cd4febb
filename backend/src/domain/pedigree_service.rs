//! Ancestor resolver.
//!
//! Builds the sire/dam tree of an animal by following parent identifiers
//! through the registry. The tree is recomputed on every call and never
//! stored.
//!
//! Depth counts ancestor generations: depth 0 yields the root alone, depth 1
//! adds its parents, and so on. Soft misses below the root become leaves
//! instead of errors:
//!
//! - no parent recorded: [`AncestorNode::Unknown`]
//! - parent id not in the registry: [`AncestorNode::Unregistered`]
//! - parent id already on the path from the root: [`AncestorNode::Cycle`]
//!
//! The visited set is scoped to the current path, so an ancestor reached
//! through both the sire and the dam line (inbreeding) is expanded twice and
//! is not reported as a cycle.

use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info, warn};

use crate::config::PedigreeConfig;
use crate::domain::models::animal::Animal;
use crate::domain::models::breeding::BreedingPerformance;
use crate::domain::models::pedigree::{AncestorNode, AncestorSnapshot};
use crate::error::{HerdError, Result};
use crate::storage::{AnimalStorage, BreedingStorage, Connection};

type NodeFuture<'a> = Pin<Box<dyn Future<Output = Result<AncestorNode>> + Send + 'a>>;

#[derive(Clone)]
pub struct PedigreeService<C: Connection> {
    animals: C::AnimalRepository,
    breeding: C::BreedingRepository,
    default_depth: u32,
    depth_limit: u32,
}

impl<C: Connection> PedigreeService<C> {
    pub fn new(connection: &C, config: &PedigreeConfig) -> Self {
        Self {
            animals: connection.create_animal_repository(),
            breeding: connection.create_breeding_repository(),
            default_depth: config.default_depth,
            depth_limit: config.max_depth,
        }
    }

    /// Depth to use for a request, falling back to the configured default
    pub fn effective_depth(&self, requested: Option<u32>) -> Result<u32> {
        let depth = requested.unwrap_or(self.default_depth);
        if depth > self.depth_limit {
            return Err(HerdError::validation(format!(
                "Pedigree depth {} exceeds the limit of {} generations",
                depth, self.depth_limit
            )));
        }
        Ok(depth)
    }

    /// Resolve the ancestor tree of `animal_id` down to `max_depth` generations
    pub async fn resolve_ancestor_tree(&self, animal_id: &str, max_depth: u32) -> Result<AncestorNode> {
        info!("Resolving ancestor tree of {} ({} generations)", animal_id, max_depth);

        let depth = self.effective_depth(Some(max_depth))?;
        let root = self.animals.get_animal(animal_id).await?.ok_or_else(|| {
            warn!("Animal not found: {}", animal_id);
            HerdError::not_found(format!("Animal {}", animal_id))
        })?;

        let path = vec![root.id.clone()];
        let tree = self.expand(root, depth, path).await?;

        let ancestors = tree.registered_ids().len().saturating_sub(1);
        debug!("Resolved {} registered ancestors for {}", ancestors, animal_id);
        Ok(tree)
    }

    /// Snapshot `animal` and, while generations remain, both of its parents
    fn expand<'a>(&'a self, animal: Animal, remaining: u32, path: Vec<String>) -> NodeFuture<'a> {
        Box::pin(async move {
            let snapshot = self.snapshot(&animal).await?;

            if remaining == 0 {
                return Ok(AncestorNode::Animal {
                    animal: snapshot,
                    sire: None,
                    dam: None,
                });
            }

            let (sire, dam) = tokio::try_join!(
                self.resolve_parent(animal.sire_id.as_deref(), remaining - 1, &path),
                self.resolve_parent(animal.dam_id.as_deref(), remaining - 1, &path),
            )?;

            Ok(AncestorNode::Animal {
                animal: snapshot,
                sire: Some(Box::new(sire)),
                dam: Some(Box::new(dam)),
            })
        })
    }

    fn resolve_parent<'a>(
        &'a self,
        parent_id: Option<&'a str>,
        remaining: u32,
        path: &'a [String],
    ) -> NodeFuture<'a> {
        Box::pin(async move {
            let Some(parent_id) = parent_id else {
                return Ok(AncestorNode::Unknown);
            };

            if path.iter().any(|id| id == parent_id) {
                warn!("Parent cycle detected: {} -> {}", path.join(" -> "), parent_id);
                return Ok(AncestorNode::Cycle {
                    id: parent_id.to_string(),
                });
            }

            let Some(parent) = self.animals.get_animal(parent_id).await? else {
                debug!("Parent {} is not registered", parent_id);
                return Ok(AncestorNode::Unregistered {
                    id: parent_id.to_string(),
                });
            };

            let mut branch = path.to_vec();
            branch.push(parent.id.clone());
            self.expand(parent, remaining, branch).await
        })
    }

    async fn snapshot(&self, animal: &Animal) -> Result<AncestorSnapshot> {
        let matings = self.breeding.list_matings(Some(&animal.id)).await?;
        let births = self.breeding.list_births(Some(&animal.id)).await?;

        Ok(AncestorSnapshot {
            id: animal.id.clone(),
            name: animal.name.clone(),
            sex: animal.sex,
            breed: animal.breed.clone(),
            birth_date: animal.birth_date,
            weight_kg: animal.weight_kg,
            performance: BreedingPerformance::aggregate(&animal.id, &matings, &births),
        })
    }
}
