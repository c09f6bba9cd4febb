use chrono::NaiveDate;
use shared::Sex;

use super::breeding::BreedingPerformance;

/// Snapshot of a registered animal at the time the tree was resolved
#[derive(Debug, Clone, PartialEq)]
pub struct AncestorSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub sex: Sex,
    pub breed: String,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub performance: BreedingPerformance,
}

/// Node of a derived ancestor tree. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum AncestorNode {
    /// `sire`/`dam` are `None` when the depth limit stopped expansion
    Animal {
        animal: AncestorSnapshot,
        sire: Option<Box<AncestorNode>>,
        dam: Option<Box<AncestorNode>>,
    },
    Unknown,
    Unregistered { id: String },
    Cycle { id: String },
}

impl AncestorNode {
    pub fn animal_id(&self) -> Option<&str> {
        match self {
            AncestorNode::Animal { animal, .. } => Some(&animal.id),
            _ => None,
        }
    }

    pub fn sire(&self) -> Option<&AncestorNode> {
        match self {
            AncestorNode::Animal { sire, .. } => sire.as_deref(),
            _ => None,
        }
    }

    pub fn dam(&self) -> Option<&AncestorNode> {
        match self {
            AncestorNode::Animal { dam, .. } => dam.as_deref(),
            _ => None,
        }
    }

    /// Number of expanded generations below this node
    pub fn generations(&self) -> u32 {
        match self {
            AncestorNode::Animal { sire, dam, .. } => {
                let below = |node: &Option<Box<AncestorNode>>| {
                    node.as_ref().map(|n| 1 + n.generations()).unwrap_or(0)
                };
                below(sire).max(below(dam))
            }
            _ => 0,
        }
    }

    /// Registered animals in the tree, root included, depth first, sire before dam
    pub fn registered_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        if let AncestorNode::Animal { animal, sire, dam } = self {
            ids.push(&animal.id);
            if let Some(sire) = sire {
                sire.collect_ids(ids);
            }
            if let Some(dam) = dam {
                dam.collect_ids(ids);
            }
        }
    }
}
