use shared::{
    AncestorNode as SharedNode, AncestorSnapshot as SharedSnapshot,
    GenealogyCertificate as SharedCertificate, PedigreeResponse, ReceiptLine as SharedReceiptLine,
    SaleReceipt as SharedReceipt,
};

use super::animal_mapper::AnimalMapper;
use super::breeding_mapper::BreedingMapper;
use super::format_date;
use crate::domain::models::document::{GenealogyCertificate, ReceiptLine, SaleReceipt};
use crate::domain::models::pedigree::{AncestorNode, AncestorSnapshot};

/// Mapper for ancestor trees and the documents that embed them
pub struct PedigreeMapper;

impl PedigreeMapper {
    pub fn to_node_dto(domain: AncestorNode) -> SharedNode {
        match domain {
            AncestorNode::Animal { animal, sire, dam } => SharedNode::Animal {
                animal: Self::to_snapshot_dto(animal),
                sire: sire.map(|node| Box::new(Self::to_node_dto(*node))),
                dam: dam.map(|node| Box::new(Self::to_node_dto(*node))),
            },
            AncestorNode::Unknown => SharedNode::Unknown,
            AncestorNode::Unregistered { id } => SharedNode::Unregistered { id },
            AncestorNode::Cycle { id } => SharedNode::Cycle { id },
        }
    }

    fn to_snapshot_dto(domain: AncestorSnapshot) -> SharedSnapshot {
        SharedSnapshot {
            id: domain.id,
            name: domain.name,
            sex: domain.sex,
            breed: domain.breed,
            birth_date: domain.birth_date.map(format_date),
            weight_kg: domain.weight_kg,
            performance: BreedingMapper::to_performance_dto(domain.performance),
        }
    }

    pub fn to_pedigree_response(animal_id: String, depth: u32, tree: AncestorNode) -> PedigreeResponse {
        PedigreeResponse {
            animal_id,
            depth,
            tree: Self::to_node_dto(tree),
        }
    }

    pub fn to_certificate_dto(domain: GenealogyCertificate) -> SharedCertificate {
        SharedCertificate {
            animal: AnimalMapper::to_dto(domain.animal),
            depth: domain.depth,
            pedigree: Self::to_node_dto(domain.pedigree),
            performance: BreedingMapper::to_performance_dto(domain.performance),
            issued_on: format_date(domain.issued_on),
        }
    }

    pub fn to_receipt_dto(domain: SaleReceipt) -> SharedReceipt {
        SharedReceipt {
            sale_id: domain.sale_id,
            buyer_name: domain.buyer_name,
            buyer_contact: domain.buyer_contact,
            sale_date: format_date(domain.sale_date),
            lines: domain.lines.into_iter().map(Self::to_receipt_line_dto).collect(),
            total: domain.total,
        }
    }

    fn to_receipt_line_dto(domain: ReceiptLine) -> SharedReceiptLine {
        SharedReceiptLine {
            animal_id: domain.animal_id,
            name: domain.name,
            breed: domain.breed,
            sex: domain.sex,
            price: domain.price,
            pedigree: Self::to_node_dto(domain.pedigree),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::breeding::BreedingPerformance;
    use shared::Sex;

    #[test]
    fn test_tree_conversion_keeps_shape() {
        let tree = AncestorNode::Animal {
            animal: AncestorSnapshot {
                id: "R-100".to_string(),
                name: None,
                sex: Sex::Female,
                breed: "Rex".to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 15),
                weight_kg: Some(3.2),
                performance: BreedingPerformance::default(),
            },
            sire: Some(Box::new(AncestorNode::Cycle { id: "R-100".to_string() })),
            dam: None,
        };

        match PedigreeMapper::to_node_dto(tree) {
            SharedNode::Animal { animal, sire, dam } => {
                assert_eq!(animal.birth_date.as_deref(), Some("2024-03-15"));
                assert_eq!(sire.as_deref(), Some(&SharedNode::Cycle { id: "R-100".to_string() }));
                assert!(dam.is_none());
            }
            other => panic!("unexpected node {:?}", other),
        }
    }
}
