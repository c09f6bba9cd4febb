//! Receipts and genealogy certificates assembled from the registry, the
//! breeding log and the sales ledger.

use chrono::Utc;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::models::document::{GenealogyCertificate, ReceiptLine, SaleReceipt};
use crate::domain::{AnimalService, BreedingService, DocumentFormatter, PedigreeService, SaleService};
use crate::error::Result;
use crate::storage::Connection;

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    animals: AnimalService<C>,
    breeding: BreedingService<C>,
    pedigree: PedigreeService<C>,
    sales: SaleService<C>,
    formatter: DocumentFormatter,
}

impl<C: Connection> ReportService<C> {
    pub fn new(connection: &C, config: &AppConfig) -> Self {
        Self {
            animals: AnimalService::new(connection),
            breeding: BreedingService::new(connection, config.breeding.gestation_days),
            pedigree: PedigreeService::new(connection, &config.pedigree),
            sales: SaleService::new(connection),
            formatter: DocumentFormatter::new(config.locale.clone()),
        }
    }

    /// Receipt of a sale with the pedigree of every sold animal at the default depth
    pub async fn sale_receipt(&self, sale_id: &str) -> Result<SaleReceipt> {
        info!("Building receipt for sale {}", sale_id);

        let sale = self.sales.get_sale(sale_id).await?;
        let depth = self.pedigree.effective_depth(None)?;

        let mut lines = Vec::with_capacity(sale.lines.len());
        for line in &sale.lines {
            let animal = self.animals.get_animal(&line.animal_id).await?;
            let pedigree = self.pedigree.resolve_ancestor_tree(&animal.id, depth).await?;
            lines.push(ReceiptLine {
                animal_id: animal.id,
                name: animal.name,
                breed: animal.breed,
                sex: animal.sex,
                price: line.price,
                pedigree,
            });
        }

        Ok(SaleReceipt {
            total: sale.total(),
            sale_id: sale.id,
            buyer_name: sale.buyer_name,
            buyer_contact: sale.buyer_contact,
            sale_date: sale.sale_date,
            lines,
        })
    }

    pub async fn sale_receipt_text(&self, sale_id: &str) -> Result<String> {
        let receipt = self.sale_receipt(sale_id).await?;
        Ok(self.formatter.sale_receipt_text(&receipt))
    }

    /// Certificate of an animal: pedigree to `depth` (or the default) and its breeding results
    pub async fn genealogy_certificate(
        &self,
        animal_id: &str,
        depth: Option<u32>,
    ) -> Result<GenealogyCertificate> {
        info!("Building genealogy certificate for {}", animal_id);

        let depth = self.pedigree.effective_depth(depth)?;
        let animal = self.animals.get_animal(animal_id).await?;
        let (pedigree, performance) = tokio::try_join!(
            self.pedigree.resolve_ancestor_tree(&animal.id, depth),
            self.breeding.performance_for(&animal.id),
        )?;

        Ok(GenealogyCertificate {
            animal,
            depth,
            pedigree,
            performance,
            issued_on: Utc::now().date_naive(),
        })
    }

    pub async fn genealogy_certificate_text(&self, animal_id: &str, depth: Option<u32>) -> Result<String> {
        let certificate = self.genealogy_certificate(animal_id, depth).await?;
        Ok(self.formatter.certificate_text(&certificate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animal_service::tests::{child_command, create_command};
    use crate::domain::commands::breeding::{RecordBirthCommand, RecordMatingCommand};
    use crate::domain::commands::sales::RecordSaleCommand;
    use crate::domain::models::breeding::LitterCounts;
    use crate::domain::models::pedigree::AncestorNode;
    use crate::domain::models::sale::SaleLine;
    use crate::error::HerdError;
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use shared::Sex;

    async fn setup_test() -> (ReportService<DbConnection>, DbConnection) {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        let animals = AnimalService::new(&db);
        animals.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        animals.create_animal(create_command("F012", Sex::Female)).await.unwrap();
        animals
            .create_animal(child_command("R-100", Sex::Female, Some("M005"), None))
            .await
            .unwrap();
        (ReportService::new(&db, &AppConfig::default()), db)
    }

    #[tokio::test]
    async fn test_certificate_includes_performance() {
        let (reports, db) = setup_test().await;
        let breeding = BreedingService::new(&db, 31);
        let mating = breeding
            .record_mating(RecordMatingCommand {
                sire_id: "M005".to_string(),
                dam_id: "F012".to_string(),
                mating_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                expected_birth_date: None,
                notes: None,
            })
            .await
            .unwrap();
        breeding
            .record_birth(RecordBirthCommand {
                mating_id: mating.id,
                birth_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                counts: LitterCounts { total_born: 8, stillborn: 1, survivors_24h: 6, survivors_48h: 6 },
                notes: None,
            })
            .await
            .unwrap();

        let certificate = reports.genealogy_certificate("F012", None).await.unwrap();
        assert_eq!(certificate.depth, 3);
        assert_eq!(certificate.performance.litters, 1);
        assert_eq!(certificate.pedigree.sire(), Some(&AncestorNode::Unknown));

        let text = reports.genealogy_certificate_text("F012", Some(1)).await.unwrap();
        assert!(text.starts_with("GENEALOGY CERTIFICATE"));
        assert!(text.contains("Pedigree (1 generations)"));
        assert!(text.contains("Litters: 1"));
        assert!(text.contains("Survival rate: 85,7 %"));
    }

    #[tokio::test]
    async fn test_certificate_errors() {
        let (reports, _) = setup_test().await;
        assert!(matches!(
            reports.genealogy_certificate("nobody", None).await,
            Err(HerdError::NotFound(_))
        ));
        assert!(matches!(
            reports.genealogy_certificate("R-100", Some(40)).await,
            Err(HerdError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_sale_receipt() {
        let (reports, db) = setup_test().await;
        let sale = SaleService::new(&db)
            .record_sale(RecordSaleCommand {
                buyer_name: "Ferme des Tilleuls".to_string(),
                buyer_contact: Some("06 12 34 56 78".to_string()),
                sale_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
                notes: None,
                lines: vec![SaleLine { animal_id: "R-100".to_string(), price: 45.0 }],
            })
            .await
            .unwrap();

        let receipt = reports.sale_receipt(&sale.id).await.unwrap();
        assert_eq!(receipt.total, 45.0);
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines[0].pedigree.sire().and_then(|s| s.animal_id()), Some("M005"));

        let text = reports.sale_receipt_text(&sale.id).await.unwrap();
        assert!(text.contains("Buyer: Ferme des Tilleuls"));
        assert!(text.contains("Contact: 06 12 34 56 78"));
        assert!(text.ends_with("Total: 45,00 €"));

        assert!(matches!(
            reports.sale_receipt("sale::missing").await,
            Err(HerdError::NotFound(_))
        ));
    }
}
