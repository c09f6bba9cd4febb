//! Sales ledger. Recording a sale marks every sold animal as `sold`.

use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::clean_text;
use crate::domain::commands::sales::RecordSaleCommand;
use crate::domain::models::sale::Sale;
use crate::error::{HerdError, Result};
use crate::storage::{AnimalStorage, Connection, SaleStorage};

#[derive(Clone)]
pub struct SaleService<C: Connection> {
    animals: C::AnimalRepository,
    sales: C::SaleRepository,
}

impl<C: Connection> SaleService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            animals: connection.create_animal_repository(),
            sales: connection.create_sale_repository(),
        }
    }

    pub async fn record_sale(&self, command: RecordSaleCommand) -> Result<Sale> {
        info!(
            "Recording sale to {} on {} ({} animals)",
            command.buyer_name,
            command.sale_date,
            command.lines.len()
        );

        let buyer_name = command.buyer_name.trim().to_string();
        if buyer_name.is_empty() {
            return Err(HerdError::validation("Buyer name cannot be empty"));
        }
        if command.lines.is_empty() {
            return Err(HerdError::validation("A sale needs at least one animal"));
        }

        let mut seen = HashSet::new();
        for line in &command.lines {
            if !seen.insert(line.animal_id.as_str()) {
                return Err(HerdError::validation(format!(
                    "Animal {} appears twice in the sale",
                    line.animal_id
                )));
            }
            if !line.price.is_finite() || line.price < 0.0 {
                return Err(HerdError::validation(format!(
                    "Price of {} must be a non-negative amount",
                    line.animal_id
                )));
            }

            let animal = self.animals.get_animal(&line.animal_id).await?.ok_or_else(|| {
                warn!("Sale references unknown animal {}", line.animal_id);
                HerdError::not_found(format!("Animal {}", line.animal_id))
            })?;
            if !animal.status.is_in_herd() {
                warn!("Rejected sale of {}: status {}", animal.id, animal.status);
                return Err(HerdError::integrity(format!(
                    "Animal {} is {} and cannot be sold",
                    animal.id, animal.status
                )));
            }
        }

        let now = Utc::now();
        let sale = Sale {
            id: Sale::generate_id(),
            buyer_name,
            buyer_contact: clean_text(command.buyer_contact),
            sale_date: command.sale_date,
            notes: clean_text(command.notes),
            lines: command.lines,
            created_at: now,
        };

        self.sales.record_sale(&sale, now).await?;

        info!("Recorded sale {} for a total of {:.2}", sale.id, sale.total());
        Ok(sale)
    }

    pub async fn get_sale(&self, sale_id: &str) -> Result<Sale> {
        info!("Getting sale: {}", sale_id);

        self.sales.get_sale(sale_id).await?.ok_or_else(|| {
            warn!("Sale not found: {}", sale_id);
            HerdError::not_found(format!("Sale {}", sale_id))
        })
    }

    /// Most recent first
    pub async fn list_sales(&self) -> Result<Vec<Sale>> {
        info!("Listing sales");
        let sales = self.sales.list_sales().await?;
        info!("Found {} sales", sales.len());
        Ok(sales)
    }
}
