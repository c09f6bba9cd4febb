use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::collections::HashMap;

use super::{decode_date, decode_timestamp, encode_date, encode_timestamp};
use crate::domain::models::sale::{Sale, SaleLine};
use crate::storage::connection::DbConnection;
use crate::storage::traits::SaleStorage;

/// SQLite repository for sales and their lines
#[derive(Clone)]
pub struct SaleRepository {
    db: DbConnection,
}

impl SaleRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_sale(row: &SqliteRow, lines: Vec<SaleLine>) -> Result<Sale> {
        let sale_date: String = row.try_get("sale_date")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Sale {
            id: row.try_get("id")?,
            buyer_name: row.try_get("buyer_name")?,
            buyer_contact: row.try_get("buyer_contact")?,
            sale_date: decode_date(&sale_date)?,
            notes: row.try_get("notes")?,
            lines,
            created_at: decode_timestamp(&created_at)?,
        })
    }

    fn row_to_line(row: &SqliteRow) -> Result<SaleLine> {
        Ok(SaleLine {
            animal_id: row.try_get("animal_id")?,
            price: row.try_get("price")?,
        })
    }
}

#[async_trait]
impl SaleStorage for SaleRepository {
    async fn record_sale(&self, sale: &Sale, sold_at: DateTime<Utc>) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, buyer_name, buyer_contact, sale_date, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.buyer_name)
        .bind(&sale.buyer_contact)
        .bind(encode_date(&sale.sale_date))
        .bind(&sale.notes)
        .bind(encode_timestamp(&sale.created_at))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert sale {}", sale.id))?;

        for line in &sale.lines {
            sqlx::query("INSERT INTO sale_lines (sale_id, animal_id, price) VALUES (?, ?, ?)")
                .bind(&sale.id)
                .bind(&line.animal_id)
                .bind(line.price)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE animals SET status = 'sold', updated_at = ? WHERE id = ?")
                .bind(encode_timestamp(&sold_at))
                .bind(&line.animal_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_sale(&self, sale_id: &str) -> Result<Option<Sale>> {
        let row = sqlx::query(
            "SELECT id, buyer_name, buyer_contact, sale_date, notes, created_at FROM sales WHERE id = ?",
        )
        .bind(sale_id)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_rows = sqlx::query(
            "SELECT animal_id, price FROM sale_lines WHERE sale_id = ? ORDER BY animal_id ASC",
        )
        .bind(sale_id)
        .fetch_all(self.db.pool())
        .await?;
        let lines = line_rows.iter().map(Self::row_to_line).collect::<Result<Vec<_>>>()?;

        Self::row_to_sale(&row, lines).map(Some)
    }

    async fn list_sales(&self) -> Result<Vec<Sale>> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_name, buyer_contact, sale_date, notes, created_at
            FROM sales
            ORDER BY sale_date DESC, created_at DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let line_rows =
            sqlx::query("SELECT sale_id, animal_id, price FROM sale_lines ORDER BY animal_id ASC")
                .fetch_all(self.db.pool())
                .await?;

        let mut lines_by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
        for row in &line_rows {
            let sale_id: String = row.try_get("sale_id")?;
            lines_by_sale.entry(sale_id).or_default().push(Self::row_to_line(row)?);
        }

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let lines = lines_by_sale.remove(&id).unwrap_or_default();
                Self::row_to_sale(row, lines)
            })
            .collect()
    }

    async fn count_sale_lines(&self, animal_id: &str) -> Result<u32> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines WHERE animal_id = ?")
            .bind(animal_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::animal::Animal;
    use crate::storage::repositories::AnimalRepository;
    use crate::storage::traits::AnimalStorage;
    use chrono::NaiveDate;
    use shared::{AnimalStatus, HealthStatus, Sex};

    async fn setup_test() -> (SaleRepository, AnimalRepository) {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        (SaleRepository::new(db.clone()), AnimalRepository::new(db))
    }

    fn animal(id: &str) -> Animal {
        let now = Utc::now();
        Animal {
            id: id.to_string(),
            name: None,
            sex: Sex::Female,
            breed: "Californian".to_string(),
            color: None,
            birth_date: None,
            weight_kg: None,
            health_status: HealthStatus::Healthy,
            status: AnimalStatus::ForSale,
            enclosure_id: None,
            sire_id: None,
            dam_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_record_sale_marks_animals_sold() {
        let (sales, animals) = setup_test().await;
        animals.store_animal(&animal("F030")).await.unwrap();
        animals.store_animal(&animal("F031")).await.unwrap();

        let sale = Sale {
            id: Sale::generate_id(),
            buyer_name: "Ferme des Tilleuls".to_string(),
            buyer_contact: Some("06 12 34 56 78".to_string()),
            sale_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            notes: None,
            lines: vec![
                SaleLine { animal_id: "F030".to_string(), price: 45.0 },
                SaleLine { animal_id: "F031".to_string(), price: 40.5 },
            ],
            created_at: Utc::now(),
        };
        sales.record_sale(&sale, Utc::now()).await.expect("Failed to record sale");

        let stored = sales.get_sale(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored, sale);
        assert_eq!(stored.total(), 85.5);

        for id in ["F030", "F031"] {
            let a = animals.get_animal(id).await.unwrap().unwrap();
            assert_eq!(a.status, AnimalStatus::Sold);
            assert_eq!(sales.count_sale_lines(id).await.unwrap(), 1);
        }

        let listed = sales.list_sales().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].lines.len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_sale() {
        let (sales, _) = setup_test().await;
        assert!(sales.get_sale("sale::missing").await.unwrap().is_none());
    }
}
