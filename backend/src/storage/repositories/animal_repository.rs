use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;

use super::{decode_date, decode_enum, decode_timestamp, encode_date, encode_timestamp, insert_error};
use crate::domain::models::animal::{Animal, AnimalFilter};
use crate::storage::connection::DbConnection;
use crate::storage::traits::AnimalStorage;

const ANIMAL_COLUMNS: &str = "id, name, sex, breed, color, birth_date, weight_kg, health_status, \
     status, enclosure_id, sire_id, dam_id, notes, created_at, updated_at";

/// SQLite repository for animal records
#[derive(Clone)]
pub struct AnimalRepository {
    db: DbConnection,
}

impl AnimalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_animal(row: &SqliteRow) -> Result<Animal> {
        let birth_date: Option<String> = row.try_get("birth_date")?;
        let sex: String = row.try_get("sex")?;
        let health_status: String = row.try_get("health_status")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Animal {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            sex: decode_enum(&sex)?,
            breed: row.try_get("breed")?,
            color: row.try_get("color")?,
            birth_date: birth_date.as_deref().map(decode_date).transpose()?,
            weight_kg: row.try_get("weight_kg")?,
            health_status: decode_enum(&health_status)?,
            status: decode_enum(&status)?,
            enclosure_id: row.try_get("enclosure_id")?,
            sire_id: row.try_get("sire_id")?,
            dam_id: row.try_get("dam_id")?,
            notes: row.try_get("notes")?,
            created_at: decode_timestamp(&created_at)?,
            updated_at: decode_timestamp(&updated_at)?,
        })
    }
}

#[async_trait]
impl AnimalStorage for AnimalRepository {
    async fn store_animal(&self, animal: &Animal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO animals (id, name, sex, breed, color, birth_date, weight_kg, health_status,
                                 status, enclosure_id, sire_id, dam_id, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&animal.id)
        .bind(&animal.name)
        .bind(animal.sex.as_str())
        .bind(&animal.breed)
        .bind(&animal.color)
        .bind(animal.birth_date.as_ref().map(encode_date))
        .bind(animal.weight_kg)
        .bind(animal.health_status.as_str())
        .bind(animal.status.as_str())
        .bind(&animal.enclosure_id)
        .bind(&animal.sire_id)
        .bind(&animal.dam_id)
        .bind(&animal.notes)
        .bind(encode_timestamp(&animal.created_at))
        .bind(encode_timestamp(&animal.updated_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| insert_error(e, format!("Animal {}", animal.id)))?;
        Ok(())
    }

    async fn get_animal(&self, animal_id: &str) -> Result<Option<Animal>> {
        let row = sqlx::query(&format!("SELECT {} FROM animals WHERE id = ?", ANIMAL_COLUMNS))
            .bind(animal_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_animal).transpose()
    }

    async fn list_offspring(&self, parent_id: &str) -> Result<Vec<Animal>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM animals WHERE sire_id = ? OR dam_id = ? ORDER BY id ASC",
            ANIMAL_COLUMNS
        ))
        .bind(parent_id)
        .bind(parent_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_animal).collect()
    }

    async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM animals WHERE 1 = 1", ANIMAL_COLUMNS));

        if let Some(sex) = filter.sex {
            query.push(" AND sex = ").push_bind(sex.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(breed) = &filter.breed {
            query.push(" AND breed = ").push_bind(breed.clone());
        }
        if let Some(enclosure_id) = &filter.enclosure_id {
            query.push(" AND enclosure_id = ").push_bind(enclosure_id.clone());
        }
        query.push(" ORDER BY id ASC");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        debug!("Animal query returned {} rows", rows.len());

        rows.iter().map(Self::row_to_animal).collect()
    }

    async fn update_animal(&self, animal: &Animal) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE animals
            SET name = ?, sex = ?, breed = ?, color = ?, birth_date = ?, weight_kg = ?,
                health_status = ?, status = ?, enclosure_id = ?, sire_id = ?, dam_id = ?,
                notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&animal.name)
        .bind(animal.sex.as_str())
        .bind(&animal.breed)
        .bind(&animal.color)
        .bind(animal.birth_date.as_ref().map(encode_date))
        .bind(animal.weight_kg)
        .bind(animal.health_status.as_str())
        .bind(animal.status.as_str())
        .bind(&animal.enclosure_id)
        .bind(&animal.sire_id)
        .bind(&animal.dam_id)
        .bind(&animal.notes)
        .bind(encode_timestamp(&animal.updated_at))
        .bind(&animal.id)
        .execute(self.db.pool())
        .await
        .with_context(|| format!("Failed to update animal {}", animal.id))?;
        Ok(())
    }

    async fn count_offspring(&self, animal_id: &str) -> Result<u32> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM animals WHERE sire_id = ? OR dam_id = ?")
                .bind(animal_id)
                .bind(animal_id)
                .fetch_one(self.db.pool())
                .await?;
        Ok(count as u32)
    }

    async fn delete_animal(&self, animal_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM animals WHERE id = ?")
            .bind(animal_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_animal_detaching_offspring(&self, animal_id: &str) -> Result<u32> {
        let mut tx = self.db.pool().begin().await?;

        let sired = sqlx::query("UPDATE animals SET sire_id = NULL WHERE sire_id = ?")
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
        let mothered = sqlx::query("UPDATE animals SET dam_id = NULL WHERE dam_id = ?")
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM animals WHERE id = ?")
            .bind(animal_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .with_context(|| format!("Failed to delete animal {}", animal_id))?;

        Ok((sired.rows_affected() + mothered.rows_affected()) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::DuplicateKey;
    use chrono::{NaiveDate, Utc};
    use shared::{AnimalStatus, HealthStatus, Sex};

    async fn setup_test() -> AnimalRepository {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        AnimalRepository::new(db)
    }

    fn animal(id: &str, sex: Sex, sire: Option<&str>, dam: Option<&str>) -> Animal {
        let now = Utc::now();
        Animal {
            id: id.to_string(),
            name: None,
            sex,
            breed: "Fauve de Bourgogne".to_string(),
            color: None,
            birth_date: None,
            weight_kg: None,
            health_status: HealthStatus::Healthy,
            status: AnimalStatus::Breeding,
            enclosure_id: None,
            sire_id: sire.map(str::to_string),
            dam_id: dam.map(str::to_string),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_every_column() {
        let repo = setup_test().await;

        let mut stored = animal("F012", Sex::Female, Some("M001"), Some("F002"));
        stored.name = Some("Noisette".to_string());
        stored.color = Some("fawn".to_string());
        stored.birth_date = NaiveDate::from_ymd_opt(2024, 2, 29);
        stored.weight_kg = Some(4.35);
        stored.health_status = HealthStatus::Recovering;
        stored.status = AnimalStatus::ForSale;
        stored.enclosure_id = Some("hutch-3".to_string());
        stored.notes = Some("calm doe".to_string());

        repo.store_animal(&stored).await.expect("Failed to store animal");
        let fetched = repo
            .get_animal("F012")
            .await
            .expect("Failed to get animal")
            .expect("Animal should exist");

        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = setup_test().await;
        repo.store_animal(&animal("M005", Sex::Male, None, None)).await.unwrap();

        let result = repo.store_animal(&animal("M005", Sex::Female, None, None)).await;
        let err = result.expect_err("Duplicate id should fail");
        assert!(err.downcast_ref::<DuplicateKey>().is_some());

        let kept = repo.get_animal("M005").await.unwrap().unwrap();
        assert_eq!(kept.sex, Sex::Male);
    }

    #[tokio::test]
    async fn test_list_offspring() {
        let repo = setup_test().await;
        repo.store_animal(&animal("R-101", Sex::Male, Some("M005"), Some("F012"))).await.unwrap();
        repo.store_animal(&animal("R-100", Sex::Female, Some("M005"), None)).await.unwrap();
        repo.store_animal(&animal("R-200", Sex::Female, Some("M009"), None)).await.unwrap();

        let kits = repo.list_offspring("M005").await.unwrap();
        let ids: Vec<&str> = kits.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["R-100", "R-101"]);

        assert_eq!(repo.list_offspring("F012").await.unwrap().len(), 1);
        assert!(repo.list_offspring("X9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let repo = setup_test().await;
        repo.store_animal(&animal("M005", Sex::Male, None, None)).await.unwrap();
        repo.store_animal(&animal("F012", Sex::Female, None, None)).await.unwrap();
        let mut sold = animal("F020", Sex::Female, None, None);
        sold.status = AnimalStatus::Sold;
        repo.store_animal(&sold).await.unwrap();

        let all = repo.list_animals(&AnimalFilter::default()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["F012", "F020", "M005"]);

        let does = repo
            .list_animals(&AnimalFilter {
                sex: Some(Sex::Female),
                status: Some(AnimalStatus::Breeding),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(does.len(), 1);
        assert_eq!(does[0].id, "F012");
    }

    #[tokio::test]
    async fn test_detaching_delete_clears_references() {
        let repo = setup_test().await;
        repo.store_animal(&animal("M005", Sex::Male, None, None)).await.unwrap();
        repo.store_animal(&animal("R-100", Sex::Female, Some("M005"), None)).await.unwrap();
        repo.store_animal(&animal("R-101", Sex::Male, Some("M005"), Some("F012"))).await.unwrap();

        assert_eq!(repo.count_offspring("M005").await.unwrap(), 2);

        let detached = repo.delete_animal_detaching_offspring("M005").await.unwrap();
        assert_eq!(detached, 2);

        assert!(repo.get_animal("M005").await.unwrap().is_none());
        let kit = repo.get_animal("R-101").await.unwrap().unwrap();
        assert_eq!(kit.sire_id, None);
        assert_eq!(kit.dam_id.as_deref(), Some("F012"));
        assert_eq!(repo.count_offspring("M005").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_animal() {
        let repo = setup_test().await;
        assert!(!repo.delete_animal("nope").await.unwrap());
    }
}
