use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{
    decode_count, decode_date, decode_enum, decode_timestamp, encode_date, encode_timestamp,
    insert_error,
};
use crate::domain::models::breeding::{BirthEvent, LitterCounts, MatingEvent};
use crate::storage::connection::DbConnection;
use crate::storage::traits::BreedingStorage;

const MATING_COLUMNS: &str =
    "id, sire_id, dam_id, mating_date, expected_birth_date, outcome, notes, created_at, updated_at";

const BIRTH_COLUMNS: &str = "b.id AS id, b.mating_id AS mating_id, b.birth_date AS birth_date, \
     b.total_born AS total_born, b.stillborn AS stillborn, b.survivors_24h AS survivors_24h, \
     b.survivors_48h AS survivors_48h, b.weaned AS weaned, b.notes AS notes, \
     b.created_at AS created_at";

/// SQLite repository for the breeding event log
#[derive(Clone)]
pub struct BreedingRepository {
    db: DbConnection,
}

impl BreedingRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_mating(row: &SqliteRow) -> Result<MatingEvent> {
        let mating_date: String = row.try_get("mating_date")?;
        let expected_birth_date: String = row.try_get("expected_birth_date")?;
        let outcome: String = row.try_get("outcome")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(MatingEvent {
            id: row.try_get("id")?,
            sire_id: row.try_get("sire_id")?,
            dam_id: row.try_get("dam_id")?,
            mating_date: decode_date(&mating_date)?,
            expected_birth_date: decode_date(&expected_birth_date)?,
            outcome: decode_enum(&outcome)?,
            notes: row.try_get("notes")?,
            created_at: decode_timestamp(&created_at)?,
            updated_at: decode_timestamp(&updated_at)?,
        })
    }

    fn row_to_birth(row: &SqliteRow) -> Result<BirthEvent> {
        let birth_date: String = row.try_get("birth_date")?;
        let weaned: Option<i64> = row.try_get("weaned")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(BirthEvent {
            id: row.try_get("id")?,
            mating_id: row.try_get("mating_id")?,
            birth_date: decode_date(&birth_date)?,
            counts: LitterCounts {
                total_born: decode_count(row.try_get("total_born")?, "total_born")?,
                stillborn: decode_count(row.try_get("stillborn")?, "stillborn")?,
                survivors_24h: decode_count(row.try_get("survivors_24h")?, "survivors_24h")?,
                survivors_48h: decode_count(row.try_get("survivors_48h")?, "survivors_48h")?,
            },
            weaned: weaned.map(|w| decode_count(w, "weaned")).transpose()?,
            notes: row.try_get("notes")?,
            created_at: decode_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl BreedingStorage for BreedingRepository {
    async fn store_mating(&self, mating: &MatingEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mating_events (id, sire_id, dam_id, mating_date, expected_birth_date,
                                       outcome, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&mating.id)
        .bind(&mating.sire_id)
        .bind(&mating.dam_id)
        .bind(encode_date(&mating.mating_date))
        .bind(encode_date(&mating.expected_birth_date))
        .bind(mating.outcome.as_str())
        .bind(&mating.notes)
        .bind(encode_timestamp(&mating.created_at))
        .bind(encode_timestamp(&mating.updated_at))
        .execute(self.db.pool())
        .await
        .with_context(|| format!("Failed to insert mating {}", mating.id))?;
        Ok(())
    }

    async fn get_mating(&self, mating_id: &str) -> Result<Option<MatingEvent>> {
        let row = sqlx::query(&format!("SELECT {} FROM mating_events WHERE id = ?", MATING_COLUMNS))
            .bind(mating_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_mating).transpose()
    }

    async fn list_matings(&self, animal_id: Option<&str>) -> Result<Vec<MatingEvent>> {
        let rows = match animal_id {
            Some(animal_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM mating_events WHERE sire_id = ? OR dam_id = ? \
                     ORDER BY mating_date ASC, created_at ASC",
                    MATING_COLUMNS
                ))
                .bind(animal_id)
                .bind(animal_id)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM mating_events ORDER BY mating_date ASC, created_at ASC",
                    MATING_COLUMNS
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(Self::row_to_mating).collect()
    }

    async fn update_mating(&self, mating: &MatingEvent) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE mating_events
            SET expected_birth_date = ?, outcome = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(encode_date(&mating.expected_birth_date))
        .bind(mating.outcome.as_str())
        .bind(&mating.notes)
        .bind(encode_timestamp(&mating.updated_at))
        .bind(&mating.id)
        .execute(self.db.pool())
        .await
        .with_context(|| format!("Failed to update mating {}", mating.id))?;
        Ok(())
    }

    async fn delete_mating(&self, mating_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM mating_events WHERE id = ?")
            .bind(mating_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_birth(&self, birth: &BirthEvent, mating: &MatingEvent) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO birth_events (id, mating_id, birth_date, total_born, stillborn,
                                      survivors_24h, survivors_48h, weaned, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&birth.id)
        .bind(&birth.mating_id)
        .bind(encode_date(&birth.birth_date))
        .bind(i64::from(birth.counts.total_born))
        .bind(i64::from(birth.counts.stillborn))
        .bind(i64::from(birth.counts.survivors_24h))
        .bind(i64::from(birth.counts.survivors_48h))
        .bind(birth.weaned.map(i64::from))
        .bind(&birth.notes)
        .bind(encode_timestamp(&birth.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, format!("Birth for mating {}", birth.mating_id)))?;

        sqlx::query("UPDATE mating_events SET outcome = ?, notes = ?, updated_at = ? WHERE id = ?")
            .bind(mating.outcome.as_str())
            .bind(&mating.notes)
            .bind(encode_timestamp(&mating.updated_at))
            .bind(&mating.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_birth(&self, birth_id: &str) -> Result<Option<BirthEvent>> {
        let row = sqlx::query(&format!("SELECT {} FROM birth_events b WHERE b.id = ?", BIRTH_COLUMNS))
            .bind(birth_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_birth).transpose()
    }

    async fn get_birth_for_mating(&self, mating_id: &str) -> Result<Option<BirthEvent>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM birth_events b WHERE b.mating_id = ?",
            BIRTH_COLUMNS
        ))
        .bind(mating_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_birth).transpose()
    }

    async fn list_births(&self, animal_id: Option<&str>) -> Result<Vec<BirthEvent>> {
        let rows = match animal_id {
            Some(animal_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM birth_events b \
                     JOIN mating_events m ON m.id = b.mating_id \
                     WHERE m.sire_id = ? OR m.dam_id = ? \
                     ORDER BY b.birth_date ASC, b.created_at ASC",
                    BIRTH_COLUMNS
                ))
                .bind(animal_id)
                .bind(animal_id)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM birth_events b ORDER BY b.birth_date ASC, b.created_at ASC",
                    BIRTH_COLUMNS
                ))
                .fetch_all(self.db.pool())
                .await?
            }
        };

        rows.iter().map(Self::row_to_birth).collect()
    }

    async fn update_weaned(&self, birth_id: &str, weaned: u32) -> Result<()> {
        sqlx::query("UPDATE birth_events SET weaned = ? WHERE id = ?")
            .bind(i64::from(weaned))
            .bind(birth_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
