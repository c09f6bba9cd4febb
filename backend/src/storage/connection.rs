use anyhow::{Context, Result};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::info;

use super::repositories::{AnimalRepository, BreedingRepository, SaleRepository};
use super::traits::Connection;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url)
                .await
                .with_context(|| format!("Failed to create database {}", url))?;
        }

        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Fresh in-memory database with a unique name, used by tests
    pub async fn init_in_memory() -> Result<Self> {
        let db_id = uuid::Uuid::new_v4().simple().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", db_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Parent columns are deliberately not foreign keys: a parent may be
        // an animal that was never registered.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS animals (
                id TEXT PRIMARY KEY,
                name TEXT,
                sex TEXT NOT NULL,
                breed TEXT NOT NULL,
                color TEXT,
                birth_date TEXT,
                weight_kg REAL,
                health_status TEXT NOT NULL,
                status TEXT NOT NULL,
                enclosure_id TEXT,
                sire_id TEXT,
                dam_id TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_animals_sire_id ON animals(sire_id);")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_animals_dam_id ON animals(dam_id);")
            .execute(pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mating_events (
                id TEXT PRIMARY KEY,
                sire_id TEXT NOT NULL,
                dam_id TEXT NOT NULL,
                mating_date TEXT NOT NULL,
                expected_birth_date TEXT NOT NULL,
                outcome TEXT NOT NULL DEFAULT 'unset',
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_mating_events_parents
            ON mating_events(sire_id, dam_id);
            "#,
        )
        .execute(pool)
        .await?;

        // One birth per mating
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS birth_events (
                id TEXT PRIMARY KEY,
                mating_id TEXT NOT NULL UNIQUE,
                birth_date TEXT NOT NULL,
                total_born INTEGER NOT NULL,
                stillborn INTEGER NOT NULL,
                survivors_24h INTEGER NOT NULL,
                survivors_48h INTEGER NOT NULL,
                weaned INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (mating_id) REFERENCES mating_events (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sales (
                id TEXT PRIMARY KEY,
                buyer_name TEXT NOT NULL,
                buyer_contact TEXT,
                sale_date TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sale_lines (
                sale_id TEXT NOT NULL,
                animal_id TEXT NOT NULL,
                price REAL NOT NULL,
                PRIMARY KEY (sale_id, animal_id),
                FOREIGN KEY (sale_id) REFERENCES sales (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sale_lines_animal_id ON sale_lines(animal_id);")
            .execute(pool)
            .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type AnimalRepository = AnimalRepository;
    type BreedingRepository = BreedingRepository;
    type SaleRepository = SaleRepository;

    fn create_animal_repository(&self) -> Self::AnimalRepository {
        AnimalRepository::new(self.clone())
    }

    fn create_breeding_repository(&self) -> Self::BreedingRepository {
        BreedingRepository::new(self.clone())
    }

    fn create_sale_repository(&self) -> Self::SaleRepository {
        SaleRepository::new(self.clone())
    }
}
