//! # Storage Traits
//!
//! Storage abstractions the domain services are written against. Every
//! multi-row write that must not be observed half-done is a single trait
//! method so implementations can wrap it in one transaction.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::animal::{Animal, AnimalFilter};
use crate::domain::models::breeding::{BirthEvent, MatingEvent};
use crate::domain::models::sale::Sale;

/// Carried inside the `anyhow::Error` of an insert that hit a unique key
#[derive(Debug, thiserror::Error)]
#[error("{0} already exists")]
pub struct DuplicateKey(pub String);

/// Keyed animal records
#[async_trait]
pub trait AnimalStorage: Send + Sync {
    /// Insert a new animal. Fails with [`DuplicateKey`] if the identifier is taken.
    async fn store_animal(&self, animal: &Animal) -> Result<()>;

    async fn get_animal(&self, animal_id: &str) -> Result<Option<Animal>>;

    /// Animals naming `parent_id` as sire or dam, ordered by identifier
    async fn list_offspring(&self, parent_id: &str) -> Result<Vec<Animal>>;

    /// List animals matching the filter, ordered by identifier
    async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>>;

    async fn update_animal(&self, animal: &Animal) -> Result<()>;

    /// Number of animals naming this one as sire or dam
    async fn count_offspring(&self, animal_id: &str) -> Result<u32>;

    /// Returns true if the animal existed
    async fn delete_animal(&self, animal_id: &str) -> Result<bool>;

    /// Clear every sire/dam reference to the animal, then delete it, atomically.
    /// Returns the number of offspring that were detached.
    async fn delete_animal_detaching_offspring(&self, animal_id: &str) -> Result<u32>;
}

/// Mating and birth events
#[async_trait]
pub trait BreedingStorage: Send + Sync {
    async fn store_mating(&self, mating: &MatingEvent) -> Result<()>;

    async fn get_mating(&self, mating_id: &str) -> Result<Option<MatingEvent>>;

    /// Matings ordered by mating date, optionally only those involving `animal_id`
    async fn list_matings(&self, animal_id: Option<&str>) -> Result<Vec<MatingEvent>>;

    async fn update_mating(&self, mating: &MatingEvent) -> Result<()>;

    /// Returns true if the mating existed
    async fn delete_mating(&self, mating_id: &str) -> Result<bool>;

    /// Insert the birth and write the updated mating in one transaction.
    /// Fails with [`DuplicateKey`] if the mating already has a birth.
    async fn record_birth(&self, birth: &BirthEvent, mating: &MatingEvent) -> Result<()>;

    async fn get_birth(&self, birth_id: &str) -> Result<Option<BirthEvent>>;

    async fn get_birth_for_mating(&self, mating_id: &str) -> Result<Option<BirthEvent>>;

    /// Births ordered by birth date, optionally only those of matings involving `animal_id`
    async fn list_births(&self, animal_id: Option<&str>) -> Result<Vec<BirthEvent>>;

    async fn update_weaned(&self, birth_id: &str, weaned: u32) -> Result<()>;
}

/// Sale records
#[async_trait]
pub trait SaleStorage: Send + Sync {
    /// Insert the sale with its lines and mark every sold animal as `sold`,
    /// in one transaction
    async fn record_sale(&self, sale: &Sale, sold_at: DateTime<Utc>) -> Result<()>;

    async fn get_sale(&self, sale_id: &str) -> Result<Option<Sale>>;

    /// Sales ordered by sale date, most recent first
    async fn list_sales(&self) -> Result<Vec<Sale>>;

    /// Number of sale lines naming the animal
    async fn count_sale_lines(&self, animal_id: &str) -> Result<u32>;
}

/// Factory for the repositories of one storage backend.
///
/// Services are generic over the connection so the domain layer never names
/// a concrete backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type AnimalRepository: AnimalStorage + Clone + 'static;
    type BreedingRepository: BreedingStorage + Clone + 'static;
    type SaleRepository: SaleStorage + Clone + 'static;

    fn create_animal_repository(&self) -> Self::AnimalRepository;
    fn create_breeding_repository(&self) -> Self::BreedingRepository;
    fn create_sale_repository(&self) -> Self::SaleRepository;
}
