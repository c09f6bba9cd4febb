//! # Storage Module
//!
//! Persistence for the registry, the breeding event log and the sales ledger.
//! The domain layer only sees the traits in [`traits`]; the SQLite
//! implementation lives in [`connection`] and [`repositories`].

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::{AnimalRepository, BreedingRepository, SaleRepository};
pub use traits::{AnimalStorage, BreedingStorage, Connection, DuplicateKey, SaleStorage};
