//! # Domain Module
//!
//! Business rules of the rabbitry: the animal registry, the breeding event
//! log, the ancestor resolver, the sales ledger and the documents built on
//! top of them.
//!
//! Services are generic over [`crate::storage::Connection`] and never talk to
//! SQLite directly.

pub mod animal_service;
pub mod breeding_service;
pub mod commands;
pub mod document_format;
pub mod models;
pub mod pedigree_service;
pub mod report_service;
pub mod sale_service;

pub use animal_service::AnimalService;
pub use breeding_service::BreedingService;
pub use document_format::DocumentFormatter;
pub use pedigree_service::PedigreeService;
pub use report_service::ReportService;
pub use sale_service::SaleService;

/// Trim free text and turn blanks into `None`
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
