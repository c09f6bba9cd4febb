// Repository modules
pub mod animal_repository;
pub mod breeding_repository;
pub mod sale_repository;

pub use animal_repository::AnimalRepository;
pub use breeding_repository::BreedingRepository;
pub use sale_repository::SaleRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::storage::traits::DuplicateKey;

/// Map an insert failure, keeping unique-key violations recognizable
fn insert_error(err: sqlx::Error, what: String) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DuplicateKey(what).into(),
        _ => anyhow::Error::new(err).context(format!("Failed to insert {}", what)),
    }
}

// Column encodings shared by the repositories: ISO dates, RFC 3339 timestamps.

const DATE_FORMAT: &str = "%Y-%m-%d";

fn encode_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("Invalid date in database: {}", value))
}

fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn decode_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in database: {}", value))
}

fn decode_count(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).with_context(|| format!("Invalid {} in database: {}", column, value))
}

fn decode_enum<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T> {
    value.parse::<T>().map_err(anyhow::Error::msg)
}
