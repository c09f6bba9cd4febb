use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{AnimalStatus, HealthStatus, Sex};

/// Domain model of an animal in the registry.
///
/// `sire_id` and `dam_id` are weak references: they name other registry
/// entries by identifier and may point at animals that were never registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: Option<String>,
    pub sex: Sex,
    pub breed: String,
    pub color: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub health_status: HealthStatus,
    pub status: AnimalStatus,
    pub enclosure_id: Option<String>,
    pub sire_id: Option<String>,
    pub dam_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Animal {
    pub const MAX_ID_LEN: usize = 64;

    /// Identifiers are ear tags: non-empty, bounded, no whitespace
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty() && id.len() <= Self::MAX_ID_LEN && !id.chars().any(char::is_whitespace)
    }

    /// Parent identifier for the given parent sex
    pub fn parent_id(&self, parent: Sex) -> Option<&str> {
        match parent {
            Sex::Male => self.sire_id.as_deref(),
            Sex::Female => self.dam_id.as_deref(),
        }
    }
}

/// Filter for registry listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalFilter {
    pub sex: Option<Sex>,
    pub status: Option<AnimalStatus>,
    pub breed: Option<String>,
    pub enclosure_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_validation() {
        assert!(Animal::is_valid_id("M005"));
        assert!(Animal::is_valid_id("R-100"));
        assert!(!Animal::is_valid_id(""));
        assert!(!Animal::is_valid_id("M 005"));
        assert!(!Animal::is_valid_id(&"x".repeat(65)));
    }
}
