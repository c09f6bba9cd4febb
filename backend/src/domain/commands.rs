//! Domain-level command and query types.
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined in
//! the `shared` crate to these internal types.

pub mod animals {
    use chrono::NaiveDate;
    use shared::{AnimalStatus, DeletePolicy, HealthStatus, Sex};

    /// Input for registering a new animal.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateAnimalCommand {
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
    }

    /// Partial update. `Some(None)` clears a nullable field.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UpdateAnimalCommand {
        pub name: Option<Option<String>>,
        pub sex: Option<Sex>,
        pub breed: Option<String>,
        pub color: Option<Option<String>>,
        pub birth_date: Option<Option<NaiveDate>>,
        pub weight_kg: Option<Option<f64>>,
        pub health_status: Option<HealthStatus>,
        pub status: Option<AnimalStatus>,
        pub enclosure_id: Option<Option<String>>,
        pub sire_id: Option<Option<String>>,
        pub dam_id: Option<Option<String>>,
        pub notes: Option<Option<String>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteAnimalCommand {
        pub animal_id: String,
        pub policy: DeletePolicy,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteAnimalResult {
        pub animal_id: String,
        pub detached_offspring: u32,
    }
}

pub mod breeding {
    use chrono::NaiveDate;
    use shared::MatingOutcome;

    use crate::domain::models::breeding::LitterCounts;

    /// Input for logging a pairing.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordMatingCommand {
        pub sire_id: String,
        pub dam_id: String,
        pub mating_date: NaiveDate,
        pub expected_birth_date: Option<NaiveDate>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct UpdateMatingOutcomeCommand {
        pub mating_id: String,
        pub outcome: MatingOutcome,
        /// Replaces the notes when provided
        pub notes: Option<String>,
    }

    /// Input for recording a kindling.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordBirthCommand {
        pub mating_id: String,
        pub birth_date: NaiveDate,
        pub counts: LitterCounts,
        pub notes: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordWeaningCommand {
        pub birth_id: String,
        pub weaned: u32,
    }
}

pub mod sales {
    use chrono::NaiveDate;

    use crate::domain::models::sale::SaleLine;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordSaleCommand {
        pub buyer_name: String,
        pub buyer_contact: Option<String>,
        pub sale_date: NaiveDate,
        pub notes: Option<String>,
        pub lines: Vec<SaleLine>,
    }
}
