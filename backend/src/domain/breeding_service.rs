//! Breeding event log: matings, kindlings, weaning and per-animal performance.

use chrono::{Days, Utc};
use shared::{MatingOutcome, Sex};
use tracing::{info, warn};

use crate::domain::clean_text;
use crate::domain::commands::breeding::{
    RecordBirthCommand, RecordMatingCommand, RecordWeaningCommand, UpdateMatingOutcomeCommand,
};
use crate::domain::models::animal::Animal;
use crate::domain::models::breeding::{BirthEvent, BreedingPerformance, MatingEvent};
use crate::error::{HerdError, Result};
use crate::storage::{AnimalStorage, BreedingStorage, Connection};

#[derive(Clone)]
pub struct BreedingService<C: Connection> {
    animals: C::AnimalRepository,
    breeding: C::BreedingRepository,
    gestation_days: u32,
}

impl<C: Connection> BreedingService<C> {
    pub fn new(connection: &C, gestation_days: u32) -> Self {
        Self {
            animals: connection.create_animal_repository(),
            breeding: connection.create_breeding_repository(),
            gestation_days,
        }
    }

    /// Log a pairing. The outcome starts unset.
    pub async fn record_mating(&self, command: RecordMatingCommand) -> Result<MatingEvent> {
        info!(
            "Recording mating: sire={}, dam={}, date={}",
            command.sire_id, command.dam_id, command.mating_date
        );

        if command.sire_id == command.dam_id {
            return Err(HerdError::validation("Sire and dam must be different animals"));
        }

        let sire = self.breeding_animal(&command.sire_id, Sex::Male).await?;
        let dam = self.breeding_animal(&command.dam_id, Sex::Female).await?;

        let expected_birth_date = match command.expected_birth_date {
            Some(date) => date,
            None => command
                .mating_date
                .checked_add_days(Days::new(u64::from(self.gestation_days)))
                .ok_or_else(|| {
                    HerdError::validation(format!(
                        "Mating date {} is out of range",
                        command.mating_date
                    ))
                })?,
        };
        if expected_birth_date <= command.mating_date {
            return Err(HerdError::validation(
                "Expected birth date must be after the mating date",
            ));
        }

        let now = Utc::now();
        let mating = MatingEvent {
            id: MatingEvent::generate_id(),
            sire_id: sire.id,
            dam_id: dam.id,
            mating_date: command.mating_date,
            expected_birth_date,
            outcome: MatingOutcome::Unset,
            notes: clean_text(command.notes),
            created_at: now,
            updated_at: now,
        };

        self.breeding.store_mating(&mating).await?;

        info!("Recorded mating {} (expected birth {})", mating.id, mating.expected_birth_date);
        Ok(mating)
    }

    pub async fn get_mating(&self, mating_id: &str) -> Result<MatingEvent> {
        info!("Getting mating: {}", mating_id);

        self.breeding.get_mating(mating_id).await?.ok_or_else(|| {
            warn!("Mating not found: {}", mating_id);
            HerdError::not_found(format!("Mating event {}", mating_id))
        })
    }

    /// Matings ordered by date, optionally only those involving one animal
    pub async fn list_matings(&self, animal_id: Option<&str>) -> Result<Vec<MatingEvent>> {
        info!("Listing matings for {:?}", animal_id);
        let matings = self.breeding.list_matings(animal_id).await?;
        info!("Found {} matings", matings.len());
        Ok(matings)
    }

    pub async fn update_mating_outcome(&self, command: UpdateMatingOutcomeCommand) -> Result<MatingEvent> {
        info!("Updating outcome of {} to {}", command.mating_id, command.outcome);

        let mut mating = self.get_mating(&command.mating_id).await?;

        if command.outcome != MatingOutcome::Success
            && self.breeding.get_birth_for_mating(&mating.id).await?.is_some()
        {
            warn!("Rejected outcome {} for {}: birth recorded", command.outcome, mating.id);
            return Err(HerdError::integrity(format!(
                "Mating {} has a recorded birth, its outcome must stay success",
                mating.id
            )));
        }

        mating.outcome = command.outcome;
        if command.notes.is_some() {
            mating.notes = clean_text(command.notes);
        }
        mating.updated_at = Utc::now();

        self.breeding.update_mating(&mating).await?;
        Ok(mating)
    }

    pub async fn delete_mating(&self, mating_id: &str) -> Result<()> {
        info!("Deleting mating: {}", mating_id);

        let mating = self.get_mating(mating_id).await?;
        if let Some(birth) = self.breeding.get_birth_for_mating(&mating.id).await? {
            warn!("Refusing to delete {}: referenced by {}", mating.id, birth.id);
            return Err(HerdError::integrity(format!(
                "Mating {} is referenced by birth {}",
                mating.id, birth.id
            )));
        }

        self.breeding.delete_mating(&mating.id).await?;
        Ok(())
    }

    /// Record the kindling of a mating and mark the mating successful
    pub async fn record_birth(&self, command: RecordBirthCommand) -> Result<BirthEvent> {
        info!("Recording birth for mating {}: {:?}", command.mating_id, command.counts);

        let mut mating = self.get_mating(&command.mating_id).await?;

        if let Some(existing) = self.breeding.get_birth_for_mating(&mating.id).await? {
            warn!("Duplicate birth for {}: {} already recorded", mating.id, existing.id);
            return Err(HerdError::integrity(format!(
                "Mating {} already has birth {}",
                mating.id, existing.id
            )));
        }

        command
            .counts
            .validate()
            .map_err(|e| HerdError::validation(e.to_string()))?;

        if command.birth_date < mating.mating_date {
            return Err(HerdError::validation(format!(
                "Birth date {} is before the mating date {}",
                command.birth_date, mating.mating_date
            )));
        }

        let now = Utc::now();
        let birth = BirthEvent {
            id: BirthEvent::generate_id(),
            mating_id: mating.id.clone(),
            birth_date: command.birth_date,
            counts: command.counts,
            weaned: None,
            notes: clean_text(command.notes),
            created_at: now,
        };
        mating.outcome = MatingOutcome::Success;
        mating.updated_at = now;

        self.breeding.record_birth(&birth, &mating).await?;

        info!(
            "Recorded birth {}: {} born, {} alive at 48h",
            birth.id, birth.counts.total_born, birth.counts.survivors_48h
        );
        Ok(birth)
    }

    pub async fn record_weaning(&self, command: RecordWeaningCommand) -> Result<BirthEvent> {
        info!("Recording weaning for {}: {}", command.birth_id, command.weaned);

        let mut birth = self.get_birth(&command.birth_id).await?;
        birth
            .validate_weaned(command.weaned)
            .map_err(|e| HerdError::validation(e.to_string()))?;

        self.breeding.update_weaned(&birth.id, command.weaned).await?;
        birth.weaned = Some(command.weaned);
        Ok(birth)
    }

    pub async fn get_birth(&self, birth_id: &str) -> Result<BirthEvent> {
        info!("Getting birth: {}", birth_id);

        self.breeding.get_birth(birth_id).await?.ok_or_else(|| {
            warn!("Birth not found: {}", birth_id);
            HerdError::not_found(format!("Birth event {}", birth_id))
        })
    }

    pub async fn list_births(&self, animal_id: Option<&str>) -> Result<Vec<BirthEvent>> {
        info!("Listing births for {:?}", animal_id);
        let births = self.breeding.list_births(animal_id).await?;
        info!("Found {} births", births.len());
        Ok(births)
    }

    /// Aggregated results of every event where the animal is sire or dam
    pub async fn get_breeding_performance(&self, animal_id: &str) -> Result<BreedingPerformance> {
        info!("Computing breeding performance for {}", animal_id);

        if self.animals.get_animal(animal_id).await?.is_none() {
            warn!("Animal not found: {}", animal_id);
            return Err(HerdError::not_found(format!("Animal {}", animal_id)));
        }

        self.performance_for(animal_id).await
    }

    /// Aggregation without the registry lookup, for callers that already hold the animal
    pub(crate) async fn performance_for(&self, animal_id: &str) -> Result<BreedingPerformance> {
        let matings = self.breeding.list_matings(Some(animal_id)).await?;
        let births = self.breeding.list_births(Some(animal_id)).await?;
        Ok(BreedingPerformance::aggregate(animal_id, &matings, &births))
    }

    async fn breeding_animal(&self, animal_id: &str, expected: Sex) -> Result<Animal> {
        let role = match expected {
            Sex::Male => "Sire",
            Sex::Female => "Dam",
        };

        let animal = self.animals.get_animal(animal_id).await?.ok_or_else(|| {
            warn!("{} not found: {}", role, animal_id);
            HerdError::not_found(format!("{} {}", role, animal_id))
        })?;

        if animal.sex != expected {
            return Err(HerdError::validation(format!(
                "{} {} is {}, expected {}",
                role, animal.id, animal.sex, expected
            )));
        }
        if !animal.status.is_in_herd() {
            return Err(HerdError::validation(format!(
                "{} {} is {} and cannot be mated",
                role, animal.id, animal.status
            )));
        }
        Ok(animal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::animal_service::tests::create_command;
    use crate::domain::commands::animals::CreateAnimalCommand;
    use crate::domain::models::breeding::LitterCounts;
    use crate::domain::AnimalService;
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use shared::AnimalStatus;

    async fn setup_test() -> (BreedingService<DbConnection>, AnimalService<DbConnection>) {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        let animals = AnimalService::new(&db);
        animals.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        animals.create_animal(create_command("F012", Sex::Female)).await.unwrap();
        (BreedingService::new(&db, 31), animals)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mating_command(sire: &str, dam: &str) -> RecordMatingCommand {
        RecordMatingCommand {
            sire_id: sire.to_string(),
            dam_id: dam.to_string(),
            mating_date: date(2025, 3, 1),
            expected_birth_date: None,
            notes: None,
        }
    }

    fn birth_command(mating_id: &str, counts: LitterCounts) -> RecordBirthCommand {
        RecordBirthCommand {
            mating_id: mating_id.to_string(),
            birth_date: date(2025, 4, 1),
            counts,
            notes: None,
        }
    }

    const LITTER: LitterCounts = LitterCounts {
        total_born: 8,
        stillborn: 1,
        survivors_24h: 6,
        survivors_48h: 6,
    };

    #[tokio::test]
    async fn test_record_mating_defaults() {
        let (service, _) = setup_test().await;

        let mating = service
            .record_mating(mating_command("M005", "F012"))
            .await
            .expect("Failed to record mating");

        assert!(mating.id.starts_with("mating::"));
        assert_eq!(mating.outcome, MatingOutcome::Unset);
        assert_eq!(mating.expected_birth_date, date(2025, 4, 1));
        assert_eq!(service.get_mating(&mating.id).await.unwrap(), mating);
    }

    #[tokio::test]
    async fn test_record_mating_checks_pair() {
        let (service, animals) = setup_test().await;

        let swapped = service.record_mating(mating_command("F012", "M005")).await;
        assert!(matches!(swapped, Err(HerdError::Validation(_))));

        let same = service.record_mating(mating_command("M005", "M005")).await;
        assert!(matches!(same, Err(HerdError::Validation(_))));

        let missing = service.record_mating(mating_command("M404", "F012")).await;
        assert!(matches!(missing, Err(HerdError::NotFound(_))));

        animals
            .create_animal(CreateAnimalCommand {
                status: AnimalStatus::Sold,
                ..create_command("F099", Sex::Female)
            })
            .await
            .unwrap();
        let sold = service.record_mating(mating_command("M005", "F099")).await;
        assert!(matches!(sold, Err(HerdError::Validation(_))));

        let early = RecordMatingCommand {
            expected_birth_date: Some(date(2025, 2, 1)),
            ..mating_command("M005", "F012")
        };
        assert!(matches!(service.record_mating(early).await, Err(HerdError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mating_date_at_calendar_end() {
        let (service, _) = setup_test().await;

        let last_day = RecordMatingCommand {
            mating_date: NaiveDate::MAX,
            ..mating_command("M005", "F012")
        };
        let result = service.record_mating(last_day).await;
        assert!(matches!(result, Err(HerdError::Validation(_))));

        let explicit = RecordMatingCommand {
            mating_date: NaiveDate::MAX,
            expected_birth_date: Some(NaiveDate::MAX),
            ..mating_command("M005", "F012")
        };
        assert!(matches!(service.record_mating(explicit).await, Err(HerdError::Validation(_))));
        assert!(service.list_matings(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_breeding_performance_scenario() {
        let (service, _) = setup_test().await;

        let mating = service.record_mating(mating_command("M005", "F012")).await.unwrap();
        let birth = service
            .record_birth(birth_command(&mating.id, LITTER))
            .await
            .expect("Failed to record birth");

        let updated = service.get_mating(&mating.id).await.unwrap();
        assert_eq!(updated.outcome, MatingOutcome::Success);

        let perf = service.get_breeding_performance("F012").await.unwrap();
        assert_eq!(perf.litters, 1);
        assert_eq!(perf.total_born, 8);
        assert_eq!(perf.born_alive, 7);
        assert!(perf.weaned <= 6);
        assert_eq!(perf.fertility_rate, Some(1.0));

        service
            .record_weaning(RecordWeaningCommand { birth_id: birth.id.clone(), weaned: 5 })
            .await
            .unwrap();
        let perf = service.get_breeding_performance("F012").await.unwrap();
        assert_eq!(perf.weaned, 5);

        let sire_perf = service.get_breeding_performance("M005").await.unwrap();
        assert_eq!(sire_perf.litters, 1);
    }

    #[tokio::test]
    async fn test_record_birth_rejects_impossible_counts() {
        let (service, _) = setup_test().await;
        let mating = service.record_mating(mating_command("M005", "F012")).await.unwrap();

        let counts = LitterCounts { survivors_24h: 8, survivors_48h: 6, ..LITTER };
        let result = service.record_birth(birth_command(&mating.id, counts)).await;
        assert!(matches!(result, Err(HerdError::Validation(_))));

        let before_mating = RecordBirthCommand {
            birth_date: date(2025, 2, 27),
            ..birth_command(&mating.id, LITTER)
        };
        assert!(matches!(service.record_birth(before_mating).await, Err(HerdError::Validation(_))));

        let oversized = LitterCounts {
            total_born: 4_000_000_000,
            stillborn: 0,
            survivors_24h: 0,
            survivors_48h: 0,
        };
        let result = service.record_birth(birth_command(&mating.id, oversized)).await;
        assert!(matches!(result, Err(HerdError::Validation(_))));

        // Nothing was written
        assert!(service.list_births(None).await.unwrap().is_empty());
        assert_eq!(service.get_mating(&mating.id).await.unwrap().outcome, MatingOutcome::Unset);
    }

    #[tokio::test]
    async fn test_second_birth_is_integrity_error() {
        let (service, _) = setup_test().await;
        let mating = service.record_mating(mating_command("M005", "F012")).await.unwrap();
        service.record_birth(birth_command(&mating.id, LITTER)).await.unwrap();

        let result = service.record_birth(birth_command(&mating.id, LITTER)).await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));

        let missing = service.record_birth(birth_command("mating::nope", LITTER)).await;
        assert!(matches!(missing, Err(HerdError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_outcome_locked_after_birth() {
        let (service, _) = setup_test().await;
        let mating = service.record_mating(mating_command("M005", "F012")).await.unwrap();

        let failed = service
            .update_mating_outcome(UpdateMatingOutcomeCommand {
                mating_id: mating.id.clone(),
                outcome: MatingOutcome::Failure,
                notes: Some("palpated empty".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(failed.outcome, MatingOutcome::Failure);
        assert_eq!(failed.notes.as_deref(), Some("palpated empty"));

        service.record_birth(birth_command(&mating.id, LITTER)).await.unwrap();

        let result = service
            .update_mating_outcome(UpdateMatingOutcomeCommand {
                mating_id: mating.id.clone(),
                outcome: MatingOutcome::Unset,
                notes: None,
            })
            .await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));
    }

    #[tokio::test]
    async fn test_delete_mating() {
        let (service, _) = setup_test().await;
        let kept = service.record_mating(mating_command("M005", "F012")).await.unwrap();
        let dropped = service.record_mating(mating_command("M005", "F012")).await.unwrap();
        service.record_birth(birth_command(&kept.id, LITTER)).await.unwrap();

        let result = service.delete_mating(&kept.id).await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));

        service.delete_mating(&dropped.id).await.unwrap();
        assert!(matches!(service.get_mating(&dropped.id).await, Err(HerdError::NotFound(_))));
        assert_eq!(service.list_matings(Some("F012")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_weaning_bounded_by_survivors() {
        let (service, _) = setup_test().await;
        let mating = service.record_mating(mating_command("M005", "F012")).await.unwrap();
        let birth = service.record_birth(birth_command(&mating.id, LITTER)).await.unwrap();

        let result = service
            .record_weaning(RecordWeaningCommand { birth_id: birth.id.clone(), weaned: 7 })
            .await;
        assert!(matches!(result, Err(HerdError::Validation(_))));

        let weaned = service
            .record_weaning(RecordWeaningCommand { birth_id: birth.id.clone(), weaned: 6 })
            .await
            .unwrap();
        assert_eq!(weaned.weaned, Some(6));
        assert_eq!(service.get_birth(&birth.id).await.unwrap().weaned, Some(6));
    }

    #[tokio::test]
    async fn test_performance_of_unknown_animal() {
        let (service, _) = setup_test().await;
        let result = service.get_breeding_performance("X1").await;
        assert!(matches!(result, Err(HerdError::NotFound(_))));

        let idle = service.get_breeding_performance("M005").await.unwrap();
        assert_eq!(idle.matings, 0);
        assert_eq!(idle.survival_rate, None);
    }
}
