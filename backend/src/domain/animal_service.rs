//! Animal registry: registration, lookup, updates and referentially safe deletion.

use chrono::Utc;
use shared::{DeletePolicy, Sex};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::clean_text;
use crate::domain::commands::animals::{
    CreateAnimalCommand, DeleteAnimalCommand, DeleteAnimalResult, UpdateAnimalCommand,
};
use crate::domain::models::animal::{Animal, AnimalFilter};
use crate::error::{HerdError, Result};
use crate::storage::{AnimalStorage, BreedingStorage, Connection, SaleStorage};

const MAX_TEXT_LEN: usize = 200;

/// Service for managing the animal registry
#[derive(Clone)]
pub struct AnimalService<C: Connection> {
    animals: C::AnimalRepository,
    breeding: C::BreedingRepository,
    sales: C::SaleRepository,
}

impl<C: Connection> AnimalService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            animals: connection.create_animal_repository(),
            breeding: connection.create_breeding_repository(),
            sales: connection.create_sale_repository(),
        }
    }

    /// Register a new animal
    pub async fn create_animal(&self, command: CreateAnimalCommand) -> Result<Animal> {
        info!("Creating animal: id={}, sex={}, breed={}", command.id, command.sex, command.breed);

        let id = command.id.trim().to_string();
        if !Animal::is_valid_id(&id) {
            return Err(HerdError::validation(format!(
                "Animal identifier must be 1-{} characters without whitespace",
                Animal::MAX_ID_LEN
            )));
        }

        if self.animals.get_animal(&id).await?.is_some() {
            warn!("Rejected duplicate animal id: {}", id);
            return Err(HerdError::integrity(format!("Animal {} already exists", id)));
        }

        let now = Utc::now();
        let animal = Animal {
            id,
            name: clean_text(command.name),
            sex: command.sex,
            breed: command.breed.trim().to_string(),
            color: clean_text(command.color),
            birth_date: command.birth_date,
            weight_kg: command.weight_kg,
            health_status: command.health_status,
            status: command.status,
            enclosure_id: clean_text(command.enclosure_id),
            sire_id: clean_text(command.sire_id),
            dam_id: clean_text(command.dam_id),
            notes: clean_text(command.notes),
            created_at: now,
            updated_at: now,
        };

        self.validate_attributes(&animal)?;
        self.validate_parents(&animal.id, animal.sire_id.as_deref(), animal.dam_id.as_deref())
            .await?;
        check_distinct_parents(&animal)?;
        self.check_recorded_offspring(&animal).await?;

        self.animals.store_animal(&animal).await?;

        info!("Registered animal {}", animal.id);
        Ok(animal)
    }

    /// Get an animal by identifier
    pub async fn get_animal(&self, animal_id: &str) -> Result<Animal> {
        info!("Getting animal: {}", animal_id);

        match self.animals.get_animal(animal_id).await? {
            Some(animal) => Ok(animal),
            None => {
                warn!("Animal not found: {}", animal_id);
                Err(HerdError::not_found(format!("Animal {}", animal_id)))
            }
        }
    }

    /// List animals matching the filter, ordered by identifier
    pub async fn list_animals(&self, filter: AnimalFilter) -> Result<Vec<Animal>> {
        info!("Listing animals with filter: {:?}", filter);

        let animals = self.animals.list_animals(&filter).await?;

        info!("Found {} animals", animals.len());
        Ok(animals)
    }

    /// Apply a partial update
    pub async fn update_animal(&self, animal_id: &str, command: UpdateAnimalCommand) -> Result<Animal> {
        info!("Updating animal: {}", animal_id);

        let mut animal = self.get_animal(animal_id).await?;

        if let Some(sex) = command.sex {
            if sex != animal.sex {
                self.check_sex_change_allowed(&animal).await?;
                animal.sex = sex;
            }
        }
        if let Some(breed) = command.breed {
            animal.breed = breed.trim().to_string();
        }
        if let Some(name) = command.name {
            animal.name = clean_text(name);
        }
        if let Some(color) = command.color {
            animal.color = clean_text(color);
        }
        if let Some(birth_date) = command.birth_date {
            animal.birth_date = birth_date;
        }
        if let Some(weight_kg) = command.weight_kg {
            animal.weight_kg = weight_kg;
        }
        if let Some(health_status) = command.health_status {
            animal.health_status = health_status;
        }
        if let Some(status) = command.status {
            animal.status = status;
        }
        if let Some(enclosure_id) = command.enclosure_id {
            animal.enclosure_id = clean_text(enclosure_id);
        }
        if let Some(notes) = command.notes {
            animal.notes = clean_text(notes);
        }

        // Only newly assigned parents are checked, so legacy records stay editable
        let new_sire = command.sire_id.map(clean_text);
        let new_dam = command.dam_id.map(clean_text);
        self.validate_parents(
            &animal.id,
            new_sire.as_ref().and_then(|s| s.as_deref()),
            new_dam.as_ref().and_then(|d| d.as_deref()),
        )
        .await?;
        if let Some(sire_id) = new_sire {
            animal.sire_id = sire_id;
        }
        if let Some(dam_id) = new_dam {
            animal.dam_id = dam_id;
        }

        self.validate_attributes(&animal)?;
        check_distinct_parents(&animal)?;

        animal.updated_at = Utc::now();
        self.animals.update_animal(&animal).await?;

        info!("Updated animal {}", animal.id);
        Ok(animal)
    }

    /// Delete an animal. Animals referenced by breeding events or sales are
    /// never deleted; offspring references are handled according to the policy.
    pub async fn delete_animal(&self, command: DeleteAnimalCommand) -> Result<DeleteAnimalResult> {
        info!("Deleting animal: {} (policy {:?})", command.animal_id, command.policy);

        let animal = self.get_animal(&command.animal_id).await?;

        let matings = self.breeding.list_matings(Some(&animal.id)).await?;
        if !matings.is_empty() {
            warn!("Refusing to delete {}: {} mating events", animal.id, matings.len());
            return Err(HerdError::integrity(format!(
                "Animal {} is referenced by {} mating events",
                animal.id,
                matings.len()
            )));
        }

        let sale_lines = self.sales.count_sale_lines(&animal.id).await?;
        if sale_lines > 0 {
            warn!("Refusing to delete {}: referenced by sales", animal.id);
            return Err(HerdError::integrity(format!(
                "Animal {} is referenced by {} sales",
                animal.id, sale_lines
            )));
        }

        let offspring = self.animals.count_offspring(&animal.id).await?;
        let detached_offspring = match (offspring, command.policy) {
            (0, _) => {
                self.animals.delete_animal(&animal.id).await?;
                0
            }
            (_, DeletePolicy::Reject) => {
                warn!("Refusing to delete {}: parent of {} animals", animal.id, offspring);
                return Err(HerdError::integrity(format!(
                    "Animal {} is recorded as sire or dam of {} animals",
                    animal.id, offspring
                )));
            }
            (_, DeletePolicy::DetachOffspring) => {
                let detached = self.animals.delete_animal_detaching_offspring(&animal.id).await?;
                warn!("Deleted {} and cleared {} parent references", animal.id, detached);
                detached
            }
        };

        info!("Deleted animal {}", animal.id);
        Ok(DeleteAnimalResult {
            animal_id: animal.id,
            detached_offspring,
        })
    }

    fn validate_attributes(&self, animal: &Animal) -> Result<()> {
        if animal.breed.is_empty() {
            return Err(HerdError::validation("Breed cannot be empty"));
        }
        if animal.breed.len() > MAX_TEXT_LEN {
            return Err(HerdError::validation("Breed is too long"));
        }
        if let Some(weight) = animal.weight_kg {
            if !weight.is_finite() || weight < 0.0 {
                return Err(HerdError::validation("Weight must be a non-negative number"));
            }
        }
        if let Some(birth_date) = animal.birth_date {
            if birth_date > Utc::now().date_naive() {
                return Err(HerdError::validation("Birth date cannot be in the future"));
            }
        }
        Ok(())
    }

    async fn validate_parents(
        &self,
        animal_id: &str,
        sire_id: Option<&str>,
        dam_id: Option<&str>,
    ) -> Result<()> {
        for (parent_id, expected_sex) in [(sire_id, Sex::Male), (dam_id, Sex::Female)] {
            let Some(parent_id) = parent_id else {
                continue;
            };
            let role = parent_role(expected_sex);

            if !Animal::is_valid_id(parent_id) {
                return Err(HerdError::validation(format!("Invalid {} identifier", role)));
            }
            if parent_id == animal_id {
                return Err(HerdError::validation(format!(
                    "Animal {} cannot be its own {}",
                    animal_id, role
                )));
            }

            // Unregistered parents are allowed and resolved lazily
            if let Some(parent) = self.animals.get_animal(parent_id).await? {
                if parent.sex != expected_sex {
                    return Err(HerdError::validation(format!(
                        "{} {} is recorded as {}, a {} must be {}",
                        capitalize(role),
                        parent.id,
                        parent.sex,
                        role,
                        expected_sex
                    )));
                }
            }

            if self.is_ancestor(animal_id, parent_id).await? {
                warn!("Rejected parent {} for {}: would create a cycle", parent_id, animal_id);
                return Err(HerdError::integrity(format!(
                    "Recording {} as {} of {} would make {} its own ancestor",
                    parent_id, role, animal_id, animal_id
                )));
            }
        }
        Ok(())
    }

    /// True if `animal_id` appears among `start_id` and its recorded ancestors
    async fn is_ancestor(&self, animal_id: &str, start_id: &str) -> Result<bool> {
        let mut pending = vec![start_id.to_string()];
        let mut seen = HashSet::new();

        while let Some(current) = pending.pop() {
            if current == animal_id {
                return Ok(true);
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(ancestor) = self.animals.get_animal(&current).await? {
                pending.extend(ancestor.sire_id);
                pending.extend(ancestor.dam_id);
            }
        }
        Ok(false)
    }

    /// Animals may already name this id as a parent before it is registered.
    /// The new record must have the sex those references imply.
    async fn check_recorded_offspring(&self, animal: &Animal) -> Result<()> {
        let opposite_role = match animal.sex {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        };

        let offspring = self.animals.list_offspring(&animal.id).await?;
        if let Some(kit) = offspring
            .iter()
            .find(|kit| kit.parent_id(opposite_role) == Some(animal.id.as_str()))
        {
            warn!(
                "Rejected {} as {}: recorded as {} of {}",
                animal.id,
                animal.sex,
                parent_role(opposite_role),
                kit.id
            );
            return Err(HerdError::integrity(format!(
                "{} is recorded as {} of {}, it cannot be registered as {}",
                animal.id,
                parent_role(opposite_role),
                kit.id,
                animal.sex
            )));
        }
        Ok(())
    }

    async fn check_sex_change_allowed(&self, animal: &Animal) -> Result<()> {
        let offspring = self.animals.count_offspring(&animal.id).await?;
        let matings = self.breeding.list_matings(Some(&animal.id)).await?;
        if offspring > 0 || !matings.is_empty() {
            return Err(HerdError::integrity(format!(
                "Cannot change the sex of {}: it has offspring or mating records",
                animal.id
            )));
        }
        Ok(())
    }
}

fn check_distinct_parents(animal: &Animal) -> Result<()> {
    if let (Some(sire), Some(dam)) = (&animal.sire_id, &animal.dam_id) {
        if sire == dam {
            return Err(HerdError::validation("Sire and dam must be different animals"));
        }
    }
    Ok(())
}

fn parent_role(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "sire",
        Sex::Female => "dam",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use shared::{AnimalStatus, HealthStatus};

    pub(crate) fn create_command(id: &str, sex: Sex) -> CreateAnimalCommand {
        CreateAnimalCommand {
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
            sire_id: None,
            dam_id: None,
            notes: None,
        }
    }

    pub(crate) fn child_command(id: &str, sex: Sex, sire: Option<&str>, dam: Option<&str>) -> CreateAnimalCommand {
        CreateAnimalCommand {
            sire_id: sire.map(str::to_string),
            dam_id: dam.map(str::to_string),
            ..create_command(id, sex)
        }
    }

    async fn setup_test() -> (AnimalService<DbConnection>, DbConnection) {
        let db = DbConnection::init_in_memory()
            .await
            .expect("Failed to create test database");
        (AnimalService::new(&db), db)
    }

    #[tokio::test]
    async fn test_create_then_get_is_lossless() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();

        let command = CreateAnimalCommand {
            id: "R-100".to_string(),
            name: Some("Noisette".to_string()),
            sex: Sex::Female,
            breed: "Rex".to_string(),
            color: Some("castor".to_string()),
            birth_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            weight_kg: Some(3.2),
            health_status: HealthStatus::Healthy,
            status: AnimalStatus::Fattening,
            enclosure_id: Some("B-2".to_string()),
            sire_id: Some("M005".to_string()),
            dam_id: None,
            notes: Some("from litter 4".to_string()),
        };
        let created = service.create_animal(command).await.expect("Failed to create animal");
        let fetched = service.get_animal("R-100").await.expect("Failed to get animal");

        assert_eq!(fetched, created);
        assert_eq!(fetched.name.as_deref(), Some("Noisette"));
        assert_eq!(fetched.sire_id.as_deref(), Some("M005"));
        assert_eq!(fetched.dam_id, None);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, _) = setup_test().await;

        let bad_id = create_command("M 005", Sex::Male);
        assert!(matches!(service.create_animal(bad_id).await, Err(HerdError::Validation(_))));

        let no_breed = CreateAnimalCommand { breed: "  ".to_string(), ..create_command("M001", Sex::Male) };
        assert!(matches!(service.create_animal(no_breed).await, Err(HerdError::Validation(_))));

        let negative = CreateAnimalCommand { weight_kg: Some(-1.0), ..create_command("M002", Sex::Male) };
        assert!(matches!(service.create_animal(negative).await, Err(HerdError::Validation(_))));

        let future = CreateAnimalCommand {
            birth_date: Some(Utc::now().date_naive() + chrono::Duration::days(3)),
            ..create_command("M003", Sex::Male)
        };
        assert!(matches!(service.create_animal(future).await, Err(HerdError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_integrity_error() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();

        let result = service.create_animal(create_command("M005", Sex::Female)).await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_insert_is_integrity_error() {
        let (service, _) = setup_test().await;
        let animal = service.create_animal(create_command("M005", Sex::Male)).await.unwrap();

        // Second insert that got past the existence check
        let err = service
            .animals
            .store_animal(&animal)
            .await
            .expect_err("Duplicate insert should fail");
        assert!(matches!(HerdError::from(err), HerdError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_registration_matches_recorded_offspring() {
        let (service, _) = setup_test().await;
        service
            .create_animal(child_command("K1", Sex::Male, Some("X9"), Some("Y3")))
            .await
            .unwrap();

        let doe_as_sire = service.create_animal(create_command("X9", Sex::Female)).await;
        assert!(matches!(doe_as_sire, Err(HerdError::Integrity(_))));

        let buck_as_dam = service.create_animal(create_command("Y3", Sex::Male)).await;
        assert!(matches!(buck_as_dam, Err(HerdError::Integrity(_))));

        service.create_animal(create_command("X9", Sex::Male)).await.expect("Sire matches");
        service.create_animal(create_command("Y3", Sex::Female)).await.expect("Dam matches");
    }

    #[tokio::test]
    async fn test_parent_checks() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        service.create_animal(create_command("F012", Sex::Female)).await.unwrap();

        let wrong_sex = child_command("K1", Sex::Male, Some("F012"), None);
        assert!(matches!(service.create_animal(wrong_sex).await, Err(HerdError::Validation(_))));

        let own_sire = child_command("K2", Sex::Male, Some("K2"), None);
        assert!(matches!(service.create_animal(own_sire).await, Err(HerdError::Validation(_))));

        let same_parent = child_command("K3", Sex::Male, Some("X9"), Some("X9"));
        assert!(matches!(service.create_animal(same_parent).await, Err(HerdError::Validation(_))));

        let unregistered = child_command("K4", Sex::Female, Some("M999"), Some("F012"));
        let kit = service.create_animal(unregistered).await.expect("Unregistered sire is allowed");
        assert_eq!(kit.sire_id.as_deref(), Some("M999"));
    }

    #[tokio::test]
    async fn test_cycles_are_rejected() {
        let (service, _) = setup_test().await;
        // A references a not-yet-registered sire "B"
        service
            .create_animal(child_command("A", Sex::Male, Some("B"), None))
            .await
            .unwrap();

        // Registering B as A's offspring would close the loop
        let result = service.create_animal(child_command("B", Sex::Male, Some("A"), None)).await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));

        service.create_animal(create_command("B", Sex::Male)).await.unwrap();
        let update = UpdateAnimalCommand {
            sire_id: Some(Some("A".to_string())),
            ..Default::default()
        };
        let result = service.update_animal("B", update).await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));
    }

    #[tokio::test]
    async fn test_update_partial_and_clear() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        let created = service
            .create_animal(CreateAnimalCommand {
                color: Some("white".to_string()),
                ..child_command("R-100", Sex::Female, Some("M005"), None)
            })
            .await
            .unwrap();

        let update = UpdateAnimalCommand {
            weight_kg: Some(Some(2.75)),
            color: Some(None),
            sire_id: Some(None),
            status: Some(AnimalStatus::ForSale),
            ..Default::default()
        };
        let updated = service.update_animal("R-100", update).await.unwrap();

        assert_eq!(updated.weight_kg, Some(2.75));
        assert_eq!(updated.color, None);
        assert_eq!(updated.sire_id, None);
        assert_eq!(updated.status, AnimalStatus::ForSale);
        assert_eq!(updated.breed, created.breed);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let missing = service.update_animal("nope", UpdateAnimalCommand::default()).await;
        assert!(matches!(missing, Err(HerdError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sex_change_blocked_for_parents() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        service
            .create_animal(child_command("R-100", Sex::Female, Some("M005"), None))
            .await
            .unwrap();

        let update = UpdateAnimalCommand { sex: Some(Sex::Female), ..Default::default() };
        let result = service.update_animal("M005", update.clone()).await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));

        service.create_animal(create_command("F050", Sex::Male)).await.unwrap();
        let fixed = service.update_animal("F050", update).await.unwrap();
        assert_eq!(fixed.sex, Sex::Female);
    }

    #[tokio::test]
    async fn test_delete_referenced_parent_is_rejected() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        service
            .create_animal(child_command("R-100", Sex::Female, Some("M005"), None))
            .await
            .unwrap();

        let result = service
            .delete_animal(DeleteAnimalCommand {
                animal_id: "M005".to_string(),
                policy: DeletePolicy::Reject,
            })
            .await;
        assert!(matches!(result, Err(HerdError::Integrity(_))));
        assert!(service.get_animal("M005").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_detaching_offspring() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        service
            .create_animal(child_command("R-100", Sex::Female, Some("M005"), None))
            .await
            .unwrap();

        let result = service
            .delete_animal(DeleteAnimalCommand {
                animal_id: "M005".to_string(),
                policy: DeletePolicy::DetachOffspring,
            })
            .await
            .expect("Failed to delete");

        assert_eq!(result.detached_offspring, 1);
        assert!(matches!(service.get_animal("M005").await, Err(HerdError::NotFound(_))));
        assert_eq!(service.get_animal("R-100").await.unwrap().sire_id, None);
    }

    #[tokio::test]
    async fn test_delete_unreferenced_and_missing() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("F001", Sex::Female)).await.unwrap();

        let result = service
            .delete_animal(DeleteAnimalCommand {
                animal_id: "F001".to_string(),
                policy: DeletePolicy::Reject,
            })
            .await
            .unwrap();
        assert_eq!(result.detached_offspring, 0);

        let missing = service
            .delete_animal(DeleteAnimalCommand {
                animal_id: "F001".to_string(),
                policy: DeletePolicy::Reject,
            })
            .await;
        assert!(matches!(missing, Err(HerdError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (service, _) = setup_test().await;
        service.create_animal(create_command("M005", Sex::Male)).await.unwrap();
        service.create_animal(create_command("F012", Sex::Female)).await.unwrap();

        let males = service
            .list_animals(AnimalFilter { sex: Some(Sex::Male), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(males.len(), 1);
        assert_eq!(males[0].id, "M005");
    }
}
