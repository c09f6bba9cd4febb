use shared::{
    Animal as SharedAnimal, AnimalListRequest, AnimalListResponse, AnimalResponse, AnimalStatus,
    CreateAnimalRequest, DeleteAnimalRequest, DeleteAnimalResponse, HealthStatus, UpdateAnimalRequest,
};

use super::{format_date, parse_date};
use crate::domain::commands::animals::{
    CreateAnimalCommand, DeleteAnimalCommand, DeleteAnimalResult, UpdateAnimalCommand,
};
use crate::domain::models::animal::{Animal as DomainAnimal, AnimalFilter};
use crate::error::Result;

/// Mapper between animal DTOs and the registry's domain types
pub struct AnimalMapper;

impl AnimalMapper {
    pub fn to_dto(domain: DomainAnimal) -> SharedAnimal {
        SharedAnimal {
            id: domain.id,
            name: domain.name,
            sex: domain.sex,
            breed: domain.breed,
            color: domain.color,
            birth_date: domain.birth_date.map(format_date),
            weight_kg: domain.weight_kg,
            health_status: domain.health_status,
            status: domain.status,
            enclosure_id: domain.enclosure_id,
            sire_id: domain.sire_id,
            dam_id: domain.dam_id,
            notes: domain.notes,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_create_command(request: CreateAnimalRequest) -> Result<CreateAnimalCommand> {
        let birth_date = request
            .birth_date
            .as_deref()
            .map(|d| parse_date("birth_date", d))
            .transpose()?;

        Ok(CreateAnimalCommand {
            id: request.id,
            name: request.name,
            sex: request.sex,
            breed: request.breed,
            color: request.color,
            birth_date,
            weight_kg: request.weight_kg,
            health_status: request.health_status.unwrap_or(HealthStatus::Healthy),
            status: request.status.unwrap_or(AnimalStatus::Breeding),
            enclosure_id: request.enclosure_id,
            sire_id: request.sire_id,
            dam_id: request.dam_id,
            notes: request.notes,
        })
    }

    pub fn to_update_command(request: UpdateAnimalRequest) -> Result<UpdateAnimalCommand> {
        let birth_date = match request.birth_date {
            Some(Some(date)) => Some(Some(parse_date("birth_date", &date)?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(UpdateAnimalCommand {
            name: request.name,
            sex: request.sex,
            breed: request.breed,
            color: request.color,
            birth_date,
            weight_kg: request.weight_kg,
            health_status: request.health_status,
            status: request.status,
            enclosure_id: request.enclosure_id,
            sire_id: request.sire_id,
            dam_id: request.dam_id,
            notes: request.notes,
        })
    }

    pub fn to_filter(request: AnimalListRequest) -> AnimalFilter {
        AnimalFilter {
            sex: request.sex,
            status: request.status,
            breed: request.breed.filter(|b| !b.trim().is_empty()),
            enclosure_id: request.enclosure_id.filter(|e| !e.trim().is_empty()),
        }
    }

    pub fn to_delete_command(animal_id: String, request: DeleteAnimalRequest) -> DeleteAnimalCommand {
        DeleteAnimalCommand {
            animal_id,
            policy: request.policy.unwrap_or_default(),
        }
    }

    pub fn to_animal_response(domain: DomainAnimal, success_message: impl Into<String>) -> AnimalResponse {
        AnimalResponse {
            animal: Self::to_dto(domain),
            success_message: success_message.into(),
        }
    }

    pub fn to_list_response(animals: Vec<DomainAnimal>) -> AnimalListResponse {
        AnimalListResponse {
            animals: animals.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_delete_response(result: DeleteAnimalResult) -> DeleteAnimalResponse {
        let success_message = match result.detached_offspring {
            0 => format!("Animal {} deleted", result.animal_id),
            n => format!("Animal {} deleted, parent reference cleared on {} offspring", result.animal_id, n),
        };
        DeleteAnimalResponse {
            animal_id: result.animal_id,
            detached_offspring: result.detached_offspring,
            success_message,
        }
    }
}
