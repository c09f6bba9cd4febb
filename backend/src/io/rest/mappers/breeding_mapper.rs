use shared::{
    BirthEvent as SharedBirth, BirthListResponse, BirthResponse, BreedingPerformance as SharedPerformance,
    MatingEvent as SharedMating, MatingListResponse, MatingResponse, RecordBirthRequest,
    RecordMatingRequest, RecordWeaningRequest, UpdateMatingOutcomeRequest,
};

use super::{format_date, parse_date};
use crate::domain::commands::breeding::{
    RecordBirthCommand, RecordMatingCommand, RecordWeaningCommand, UpdateMatingOutcomeCommand,
};
use crate::domain::models::breeding::{BirthEvent, BreedingPerformance, LitterCounts, MatingEvent};
use crate::error::Result;

/// Mapper between breeding log DTOs and domain events
pub struct BreedingMapper;

impl BreedingMapper {
    pub fn to_mating_dto(domain: MatingEvent) -> SharedMating {
        SharedMating {
            id: domain.id,
            sire_id: domain.sire_id,
            dam_id: domain.dam_id,
            mating_date: format_date(domain.mating_date),
            expected_birth_date: format_date(domain.expected_birth_date),
            outcome: domain.outcome,
            notes: domain.notes,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_birth_dto(domain: BirthEvent) -> SharedBirth {
        SharedBirth {
            id: domain.id,
            mating_id: domain.mating_id,
            birth_date: format_date(domain.birth_date),
            total_born: domain.counts.total_born,
            stillborn: domain.counts.stillborn,
            survivors_24h: domain.counts.survivors_24h,
            survivors_48h: domain.counts.survivors_48h,
            weaned: domain.weaned,
            notes: domain.notes,
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    pub fn to_performance_dto(domain: BreedingPerformance) -> SharedPerformance {
        SharedPerformance {
            animal_id: domain.animal_id,
            matings: domain.matings,
            successful_matings: domain.successful_matings,
            failed_matings: domain.failed_matings,
            litters: domain.litters,
            total_born: domain.total_born,
            stillborn: domain.stillborn,
            born_alive: domain.born_alive,
            survivors_24h: domain.survivors_24h,
            survivors_48h: domain.survivors_48h,
            weaned: domain.weaned,
            survival_rate: domain.survival_rate,
            fertility_rate: domain.fertility_rate,
        }
    }

    pub fn to_record_mating_command(request: RecordMatingRequest) -> Result<RecordMatingCommand> {
        Ok(RecordMatingCommand {
            sire_id: request.sire_id.trim().to_string(),
            dam_id: request.dam_id.trim().to_string(),
            mating_date: parse_date("mating_date", &request.mating_date)?,
            expected_birth_date: request
                .expected_birth_date
                .as_deref()
                .map(|d| parse_date("expected_birth_date", d))
                .transpose()?,
            notes: request.notes,
        })
    }

    pub fn to_outcome_command(mating_id: String, request: UpdateMatingOutcomeRequest) -> UpdateMatingOutcomeCommand {
        UpdateMatingOutcomeCommand {
            mating_id,
            outcome: request.outcome,
            notes: request.notes,
        }
    }

    pub fn to_record_birth_command(request: RecordBirthRequest) -> Result<RecordBirthCommand> {
        Ok(RecordBirthCommand {
            birth_date: parse_date("birth_date", &request.birth_date)?,
            mating_id: request.mating_id,
            counts: LitterCounts {
                total_born: request.total_born,
                stillborn: request.stillborn,
                survivors_24h: request.survivors_24h,
                survivors_48h: request.survivors_48h,
            },
            notes: request.notes,
        })
    }

    pub fn to_weaning_command(birth_id: String, request: RecordWeaningRequest) -> RecordWeaningCommand {
        RecordWeaningCommand {
            birth_id,
            weaned: request.weaned,
        }
    }

    pub fn to_mating_response(domain: MatingEvent, success_message: impl Into<String>) -> MatingResponse {
        MatingResponse {
            mating: Self::to_mating_dto(domain),
            success_message: success_message.into(),
        }
    }

    pub fn to_mating_list_response(matings: Vec<MatingEvent>) -> MatingListResponse {
        MatingListResponse {
            matings: matings.into_iter().map(Self::to_mating_dto).collect(),
        }
    }

    pub fn to_birth_response(domain: BirthEvent, success_message: impl Into<String>) -> BirthResponse {
        BirthResponse {
            birth: Self::to_birth_dto(domain),
            success_message: success_message.into(),
        }
    }

    pub fn to_birth_list_response(births: Vec<BirthEvent>) -> BirthListResponse {
        BirthListResponse {
            births: births.into_iter().map(Self::to_birth_dto).collect(),
        }
    }
}
