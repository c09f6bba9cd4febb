//! # REST API for the Breeding Event Log
//!
//! Matings are mounted under `/api/matings`, kindlings under `/api/births`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use tracing::{error, info};

use crate::io::rest::{ApiJson, ApiQuery};
use crate::io::rest::mappers::breeding_mapper::BreedingMapper;
use crate::AppState;
use shared::{
    BreedingEventListRequest, RecordBirthRequest, RecordMatingRequest, RecordWeaningRequest,
    UpdateMatingOutcomeRequest,
};

/// Router for mating events
pub fn mating_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_matings).post(record_mating))
        .route("/:id", get(get_mating).delete(delete_mating))
        .route("/:id/outcome", put(update_mating_outcome))
}

/// Router for birth events
pub fn birth_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_births).post(record_birth))
        .route("/:id", get(get_birth))
        .route("/:id/weaning", put(record_weaning))
}

pub async fn record_mating(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordMatingRequest>,
) -> impl IntoResponse {
    info!("POST /api/matings - request: {:?}", request);

    let command = match BreedingMapper::to_record_mating_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.breeding_service.record_mating(command).await {
        Ok(mating) => {
            let message = format!("Mating {} x {} recorded", mating.sire_id, mating.dam_id);
            (StatusCode::CREATED, Json(BreedingMapper::to_mating_response(mating, message))).into_response()
        }
        Err(e) => {
            error!("Failed to record mating: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_mating(
    State(state): State<AppState>,
    Path(mating_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/matings/{}", mating_id);

    match state.breeding_service.get_mating(&mating_id).await {
        Ok(mating) => (StatusCode::OK, Json(BreedingMapper::to_mating_dto(mating))).into_response(),
        Err(e) => {
            error!("Failed to get mating {}: {}", mating_id, e);
            e.into_response()
        }
    }
}

/// List matings, `?animal_id=` restricts to those where the animal is sire or dam
pub async fn list_matings(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<BreedingEventListRequest>,
) -> impl IntoResponse {
    info!("GET /api/matings - query: {:?}", request);

    match state.breeding_service.list_matings(request.animal_id.as_deref()).await {
        Ok(matings) => (StatusCode::OK, Json(BreedingMapper::to_mating_list_response(matings))).into_response(),
        Err(e) => {
            error!("Failed to list matings: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_mating_outcome(
    State(state): State<AppState>,
    Path(mating_id): Path<String>,
    ApiJson(request): ApiJson<UpdateMatingOutcomeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/matings/{}/outcome - request: {:?}", mating_id, request);

    let command = BreedingMapper::to_outcome_command(mating_id.clone(), request);
    match state.breeding_service.update_mating_outcome(command).await {
        Ok(mating) => {
            let message = format!("Outcome of {} set to {}", mating.id, mating.outcome);
            (StatusCode::OK, Json(BreedingMapper::to_mating_response(mating, message))).into_response()
        }
        Err(e) => {
            error!("Failed to update outcome of {}: {}", mating_id, e);
            e.into_response()
        }
    }
}

pub async fn delete_mating(
    State(state): State<AppState>,
    Path(mating_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/matings/{}", mating_id);

    match state.breeding_service.delete_mating(&mating_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to delete mating {}: {}", mating_id, e);
            e.into_response()
        }
    }
}

pub async fn record_birth(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordBirthRequest>,
) -> impl IntoResponse {
    info!("POST /api/births - request: {:?}", request);

    let command = match BreedingMapper::to_record_birth_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.breeding_service.record_birth(command).await {
        Ok(birth) => {
            let message = format!("Litter of {} recorded", birth.counts.total_born);
            (StatusCode::CREATED, Json(BreedingMapper::to_birth_response(birth, message))).into_response()
        }
        Err(e) => {
            error!("Failed to record birth: {}", e);
            e.into_response()
        }
    }
}

pub async fn get_birth(
    State(state): State<AppState>,
    Path(birth_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/births/{}", birth_id);

    match state.breeding_service.get_birth(&birth_id).await {
        Ok(birth) => (StatusCode::OK, Json(BreedingMapper::to_birth_dto(birth))).into_response(),
        Err(e) => {
            error!("Failed to get birth {}: {}", birth_id, e);
            e.into_response()
        }
    }
}

pub async fn list_births(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<BreedingEventListRequest>,
) -> impl IntoResponse {
    info!("GET /api/births - query: {:?}", request);

    match state.breeding_service.list_births(request.animal_id.as_deref()).await {
        Ok(births) => (StatusCode::OK, Json(BreedingMapper::to_birth_list_response(births))).into_response(),
        Err(e) => {
            error!("Failed to list births: {}", e);
            e.into_response()
        }
    }
}

pub async fn record_weaning(
    State(state): State<AppState>,
    Path(birth_id): Path<String>,
    ApiJson(request): ApiJson<RecordWeaningRequest>,
) -> impl IntoResponse {
    info!("PUT /api/births/{}/weaning - request: {:?}", birth_id, request);

    let command = BreedingMapper::to_weaning_command(birth_id.clone(), request);
    match state.breeding_service.record_weaning(command).await {
        Ok(birth) => {
            let message = format!("{} kits weaned", birth.weaned.unwrap_or(0));
            (StatusCode::OK, Json(BreedingMapper::to_birth_response(birth, message))).into_response()
        }
        Err(e) => {
            error!("Failed to record weaning for {}: {}", birth_id, e);
            e.into_response()
        }
    }
}
