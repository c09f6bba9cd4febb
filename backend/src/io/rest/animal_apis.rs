//! # REST API for the Animal Registry
//!
//! Endpoints for registering, listing, updating and deleting animals.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::io::rest::{ApiJson, ApiQuery};
use crate::io::rest::mappers::animal_mapper::AnimalMapper;
use crate::AppState;
use shared::{AnimalListRequest, CreateAnimalRequest, DeleteAnimalRequest, UpdateAnimalRequest};

/// Create a router for animal registry APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_animals).post(create_animal))
        .route("/:id", get(get_animal).put(update_animal).delete(delete_animal))
}

/// Register a new animal
pub async fn create_animal(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAnimalRequest>,
) -> impl IntoResponse {
    info!("POST /api/animals - request: {:?}", request);

    let command = match AnimalMapper::to_create_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.animal_service.create_animal(command).await {
        Ok(animal) => {
            let message = format!("Animal {} registered", animal.id);
            (StatusCode::CREATED, Json(AnimalMapper::to_animal_response(animal, message))).into_response()
        }
        Err(e) => {
            error!("Failed to create animal: {}", e);
            e.into_response()
        }
    }
}

/// Get an animal by identifier
pub async fn get_animal(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}", animal_id);

    match state.animal_service.get_animal(&animal_id).await {
        Ok(animal) => (StatusCode::OK, Json(AnimalMapper::to_dto(animal))).into_response(),
        Err(e) => {
            error!("Failed to get animal {}: {}", animal_id, e);
            e.into_response()
        }
    }
}

/// List animals, optionally filtered by sex, status, breed or enclosure
pub async fn list_animals(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<AnimalListRequest>,
) -> impl IntoResponse {
    info!("GET /api/animals - query: {:?}", request);

    match state.animal_service.list_animals(AnimalMapper::to_filter(request)).await {
        Ok(animals) => (StatusCode::OK, Json(AnimalMapper::to_list_response(animals))).into_response(),
        Err(e) => {
            error!("Failed to list animals: {}", e);
            e.into_response()
        }
    }
}

/// Partially update an animal
pub async fn update_animal(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    ApiJson(request): ApiJson<UpdateAnimalRequest>,
) -> impl IntoResponse {
    info!("PUT /api/animals/{} - request: {:?}", animal_id, request);

    let command = match AnimalMapper::to_update_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.animal_service.update_animal(&animal_id, command).await {
        Ok(animal) => {
            let message = format!("Animal {} updated", animal.id);
            (StatusCode::OK, Json(AnimalMapper::to_animal_response(animal, message))).into_response()
        }
        Err(e) => {
            error!("Failed to update animal {}: {}", animal_id, e);
            e.into_response()
        }
    }
}

/// Delete an animal; `?policy=detach_offspring` clears offspring references first
pub async fn delete_animal(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    ApiQuery(request): ApiQuery<DeleteAnimalRequest>,
) -> impl IntoResponse {
    info!("DELETE /api/animals/{} - policy: {:?}", animal_id, request.policy);

    let command = AnimalMapper::to_delete_command(animal_id.clone(), request);
    match state.animal_service.delete_animal(command).await {
        Ok(result) => (StatusCode::OK, Json(AnimalMapper::to_delete_response(result))).into_response(),
        Err(e) => {
            error!("Failed to delete animal {}: {}", animal_id, e);
            e.into_response()
        }
    }
}
