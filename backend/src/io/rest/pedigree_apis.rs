//! # REST API for Pedigrees and Certificates
//!
//! Read-only views derived from the registry and the breeding log, mounted
//! next to the animal endpoints under `/api/animals/:id`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::io::rest::ApiQuery;
use crate::io::rest::mappers::breeding_mapper::BreedingMapper;
use crate::io::rest::mappers::pedigree_mapper::PedigreeMapper;
use crate::AppState;
use shared::PedigreeRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/pedigree", get(get_pedigree))
        .route("/:id/performance", get(get_performance))
        .route("/:id/certificate", get(get_certificate))
        .route("/:id/certificate/text", get(get_certificate_text))
}

/// Ancestor tree, `?depth=` generations (configured default otherwise)
pub async fn get_pedigree(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    ApiQuery(request): ApiQuery<PedigreeRequest>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}/pedigree - depth: {:?}", animal_id, request.depth);

    let depth = match state.pedigree_service.effective_depth(request.depth) {
        Ok(depth) => depth,
        Err(e) => return e.into_response(),
    };

    match state.pedigree_service.resolve_ancestor_tree(&animal_id, depth).await {
        Ok(tree) => {
            let response = PedigreeMapper::to_pedigree_response(animal_id, depth, tree);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to resolve pedigree of {}: {}", animal_id, e);
            e.into_response()
        }
    }
}

pub async fn get_performance(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}/performance", animal_id);

    match state.breeding_service.get_breeding_performance(&animal_id).await {
        Ok(performance) => {
            (StatusCode::OK, Json(BreedingMapper::to_performance_dto(performance))).into_response()
        }
        Err(e) => {
            error!("Failed to compute performance of {}: {}", animal_id, e);
            e.into_response()
        }
    }
}

pub async fn get_certificate(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    ApiQuery(request): ApiQuery<PedigreeRequest>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}/certificate - depth: {:?}", animal_id, request.depth);

    match state.report_service.genealogy_certificate(&animal_id, request.depth).await {
        Ok(certificate) => {
            (StatusCode::OK, Json(PedigreeMapper::to_certificate_dto(certificate))).into_response()
        }
        Err(e) => {
            error!("Failed to build certificate for {}: {}", animal_id, e);
            e.into_response()
        }
    }
}

/// Printable certificate as plain text
pub async fn get_certificate_text(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    ApiQuery(request): ApiQuery<PedigreeRequest>,
) -> impl IntoResponse {
    info!("GET /api/animals/{}/certificate/text - depth: {:?}", animal_id, request.depth);

    match state.report_service.genealogy_certificate_text(&animal_id, request.depth).await {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            error!("Failed to render certificate for {}: {}", animal_id, e);
            e.into_response()
        }
    }
}
