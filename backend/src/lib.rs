//! # Clapier Backend
//!
//! Registry and breeding log for a rabbitry, with pedigrees derived from
//! sire/dam references and printable receipts and genealogy certificates.
//!
//! ## Architecture
//!
//! - **[`io`]**: REST endpoints and DTO mapping
//! - **[`domain`]**: services holding the business rules
//! - **[`storage`]**: storage traits and their SQLite implementation
//!
//! The binary in `main.rs` loads [`config::AppConfig`], calls
//! [`initialize_backend`] and serves [`create_router`].

pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod storage;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{AppConfig, ServerConfig};
use crate::domain::{AnimalService, BreedingService, PedigreeService, ReportService, SaleService};
use crate::io::rest::{animal_apis, breeding_apis, pedigree_apis, sale_apis};
use crate::storage::DbConnection;

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub animal_service: AnimalService<DbConnection>,
    pub breeding_service: BreedingService<DbConnection>,
    pub pedigree_service: PedigreeService<DbConnection>,
    pub sale_service: SaleService<DbConnection>,
    pub report_service: ReportService<DbConnection>,
}

/// Open the configured database and wire up the services
pub async fn initialize_backend(config: &AppConfig) -> anyhow::Result<AppState> {
    info!("Initializing backend with database {}", config.database.url);
    let db = DbConnection::new(&config.database.url).await?;
    Ok(build_state(&db, config))
}

/// Wire up the services over an existing connection
pub fn build_state(db: &DbConnection, config: &AppConfig) -> AppState {
    AppState {
        animal_service: AnimalService::new(db),
        breeding_service: BreedingService::new(db, config.breeding.gestation_days),
        pedigree_service: PedigreeService::new(db, &config.pedigree),
        sale_service: SaleService::new(db),
        report_service: ReportService::new(db, config),
    }
}

pub fn create_router(app_state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .nest("/animals", animal_apis::router().merge(pedigree_apis::router()))
        .nest("/matings", breeding_apis::mating_router())
        .nest("/births", breeding_apis::birth_router())
        .nest("/sales", sale_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    match server.cors_origin.as_deref().map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(_)) => {
            warn!("Ignoring invalid CORS origin {:?}, allowing any origin", server.cors_origin);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
