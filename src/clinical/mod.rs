// ============================================================================
// Clinical Data Service
// ============================================================================
//
// CRUD over Patient, TumorType and ClinicalRecord, served under /clinica.
// Layering: handlers -> services (patients / tumor_types / records) -> store.
//
// ============================================================================

pub mod dto;
pub mod handlers;
pub mod models;
pub mod patients;
pub mod records;
pub mod store;
pub mod tumor_types;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{ClinicalConfig, StorageBackend};
use crate::db;
use crate::routes;
use patients::PatientService;
use records::ClinicalRecordService;
use store::{ClinicalStore, MemoryClinicalStore, PostgresClinicalStore};
use tumor_types::TumorTypeService;

/// Path prefix the gateway routes to this service
pub const PATH_PREFIX: &str = "/clinica";

/// Clinical service context
#[derive(Clone)]
pub struct ClinicalContext {
    pub store: Arc<dyn ClinicalStore>,
    pub patients: PatientService,
    pub tumor_types: TumorTypeService,
    pub records: ClinicalRecordService,
}

impl ClinicalContext {
    pub fn new(store: Arc<dyn ClinicalStore>) -> Arc<Self> {
        Arc::new(Self {
            patients: PatientService::new(store.clone()),
            tumor_types: TumorTypeService::new(store.clone()),
            records: ClinicalRecordService::new(store.clone()),
            store,
        })
    }
}

/// Open the configured store, applying migrations for Postgres
pub async fn build_store(config: &ClinicalConfig) -> Result<Arc<dyn ClinicalStore>> {
    match (config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            tracing::info!(database = %database.describe(), "Connecting to PostgreSQL");
            let pool = db::create_pool(database).await?;
            db::migrate_clinical(&pool).await?;
            tracing::info!("Clinical migrations applied");
            Ok(Arc::new(PostgresClinicalStore::new(pool)))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("Postgres storage selected but no database configuration loaded")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryClinicalStore::new()))
        }
    }
}

/// Build the clinical service application
pub fn create_router(ctx: Arc<ClinicalContext>) -> Router {
    let api = Router::new()
        .route(
            "/patients",
            post(handlers::create_patient).get(handlers::list_patients),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient)
                .patch(handlers::update_patient)
                .delete(handlers::deactivate_patient),
        )
        .route(
            "/tumor-types",
            post(handlers::create_tumor_type).get(handlers::list_tumor_types),
        )
        .route(
            "/tumor-types/:id",
            get(handlers::get_tumor_type)
                .patch(handlers::update_tumor_type)
                .delete(handlers::delete_tumor_type),
        )
        .route(
            "/clinical-records",
            post(handlers::create_record).get(handlers::list_records),
        )
        .route(
            "/clinical-records/patient/:patient_id",
            get(handlers::list_records_for_patient),
        )
        .route(
            "/clinical-records/:id",
            get(handlers::get_record)
                .patch(handlers::update_record)
                .delete(handlers::delete_record),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest(PATH_PREFIX, api)
        .fallback(handlers::not_found)
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(routes::middleware::request_logging))
                .into_inner(),
        )
}
