// ============================================================================
// Genomics Service
// ============================================================================
//
// Genes, their variants, and per-patient variant reports, served under
// /genoma with snake_case JSON. Patients are owned by the clinical service
// and reached through `clinic_client`.
//
// ============================================================================

pub mod clinic_client;
pub mod dto;
pub mod genes;
pub mod handlers;
pub mod models;
pub mod reports;
pub mod store;
pub mod variants;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{GenomicsConfig, StorageBackend};
use crate::db;
use crate::routes;
use clinic_client::PatientDirectory;
use genes::GeneService;
use reports::ReportService;
use store::{GenomicsStore, MemoryGenomicsStore, PostgresGenomicsStore};
use variants::VariantService;

/// Path prefix the gateway routes to this service
pub const PATH_PREFIX: &str = "/genoma";

/// Genomics service context
#[derive(Clone)]
pub struct GenomicsContext {
    pub store: Arc<dyn GenomicsStore>,
    pub genes: GeneService,
    pub variants: VariantService,
    pub reports: ReportService,
}

impl GenomicsContext {
    pub fn new(store: Arc<dyn GenomicsStore>, patients: Arc<dyn PatientDirectory>) -> Arc<Self> {
        Arc::new(Self {
            genes: GeneService::new(store.clone()),
            variants: VariantService::new(store.clone()),
            reports: ReportService::new(store.clone(), patients),
            store,
        })
    }
}

/// Open the configured store, applying migrations for Postgres
pub async fn build_store(config: &GenomicsConfig) -> Result<Arc<dyn GenomicsStore>> {
    match (config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            tracing::info!(database = %database.describe(), "Connecting to PostgreSQL");
            let pool = db::create_pool(database).await?;
            db::migrate_genomics(&pool).await?;
            tracing::info!("Genomics migrations applied");
            Ok(Arc::new(PostgresGenomicsStore::new(pool)))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("Postgres storage selected but no database configuration loaded")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryGenomicsStore::new()))
        }
    }
}

/// Build the genomics service application
pub fn create_router(ctx: Arc<GenomicsContext>) -> Router {
    let api = Router::new()
        .route("/genes", post(handlers::create_gene).get(handlers::list_genes))
        .route("/genes/search", get(handlers::search_genes))
        .route(
            "/genes/:id",
            get(handlers::get_gene)
                .put(handlers::update_gene)
                .patch(handlers::update_gene)
                .delete(handlers::delete_gene),
        )
        .route(
            "/variants",
            post(handlers::create_variant).get(handlers::list_variants),
        )
        .route(
            "/variants/by-gene/:gene_id",
            get(handlers::list_variants_by_gene),
        )
        .route("/variants/by-impact", get(handlers::list_variants_by_impact))
        .route(
            "/variants/:id",
            get(handlers::get_variant)
                .put(handlers::update_variant)
                .patch(handlers::update_variant)
                .delete(handlers::delete_variant),
        )
        .route(
            "/reports",
            post(handlers::create_report).get(handlers::list_reports),
        )
        .route(
            "/reports/by-patient/:patient_id",
            get(handlers::list_reports_by_patient),
        )
        .route(
            "/reports/:id",
            get(handlers::get_report)
                .put(handlers::update_report)
                .patch(handlers::update_report)
                .delete(handlers::delete_report),
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
