// ============================================================================
// Genomics HTTP Handlers
// ============================================================================
//
// PUT and PATCH share the partial-update handlers. Deletes answer 204.
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::Response, Json};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{
    CreateGeneRequest, CreateReportRequest, CreateVariantRequest, GeneResponse, ReportResponse,
    SearchQuery, UpdateGeneRequest, UpdateReportRequest, UpdateVariantRequest, VariantQuery,
    VariantResponse,
};
use super::models::{GeneFilter, ReportFilter};
use super::GenomicsContext;
use crate::error::{AppError, AppResult};
use crate::routes::extractors::{JsonBody, PathParam, QueryParams};
use crate::routes::health;

// ===== Genes =====

pub async fn create_gene(
    State(ctx): State<Arc<GenomicsContext>>,
    JsonBody(request): JsonBody<CreateGeneRequest>,
) -> AppResult<(StatusCode, Json<GeneResponse>)> {
    let gene = ctx.genes.create(request).await?;
    Ok((StatusCode::CREATED, Json(gene)))
}

pub async fn list_genes(
    State(ctx): State<Arc<GenomicsContext>>,
    QueryParams(filter): QueryParams<GeneFilter>,
) -> AppResult<Json<Vec<GeneResponse>>> {
    Ok(Json(ctx.genes.list(filter).await?))
}

pub async fn search_genes(
    State(ctx): State<Arc<GenomicsContext>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<Json<Vec<GeneResponse>>> {
    Ok(Json(ctx.genes.search(query.symbol).await?))
}

pub async fn get_gene(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<GeneResponse>> {
    Ok(Json(ctx.genes.get(id).await?))
}

pub async fn update_gene(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<i32>,
    JsonBody(request): JsonBody<UpdateGeneRequest>,
) -> AppResult<Json<GeneResponse>> {
    Ok(Json(ctx.genes.update(id, request).await?))
}

pub async fn delete_gene(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    ctx.genes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Variants =====

pub async fn create_variant(
    State(ctx): State<Arc<GenomicsContext>>,
    JsonBody(request): JsonBody<CreateVariantRequest>,
) -> AppResult<(StatusCode, Json<VariantResponse>)> {
    let variant = ctx.variants.create(request).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn list_variants(
    State(ctx): State<Arc<GenomicsContext>>,
    QueryParams(query): QueryParams<VariantQuery>,
) -> AppResult<Json<Vec<VariantResponse>>> {
    Ok(Json(ctx.variants.list(query).await?))
}

pub async fn list_variants_by_gene(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(gene_id): PathParam<i32>,
) -> AppResult<Json<Vec<VariantResponse>>> {
    Ok(Json(ctx.variants.list_by_gene(gene_id).await?))
}

pub async fn list_variants_by_impact(
    State(ctx): State<Arc<GenomicsContext>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<Json<Vec<VariantResponse>>> {
    Ok(Json(
        ctx.variants.list_by_impact(query.impact.as_deref()).await?,
    ))
}

pub async fn get_variant(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<VariantResponse>> {
    Ok(Json(ctx.variants.get(id).await?))
}

pub async fn update_variant(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<UpdateVariantRequest>,
) -> AppResult<Json<VariantResponse>> {
    Ok(Json(ctx.variants.update(id, request).await?))
}

pub async fn delete_variant(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    ctx.variants.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Reports =====

pub async fn create_report(
    State(ctx): State<Arc<GenomicsContext>>,
    JsonBody(request): JsonBody<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<ReportResponse>)> {
    let report = ctx.reports.create(request).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn list_reports(
    State(ctx): State<Arc<GenomicsContext>>,
    QueryParams(filter): QueryParams<ReportFilter>,
) -> AppResult<Json<Vec<ReportResponse>>> {
    Ok(Json(ctx.reports.list(filter).await?))
}

pub async fn list_reports_by_patient(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(patient_id): PathParam<Uuid>,
) -> AppResult<Json<Vec<ReportResponse>>> {
    Ok(Json(ctx.reports.list_for_patient(patient_id).await?))
}

pub async fn get_report(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<ReportResponse>> {
    Ok(Json(ctx.reports.get(id).await?))
}

pub async fn update_report(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<UpdateReportRequest>,
) -> AppResult<Json<ReportResponse>> {
    Ok(Json(ctx.reports.update(id, request).await?))
}

pub async fn delete_report(
    State(ctx): State<Arc<GenomicsContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    ctx.reports.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Misc =====

pub async fn health_check(State(ctx): State<Arc<GenomicsContext>>) -> Response {
    health::from_ping(ctx.store.ping().await)
}

pub async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}
