// ============================================================================
// Clinical HTTP Handlers
// ============================================================================
//
// Thin adapters: extract, call the service, pick the status code.
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::Response, Json};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{
    ClinicalRecordResponse, CreateClinicalRecordRequest, CreatePatientRequest,
    CreateTumorTypeRequest, DeletedResponse, PatientResponse, TumorTypeResponse,
    UpdateClinicalRecordRequest, UpdatePatientRequest, UpdateTumorTypeRequest,
};
use super::ClinicalContext;
use crate::error::{AppError, AppResult};
use crate::routes::extractors::{JsonBody, PathParam};
use crate::routes::health;

// ===== Patients =====

pub async fn create_patient(
    State(ctx): State<Arc<ClinicalContext>>,
    JsonBody(request): JsonBody<CreatePatientRequest>,
) -> AppResult<(StatusCode, Json<PatientResponse>)> {
    let patient = ctx.patients.create(request).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list_patients(
    State(ctx): State<Arc<ClinicalContext>>,
) -> AppResult<Json<Vec<PatientResponse>>> {
    Ok(Json(ctx.patients.list().await?))
}

pub async fn get_patient(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<PatientResponse>> {
    Ok(Json(ctx.patients.get(id).await?))
}

pub async fn update_patient(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<UpdatePatientRequest>,
) -> AppResult<Json<PatientResponse>> {
    Ok(Json(ctx.patients.update(id, request).await?))
}

/// DELETE deactivates; the patient row and its records stay
pub async fn deactivate_patient(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<PatientResponse>> {
    Ok(Json(ctx.patients.deactivate(id).await?))
}

// ===== Tumor types =====

pub async fn create_tumor_type(
    State(ctx): State<Arc<ClinicalContext>>,
    JsonBody(request): JsonBody<CreateTumorTypeRequest>,
) -> AppResult<(StatusCode, Json<TumorTypeResponse>)> {
    let tumor_type = ctx.tumor_types.create(request).await?;
    Ok((StatusCode::CREATED, Json(tumor_type)))
}

pub async fn list_tumor_types(
    State(ctx): State<Arc<ClinicalContext>>,
) -> AppResult<Json<Vec<TumorTypeResponse>>> {
    Ok(Json(ctx.tumor_types.list().await?))
}

pub async fn get_tumor_type(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<TumorTypeResponse>> {
    Ok(Json(ctx.tumor_types.get(id).await?))
}

pub async fn update_tumor_type(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<i32>,
    JsonBody(request): JsonBody<UpdateTumorTypeRequest>,
) -> AppResult<Json<TumorTypeResponse>> {
    Ok(Json(ctx.tumor_types.update(id, request).await?))
}

pub async fn delete_tumor_type(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<DeletedResponse>> {
    ctx.tumor_types.delete(id).await?;
    Ok(Json(DeletedResponse {
        message: format!("Tumor type {} deleted", id),
    }))
}

// ===== Clinical records =====

pub async fn create_record(
    State(ctx): State<Arc<ClinicalContext>>,
    JsonBody(request): JsonBody<CreateClinicalRecordRequest>,
) -> AppResult<(StatusCode, Json<ClinicalRecordResponse>)> {
    let record = ctx.records.create(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_records(
    State(ctx): State<Arc<ClinicalContext>>,
) -> AppResult<Json<Vec<ClinicalRecordResponse>>> {
    Ok(Json(ctx.records.list().await?))
}

pub async fn get_record(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<ClinicalRecordResponse>> {
    Ok(Json(ctx.records.get(id).await?))
}

pub async fn list_records_for_patient(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(patient_id): PathParam<Uuid>,
) -> AppResult<Json<Vec<ClinicalRecordResponse>>> {
    Ok(Json(ctx.records.list_for_patient(patient_id).await?))
}

pub async fn update_record(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<UpdateClinicalRecordRequest>,
) -> AppResult<Json<ClinicalRecordResponse>> {
    Ok(Json(ctx.records.update(id, request).await?))
}

pub async fn delete_record(
    State(ctx): State<Arc<ClinicalContext>>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<DeletedResponse>> {
    ctx.records.delete(id).await?;
    Ok(Json(DeletedResponse {
        message: format!("Clinical record {} deleted", id),
    }))
}

// ===== Misc =====

pub async fn health_check(State(ctx): State<Arc<ClinicalContext>>) -> Response {
    health::from_ping(ctx.store.ping().await)
}

pub async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}
