//! Wire shapes for the clinical API (camelCase JSON).
//!
//! Responses are built with explicit constructors from the stored models;
//! related entities appear only when the handler loaded them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::models::{ClinicalRecord, Gender, Patient, PatientStatus, TumorType};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub status: Option<PatientStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub status: Option<PatientStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTumorTypeRequest {
    pub name: String,
    pub system_affected: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTumorTypeRequest {
    pub name: Option<String>,
    pub system_affected: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClinicalRecordRequest {
    pub patient_id: Uuid,
    pub tumor_type_id: i32,
    pub diagnosis_date: NaiveDate,
    pub stage: Option<String>,
    pub treatment_protocol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClinicalRecordRequest {
    pub patient_id: Option<Uuid>,
    pub tumor_type_id: Option<i32>,
    pub diagnosis_date: Option<NaiveDate>,
    /// Absent: unchanged. `null`: cleared.
    #[serde(default, deserialize_with = "nullable")]
    pub stage: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub treatment_protocol: Option<Option<String>>,
}

/// Keeps an explicit `null` apart from a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_records: Option<Vec<ClinicalRecordResponse>>,
}

impl PatientResponse {
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            birth_date: patient.birth_date,
            gender: patient.gender,
            status: patient.status,
            created_at: patient.created_at,
            clinical_records: None,
        }
    }

    pub fn with_records(mut self, records: &[ClinicalRecord]) -> Self {
        self.clinical_records = Some(
            records
                .iter()
                .map(ClinicalRecordResponse::from_record)
                .collect(),
        );
        self
    }
}

/// Patient as embedded in a clinical record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub status: PatientStatus,
}

impl PatientSummary {
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            birth_date: patient.birth_date,
            gender: patient.gender,
            status: patient.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TumorTypeResponse {
    pub id: i32,
    pub name: String,
    pub system_affected: String,
}

impl TumorTypeResponse {
    pub fn from_tumor_type(tumor_type: &TumorType) -> Self {
        Self {
            id: tumor_type.id,
            name: tumor_type.name.clone(),
            system_affected: tumor_type.system_affected.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRecordResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub tumor_type_id: i32,
    pub diagnosis_date: NaiveDate,
    pub stage: Option<String>,
    pub treatment_protocol: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tumor_type: Option<TumorTypeResponse>,
}

impl ClinicalRecordResponse {
    pub fn from_record(record: &ClinicalRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            tumor_type_id: record.tumor_type_id,
            diagnosis_date: record.diagnosis_date,
            stage: record.stage.clone(),
            treatment_protocol: record.treatment_protocol.clone(),
            created_at: record.created_at,
            patient: None,
            tumor_type: None,
        }
    }

    pub fn with_patient(mut self, patient: Option<&Patient>) -> Self {
        self.patient = patient.map(PatientSummary::from_patient);
        self
    }

    pub fn with_tumor_type(mut self, tumor_type: Option<&TumorType>) -> Self {
        self.tumor_type = tumor_type.map(TumorTypeResponse::from_tumor_type);
        self
    }
}

/// Body returned by physical deletes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}
