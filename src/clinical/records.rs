use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{
    ClinicalRecordResponse, CreateClinicalRecordRequest, UpdateClinicalRecordRequest,
};
use super::models::{ClinicalRecord, Patient, TumorType};
use super::patients::PatientService;
use super::store::ClinicalStore;
use super::tumor_types::TumorTypeService;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::validation::optional_text;

const STAGE_MAX_LEN: usize = 10;
const TREATMENT_MAX_LEN: usize = 2000;

#[derive(Clone)]
pub struct ClinicalRecordService {
    store: Arc<dyn ClinicalStore>,
    patients: PatientService,
    tumor_types: TumorTypeService,
}

impl ClinicalRecordService {
    pub fn new(store: Arc<dyn ClinicalStore>) -> Self {
        Self {
            patients: PatientService::new(store.clone()),
            tumor_types: TumorTypeService::new(store.clone()),
            store,
        }
    }

    /// Validates both references before writing; returns the record with
    /// its patient and tumor type.
    pub async fn create(
        &self,
        request: CreateClinicalRecordRequest,
    ) -> AppResult<ClinicalRecordResponse> {
        let stage = optional_text("stage", request.stage.as_deref(), STAGE_MAX_LEN)?;
        let treatment_protocol = optional_text(
            "treatmentProtocol",
            request.treatment_protocol.as_deref(),
            TREATMENT_MAX_LEN,
        )?;

        let patient = self.patients.require(request.patient_id).await?;
        let tumor_type = self.tumor_types.require(request.tumor_type_id).await?;

        let record = ClinicalRecord {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            tumor_type_id: tumor_type.id,
            diagnosis_date: request.diagnosis_date,
            stage,
            treatment_protocol,
            created_at: db::timestamp_now(),
        };

        self.store.insert_record(&record).await?;
        tracing::info!(
            record_id = %record.id,
            patient_id = %record.patient_id,
            tumor_type_id = record.tumor_type_id,
            "Clinical record created"
        );

        self.detailed(record.id).await
    }

    /// Newest created first, each with patient and tumor type
    pub async fn list(&self) -> AppResult<Vec<ClinicalRecordResponse>> {
        let records = self.store.list_records().await?;

        let patient_ids: Vec<Uuid> = records
            .iter()
            .map(|r| r.patient_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let patients: HashMap<Uuid, Patient> = self
            .store
            .get_patients(&patient_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let tumor_types = self.tumor_types_for(&records).await?;

        Ok(records
            .iter()
            .map(|record| {
                ClinicalRecordResponse::from_record(record)
                    .with_patient(patients.get(&record.patient_id))
                    .with_tumor_type(tumor_types.get(&record.tumor_type_id))
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ClinicalRecordResponse> {
        self.detailed(id).await
    }

    /// 404 for an unknown patient; an empty list only when the patient exists
    /// without records. Newest diagnosis first, tumor type included.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<ClinicalRecordResponse>> {
        self.patients.require(patient_id).await?;

        let records = self.store.list_records_for_patient(patient_id).await?;
        let tumor_types = self.tumor_types_for(&records).await?;

        Ok(records
            .iter()
            .map(|record| {
                ClinicalRecordResponse::from_record(record)
                    .with_tumor_type(tumor_types.get(&record.tumor_type_id))
            })
            .collect())
    }

    /// Changed references are validated like on create
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateClinicalRecordRequest,
    ) -> AppResult<ClinicalRecordResponse> {
        let mut record = self.require(id).await?;

        if let Some(patient_id) = request.patient_id {
            if patient_id != record.patient_id {
                self.patients.require(patient_id).await?;
                record.patient_id = patient_id;
            }
        }
        if let Some(tumor_type_id) = request.tumor_type_id {
            if tumor_type_id != record.tumor_type_id {
                self.tumor_types.require(tumor_type_id).await?;
                record.tumor_type_id = tumor_type_id;
            }
        }
        if let Some(diagnosis_date) = request.diagnosis_date {
            record.diagnosis_date = diagnosis_date;
        }
        if let Some(stage) = request.stage {
            record.stage = optional_text("stage", stage.as_deref(), STAGE_MAX_LEN)?;
        }
        if let Some(treatment_protocol) = request.treatment_protocol {
            record.treatment_protocol = optional_text(
                "treatmentProtocol",
                treatment_protocol.as_deref(),
                TREATMENT_MAX_LEN,
            )?;
        }

        self.store.update_record(&record).await?;
        tracing::info!(record_id = %id, "Clinical record updated");

        self.detailed(id).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_record(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(record_id = %id, "Clinical record deleted");
        Ok(())
    }

    async fn require(&self, id: Uuid) -> AppResult<ClinicalRecord> {
        self.store
            .get_record(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Record reloaded with its patient and tumor type
    async fn detailed(&self, id: Uuid) -> AppResult<ClinicalRecordResponse> {
        let record = self.require(id).await?;
        let patient = self.store.get_patient(record.patient_id).await?;
        let tumor_type = self.store.get_tumor_type(record.tumor_type_id).await?;

        Ok(ClinicalRecordResponse::from_record(&record)
            .with_patient(patient.as_ref())
            .with_tumor_type(tumor_type.as_ref()))
    }

    async fn tumor_types_for(&self, records: &[ClinicalRecord]) -> AppResult<HashMap<i32, TumorType>> {
        let ids: Vec<i32> = records
            .iter()
            .map(|r| r.tumor_type_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(self
            .store
            .get_tumor_types(&ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Clinical record with id {} not found", id))
}
