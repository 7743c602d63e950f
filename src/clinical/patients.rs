use std::sync::Arc;
use uuid::Uuid;

use super::dto::{CreatePatientRequest, PatientResponse, UpdatePatientRequest};
use super::models::{Patient, PatientStatus};
use super::store::ClinicalStore;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::validation::required_text;

pub(crate) const NAME_MAX_LEN: usize = 100;

#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn ClinicalStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn ClinicalStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreatePatientRequest) -> AppResult<PatientResponse> {
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: required_text("firstName", &request.first_name, NAME_MAX_LEN)?,
            last_name: required_text("lastName", &request.last_name, NAME_MAX_LEN)?,
            birth_date: request.birth_date,
            gender: request.gender,
            status: request.status.unwrap_or_default(),
            created_at: db::timestamp_now(),
        };

        self.store.insert_patient(&patient).await?;
        tracing::info!(patient_id = %patient.id, "Patient created");

        Ok(PatientResponse::from_patient(&patient))
    }

    pub async fn list(&self) -> AppResult<Vec<PatientResponse>> {
        let patients = self.store.list_patients().await?;
        Ok(patients.iter().map(PatientResponse::from_patient).collect())
    }

    /// Patient with its clinical records
    pub async fn get(&self, id: Uuid) -> AppResult<PatientResponse> {
        let patient = self.require(id).await?;
        let records = self.store.list_records_for_patient(id).await?;
        Ok(PatientResponse::from_patient(&patient).with_records(&records))
    }

    pub async fn update(&self, id: Uuid, request: UpdatePatientRequest) -> AppResult<PatientResponse> {
        let mut patient = self.require(id).await?;

        if let Some(first_name) = request.first_name {
            patient.first_name = required_text("firstName", &first_name, NAME_MAX_LEN)?;
        }
        if let Some(last_name) = request.last_name {
            patient.last_name = required_text("lastName", &last_name, NAME_MAX_LEN)?;
        }
        if let Some(birth_date) = request.birth_date {
            patient.birth_date = birth_date;
        }
        if let Some(gender) = request.gender {
            patient.gender = gender;
        }
        if let Some(status) = request.status {
            patient.status = status;
        }

        self.store.update_patient(&patient).await?;
        tracing::info!(patient_id = %id, "Patient updated");

        Ok(PatientResponse::from_patient(&patient))
    }

    /// Soft delete: status becomes inactive, records are kept
    pub async fn deactivate(&self, id: Uuid) -> AppResult<PatientResponse> {
        let mut patient = self.require(id).await?;
        patient.status = PatientStatus::Inactive;

        self.store.update_patient(&patient).await?;
        tracing::info!(patient_id = %id, "Patient deactivated");

        Ok(PatientResponse::from_patient(&patient))
    }

    pub(crate) async fn require(&self, id: Uuid) -> AppResult<Patient> {
        self.store
            .get_patient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Patient with id {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinical::models::Gender;
    use crate::clinical::store::MemoryClinicalStore;
    use chrono::NaiveDate;

    fn service() -> PatientService {
        PatientService::new(Arc::new(MemoryClinicalStore::new()))
    }

    fn request() -> CreatePatientRequest {
        CreatePatientRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            gender: Gender::Female,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_active() {
        let created = service().create(request()).await.unwrap();
        assert_eq!(created.status, PatientStatus::Active);
        assert!(created.clinical_records.is_none());
    }

    #[tokio::test]
    async fn test_fetch_after_create_returns_same_patient() {
        let service = service();
        let created = service.create(request()).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.first_name, created.first_name);
        assert_eq!(fetched.last_name, created.last_name);
        assert_eq!(fetched.birth_date, created.birth_date);
        assert_eq!(fetched.gender, created.gender);
        assert_eq!(fetched.status, created.status);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let mut req = request();
        req.first_name = "  ".to_string();
        assert!(matches!(
            service().create(req).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let service = service();
        let created = service.create(request()).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdatePatientRequest {
                    status: Some(PatientStatus::FollowUp),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, PatientStatus::FollowUp);
        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.birth_date, created.birth_date);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_failed_update_commits_nothing() {
        let service = service();
        let created = service.create(request()).await.unwrap();

        let result = service
            .update(
                created.id,
                UpdatePatientRequest {
                    first_name: Some("Augusta".to_string()),
                    last_name: Some("x".repeat(101)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let stored = service.get(created.id).await.unwrap();
        assert_eq!(stored.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(matches!(service.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.deactivate(id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
