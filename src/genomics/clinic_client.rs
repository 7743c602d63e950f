// ============================================================================
// Clinical Service Client
// ============================================================================
//
// Patients live in the clinical service; the genomics service only holds
// their ids. This client asks the clinical service whether a patient exists
// and what their name is.
//
// ============================================================================

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// What the genomics service needs to know about a patient
#[derive(Debug, Clone, PartialEq)]
pub struct PatientInfo {
    pub id: Uuid,
    pub name: String,
}

/// Patient lookup by id
#[async_trait::async_trait]
pub trait PatientDirectory: Send + Sync {
    /// `Ok(None)` when the patient does not exist; `Err` when the
    /// directory could not answer.
    async fn find_patient(&self, id: Uuid) -> AppResult<Option<PatientInfo>>;
}

/// Subset of the clinical service's camelCase patient body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClinicPatient {
    id: Uuid,
    first_name: String,
    last_name: String,
}

impl From<ClinicPatient> for PatientInfo {
    fn from(patient: ClinicPatient) -> Self {
        PatientInfo {
            id: patient.id,
            name: format!("{} {}", patient.first_name, patient.last_name),
        }
    }
}

/// PatientDirectory backed by `GET {base_url}/patients/{id}`
#[derive(Clone)]
pub struct ClinicClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClinicClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create clinical service client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn patient_url(&self, id: Uuid) -> String {
        format!("{}/patients/{}", self.base_url, id)
    }
}

#[async_trait::async_trait]
impl PatientDirectory for ClinicClient {
    async fn find_patient(&self, id: Uuid) -> AppResult<Option<PatientInfo>> {
        let url = self.patient_url(id);
        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(patient_id = %id, error = %e, "Clinical service unreachable");
            AppError::upstream("Clinical service unavailable")
        })?;

        match response.status() {
            StatusCode::OK => {
                let patient: ClinicPatient = response.json().await.map_err(|e| {
                    tracing::error!(patient_id = %id, error = %e, "Unexpected clinical service body");
                    AppError::upstream("Clinical service returned an unexpected body")
                })?;
                Ok(Some(patient.into()))
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!(patient_id = %id, "Patient not known to clinical service");
                Ok(None)
            }
            status => {
                tracing::error!(patient_id = %id, %status, "Clinical service lookup failed");
                Err(AppError::upstream(format!(
                    "Clinical service answered {}",
                    status.as_u16()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patient_url_trims_trailing_slash() {
        let client = ClinicClient::new("http://clinic:3000/clinica/", 5).unwrap();
        let id = Uuid::nil();
        assert_eq!(
            client.patient_url(id),
            "http://clinic:3000/clinica/patients/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_patient_name_from_clinical_body() {
        let id = Uuid::new_v4();
        let body = json!({
            "id": id,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "birthDate": "1815-12-10",
            "gender": "female",
            "status": "active",
            "clinicalRecords": []
        });

        let info: PatientInfo = serde_json::from_value::<ClinicPatient>(body).unwrap().into();
        assert_eq!(
            info,
            PatientInfo {
                id,
                name: "Ada Lovelace".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_clinic_is_upstream_error() {
        // Port 9 (discard) is closed on test hosts
        let client = ClinicClient::new("http://127.0.0.1:9/clinica", 2).unwrap();
        let err = client.find_patient(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
