use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ClinicalStore;
use crate::clinical::models::{ClinicalRecord, NewTumorType, Patient, TumorType};
use crate::error::{AppError, AppResult};

/// PostgreSQL implementation of ClinicalStore
pub struct PostgresClinicalStore {
    pool: PgPool,
}

impl PostgresClinicalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// gender and status are stored as text
#[derive(sqlx::FromRow)]
struct PatientRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    gender: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = AppError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            gender: row.gender.parse().map_err(AppError::internal)?,
            status: row.status.parse().map_err(AppError::internal)?,
            created_at: row.created_at,
        })
    }
}

fn into_patients(rows: Vec<PatientRow>) -> AppResult<Vec<Patient>> {
    rows.into_iter().map(Patient::try_from).collect()
}

const PATIENT_COLUMNS: &str =
    "id, first_name, last_name, birth_date, gender, status, created_at";

const RECORD_COLUMNS: &str =
    "id, patient_id, tumor_type_id, diagnosis_date, stage, treatment_protocol, created_at";

#[async_trait::async_trait]
impl ClinicalStore for PostgresClinicalStore {
    async fn ping(&self) -> anyhow::Result<()> {
        crate::db::ping(&self.pool).await
    }

    async fn insert_patient(&self, patient: &Patient) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO patients (id, first_name, last_name, birth_date, gender, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(patient.id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.birth_date)
        .bind(patient.gender.as_str())
        .bind(patient.status.as_str())
        .bind(patient.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> AppResult<Option<Patient>> {
        let row = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {} FROM patients WHERE id = $1",
            PATIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Patient::try_from).transpose()
    }

    async fn get_patients(&self, ids: &[Uuid]) -> AppResult<Vec<Patient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {} FROM patients WHERE id = ANY($1)",
            PATIENT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        into_patients(rows)
    }

    async fn list_patients(&self) -> AppResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, PatientRow>(&format!(
            "SELECT {} FROM patients ORDER BY last_name ASC, first_name ASC",
            PATIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_patients(rows)
    }

    async fn update_patient(&self, patient: &Patient) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE patients
            SET first_name = $2, last_name = $3, birth_date = $4, gender = $5, status = $6
            WHERE id = $1
            "#,
        )
        .bind(patient.id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.birth_date)
        .bind(patient.gender.as_str())
        .bind(patient.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_tumor_type(&self, tumor_type: &NewTumorType) -> AppResult<TumorType> {
        sqlx::query_as::<_, TumorType>(
            r#"
            INSERT INTO tumor_types (name, system_affected)
            VALUES ($1, $2)
            RETURNING id, name, system_affected
            "#,
        )
        .bind(&tumor_type.name)
        .bind(&tumor_type.system_affected)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(
                e,
                format!("Tumor type with name '{}' already exists", tumor_type.name),
            )
        })
    }

    async fn get_tumor_type(&self, id: i32) -> AppResult<Option<TumorType>> {
        let tumor_type = sqlx::query_as::<_, TumorType>(
            "SELECT id, name, system_affected FROM tumor_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tumor_type)
    }

    async fn get_tumor_types(&self, ids: &[i32]) -> AppResult<Vec<TumorType>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tumor_types = sqlx::query_as::<_, TumorType>(
            "SELECT id, name, system_affected FROM tumor_types WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tumor_types)
    }

    async fn find_tumor_type_by_name(&self, name: &str) -> AppResult<Option<TumorType>> {
        let tumor_type = sqlx::query_as::<_, TumorType>(
            "SELECT id, name, system_affected FROM tumor_types WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tumor_type)
    }

    async fn list_tumor_types(&self) -> AppResult<Vec<TumorType>> {
        let tumor_types = sqlx::query_as::<_, TumorType>(
            "SELECT id, name, system_affected FROM tumor_types ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tumor_types)
    }

    async fn update_tumor_type(&self, tumor_type: &TumorType) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tumor_types
            SET name = $2, system_affected = $3
            WHERE id = $1
            "#,
        )
        .bind(tumor_type.id)
        .bind(&tumor_type.name)
        .bind(&tumor_type.system_affected)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(
                e,
                format!("Tumor type with name '{}' already exists", tumor_type.name),
            )
        })?;

        Ok(())
    }

    async fn delete_tumor_type(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tumor_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_db(
                    e,
                    format!("Tumor type {} is referenced by clinical records", id),
                )
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_records_for_tumor_type(&self, tumor_type_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM clinical_records WHERE tumor_type_id = $1")
                .bind(tumor_type_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn insert_record(&self, record: &ClinicalRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clinical_records
                (id, patient_id, tumor_type_id, diagnosis_date, stage, treatment_protocol, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.patient_id)
        .bind(record.tumor_type_id)
        .bind(record.diagnosis_date)
        .bind(&record.stage)
        .bind(&record.treatment_protocol)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(e, "Referenced patient or tumor type no longer exists")
        })?;

        Ok(())
    }

    async fn get_record(&self, id: Uuid) -> AppResult<Option<ClinicalRecord>> {
        let record = sqlx::query_as::<_, ClinicalRecord>(&format!(
            "SELECT {} FROM clinical_records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_records(&self) -> AppResult<Vec<ClinicalRecord>> {
        let records = sqlx::query_as::<_, ClinicalRecord>(&format!(
            "SELECT {} FROM clinical_records ORDER BY created_at DESC",
            RECORD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn list_records_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<ClinicalRecord>> {
        let records = sqlx::query_as::<_, ClinicalRecord>(&format!(
            "SELECT {} FROM clinical_records WHERE patient_id = $1 ORDER BY diagnosis_date DESC",
            RECORD_COLUMNS
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn update_record(&self, record: &ClinicalRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE clinical_records
            SET patient_id = $2, tumor_type_id = $3, diagnosis_date = $4,
                stage = $5, treatment_protocol = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(record.patient_id)
        .bind(record.tumor_type_id)
        .bind(record.diagnosis_date)
        .bind(&record.stage)
        .bind(&record.treatment_protocol)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(e, "Referenced patient or tumor type no longer exists")
        })?;

        Ok(())
    }

    async fn delete_record(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clinical_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
