//! Persistence seam for the clinical service.
//!
//! Services do their existence and uniqueness checks up front for clear
//! error messages; implementations must still refuse writes that would
//! break a unique name or a reference (returning `AppError::Conflict`),
//! since a concurrent request can land between check and write.

mod memory;
mod postgres;

pub use memory::MemoryClinicalStore;
pub use postgres::PostgresClinicalStore;

use uuid::Uuid;

use super::models::{ClinicalRecord, NewTumorType, Patient, TumorType};
use crate::error::AppResult;

#[async_trait::async_trait]
pub trait ClinicalStore: Send + Sync {
    /// Cheap reachability check for /health
    async fn ping(&self) -> anyhow::Result<()>;

    // ===== Patients =====

    async fn insert_patient(&self, patient: &Patient) -> AppResult<()>;

    async fn get_patient(&self, id: Uuid) -> AppResult<Option<Patient>>;

    async fn get_patients(&self, ids: &[Uuid]) -> AppResult<Vec<Patient>>;

    /// Ordered by last name, then first name
    async fn list_patients(&self) -> AppResult<Vec<Patient>>;

    /// Writes every mutable column; `created_at` is never touched
    async fn update_patient(&self, patient: &Patient) -> AppResult<()>;

    // ===== Tumor types =====

    async fn insert_tumor_type(&self, tumor_type: &NewTumorType) -> AppResult<TumorType>;

    async fn get_tumor_type(&self, id: i32) -> AppResult<Option<TumorType>>;

    async fn get_tumor_types(&self, ids: &[i32]) -> AppResult<Vec<TumorType>>;

    async fn find_tumor_type_by_name(&self, name: &str) -> AppResult<Option<TumorType>>;

    /// Ordered by name
    async fn list_tumor_types(&self) -> AppResult<Vec<TumorType>>;

    async fn update_tumor_type(&self, tumor_type: &TumorType) -> AppResult<()>;

    /// Returns false when no row had that id
    async fn delete_tumor_type(&self, id: i32) -> AppResult<bool>;

    async fn count_records_for_tumor_type(&self, tumor_type_id: i32) -> AppResult<i64>;

    // ===== Clinical records =====

    async fn insert_record(&self, record: &ClinicalRecord) -> AppResult<()>;

    async fn get_record(&self, id: Uuid) -> AppResult<Option<ClinicalRecord>>;

    /// Newest created first
    async fn list_records(&self) -> AppResult<Vec<ClinicalRecord>>;

    /// Newest diagnosis first
    async fn list_records_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<ClinicalRecord>>;

    /// Writes every mutable column; `created_at` is never touched
    async fn update_record(&self, record: &ClinicalRecord) -> AppResult<()>;

    /// Returns false when no row had that id
    async fn delete_record(&self, id: Uuid) -> AppResult<bool>;
}
