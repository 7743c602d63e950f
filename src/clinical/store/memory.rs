use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ClinicalStore;
use crate::clinical::models::{ClinicalRecord, NewTumorType, Patient, TumorType};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    patients: HashMap<Uuid, Patient>,
    tumor_types: BTreeMap<i32, TumorType>,
    last_tumor_type_id: i32,
    records: HashMap<Uuid, ClinicalRecord>,
}

impl Tables {
    fn name_taken(&self, name: &str, except_id: Option<i32>) -> bool {
        self.tumor_types
            .values()
            .any(|t| t.name == name && Some(t.id) != except_id)
    }

    fn check_references(&self, record: &ClinicalRecord) -> AppResult<()> {
        if !self.patients.contains_key(&record.patient_id)
            || !self.tumor_types.contains_key(&record.tumor_type_id)
        {
            return Err(AppError::conflict(
                "Referenced patient or tumor type no longer exists",
            ));
        }
        Ok(())
    }
}

/// Process-local ClinicalStore. Every write holds one lock across its
/// constraint check and mutation, mirroring the database constraints.
#[derive(Default)]
pub struct MemoryClinicalStore {
    tables: RwLock<Tables>,
}

impl MemoryClinicalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ClinicalStore for MemoryClinicalStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_patient(&self, patient: &Patient) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.patients.contains_key(&patient.id) {
            return Err(AppError::conflict(format!("Patient {} already exists", patient.id)));
        }
        tables.patients.insert(patient.id, patient.clone());
        Ok(())
    }

    async fn get_patient(&self, id: Uuid) -> AppResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn get_patients(&self, ids: &[Uuid]) -> AppResult<Vec<Patient>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.patients.get(id).cloned())
            .collect())
    }

    async fn list_patients(&self) -> AppResult<Vec<Patient>> {
        let mut patients: Vec<Patient> =
            self.tables.read().await.patients.values().cloned().collect();
        patients.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(patients)
    }

    async fn update_patient(&self, patient: &Patient) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.patients.get_mut(&patient.id) {
            let created_at = existing.created_at;
            *existing = Patient {
                created_at,
                ..patient.clone()
            };
        }
        Ok(())
    }

    async fn insert_tumor_type(&self, tumor_type: &NewTumorType) -> AppResult<TumorType> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&tumor_type.name, None) {
            return Err(AppError::conflict(format!(
                "Tumor type with name '{}' already exists",
                tumor_type.name
            )));
        }

        tables.last_tumor_type_id += 1;
        let created = TumorType {
            id: tables.last_tumor_type_id,
            name: tumor_type.name.clone(),
            system_affected: tumor_type.system_affected.clone(),
        };
        tables.tumor_types.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_tumor_type(&self, id: i32) -> AppResult<Option<TumorType>> {
        Ok(self.tables.read().await.tumor_types.get(&id).cloned())
    }

    async fn get_tumor_types(&self, ids: &[i32]) -> AppResult<Vec<TumorType>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.tumor_types.get(id).cloned())
            .collect())
    }

    async fn find_tumor_type_by_name(&self, name: &str) -> AppResult<Option<TumorType>> {
        Ok(self
            .tables
            .read()
            .await
            .tumor_types
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn list_tumor_types(&self) -> AppResult<Vec<TumorType>> {
        let mut tumor_types: Vec<TumorType> =
            self.tables.read().await.tumor_types.values().cloned().collect();
        tumor_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tumor_types)
    }

    async fn update_tumor_type(&self, tumor_type: &TumorType) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&tumor_type.name, Some(tumor_type.id)) {
            return Err(AppError::conflict(format!(
                "Tumor type with name '{}' already exists",
                tumor_type.name
            )));
        }
        if let Some(existing) = tables.tumor_types.get_mut(&tumor_type.id) {
            *existing = tumor_type.clone();
        }
        Ok(())
    }

    async fn delete_tumor_type(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.records.values().any(|r| r.tumor_type_id == id) {
            return Err(AppError::conflict(format!(
                "Tumor type {} is referenced by clinical records",
                id
            )));
        }
        Ok(tables.tumor_types.remove(&id).is_some())
    }

    async fn count_records_for_tumor_type(&self, tumor_type_id: i32) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .values()
            .filter(|r| r.tumor_type_id == tumor_type_id)
            .count() as i64)
    }

    async fn insert_record(&self, record: &ClinicalRecord) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_references(record)?;
        tables.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_record(&self, id: Uuid) -> AppResult<Option<ClinicalRecord>> {
        Ok(self.tables.read().await.records.get(&id).cloned())
    }

    async fn list_records(&self) -> AppResult<Vec<ClinicalRecord>> {
        let mut records: Vec<ClinicalRecord> =
            self.tables.read().await.records.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn list_records_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<ClinicalRecord>> {
        let mut records: Vec<ClinicalRecord> = self
            .tables
            .read()
            .await
            .records
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.diagnosis_date.cmp(&a.diagnosis_date));
        Ok(records)
    }

    async fn update_record(&self, record: &ClinicalRecord) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.check_references(record)?;
        if let Some(existing) = tables.records.get_mut(&record.id) {
            let created_at = existing.created_at;
            *existing = ClinicalRecord {
                created_at,
                ..record.clone()
            };
        }
        Ok(())
    }

    async fn delete_record(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.records.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinical::models::{Gender, PatientStatus};
    use chrono::{Duration, NaiveDate, Utc};

    fn patient(first: &str, last: &str) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            gender: Gender::Other,
            status: PatientStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_patients_sorted_by_last_then_first_name() {
        let store = MemoryClinicalStore::new();
        store.insert_patient(&patient("Zoe", "Adams")).await.unwrap();
        store.insert_patient(&patient("Ann", "Brown")).await.unwrap();
        store.insert_patient(&patient("Ada", "Adams")).await.unwrap();

        let names: Vec<(String, String)> = store
            .list_patients()
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.last_name, p.first_name))
            .collect();

        assert_eq!(
            names,
            vec![
                ("Adams".to_string(), "Ada".to_string()),
                ("Adams".to_string(), "Zoe".to_string()),
                ("Brown".to_string(), "Ann".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_tumor_type_ids_are_sequential_and_names_unique() {
        let store = MemoryClinicalStore::new();
        let first = store
            .insert_tumor_type(&NewTumorType {
                name: "Melanoma".to_string(),
                system_affected: "Skin".to_string(),
            })
            .await
            .unwrap();
        let second = store
            .insert_tumor_type(&NewTumorType {
                name: "Glioma".to_string(),
                system_affected: "Nervous".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let dup = store
            .insert_tumor_type(&NewTumorType {
                name: "Melanoma".to_string(),
                system_affected: "Other".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let renamed = TumorType {
            name: "Melanoma".to_string(),
            ..second.clone()
        };
        assert!(matches!(
            store.update_tumor_type(&renamed).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(store.get_tumor_type(second.id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_record_writes_enforce_references() {
        let store = MemoryClinicalStore::new();
        let p = patient("Ada", "Lovelace");
        store.insert_patient(&p).await.unwrap();
        let t = store
            .insert_tumor_type(&NewTumorType {
                name: "Melanoma".to_string(),
                system_affected: "Skin".to_string(),
            })
            .await
            .unwrap();

        let mut record = ClinicalRecord {
            id: Uuid::new_v4(),
            patient_id: p.id,
            tumor_type_id: t.id,
            diagnosis_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            stage: None,
            treatment_protocol: None,
            created_at: Utc::now(),
        };
        store.insert_record(&record).await.unwrap();

        assert!(matches!(
            store.delete_tumor_type(t.id).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(store.count_records_for_tumor_type(t.id).await.unwrap(), 1);

        record.tumor_type_id = 999;
        assert!(matches!(
            store.update_record(&record).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_updates_keep_created_at() {
        let store = MemoryClinicalStore::new();
        let original = patient("Ada", "Lovelace");
        store.insert_patient(&original).await.unwrap();

        let changed = Patient {
            first_name: "Augusta".to_string(),
            created_at: original.created_at + Duration::days(3),
            ..original.clone()
        };
        store.update_patient(&changed).await.unwrap();

        let stored = store.get_patient(original.id).await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Augusta");
        assert_eq!(stored.created_at, original.created_at);
    }
}
