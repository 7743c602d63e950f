use std::sync::Arc;

use super::dto::{CreateTumorTypeRequest, TumorTypeResponse, UpdateTumorTypeRequest};
use super::models::{NewTumorType, TumorType};
use super::store::ClinicalStore;
use crate::error::{AppError, AppResult};
use crate::validation::required_text;

const NAME_MAX_LEN: usize = 100;
const SYSTEM_MAX_LEN: usize = 100;

#[derive(Clone)]
pub struct TumorTypeService {
    store: Arc<dyn ClinicalStore>,
}

impl TumorTypeService {
    pub fn new(store: Arc<dyn ClinicalStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateTumorTypeRequest) -> AppResult<TumorTypeResponse> {
        let new = NewTumorType {
            name: required_text("name", &request.name, NAME_MAX_LEN)?,
            system_affected: required_text(
                "systemAffected",
                &request.system_affected,
                SYSTEM_MAX_LEN,
            )?,
        };

        if self.store.find_tumor_type_by_name(&new.name).await?.is_some() {
            return Err(name_conflict(&new.name));
        }

        let created = self.store.insert_tumor_type(&new).await?;
        tracing::info!(tumor_type_id = created.id, name = %created.name, "Tumor type created");

        Ok(TumorTypeResponse::from_tumor_type(&created))
    }

    pub async fn list(&self) -> AppResult<Vec<TumorTypeResponse>> {
        let tumor_types = self.store.list_tumor_types().await?;
        Ok(tumor_types
            .iter()
            .map(TumorTypeResponse::from_tumor_type)
            .collect())
    }

    pub async fn get(&self, id: i32) -> AppResult<TumorTypeResponse> {
        let tumor_type = self.require(id).await?;
        Ok(TumorTypeResponse::from_tumor_type(&tumor_type))
    }

    /// A rename to a name held by another row is a conflict and changes nothing
    pub async fn update(
        &self,
        id: i32,
        request: UpdateTumorTypeRequest,
    ) -> AppResult<TumorTypeResponse> {
        let mut tumor_type = self.require(id).await?;

        if let Some(name) = request.name {
            let name = required_text("name", &name, NAME_MAX_LEN)?;
            if let Some(existing) = self.store.find_tumor_type_by_name(&name).await? {
                if existing.id != id {
                    return Err(name_conflict(&name));
                }
            }
            tumor_type.name = name;
        }
        if let Some(system_affected) = request.system_affected {
            tumor_type.system_affected =
                required_text("systemAffected", &system_affected, SYSTEM_MAX_LEN)?;
        }

        self.store.update_tumor_type(&tumor_type).await?;
        tracing::info!(tumor_type_id = id, "Tumor type updated");

        Ok(TumorTypeResponse::from_tumor_type(&tumor_type))
    }

    /// Refused while any clinical record references the tumor type
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.require(id).await?;

        let references = self.store.count_records_for_tumor_type(id).await?;
        if references > 0 {
            return Err(AppError::conflict(format!(
                "Tumor type {} is referenced by {} clinical record(s)",
                id, references
            )));
        }

        if !self.store.delete_tumor_type(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(tumor_type_id = id, "Tumor type deleted");

        Ok(())
    }

    pub(crate) async fn require(&self, id: i32) -> AppResult<TumorType> {
        self.store
            .get_tumor_type(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i32) -> AppError {
    AppError::not_found(format!("Tumor type with id {} not found", id))
}

fn name_conflict(name: &str) -> AppError {
    AppError::conflict(format!("Tumor type with name '{}' already exists", name))
}
