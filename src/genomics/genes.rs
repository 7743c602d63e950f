use std::sync::Arc;

use super::dto::{CreateGeneRequest, GeneResponse, UpdateGeneRequest};
use super::models::{Gene, GeneFilter, NewGene};
use super::store::GenomicsStore;
use crate::error::{AppError, AppResult};
use crate::validation::{optional_text, required_text};

const SYMBOL_MAX_LEN: usize = 50;
const FULL_NAME_MAX_LEN: usize = 255;
const SUMMARY_MAX_LEN: usize = 10_000;

#[derive(Clone)]
pub struct GeneService {
    store: Arc<dyn GenomicsStore>,
}

impl GeneService {
    pub fn new(store: Arc<dyn GenomicsStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateGeneRequest) -> AppResult<GeneResponse> {
        let new = NewGene {
            symbol: required_text("symbol", &request.symbol, SYMBOL_MAX_LEN)?,
            full_name: optional_text("full_name", request.full_name.as_deref(), FULL_NAME_MAX_LEN)?,
            function_summary: optional_text(
                "function_summary",
                request.function_summary.as_deref(),
                SUMMARY_MAX_LEN,
            )?,
        };

        if self.store.find_gene_by_symbol(&new.symbol).await?.is_some() {
            return Err(symbol_conflict(&new.symbol));
        }

        let created = self.store.insert_gene(&new).await?;
        tracing::info!(gene_id = created.id, symbol = %created.symbol, "Gene created");

        Ok(GeneResponse::from_gene(&created))
    }

    pub async fn list(&self, filter: GeneFilter) -> AppResult<Vec<GeneResponse>> {
        let filter = GeneFilter {
            symbol: non_blank(filter.symbol),
            full_name: non_blank(filter.full_name),
            query: non_blank(filter.query),
        };
        let genes = self.store.list_genes(&filter).await?;
        Ok(genes.iter().map(GeneResponse::from_gene).collect())
    }

    /// Partial symbol match; a blank or missing symbol finds nothing
    pub async fn search(&self, symbol: Option<String>) -> AppResult<Vec<GeneResponse>> {
        match non_blank(symbol) {
            None => Ok(Vec::new()),
            Some(symbol) => {
                self.list(GeneFilter {
                    symbol: Some(symbol),
                    ..Default::default()
                })
                .await
            }
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<GeneResponse> {
        let gene = self.require(id).await?;
        Ok(GeneResponse::from_gene(&gene))
    }

    /// A symbol held by another gene is a conflict and changes nothing
    pub async fn update(&self, id: i32, request: UpdateGeneRequest) -> AppResult<GeneResponse> {
        let mut gene = self.require(id).await?;

        if let Some(symbol) = request.symbol {
            let symbol = required_text("symbol", &symbol, SYMBOL_MAX_LEN)?;
            if let Some(existing) = self.store.find_gene_by_symbol(&symbol).await? {
                if existing.id != id {
                    return Err(symbol_conflict(&symbol));
                }
            }
            gene.symbol = symbol;
        }
        if request.full_name.is_some() {
            gene.full_name =
                optional_text("full_name", request.full_name.as_deref(), FULL_NAME_MAX_LEN)?;
        }
        if request.function_summary.is_some() {
            gene.function_summary = optional_text(
                "function_summary",
                request.function_summary.as_deref(),
                SUMMARY_MAX_LEN,
            )?;
        }

        self.store.update_gene(&gene).await?;
        tracing::info!(gene_id = id, "Gene updated");

        Ok(GeneResponse::from_gene(&gene))
    }

    /// Refused while any variant belongs to the gene
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.require(id).await?;

        let variants = self.store.count_variants_for_gene(id).await?;
        if variants > 0 {
            return Err(AppError::conflict(format!(
                "Gene {} has {} associated variant(s)",
                id, variants
            )));
        }

        if !self.store.delete_gene(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(gene_id = id, "Gene deleted");

        Ok(())
    }

    pub(crate) async fn require(&self, id: i32) -> AppResult<Gene> {
        self.store.get_gene(id).await?.ok_or_else(|| not_found(id))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found(id: i32) -> AppError {
    AppError::not_found(format!("Gene with id {} not found", id))
}

fn symbol_conflict(symbol: &str) -> AppError {
    AppError::conflict(format!("Gene with symbol '{}' already exists", symbol))
}
