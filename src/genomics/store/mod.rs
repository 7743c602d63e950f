//! Persistence seam for the genomics service.
//!
//! As with the clinical store, implementations back the services'
//! explicit checks: a duplicate symbol or a delete that would orphan rows
//! fails with `AppError::Conflict`.

mod memory;
mod postgres;

pub use memory::MemoryGenomicsStore;
pub use postgres::PostgresGenomicsStore;

use uuid::Uuid;

use super::models::{
    Gene, GeneFilter, GeneticVariant, NewGene, PatientVariantReport, ReportFilter, VariantFilter,
};
use crate::error::AppResult;

#[async_trait::async_trait]
pub trait GenomicsStore: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;

    // ===== Genes =====

    async fn insert_gene(&self, gene: &NewGene) -> AppResult<Gene>;

    async fn get_gene(&self, id: i32) -> AppResult<Option<Gene>>;

    async fn get_genes(&self, ids: &[i32]) -> AppResult<Vec<Gene>>;

    /// Exact, case-sensitive match
    async fn find_gene_by_symbol(&self, symbol: &str) -> AppResult<Option<Gene>>;

    /// Ordered by symbol
    async fn list_genes(&self, filter: &GeneFilter) -> AppResult<Vec<Gene>>;

    async fn update_gene(&self, gene: &Gene) -> AppResult<()>;

    async fn delete_gene(&self, id: i32) -> AppResult<bool>;

    async fn count_variants_for_gene(&self, gene_id: i32) -> AppResult<i64>;

    // ===== Variants =====

    async fn insert_variant(&self, variant: &GeneticVariant) -> AppResult<()>;

    async fn get_variant(&self, id: Uuid) -> AppResult<Option<GeneticVariant>>;

    async fn get_variants(&self, ids: &[Uuid]) -> AppResult<Vec<GeneticVariant>>;

    /// Ordered by chromosome, then position
    async fn list_variants(&self, filter: &VariantFilter) -> AppResult<Vec<GeneticVariant>>;

    async fn update_variant(&self, variant: &GeneticVariant) -> AppResult<()>;

    async fn delete_variant(&self, id: Uuid) -> AppResult<bool>;

    async fn count_reports_for_variant(&self, variant_id: Uuid) -> AppResult<i64>;

    // ===== Reports =====

    async fn insert_report(&self, report: &PatientVariantReport) -> AppResult<()>;

    async fn get_report(&self, id: Uuid) -> AppResult<Option<PatientVariantReport>>;

    /// Newest detection first
    async fn list_reports(&self, filter: &ReportFilter) -> AppResult<Vec<PatientVariantReport>>;

    /// Writes detection date and allele frequency
    async fn update_report(&self, report: &PatientVariantReport) -> AppResult<()>;

    async fn delete_report(&self, id: Uuid) -> AppResult<bool>;
}
