use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::GenomicsStore;
use crate::error::{AppError, AppResult};
use crate::genomics::models::{
    contains_ci, Gene, GeneFilter, GeneticVariant, NewGene, PatientVariantReport, ReportFilter,
    VariantFilter,
};

#[derive(Default)]
struct Tables {
    genes: BTreeMap<i32, Gene>,
    last_gene_id: i32,
    variants: HashMap<Uuid, GeneticVariant>,
    reports: HashMap<Uuid, PatientVariantReport>,
}

impl Tables {
    fn symbol_taken(&self, symbol: &str, except_id: Option<i32>) -> bool {
        self.genes
            .values()
            .any(|g| g.symbol == symbol && Some(g.id) != except_id)
    }

    fn gene_of(&self, variant_id: &Uuid) -> Option<i32> {
        self.variants.get(variant_id).map(|v| v.gene_id)
    }
}

fn gene_matches(gene: &Gene, filter: &GeneFilter) -> bool {
    let full_name = gene.full_name.as_deref().unwrap_or_default();

    filter
        .symbol
        .as_deref()
        .map_or(true, |s| contains_ci(&gene.symbol, s))
        && filter
            .full_name
            .as_deref()
            .map_or(true, |n| gene.full_name.is_some() && contains_ci(full_name, n))
        && filter
            .query
            .as_deref()
            .map_or(true, |q| contains_ci(&gene.symbol, q) || contains_ci(full_name, q))
}

fn variant_matches(variant: &GeneticVariant, filter: &VariantFilter) -> bool {
    filter.gene_id.map_or(true, |id| variant.gene_id == id)
        && filter
            .chromosome
            .as_deref()
            .map_or(true, |c| variant.chromosome.as_deref() == Some(c))
        && filter.impact.map_or(true, |i| variant.impact == i)
}

/// Process-local GenomicsStore; constraint checks and writes share one lock
#[derive(Default)]
pub struct MemoryGenomicsStore {
    tables: RwLock<Tables>,
}

impl MemoryGenomicsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl GenomicsStore for MemoryGenomicsStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_gene(&self, gene: &NewGene) -> AppResult<Gene> {
        let mut tables = self.tables.write().await;
        if tables.symbol_taken(&gene.symbol, None) {
            return Err(AppError::conflict(format!(
                "Gene with symbol '{}' already exists",
                gene.symbol
            )));
        }

        tables.last_gene_id += 1;
        let created = Gene {
            id: tables.last_gene_id,
            symbol: gene.symbol.clone(),
            full_name: gene.full_name.clone(),
            function_summary: gene.function_summary.clone(),
        };
        tables.genes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_gene(&self, id: i32) -> AppResult<Option<Gene>> {
        Ok(self.tables.read().await.genes.get(&id).cloned())
    }

    async fn get_genes(&self, ids: &[i32]) -> AppResult<Vec<Gene>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.genes.get(id).cloned())
            .collect())
    }

    async fn find_gene_by_symbol(&self, symbol: &str) -> AppResult<Option<Gene>> {
        Ok(self
            .tables
            .read()
            .await
            .genes
            .values()
            .find(|g| g.symbol == symbol)
            .cloned())
    }

    async fn list_genes(&self, filter: &GeneFilter) -> AppResult<Vec<Gene>> {
        let mut genes: Vec<Gene> = self
            .tables
            .read()
            .await
            .genes
            .values()
            .filter(|g| gene_matches(g, filter))
            .cloned()
            .collect();
        genes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(genes)
    }

    async fn update_gene(&self, gene: &Gene) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.symbol_taken(&gene.symbol, Some(gene.id)) {
            return Err(AppError::conflict(format!(
                "Gene with symbol '{}' already exists",
                gene.symbol
            )));
        }
        if let Some(existing) = tables.genes.get_mut(&gene.id) {
            *existing = gene.clone();
        }
        Ok(())
    }

    async fn delete_gene(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.variants.values().any(|v| v.gene_id == id) {
            return Err(AppError::conflict(format!(
                "Gene {} has associated variants",
                id
            )));
        }
        Ok(tables.genes.remove(&id).is_some())
    }

    async fn count_variants_for_gene(&self, gene_id: i32) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .variants
            .values()
            .filter(|v| v.gene_id == gene_id)
            .count() as i64)
    }

    async fn insert_variant(&self, variant: &GeneticVariant) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.genes.contains_key(&variant.gene_id) {
            return Err(AppError::conflict("Referenced gene no longer exists"));
        }
        tables.variants.insert(variant.id, variant.clone());
        Ok(())
    }

    async fn get_variant(&self, id: Uuid) -> AppResult<Option<GeneticVariant>> {
        Ok(self.tables.read().await.variants.get(&id).cloned())
    }

    async fn get_variants(&self, ids: &[Uuid]) -> AppResult<Vec<GeneticVariant>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.variants.get(id).cloned())
            .collect())
    }

    async fn list_variants(&self, filter: &VariantFilter) -> AppResult<Vec<GeneticVariant>> {
        let mut variants: Vec<GeneticVariant> = self
            .tables
            .read()
            .await
            .variants
            .values()
            .filter(|v| variant_matches(v, filter))
            .cloned()
            .collect();
        // NULLS LAST, as in the SQL ordering
        variants.sort_by(|a, b| {
            (a.chromosome.is_none(), &a.chromosome, a.position.is_none(), a.position).cmp(&(
                b.chromosome.is_none(),
                &b.chromosome,
                b.position.is_none(),
                b.position,
            ))
        });
        Ok(variants)
    }

    async fn update_variant(&self, variant: &GeneticVariant) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.genes.contains_key(&variant.gene_id) {
            return Err(AppError::conflict("Referenced gene no longer exists"));
        }
        if let Some(existing) = tables.variants.get_mut(&variant.id) {
            *existing = variant.clone();
        }
        Ok(())
    }

    async fn delete_variant(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.reports.values().any(|r| r.variant_id == id) {
            return Err(AppError::conflict(format!(
                "Variant {} has associated reports",
                id
            )));
        }
        Ok(tables.variants.remove(&id).is_some())
    }

    async fn count_reports_for_variant(&self, variant_id: Uuid) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .values()
            .filter(|r| r.variant_id == variant_id)
            .count() as i64)
    }

    async fn insert_report(&self, report: &PatientVariantReport) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.variants.contains_key(&report.variant_id) {
            return Err(AppError::conflict("Referenced variant no longer exists"));
        }
        tables.reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> AppResult<Option<PatientVariantReport>> {
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self, filter: &ReportFilter) -> AppResult<Vec<PatientVariantReport>> {
        let tables = self.tables.read().await;
        let mut reports: Vec<PatientVariantReport> = tables
            .reports
            .values()
            .filter(|r| {
                filter.patient_id.map_or(true, |id| r.patient_id == id)
                    && filter.variant_id.map_or(true, |id| r.variant_id == id)
                    && filter
                        .gene_id
                        .map_or(true, |id| tables.gene_of(&r.variant_id) == Some(id))
                    && filter
                        .detection_date_from
                        .map_or(true, |from| r.detection_date >= from)
                    && filter
                        .detection_date_to
                        .map_or(true, |to| r.detection_date <= to)
            })
            .cloned()
            .collect();
        reports.sort_by(|a, b| {
            b.detection_date
                .cmp(&a.detection_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(reports)
    }

    async fn update_report(&self, report: &PatientVariantReport) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.reports.get_mut(&report.id) {
            existing.detection_date = report.detection_date;
            existing.allele_frequency = report.allele_frequency;
        }
        Ok(())
    }

    async fn delete_report(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.reports.remove(&id).is_some())
    }
}
