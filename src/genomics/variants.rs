use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{CreateVariantRequest, UpdateVariantRequest, VariantQuery, VariantResponse};
use super::genes::GeneService;
use super::models::{Gene, GeneticVariant, Impact, VariantFilter};
use super::store::GenomicsStore;
use crate::error::{AppError, AppResult};
use crate::validation::optional_text;

const CHROMOSOME_MAX_LEN: usize = 10;
const BASE_LEN: usize = 1;

#[derive(Clone)]
pub struct VariantService {
    store: Arc<dyn GenomicsStore>,
    genes: GeneService,
}

impl VariantService {
    pub fn new(store: Arc<dyn GenomicsStore>) -> Self {
        Self {
            genes: GeneService::new(store.clone()),
            store,
        }
    }

    pub async fn create(&self, request: CreateVariantRequest) -> AppResult<VariantResponse> {
        let variant = GeneticVariant {
            id: Uuid::new_v4(),
            gene_id: request.gene_id,
            chromosome: optional_text(
                "chromosome",
                request.chromosome.as_deref(),
                CHROMOSOME_MAX_LEN,
            )?,
            position: check_position(request.position)?,
            reference_base: optional_text(
                "reference_base",
                request.reference_base.as_deref(),
                BASE_LEN,
            )?,
            alternate_base: optional_text(
                "alternate_base",
                request.alternate_base.as_deref(),
                BASE_LEN,
            )?,
            impact: request.impact,
        };

        let gene = self.genes.require(variant.gene_id).await?;

        self.store.insert_variant(&variant).await?;
        tracing::info!(
            variant_id = %variant.id,
            gene_id = variant.gene_id,
            impact = %variant.impact,
            "Genetic variant created"
        );

        Ok(VariantResponse::from_variant(&variant, Some(&gene)))
    }

    pub async fn list(&self, query: VariantQuery) -> AppResult<Vec<VariantResponse>> {
        let impact = query
            .impact
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(parse_impact)
            .transpose()?;

        self.filtered(VariantFilter {
            gene_id: query.gene_id,
            chromosome: query
                .chromosome
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            impact,
        })
        .await
    }

    /// 404 for an unknown gene; empty when the gene has no variants
    pub async fn list_by_gene(&self, gene_id: i32) -> AppResult<Vec<VariantResponse>> {
        self.genes.require(gene_id).await?;
        self.filtered(VariantFilter {
            gene_id: Some(gene_id),
            ..Default::default()
        })
        .await
    }

    /// A missing impact means `Unknown`
    pub async fn list_by_impact(&self, impact: Option<&str>) -> AppResult<Vec<VariantResponse>> {
        let impact = match impact.map(str::trim) {
            None | Some("") => Impact::default(),
            Some(raw) => parse_impact(raw)?,
        };
        self.filtered(VariantFilter {
            impact: Some(impact),
            ..Default::default()
        })
        .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<VariantResponse> {
        let variant = self.require(id).await?;
        let gene = self.store.get_gene(variant.gene_id).await?;
        Ok(VariantResponse::from_variant(&variant, gene.as_ref()))
    }

    /// A new gene id must exist; nothing is written if any check fails
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVariantRequest,
    ) -> AppResult<VariantResponse> {
        let mut variant = self.require(id).await?;

        if let Some(gene_id) = request.gene_id {
            if gene_id != variant.gene_id {
                self.genes.require(gene_id).await?;
                variant.gene_id = gene_id;
            }
        }
        if request.chromosome.is_some() {
            variant.chromosome = optional_text(
                "chromosome",
                request.chromosome.as_deref(),
                CHROMOSOME_MAX_LEN,
            )?;
        }
        if request.position.is_some() {
            variant.position = check_position(request.position)?;
        }
        if request.reference_base.is_some() {
            variant.reference_base = optional_text(
                "reference_base",
                request.reference_base.as_deref(),
                BASE_LEN,
            )?;
        }
        if request.alternate_base.is_some() {
            variant.alternate_base = optional_text(
                "alternate_base",
                request.alternate_base.as_deref(),
                BASE_LEN,
            )?;
        }
        if let Some(impact) = request.impact {
            variant.impact = impact;
        }

        self.store.update_variant(&variant).await?;
        tracing::info!(variant_id = %id, "Genetic variant updated");

        self.get(id).await
    }

    /// Refused while any report references the variant
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.require(id).await?;

        let reports = self.store.count_reports_for_variant(id).await?;
        if reports > 0 {
            return Err(AppError::conflict(format!(
                "Variant {} has {} associated report(s)",
                id, reports
            )));
        }

        if !self.store.delete_variant(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(variant_id = %id, "Genetic variant deleted");

        Ok(())
    }

    pub(crate) async fn require(&self, id: Uuid) -> AppResult<GeneticVariant> {
        self.store
            .get_variant(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn filtered(&self, filter: VariantFilter) -> AppResult<Vec<VariantResponse>> {
        let variants = self.store.list_variants(&filter).await?;
        let genes = genes_for(self.store.as_ref(), &variants).await?;

        Ok(variants
            .iter()
            .map(|v| VariantResponse::from_variant(v, genes.get(&v.gene_id)))
            .collect())
    }
}

/// Genes of the given variants, keyed by id
pub(crate) async fn genes_for(
    store: &dyn GenomicsStore,
    variants: &[GeneticVariant],
) -> AppResult<HashMap<i32, Gene>> {
    let ids: Vec<i32> = variants
        .iter()
        .map(|v| v.gene_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(store
        .get_genes(&ids)
        .await?
        .into_iter()
        .map(|g| (g.id, g))
        .collect())
}

fn parse_impact(raw: &str) -> AppResult<Impact> {
    raw.parse().map_err(AppError::validation)
}

fn check_position(position: Option<i64>) -> AppResult<Option<i64>> {
    match position {
        Some(p) if p < 0 => Err(AppError::validation("position must not be negative")),
        other => Ok(other),
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Variant with id {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::dto::CreateGeneRequest;
    use crate::genomics::store::MemoryGenomicsStore;

    async fn fixture() -> (VariantService, i32) {
        let store: Arc<dyn GenomicsStore> = Arc::new(MemoryGenomicsStore::new());
        let gene = GeneService::new(store.clone())
            .create(CreateGeneRequest {
                symbol: "TP53".to_string(),
                full_name: None,
                function_summary: None,
            })
            .await
            .unwrap();
        (VariantService::new(store), gene.id)
    }

    fn request(gene_id: i32, impact: Impact) -> CreateVariantRequest {
        CreateVariantRequest {
            gene_id,
            chromosome: Some("17".to_string()),
            position: Some(7_675_088),
            reference_base: Some("C".to_string()),
            alternate_base: Some("T".to_string()),
            impact,
        }
    }

    #[tokio::test]
    async fn test_create_for_unknown_gene_is_not_found() {
        let (variants, _) = fixture().await;
        let err = variants.create(request(99, Impact::Silent)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(variants.list(VariantQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let (variants, gene_id) = fixture().await;

        let mut bad = request(gene_id, Impact::Missense);
        bad.position = Some(-1);
        assert!(matches!(variants.create(bad).await, Err(AppError::Validation(_))));

        let mut bad = request(gene_id, Impact::Missense);
        bad.reference_base = Some("CT".to_string());
        assert!(matches!(variants.create(bad).await, Err(AppError::Validation(_))));

        let mut bad = request(gene_id, Impact::Missense);
        bad.chromosome = Some("chromosome-17".to_string());
        assert!(matches!(variants.create(bad).await, Err(AppError::Validation(_))));

        let created = variants.create(request(gene_id, Impact::Missense)).await.unwrap();
        assert_eq!(created.gene_symbol.as_deref(), Some("TP53"));
    }

    #[tokio::test]
    async fn test_by_impact_defaults_and_rejects_unknown_values() {
        let (variants, gene_id) = fixture().await;
        variants.create(request(gene_id, Impact::Unknown)).await.unwrap();
        variants.create(request(gene_id, Impact::Nonsense)).await.unwrap();

        assert_eq!(variants.list_by_impact(None).await.unwrap().len(), 1);
        let nonsense = variants.list_by_impact(Some("Nonsense")).await.unwrap();
        assert_eq!(nonsense.len(), 1);
        assert_eq!(nonsense[0].impact, Impact::Nonsense);

        assert!(matches!(
            variants.list_by_impact(Some("Severe")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_by_gene_requires_gene() {
        let (variants, gene_id) = fixture().await;
        assert!(variants.list_by_gene(gene_id).await.unwrap().is_empty());
        assert!(matches!(
            variants.list_by_gene(404).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_to_unknown_gene_changes_nothing() {
        let (variants, gene_id) = fixture().await;
        let created = variants.create(request(gene_id, Impact::Missense)).await.unwrap();

        let err = variants
            .update(
                created.id,
                UpdateVariantRequest {
                    gene_id: Some(77),
                    impact: Some(Impact::Frameshift),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = variants.get(created.id).await.unwrap();
        assert_eq!(stored.impact, Impact::Missense);
        assert_eq!(stored.gene_id, gene_id);
    }
}
