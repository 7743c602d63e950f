use sqlx::PgPool;
use uuid::Uuid;

use super::GenomicsStore;
use crate::error::{AppError, AppResult};
use crate::genomics::models::{
    Gene, GeneFilter, GeneticVariant, NewGene, PatientVariantReport, ReportFilter, VariantFilter,
};

/// PostgreSQL implementation of GenomicsStore
pub struct PostgresGenomicsStore {
    pool: PgPool,
}

impl PostgresGenomicsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// impact is stored as text
#[derive(sqlx::FromRow)]
struct VariantRow {
    id: Uuid,
    gene_id: i32,
    chromosome: Option<String>,
    position: Option<i64>,
    reference_base: Option<String>,
    alternate_base: Option<String>,
    impact: String,
}

impl TryFrom<VariantRow> for GeneticVariant {
    type Error = AppError;

    fn try_from(row: VariantRow) -> Result<Self, Self::Error> {
        Ok(GeneticVariant {
            id: row.id,
            gene_id: row.gene_id,
            chromosome: row.chromosome,
            position: row.position,
            reference_base: row.reference_base,
            alternate_base: row.alternate_base,
            impact: row.impact.parse().map_err(AppError::internal)?,
        })
    }
}

fn into_variants(rows: Vec<VariantRow>) -> AppResult<Vec<GeneticVariant>> {
    rows.into_iter().map(GeneticVariant::try_from).collect()
}

/// `%value%` with LIKE metacharacters escaped
fn like_pattern(value: Option<&str>) -> Option<String> {
    value.map(|v| {
        let escaped = v
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

const GENE_COLUMNS: &str = "id, symbol, full_name, function_summary";

const VARIANT_COLUMNS: &str =
    "id, gene_id, chromosome, position, reference_base, alternate_base, impact";

#[async_trait::async_trait]
impl GenomicsStore for PostgresGenomicsStore {
    async fn ping(&self) -> anyhow::Result<()> {
        crate::db::ping(&self.pool).await
    }

    async fn insert_gene(&self, gene: &NewGene) -> AppResult<Gene> {
        sqlx::query_as::<_, Gene>(&format!(
            r#"
            INSERT INTO genes (symbol, full_name, function_summary)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            GENE_COLUMNS
        ))
        .bind(&gene.symbol)
        .bind(&gene.full_name)
        .bind(&gene.function_summary)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(e, format!("Gene with symbol '{}' already exists", gene.symbol))
        })
    }

    async fn get_gene(&self, id: i32) -> AppResult<Option<Gene>> {
        let gene = sqlx::query_as::<_, Gene>(&format!(
            "SELECT {} FROM genes WHERE id = $1",
            GENE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gene)
    }

    async fn get_genes(&self, ids: &[i32]) -> AppResult<Vec<Gene>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let genes = sqlx::query_as::<_, Gene>(&format!(
            "SELECT {} FROM genes WHERE id = ANY($1)",
            GENE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(genes)
    }

    async fn find_gene_by_symbol(&self, symbol: &str) -> AppResult<Option<Gene>> {
        let gene = sqlx::query_as::<_, Gene>(&format!(
            "SELECT {} FROM genes WHERE symbol = $1",
            GENE_COLUMNS
        ))
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gene)
    }

    async fn list_genes(&self, filter: &GeneFilter) -> AppResult<Vec<Gene>> {
        let genes = sqlx::query_as::<_, Gene>(&format!(
            r#"
            SELECT {}
            FROM genes
            WHERE ($1::text IS NULL OR symbol ILIKE $1)
              AND ($2::text IS NULL OR full_name ILIKE $2)
              AND ($3::text IS NULL OR symbol ILIKE $3 OR full_name ILIKE $3)
            ORDER BY symbol ASC
            "#,
            GENE_COLUMNS
        ))
        .bind(like_pattern(filter.symbol.as_deref()))
        .bind(like_pattern(filter.full_name.as_deref()))
        .bind(like_pattern(filter.query.as_deref()))
        .fetch_all(&self.pool)
        .await?;

        Ok(genes)
    }

    async fn update_gene(&self, gene: &Gene) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE genes
            SET symbol = $2, full_name = $3, function_summary = $4
            WHERE id = $1
            "#,
        )
        .bind(gene.id)
        .bind(&gene.symbol)
        .bind(&gene.full_name)
        .bind(&gene.function_summary)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_db(e, format!("Gene with symbol '{}' already exists", gene.symbol))
        })?;

        Ok(())
    }

    async fn delete_gene(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM genes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db(e, format!("Gene {} has associated variants", id)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_variants_for_gene(&self, gene_id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM genetic_variants WHERE gene_id = $1")
                .bind(gene_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn insert_variant(&self, variant: &GeneticVariant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO genetic_variants
                (id, gene_id, chromosome, position, reference_base, alternate_base, impact)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(variant.id)
        .bind(variant.gene_id)
        .bind(&variant.chromosome)
        .bind(variant.position)
        .bind(&variant.reference_base)
        .bind(&variant.alternate_base)
        .bind(variant.impact.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Referenced gene no longer exists"))?;

        Ok(())
    }

    async fn get_variant(&self, id: Uuid) -> AppResult<Option<GeneticVariant>> {
        let row = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {} FROM genetic_variants WHERE id = $1",
            VARIANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(GeneticVariant::try_from).transpose()
    }

    async fn get_variants(&self, ids: &[Uuid]) -> AppResult<Vec<GeneticVariant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            "SELECT {} FROM genetic_variants WHERE id = ANY($1)",
            VARIANT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        into_variants(rows)
    }

    async fn list_variants(&self, filter: &VariantFilter) -> AppResult<Vec<GeneticVariant>> {
        let rows = sqlx::query_as::<_, VariantRow>(&format!(
            r#"
            SELECT {}
            FROM genetic_variants
            WHERE ($1::int IS NULL OR gene_id = $1)
              AND ($2::text IS NULL OR chromosome = $2)
              AND ($3::text IS NULL OR impact = $3)
            ORDER BY chromosome ASC NULLS LAST, position ASC NULLS LAST
            "#,
            VARIANT_COLUMNS
        ))
        .bind(filter.gene_id)
        .bind(&filter.chromosome)
        .bind(filter.impact.map(|i| i.as_str()))
        .fetch_all(&self.pool)
        .await?;

        into_variants(rows)
    }

    async fn update_variant(&self, variant: &GeneticVariant) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE genetic_variants
            SET gene_id = $2, chromosome = $3, position = $4,
                reference_base = $5, alternate_base = $6, impact = $7
            WHERE id = $1
            "#,
        )
        .bind(variant.id)
        .bind(variant.gene_id)
        .bind(&variant.chromosome)
        .bind(variant.position)
        .bind(&variant.reference_base)
        .bind(&variant.alternate_base)
        .bind(variant.impact.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Referenced gene no longer exists"))?;

        Ok(())
    }

    async fn delete_variant(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM genetic_variants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_db(e, format!("Variant {} has associated reports", id))
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_reports_for_variant(&self, variant_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM patient_variant_reports WHERE variant_id = $1",
        )
        .bind(variant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_report(&self, report: &PatientVariantReport) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO patient_variant_reports
                (id, patient_id, variant_id, detection_date, allele_frequency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(report.id)
        .bind(report.patient_id)
        .bind(report.variant_id)
        .bind(report.detection_date)
        .bind(report.allele_frequency)
        .bind(report.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Referenced variant no longer exists"))?;

        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> AppResult<Option<PatientVariantReport>> {
        let report = sqlx::query_as::<_, PatientVariantReport>(
            r#"
            SELECT id, patient_id, variant_id, detection_date, allele_frequency, created_at
            FROM patient_variant_reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    async fn list_reports(&self, filter: &ReportFilter) -> AppResult<Vec<PatientVariantReport>> {
        let reports = sqlx::query_as::<_, PatientVariantReport>(
            r#"
            SELECT r.id, r.patient_id, r.variant_id, r.detection_date, r.allele_frequency, r.created_at
            FROM patient_variant_reports r
            JOIN genetic_variants v ON v.id = r.variant_id
            WHERE ($1::uuid IS NULL OR r.patient_id = $1)
              AND ($2::uuid IS NULL OR r.variant_id = $2)
              AND ($3::int IS NULL OR v.gene_id = $3)
              AND ($4::date IS NULL OR r.detection_date >= $4)
              AND ($5::date IS NULL OR r.detection_date <= $5)
            ORDER BY r.detection_date DESC, r.created_at DESC
            "#,
        )
        .bind(filter.patient_id)
        .bind(filter.variant_id)
        .bind(filter.gene_id)
        .bind(filter.detection_date_from)
        .bind(filter.detection_date_to)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    async fn update_report(&self, report: &PatientVariantReport) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE patient_variant_reports
            SET detection_date = $2, allele_frequency = $3
            WHERE id = $1
            "#,
        )
        .bind(report.id)
        .bind(report.detection_date)
        .bind(report.allele_frequency)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_report(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM patient_variant_reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
