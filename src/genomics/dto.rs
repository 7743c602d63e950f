//! Wire shapes for the genomics API (snake_case JSON).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{Gene, GeneticVariant, Impact, PatientVariantReport};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGeneRequest {
    pub symbol: String,
    pub full_name: Option<String>,
    pub function_summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGeneRequest {
    pub symbol: Option<String>,
    pub full_name: Option<String>,
    pub function_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVariantRequest {
    pub gene_id: i32,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub reference_base: Option<String>,
    pub alternate_base: Option<String>,
    #[serde(default)]
    pub impact: Impact,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVariantRequest {
    pub gene_id: Option<i32>,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub reference_base: Option<String>,
    pub alternate_base: Option<String>,
    pub impact: Option<Impact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportRequest {
    pub patient_id: Uuid,
    pub variant_id: Uuid,
    pub detection_date: NaiveDate,
    pub allele_frequency: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReportRequest {
    pub detection_date: Option<NaiveDate>,
    pub allele_frequency: Option<f64>,
}

/// `GET /variants` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantQuery {
    pub gene_id: Option<i32>,
    pub chromosome: Option<String>,
    /// Parsed by the service so an unknown value reports the valid ones
    pub impact: Option<String>,
}

/// `GET /genes/search` and `GET /variants/by-impact` query strings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub symbol: Option<String>,
    pub impact: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneResponse {
    pub id: i32,
    pub symbol: String,
    pub full_name: Option<String>,
    pub function_summary: Option<String>,
}

impl GeneResponse {
    pub fn from_gene(gene: &Gene) -> Self {
        Self {
            id: gene.id,
            symbol: gene.symbol.clone(),
            full_name: gene.full_name.clone(),
            function_summary: gene.function_summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantResponse {
    pub id: Uuid,
    pub gene_id: i32,
    pub gene_symbol: Option<String>,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub reference_base: Option<String>,
    pub alternate_base: Option<String>,
    pub impact: Impact,
}

impl VariantResponse {
    pub fn from_variant(variant: &GeneticVariant, gene: Option<&Gene>) -> Self {
        Self {
            id: variant.id,
            gene_id: variant.gene_id,
            gene_symbol: gene.map(|g| g.symbol.clone()),
            chromosome: variant.chromosome.clone(),
            position: variant.position,
            reference_base: variant.reference_base.clone(),
            alternate_base: variant.alternate_base.clone(),
            impact: variant.impact,
        }
    }
}

/// Report flattened with its variant, gene symbol and patient name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Null when the clinical service could not be reached
    pub patient_name: Option<String>,
    pub variant_id: Uuid,
    pub gene_symbol: Option<String>,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub impact: Option<Impact>,
    pub detection_date: NaiveDate,
    pub allele_frequency: Option<f64>,
}

impl ReportResponse {
    pub fn from_report(report: &PatientVariantReport) -> Self {
        Self {
            id: report.id,
            patient_id: report.patient_id,
            patient_name: None,
            variant_id: report.variant_id,
            gene_symbol: None,
            chromosome: None,
            position: None,
            impact: None,
            detection_date: report.detection_date,
            allele_frequency: report.allele_frequency,
        }
    }

    pub fn with_variant(mut self, variant: Option<&GeneticVariant>, gene: Option<&Gene>) -> Self {
        if let Some(variant) = variant {
            self.chromosome = variant.chromosome.clone();
            self.position = variant.position;
            self.impact = Some(variant.impact);
        }
        self.gene_symbol = gene.map(|g| g.symbol.clone());
        self
    }

    pub fn with_patient_name(mut self, name: Option<String>) -> Self {
        self.patient_name = name;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_variant_request_defaults_impact() {
        let request: CreateVariantRequest =
            serde_json::from_value(json!({ "gene_id": 1, "chromosome": "17" })).unwrap();
        assert_eq!(request.impact, Impact::Unknown);
        assert_eq!(request.position, None);

        let bad = serde_json::from_value::<CreateVariantRequest>(
            json!({ "gene_id": 1, "impact": "Severe" }),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_report_response_is_flat_snake_case() {
        let gene = Gene {
            id: 3,
            symbol: "TP53".to_string(),
            full_name: None,
            function_summary: None,
        };
        let variant = GeneticVariant {
            id: Uuid::new_v4(),
            gene_id: 3,
            chromosome: Some("17".to_string()),
            position: Some(7_675_088),
            reference_base: Some("C".to_string()),
            alternate_base: Some("T".to_string()),
            impact: Impact::Nonsense,
        };
        let report = PatientVariantReport {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            variant_id: variant.id,
            detection_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            allele_frequency: Some(37.5),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(
            ReportResponse::from_report(&report)
                .with_variant(Some(&variant), Some(&gene))
                .with_patient_name(Some("Ada Lovelace".to_string())),
        )
        .unwrap();

        assert_eq!(value["patient_name"], "Ada Lovelace");
        assert_eq!(value["gene_symbol"], "TP53");
        assert_eq!(value["chromosome"], "17");
        assert_eq!(value["position"], 7_675_088);
        assert_eq!(value["impact"], "Nonsense");
        assert_eq!(value["detection_date"], "2024-04-02");
        assert_eq!(value["allele_frequency"], 37.5);
        assert!(value.get("created_at").is_none());
    }
}
