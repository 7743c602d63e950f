use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Predicted effect of a variant on the protein
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Impact {
    Missense,
    Frameshift,
    Nonsense,
    Silent,
    #[default]
    Unknown,
}

impl Impact {
    pub const ALL: [Impact; 5] = [
        Impact::Missense,
        Impact::Frameshift,
        Impact::Nonsense,
        Impact::Silent,
        Impact::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Missense => "Missense",
            Impact::Frameshift => "Frameshift",
            Impact::Nonsense => "Nonsense",
            Impact::Silent => "Silent",
            Impact::Unknown => "Unknown",
        }
    }
}

impl FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Impact::ALL
            .into_iter()
            .find(|impact| impact.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "impact must be one of: {}",
                    Impact::ALL.map(|i| i.as_str()).join(", ")
                )
            })
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Gene {
    pub id: i32,
    pub symbol: String,
    pub full_name: Option<String>,
    pub function_summary: Option<String>,
}

/// Gene before the store assigns its id
#[derive(Debug, Clone)]
pub struct NewGene {
    pub symbol: String,
    pub full_name: Option<String>,
    pub function_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneticVariant {
    pub id: Uuid,
    pub gene_id: i32,
    pub chromosome: Option<String>,
    pub position: Option<i64>,
    pub reference_base: Option<String>,
    pub alternate_base: Option<String>,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PatientVariantReport {
    pub id: Uuid,
    /// Patient owned by the clinical service
    pub patient_id: Uuid,
    pub variant_id: Uuid,
    pub detection_date: NaiveDate,
    pub allele_frequency: Option<f64>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// List filters
// ============================================================================

/// Partial, case-insensitive matches; all given filters must hold
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneFilter {
    pub symbol: Option<String>,
    pub full_name: Option<String>,
    /// Matches symbol or full name
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VariantFilter {
    pub gene_id: Option<i32>,
    /// Exact match
    pub chromosome: Option<String>,
    pub impact: Option<Impact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub patient_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub gene_id: Option<i32>,
    pub detection_date_from: Option<NaiveDate>,
    pub detection_date_to: Option<NaiveDate>,
}

/// Case-insensitive substring test used by the in-memory store
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_parsing_is_exact() {
        assert_eq!("Missense".parse::<Impact>().unwrap(), Impact::Missense);
        assert_eq!(Impact::default(), Impact::Unknown);

        let err = "High".parse::<Impact>().unwrap_err();
        assert!(err.contains("Missense, Frameshift, Nonsense, Silent, Unknown"));
        assert!("missense".parse::<Impact>().is_err());
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("BRCA1", "brc"));
        assert!(contains_ci("Tumor protein p53", "PROTEIN"));
        assert!(!contains_ci("TP53", "brca"));
    }
}
