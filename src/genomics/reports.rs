use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::clinic_client::PatientDirectory;
use super::dto::{CreateReportRequest, ReportResponse, UpdateReportRequest};
use super::models::{GeneticVariant, PatientVariantReport, ReportFilter};
use super::store::GenomicsStore;
use super::variants::{genes_for, VariantService};
use crate::db;
use crate::error::{AppError, AppResult};

const MAX_ALLELE_FREQUENCY: f64 = 100.0;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn GenomicsStore>,
    variants: VariantService,
    patients: Arc<dyn PatientDirectory>,
}

impl ReportService {
    pub fn new(store: Arc<dyn GenomicsStore>, patients: Arc<dyn PatientDirectory>) -> Self {
        Self {
            variants: VariantService::new(store.clone()),
            store,
            patients,
        }
    }

    /// The variant must exist locally and the patient in the clinical
    /// service; nothing is written otherwise.
    pub async fn create(&self, request: CreateReportRequest) -> AppResult<ReportResponse> {
        let allele_frequency = check_allele_frequency(request.allele_frequency)?;
        self.variants.require(request.variant_id).await?;

        let patient = self
            .patients
            .find_patient(request.patient_id)
            .await?
            .ok_or_else(|| unknown_patient(request.patient_id))?;

        let report = PatientVariantReport {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            variant_id: request.variant_id,
            detection_date: request.detection_date,
            allele_frequency,
            created_at: db::timestamp_now(),
        };

        self.store.insert_report(&report).await?;
        tracing::info!(
            report_id = %report.id,
            patient_id = %report.patient_id,
            variant_id = %report.variant_id,
            "Patient variant report created"
        );

        Ok(self.enrich_one(report).await?.with_patient_name(Some(patient.name)))
    }

    pub async fn list(&self, filter: ReportFilter) -> AppResult<Vec<ReportResponse>> {
        let reports = self.store.list_reports(&filter).await?;
        let names = self.patient_names(&reports).await;

        Ok(self
            .enrich(&reports)
            .await?
            .into_iter()
            .map(|r| {
                let name = names.get(&r.patient_id).cloned();
                r.with_patient_name(name)
            })
            .collect())
    }

    /// 404 when the clinical service does not know the patient
    pub async fn list_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<ReportResponse>> {
        let patient = self
            .patients
            .find_patient(patient_id)
            .await?
            .ok_or_else(|| unknown_patient(patient_id))?;

        let reports = self
            .store
            .list_reports(&ReportFilter {
                patient_id: Some(patient_id),
                ..Default::default()
            })
            .await?;

        Ok(self
            .enrich(&reports)
            .await?
            .into_iter()
            .map(|r| r.with_patient_name(Some(patient.name.clone())))
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ReportResponse> {
        let report = self.require(id).await?;
        self.detailed(report).await
    }

    /// Only detection date and allele frequency change
    pub async fn update(&self, id: Uuid, request: UpdateReportRequest) -> AppResult<ReportResponse> {
        let mut report = self.require(id).await?;

        if let Some(detection_date) = request.detection_date {
            report.detection_date = detection_date;
        }
        if request.allele_frequency.is_some() {
            report.allele_frequency = check_allele_frequency(request.allele_frequency)?;
        }

        self.store.update_report(&report).await?;
        tracing::info!(report_id = %id, "Patient variant report updated");

        self.detailed(report).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_report(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(report_id = %id, "Patient variant report deleted");
        Ok(())
    }

    async fn require(&self, id: Uuid) -> AppResult<PatientVariantReport> {
        self.store
            .get_report(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn detailed(&self, report: PatientVariantReport) -> AppResult<ReportResponse> {
        let name = self.patient_name(report.patient_id).await;
        Ok(self.enrich_one(report).await?.with_patient_name(name))
    }

    async fn enrich_one(&self, report: PatientVariantReport) -> AppResult<ReportResponse> {
        self.enrich(std::slice::from_ref(&report))
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("Report enrichment produced no row"))
    }

    /// Adds variant and gene fields; patient names are left empty
    async fn enrich(&self, reports: &[PatientVariantReport]) -> AppResult<Vec<ReportResponse>> {
        let variant_ids: Vec<Uuid> = reports
            .iter()
            .map(|r| r.variant_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let variants: Vec<GeneticVariant> = self.store.get_variants(&variant_ids).await?;
        let genes = genes_for(self.store.as_ref(), &variants).await?;
        let variants: HashMap<Uuid, GeneticVariant> =
            variants.into_iter().map(|v| (v.id, v)).collect();

        Ok(reports
            .iter()
            .map(|report| {
                let variant = variants.get(&report.variant_id);
                let gene = variant.and_then(|v| genes.get(&v.gene_id));
                ReportResponse::from_report(report).with_variant(variant, gene)
            })
            .collect())
    }

    /// Names for the distinct patients in `reports`; lookups that fail are skipped
    async fn patient_names(&self, reports: &[PatientVariantReport]) -> HashMap<Uuid, String> {
        let ids: BTreeSet<Uuid> = reports.iter().map(|r| r.patient_id).collect();

        let mut names = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(name) = self.patient_name(id).await {
                names.insert(id, name);
            }
        }
        names
    }

    async fn patient_name(&self, id: Uuid) -> Option<String> {
        match self.patients.find_patient(id).await {
            Ok(patient) => patient.map(|p| p.name),
            Err(e) => {
                tracing::warn!(patient_id = %id, error = %e, "Patient name unavailable");
                None
            }
        }
    }
}

fn check_allele_frequency(value: Option<f64>) -> AppResult<Option<f64>> {
    match value {
        Some(f) if !(0.0..=MAX_ALLELE_FREQUENCY).contains(&f) => Err(AppError::validation(
            "allele_frequency must be between 0 and 100",
        )),
        other => Ok(other),
    }
}

fn unknown_patient(id: Uuid) -> AppError {
    AppError::not_found(format!(
        "Patient with id {} not found in clinical service",
        id
    ))
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Report with id {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::clinic_client::PatientInfo;
    use crate::genomics::dto::{CreateGeneRequest, CreateVariantRequest};
    use crate::genomics::genes::GeneService;
    use crate::genomics::models::Impact;
    use crate::genomics::store::MemoryGenomicsStore;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Directory with one known patient that can be switched offline
    struct FakeDirectory {
        known: PatientInfo,
        offline: AtomicBool,
    }

    #[async_trait::async_trait]
    impl PatientDirectory for FakeDirectory {
        async fn find_patient(&self, id: Uuid) -> AppResult<Option<PatientInfo>> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(AppError::upstream("Clinical service unavailable"));
            }
            Ok((id == self.known.id).then(|| self.known.clone()))
        }
    }

    struct Fixture {
        reports: ReportService,
        store: Arc<dyn GenomicsStore>,
        directory: Arc<FakeDirectory>,
        patient_id: Uuid,
        variant_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn GenomicsStore> = Arc::new(MemoryGenomicsStore::new());
        let gene = GeneService::new(store.clone())
            .create(CreateGeneRequest {
                symbol: "BRCA1".to_string(),
                full_name: None,
                function_summary: None,
            })
            .await
            .unwrap();
        let variant = VariantService::new(store.clone())
            .create(CreateVariantRequest {
                gene_id: gene.id,
                chromosome: Some("17".to_string()),
                position: Some(43_045_712),
                reference_base: Some("G".to_string()),
                alternate_base: Some("A".to_string()),
                impact: Impact::Frameshift,
            })
            .await
            .unwrap();

        let directory = Arc::new(FakeDirectory {
            known: PatientInfo {
                id: Uuid::new_v4(),
                name: "Ada Lovelace".to_string(),
            },
            offline: AtomicBool::new(false),
        });

        Fixture {
            reports: ReportService::new(store.clone(), directory.clone()),
            store,
            patient_id: directory.known.id,
            directory,
            variant_id: variant.id,
        }
    }

    fn request(patient_id: Uuid, variant_id: Uuid) -> CreateReportRequest {
        CreateReportRequest {
            patient_id,
            variant_id,
            detection_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            allele_frequency: Some(42.0),
        }
    }

    #[tokio::test]
    async fn test_create_is_enriched() {
        let f = fixture().await;
        let created = f
            .reports
            .create(request(f.patient_id, f.variant_id))
            .await
            .unwrap();

        assert_eq!(created.patient_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(created.gene_symbol.as_deref(), Some("BRCA1"));
        assert_eq!(created.impact, Some(Impact::Frameshift));
        assert_eq!(created.position, Some(43_045_712));
    }

    #[tokio::test]
    async fn test_unknown_patient_writes_nothing() {
        let f = fixture().await;
        let err = f
            .reports
            .create(request(Uuid::new_v4(), f.variant_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(f
            .store
            .list_reports(&ReportFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_variant_is_not_found() {
        let f = fixture().await;
        let err = f
            .reports
            .create(request(f.patient_id, Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_allele_frequency_range() {
        let f = fixture().await;
        let mut bad = request(f.patient_id, f.variant_id);
        bad.allele_frequency = Some(100.5);
        assert!(matches!(
            f.reports.create(bad).await,
            Err(AppError::Validation(_))
        ));

        let created = f
            .reports
            .create(request(f.patient_id, f.variant_id))
            .await
            .unwrap();
        let err = f
            .reports
            .update(
                created.id,
                UpdateReportRequest {
                    detection_date: NaiveDate::from_ymd_opt(2020, 1, 1),
                    allele_frequency: Some(-1.0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            f.reports.get(created.id).await.unwrap().detection_date,
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
        );
    }

    #[tokio::test]
    async fn test_clinic_outage_leaves_name_empty_on_reads() {
        let f = fixture().await;
        let created = f
            .reports
            .create(request(f.patient_id, f.variant_id))
            .await
            .unwrap();

        f.directory.offline.store(true, Ordering::SeqCst);

        let listed = f.reports.list(ReportFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].patient_name, None);
        assert_eq!(listed[0].gene_symbol.as_deref(), Some("BRCA1"));

        assert_eq!(f.reports.get(created.id).await.unwrap().patient_name, None);

        // validation needs an answer, so writes and by-patient reads fail
        assert!(matches!(
            f.reports.create(request(f.patient_id, f.variant_id)).await,
            Err(AppError::Upstream(_))
        ));
        assert!(matches!(
            f.reports.list_for_patient(f.patient_id).await,
            Err(AppError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_list_for_patient() {
        let f = fixture().await;
        f.reports
            .create(request(f.patient_id, f.variant_id))
            .await
            .unwrap();

        let listed = f.reports.list_for_patient(f.patient_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].patient_name.as_deref(), Some("Ada Lovelace"));

        assert!(matches!(
            f.reports.list_for_patient(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_report_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.reports.delete(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
