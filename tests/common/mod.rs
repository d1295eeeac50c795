#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use serde_json::json;

use gdc_cohort_query::app::ProgressEvent;
use gdc_cohort_query::app::ProgressSink;
use gdc_cohort_query::error::GdcError;
use gdc_cohort_query::gdc::{Analysis, CategorySummary, GdcClient, ProjectSummary, RawHit};
use gdc_cohort_query::request::SearchRequest;

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct MockGdc {
    pub projects: Vec<String>,
    pub categories: Vec<CategorySummary>,
    pub hits: Vec<(String, Vec<RawHit>)>,
    pub requests: Arc<Mutex<Vec<SearchRequest>>>,
    pub catalog: Arc<Mutex<Vec<String>>>,
}

impl MockGdc {
    pub fn new(project: &str, category: &str, hits: Vec<RawHit>) -> Self {
        Self {
            projects: vec![project.to_string(), "TARGET-AML".to_string()],
            categories: vec![
                CategorySummary {
                    data_category: category.to_string(),
                    file_count: hits.len() as u64,
                },
                CategorySummary {
                    data_category: "Biospecimen".to_string(),
                    file_count: 7,
                },
            ],
            hits: vec![(project.to_string(), hits)],
            requests: Arc::new(Mutex::new(Vec::new())),
            catalog: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of search requests, still readable after the mock is
    /// moved into an `App`.
    pub fn request_log(&self) -> Arc<Mutex<Vec<SearchRequest>>> {
        Arc::clone(&self.requests)
    }

    /// Shared log of catalog lookups (`projects`, `summary <id>`).
    pub fn catalog_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.catalog)
    }
}

impl GdcClient for MockGdc {
    fn project_ids(&self, _legacy: bool) -> Result<Vec<String>, GdcError> {
        self.catalog.lock().unwrap().push("projects".to_string());
        Ok(self.projects.clone())
    }

    fn project_summary(&self, project: &str, _legacy: bool) -> Result<ProjectSummary, GdcError> {
        self.catalog.lock().unwrap().push(format!("summary {project}"));
        if !self.projects.iter().any(|id| id == project) {
            return Ok(ProjectSummary::default());
        }
        Ok(ProjectSummary {
            data_categories: self.categories.clone(),
        })
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<RawHit>, GdcError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .hits
            .iter()
            .find(|(project, _)| request.query.contains(project.as_str()))
            .map(|(_, hits)| hits.clone())
            .unwrap_or_default())
    }
}

/// Builder for raw search hits carrying a nested aliquot barcode.
pub struct HitBuilder {
    hit: RawHit,
}

impl HitBuilder {
    pub fn new(id: &str, barcode: &str) -> Self {
        let case_id = barcode.get(..12).unwrap_or(barcode);
        Self {
            hit: RawHit {
                id: Some(id.to_string()),
                file_name: Some(format!("{id}.txt")),
                data_category: Some("Transcriptome Profiling".to_string()),
                data_type: Some("Gene Expression Quantification".to_string()),
                access: Some("open".to_string()),
                experimental_strategy: Some("RNA-Seq".to_string()),
                analysis: Some(Analysis {
                    workflow_type: Some("STAR - Counts".to_string()),
                }),
                cases: vec![json!({
                    "submitter_id": case_id,
                    "project": {"project_id": "TCGA-ACC"},
                    "samples": [{
                        "portions": [{
                            "analytes": [{
                                "aliquots": [{"submitter_id": barcode}]
                            }]
                        }]
                    }]
                })],
                ..RawHit::default()
            },
        }
    }

    pub fn file_name(mut self, value: &str) -> Self {
        self.hit.file_name = Some(value.to_string());
        self
    }

    pub fn data_type(mut self, value: &str) -> Self {
        self.hit.data_type = Some(value.to_string());
        self
    }

    pub fn workflow(mut self, value: &str) -> Self {
        self.hit.analysis = Some(Analysis {
            workflow_type: Some(value.to_string()),
        });
        self
    }

    pub fn strategy(mut self, value: &str) -> Self {
        self.hit.experimental_strategy = Some(value.to_string());
        self
    }

    pub fn platform(mut self, value: &str) -> Self {
        self.hit.platform = Some(value.to_string());
        self
    }

    pub fn access(mut self, value: &str) -> Self {
        self.hit.access = Some(value.to_string());
        self
    }

    pub fn no_cases(mut self) -> Self {
        self.hit.cases = vec![json!({"project": {"project_id": "TCGA-ACC"}})];
        self
    }

    pub fn build(self) -> RawHit {
        self.hit
    }
}

pub fn ids(hits: &[gdc_cohort_query::barcode::Hit]) -> Vec<&str> {
    hits.iter()
        .filter_map(|hit| hit.file_id.as_deref())
        .collect()
}
