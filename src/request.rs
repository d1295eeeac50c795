use std::fmt;

use serde_json::json;

use crate::domain::{CategoryClass, Repository};
use crate::gdc::ProjectSummary;

pub const DEFAULT_BASE_URL: &str = "https://api.gdc.cancer.gov";

/// Nested fields requested alongside each file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    LegacyProtein,
    CaseLevel,
    AliquotLevel,
}

impl Expansion {
    pub fn select(class: CategoryClass, repository: Repository) -> Self {
        match (class, repository) {
            (CategoryClass::ProteinExpression, Repository::Legacy) => Expansion::LegacyProtein,
            (CategoryClass::ClinicalOrBiospecimen, _) => Expansion::CaseLevel,
            (CategoryClass::ProteinExpression, Repository::Harmonized)
            | (CategoryClass::Other, _) => Expansion::AliquotLevel,
        }
    }

    pub fn fields(self) -> &'static str {
        match self {
            Expansion::LegacyProtein => "cases.samples.portions,cases.project,center,analysis",
            Expansion::CaseLevel => "cases,cases.project,center,analysis",
            Expansion::AliquotLevel => {
                "cases.samples.portions.analytes.aliquots,cases.project,center,analysis,cases.samples"
            }
        }
    }
}

/// A fully built search request: the files endpoint of one repository plus
/// the encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub repository: Repository,
    pub endpoint: String,
    pub query: String,
}

impl SearchRequest {
    pub fn url(&self) -> String {
        format!("{}?{}", self.endpoint, self.query)
    }
}

impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

pub fn files_endpoint(base_url: &str, repository: Repository) -> String {
    format!(
        "{}{}/files",
        base_url.trim_end_matches('/'),
        repository.path_prefix()
    )
}

/// JSON filter selecting the files of one project within one data category.
pub fn filter_expression(project: &str, category: &str) -> String {
    json!({
        "op": "and",
        "content": [
            {"op": "in", "content": {"field": "cases.project.project_id", "value": [project]}},
            {"op": "in", "content": {"field": "files.data_category", "value": [category]}}
        ]
    })
    .to_string()
}

pub fn build_search_request(
    base_url: &str,
    project: &str,
    category: &str,
    legacy: bool,
    size: u64,
) -> SearchRequest {
    let repository = Repository::from_legacy(legacy);
    let expansion = Expansion::select(CategoryClass::of(category), repository);
    let query = format!(
        "pretty=true&expand={}&size={size}&format=JSON&filters={}",
        expansion.fields(),
        encode_url_component(&filter_expression(project, category))
    );
    SearchRequest {
        repository,
        endpoint: files_endpoint(base_url, repository),
        query,
    }
}

/// Number of files a project summary lists for a category. Used as the page
/// size so a single page carries every hit.
pub fn page_size(summary: &ProjectSummary, category: &str) -> u64 {
    summary
        .category(category)
        .map(|entry| entry.file_count)
        .unwrap_or(0)
}

pub(crate) fn encode_url_component(value: &str) -> String {
    let mut out = String::new();
    for byte in value.as_bytes() {
        let ch = *byte as char;
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == '~' {
            out.push(ch);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
