use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Repository;
use crate::error::GdcError;
use crate::request::{self, DEFAULT_BASE_URL, SearchRequest};

/// One file record as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RawHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub data_category: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub experimental_strategy: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
    #[serde(default)]
    pub cases: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Analysis {
    #[serde(default)]
    pub workflow_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct HitPage<T> {
    #[serde(default = "Vec::new")]
    hits: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ProjectRecord {
    project_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategorySummary {
    pub data_category: String,
    #[serde(default)]
    pub file_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ProjectSummary {
    #[serde(default)]
    pub data_categories: Vec<CategorySummary>,
}

impl ProjectSummary {
    pub fn category(&self, category: &str) -> Option<&CategorySummary> {
        self.data_categories
            .iter()
            .find(|entry| entry.data_category == category)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectDetail {
    #[serde(default)]
    summary: Option<ProjectSummary>,
}

/// Access to the repository: the project catalog used for validation and
/// page sizing, and the file search itself.
pub trait GdcClient: Send + Sync {
    fn project_ids(&self, legacy: bool) -> Result<Vec<String>, GdcError>;
    fn project_summary(&self, project: &str, legacy: bool) -> Result<ProjectSummary, GdcError>;
    fn search(&self, request: &SearchRequest) -> Result<Vec<RawHit>, GdcError>;

    fn file_count(&self, project: &str, category: &str, legacy: bool) -> Result<u64, GdcError> {
        let summary = self.project_summary(project, legacy)?;
        Ok(request::page_size(&summary, category))
    }
}

#[derive(Clone)]
pub struct GdcHttpClient {
    client: Client,
    base_url: String,
}

impl GdcHttpClient {
    pub fn new() -> Result<Self, GdcError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, GdcError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gdc-query/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GdcError::GdcHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| GdcError::GdcHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn projects_url(&self, legacy: bool) -> String {
        format!(
            "{}{}/projects",
            self.base_url,
            Repository::from_legacy(legacy).path_prefix()
        )
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, GdcError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "GDC request failed".to_string());
        Err(GdcError::GdcStatus { status, message })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GdcError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GdcError::GdcHttp(err.to_string()))?;
        Self::handle_status(response)?
            .json()
            .map_err(|err| GdcError::GdcDecode(err.to_string()))
    }

    /// Decodes straight from the response first. If that fails for any
    /// reason the URL is fetched again and the body parsed from text.
    fn get_json_with_fallback<T: DeserializeOwned>(&self, url: &str) -> Result<T, GdcError> {
        let primary = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.json::<T>());
        match primary {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!("direct JSON decode failed ({err}); refetching as text");
                let response = self
                    .client
                    .get(url)
                    .send()
                    .map_err(|err| GdcError::GdcHttp(err.to_string()))?;
                let body = Self::handle_status(response)?
                    .text()
                    .map_err(|err| GdcError::GdcHttp(err.to_string()))?;
                parse_json_body(&body)
            }
        }
    }
}

impl GdcClient for GdcHttpClient {
    fn project_ids(&self, legacy: bool) -> Result<Vec<String>, GdcError> {
        let url = format!(
            "{}?size=1000&fields=project_id&format=JSON",
            self.projects_url(legacy)
        );
        let envelope: Envelope<HitPage<ProjectRecord>> = self.get_json(&url)?;
        Ok(envelope
            .data
            .hits
            .into_iter()
            .map(|record| record.project_id)
            .collect())
    }

    fn project_summary(&self, project: &str, legacy: bool) -> Result<ProjectSummary, GdcError> {
        let url = format!(
            "{}/{}?expand=summary,summary.data_categories&format=JSON",
            self.projects_url(legacy),
            project
        );
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| GdcError::GdcHttp(err.to_string()))?;
        if response.status().as_u16() == 404 {
            return Ok(ProjectSummary::default());
        }
        let envelope: Envelope<ProjectDetail> = Self::handle_status(response)?
            .json()
            .map_err(|err| GdcError::GdcDecode(err.to_string()))?;
        Ok(envelope.data.summary.unwrap_or_default())
    }

    fn search(&self, request: &SearchRequest) -> Result<Vec<RawHit>, GdcError> {
        let url = request.url();
        tracing::debug!("GET {url}");
        let envelope: Envelope<HitPage<RawHit>> = self.get_json_with_fallback(&url)?;
        Ok(envelope.data.hits)
    }
}

/// Parses a search response body into its hit list.
pub fn parse_search_response(body: &str) -> Result<Vec<RawHit>, GdcError> {
    let envelope: Envelope<HitPage<RawHit>> = parse_json_body(body)?;
    Ok(envelope.data.hits)
}

fn parse_json_body<T: DeserializeOwned>(body: &str) -> Result<T, GdcError> {
    serde_json::from_str(body).map_err(|err| GdcError::GdcDecode(err.to_string()))
}
