use serde::{Deserialize, Serialize};

use crate::domain::{self, FilterArg, Notice, Repository};
use crate::error::GdcError;
use crate::gdc::{GdcClient, ProjectSummary};
use crate::request;
use crate::tissue;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ProjectArg {
    One(String),
    Many(Vec<String>),
}

impl ProjectArg {
    fn into_vec(self) -> Vec<String> {
        match self {
            ProjectArg::One(value) => vec![value],
            ProjectArg::Many(values) => values,
        }
    }
}

/// Query arguments as received from a caller or a config file, before the
/// optional filters are normalized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawCriteria {
    pub project: ProjectArg,
    pub data_category: String,
    #[serde(default)]
    pub data_type: FilterArg<String>,
    #[serde(default)]
    pub workflow_type: FilterArg<String>,
    #[serde(default)]
    pub file_type: FilterArg<String>,
    #[serde(default)]
    pub access: FilterArg<String>,
    #[serde(default, deserialize_with = "domain::deserialize_list")]
    pub experimental_strategy: FilterArg<Vec<String>>,
    #[serde(default)]
    pub platform: FilterArg<String>,
    #[serde(default, deserialize_with = "domain::deserialize_list")]
    pub sample_type: FilterArg<Vec<String>>,
    #[serde(default, deserialize_with = "domain::deserialize_list")]
    pub barcode: FilterArg<Vec<String>>,
    #[serde(default)]
    pub legacy: bool,
}

impl RawCriteria {
    pub fn new(project: impl Into<String>, data_category: impl Into<String>) -> Self {
        Self {
            project: ProjectArg::One(project.into()),
            data_category: data_category.into(),
            data_type: FilterArg::Unset,
            workflow_type: FilterArg::Unset,
            file_type: FilterArg::Unset,
            access: FilterArg::Unset,
            experimental_strategy: FilterArg::Unset,
            platform: FilterArg::Unset,
            sample_type: FilterArg::Unset,
            barcode: FilterArg::Unset,
            legacy: false,
        }
    }
}

/// Normalized query criteria. `None` means the corresponding filter stage is
/// skipped, whether the caller left the argument out or disabled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCriteria {
    pub projects: Vec<String>,
    pub data_category: String,
    pub data_type: Option<String>,
    pub workflow_type: Option<String>,
    pub file_type: Option<String>,
    pub access: Option<String>,
    pub experimental_strategy: Option<Vec<String>>,
    pub platform: Option<String>,
    pub sample_type: Option<Vec<String>>,
    pub barcode: Option<Vec<String>>,
    pub legacy: bool,
}

impl QueryCriteria {
    pub fn repository(&self) -> Repository {
        Repository::from_legacy(self.legacy)
    }

    /// Platform filtering only exists in the legacy repository.
    pub fn effective_platform(&self) -> Option<&str> {
        if self.legacy {
            self.platform.as_deref()
        } else {
            None
        }
    }
}

impl From<RawCriteria> for QueryCriteria {
    fn from(raw: RawCriteria) -> Self {
        normalize(raw)
    }
}

pub fn normalize(raw: RawCriteria) -> QueryCriteria {
    let projects = raw
        .project
        .into_vec()
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();

    QueryCriteria {
        projects,
        data_category: raw.data_category.trim().to_string(),
        data_type: raw.data_type.into_option(),
        workflow_type: raw.workflow_type.into_option(),
        file_type: raw.file_type.into_option(),
        access: raw.access.into_option(),
        experimental_strategy: raw.experimental_strategy.into_option(),
        platform: raw.platform.into_option(),
        sample_type: raw.sample_type.into_option(),
        barcode: raw.barcode.into_option(),
        legacy: raw.legacy,
    }
}

pub fn validate_project(project: &str, valid: &[String]) -> Result<(), GdcError> {
    if valid.iter().any(|id| id == project) {
        return Ok(());
    }
    let mut valid = valid.to_vec();
    valid.sort();
    Err(GdcError::InvalidProject {
        project: project.to_string(),
        valid,
    })
}

/// Checks the category against the project summary and hands the summary
/// back so its file counts can size the search.
pub fn validate_category<C: GdcClient + ?Sized>(
    catalog: &C,
    project: &str,
    category: &str,
    legacy: bool,
) -> Result<ProjectSummary, GdcError> {
    let summary = catalog.project_summary(project, legacy)?;
    if summary.category(category).is_some() {
        return Ok(summary);
    }
    Err(GdcError::InvalidCategory {
        project: project.to_string(),
        category: category.to_string(),
        legacy,
        valid: summary
            .data_categories
            .into_iter()
            .map(|entry| entry.data_category)
            .collect(),
    })
}

pub fn validate_sample_type(values: &[String]) -> Result<(), GdcError> {
    let unknown = values
        .iter()
        .filter(|value| !tissue::is_known_definition(value))
        .cloned()
        .collect::<Vec<_>>();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(GdcError::InvalidBarcodeDefinition {
        values: unknown,
        valid: tissue::known_definitions()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Outcome of the up-front checks: non-fatal notices and the page size of
/// every project, in project order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub notices: Vec<Notice>,
    pub page_sizes: Vec<u64>,
}

/// Runs every up-front check for a normalized query. The project catalog is
/// fetched once; each project summary is fetched once.
pub fn validate<C: GdcClient + ?Sized>(
    catalog: &C,
    criteria: &QueryCriteria,
) -> Result<Validation, GdcError> {
    let valid_projects = catalog.project_ids(criteria.legacy)?;
    if criteria.projects.is_empty() {
        return Err(GdcError::InvalidProject {
            project: String::new(),
            valid: valid_projects,
        });
    }

    let mut page_sizes = Vec::with_capacity(criteria.projects.len());
    for project in &criteria.projects {
        validate_project(project, &valid_projects)?;
        let summary =
            validate_category(catalog, project, &criteria.data_category, criteria.legacy)?;
        page_sizes.push(request::page_size(&summary, &criteria.data_category));
    }
    if let Some(sample_type) = &criteria.sample_type {
        validate_sample_type(sample_type)?;
    }

    let mut notices = Vec::new();
    if let Some(platform) = &criteria.platform {
        if !criteria.legacy {
            let notice = Notice::IgnoredPlatform {
                platform: platform.clone(),
            };
            tracing::warn!("{notice}");
            notices.push(notice);
        }
    }
    Ok(Validation {
        notices,
        page_sizes,
    })
}
