use std::collections::HashMap;

use regex::Regex;

use crate::barcode::Hit;
use crate::criteria::QueryCriteria;
use crate::domain::Notice;
use crate::error::GdcError;

/// What a stage does when the requested value is not among the values
/// observed in the current hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the query with an error listing the valid values.
    Reject,
    /// Emit a notice and leave the hits untouched.
    Warn,
    /// Never checked; the stage only narrows.
    Narrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Platform,
    SampleType,
    Barcode,
    Access,
    ExperimentalStrategy,
    DataType,
    WorkflowType,
    FileType,
}

enum Selection {
    Skip,
    Mismatch {
        requested: Vec<String>,
        valid: Vec<String>,
    },
    Keep(Vec<bool>),
}

impl FilterStage {
    pub const ORDER: [FilterStage; 8] = [
        FilterStage::Platform,
        FilterStage::SampleType,
        FilterStage::Barcode,
        FilterStage::Access,
        FilterStage::ExperimentalStrategy,
        FilterStage::DataType,
        FilterStage::WorkflowType,
        FilterStage::FileType,
    ];

    pub fn policy(self) -> FailurePolicy {
        match self {
            FilterStage::Platform | FilterStage::DataType | FilterStage::WorkflowType => {
                FailurePolicy::Reject
            }
            FilterStage::ExperimentalStrategy => FailurePolicy::Warn,
            FilterStage::SampleType
            | FilterStage::Barcode
            | FilterStage::Access
            | FilterStage::FileType => FailurePolicy::Narrow,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterStage::Platform => "platform",
            FilterStage::SampleType => "sample_type",
            FilterStage::Barcode => "barcode",
            FilterStage::Access => "access",
            FilterStage::ExperimentalStrategy => "experimental_strategy",
            FilterStage::DataType => "data_type",
            FilterStage::WorkflowType => "workflow_type",
            FilterStage::FileType => "file_type",
        }
    }

    /// Runs this stage over `hits`. Surviving hits keep their relative order.
    pub fn apply(
        self,
        criteria: &QueryCriteria,
        hits: Vec<Hit>,
        notices: &mut Vec<Notice>,
    ) -> Result<Vec<Hit>, GdcError> {
        match self.select(criteria, &hits)? {
            Selection::Skip => Ok(hits),
            Selection::Keep(mask) => {
                let mut flags = mask.into_iter();
                let mut hits = hits;
                hits.retain(|_| flags.next().unwrap_or(false));
                Ok(hits)
            }
            Selection::Mismatch { requested, valid } => match self.policy() {
                FailurePolicy::Reject => match self.rejection(requested, valid) {
                    Some(err) => Err(err),
                    None => Ok(hits),
                },
                FailurePolicy::Warn => {
                    let notice = Notice::UnmatchedExperimentalStrategy { requested, valid };
                    tracing::warn!("{notice}");
                    notices.push(notice);
                    Ok(hits)
                }
                FailurePolicy::Narrow => Ok(hits),
            },
        }
    }

    fn select(self, criteria: &QueryCriteria, hits: &[Hit]) -> Result<Selection, GdcError> {
        let selection = match self {
            FilterStage::Platform => match criteria.effective_platform() {
                None => Selection::Skip,
                Some(platform) => {
                    check_single(hits, platform, |hit| hit.platform.as_deref(), eq_ci)
                }
            },
            FilterStage::SampleType => match &criteria.sample_type {
                None => Selection::Skip,
                Some(values) => Selection::Keep(mask(hits, |hit| {
                    hit.tissue_definition()
                        .is_some_and(|definition| values.iter().any(|v| eq_ci(definition, v)))
                })),
            },
            FilterStage::Barcode => match &criteria.barcode {
                None => Selection::Skip,
                Some(prefixes) => {
                    let width = prefixes.first().map(|p| p.chars().count()).unwrap_or(0);
                    Selection::Keep(mask(hits, |hit| {
                        hit.barcode_id().is_some_and(|barcode| {
                            let head = barcode.get(..width).unwrap_or(barcode);
                            prefixes.iter().any(|prefix| prefix == head)
                        })
                    }))
                }
            },
            FilterStage::Access => match &criteria.access {
                None => Selection::Skip,
                Some(access) => {
                    let needle = access.to_lowercase();
                    Selection::Keep(mask(hits, |hit| {
                        hit.access
                            .as_deref()
                            .is_some_and(|value| value.to_lowercase().contains(&needle))
                    }))
                }
            },
            FilterStage::ExperimentalStrategy => match &criteria.experimental_strategy {
                None => Selection::Skip,
                Some(requested) => {
                    let valid = observed(hits, |hit| hit.experimental_strategy.as_deref());
                    let any_match = requested
                        .iter()
                        .any(|value| valid.iter().any(|seen| eq_ci(seen, value)));
                    if any_match {
                        Selection::Keep(mask(hits, |hit| {
                            hit.experimental_strategy
                                .as_deref()
                                .is_some_and(|seen| requested.iter().any(|v| eq_ci(seen, v)))
                        }))
                    } else {
                        Selection::Mismatch {
                            requested: requested.clone(),
                            valid,
                        }
                    }
                }
            },
            FilterStage::DataType => match &criteria.data_type {
                None => Selection::Skip,
                Some(data_type) => {
                    check_single(hits, data_type, |hit| hit.data_type.as_deref(), eq_ci)
                }
            },
            FilterStage::WorkflowType => match &criteria.workflow_type {
                None => Selection::Skip,
                Some(workflow) => check_single(
                    hits,
                    workflow,
                    |hit| hit.workflow_type.as_deref(),
                    |a, b| a == b,
                ),
            },
            FilterStage::FileType => match &criteria.file_type {
                None => Selection::Skip,
                Some(label) => {
                    let pattern = FilePattern::for_label(label)?;
                    Selection::Keep(mask(hits, |hit| {
                        hit.file_name
                            .as_deref()
                            .is_some_and(|name| pattern.is_match(name))
                    }))
                }
            },
        };
        Ok(selection)
    }

    /// Error raised by a rejecting stage. `None` for stages that never reject.
    pub fn rejection(self, requested: Vec<String>, valid: Vec<String>) -> Option<GdcError> {
        let value = requested.join(", ");
        match self {
            FilterStage::Platform => Some(GdcError::InvalidPlatform {
                platform: value,
                valid,
            }),
            FilterStage::DataType => Some(GdcError::InvalidDataType {
                data_type: value,
                valid,
            }),
            FilterStage::WorkflowType => Some(GdcError::InvalidWorkflowType {
                workflow_type: value,
                valid,
            }),
            FilterStage::SampleType
            | FilterStage::Barcode
            | FilterStage::Access
            | FilterStage::ExperimentalStrategy
            | FilterStage::FileType => None,
        }
    }
}

/// Result of running every stage.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    pub hits: Vec<Hit>,
    pub notices: Vec<Notice>,
}

pub fn run_pipeline(criteria: &QueryCriteria, hits: Vec<Hit>) -> Result<FilterOutput, GdcError> {
    let mut notices = Vec::new();
    let mut hits = hits;
    for stage in FilterStage::ORDER {
        let before = hits.len();
        hits = stage.apply(criteria, hits, &mut notices)?;
        tracing::debug!("filter {}: {} -> {} hits", stage.name(), before, hits.len());
    }
    Ok(FilterOutput { hits, notices })
}

/// Case ids shared by more than one surviving hit, in first-seen order.
pub fn duplicate_cases(hits: &[Hit]) -> Vec<String> {
    let mut counts = HashMap::<&str, usize>::new();
    let mut order = Vec::new();
    for case_id in hits.iter().filter_map(Hit::case_id) {
        let count = counts.entry(case_id).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(case_id.to_string());
        }
    }
    order
}

pub fn detect_duplicates(hits: &[Hit]) -> Option<Notice> {
    let cases = duplicate_cases(hits);
    if cases.is_empty() {
        return None;
    }
    let notice = Notice::DuplicateCase { cases };
    tracing::warn!("{notice}");
    Some(notice)
}

/// File-name matcher for a logical file-type label. A match only counts when
/// it is not immediately preceded by `not_after`. Labels outside the known
/// set are used as regular expressions over the file name.
#[derive(Debug, Clone)]
pub struct FilePattern {
    pattern: Regex,
    not_after: Option<&'static str>,
}

impl FilePattern {
    pub fn for_label(label: &str) -> Result<Self, GdcError> {
        let (pattern, not_after) = match label {
            "normalized_results" => (r"normalized_results".to_string(), None),
            "results" => (r"results".to_string(), Some("normalized_")),
            "nocnv_hg18" | "nocnv_hg18.seg" => (r"nocnv_hg18".to_string(), None),
            "cnv_hg18" | "hg18.seg" => (r"hg18\.seg".to_string(), Some("nocnv_")),
            "nocnv_hg19" | "nocnv_hg19.seg" => (r"nocnv_hg19".to_string(), None),
            "cnv_hg19" | "hg19.seg" => (r"hg19\.seg".to_string(), Some("nocnv_")),
            "mirna" => (r"hg19\.mirna".to_string(), None),
            "hg19.mirbase20" => (r"hg19\.mirbase20\.mirna".to_string(), None),
            "isoforms" | "hg19.isoforms" => (r"hg19\.isoform".to_string(), None),
            "hg19.mirbase20.isoforms" => (r"hg19\.mirbase20\.isoform".to_string(), None),
            "bam" => (r"\.bam".to_string(), None),
            other => (other.to_string(), None),
        };
        let pattern = Regex::new(&pattern)
            .map_err(|err| GdcError::InvalidPattern(format!("{label}: {err}")))?;
        Ok(Self { pattern, not_after })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.pattern.find_iter(name).any(|found| match self.not_after {
            Some(prefix) => !name[..found.start()].ends_with(prefix),
            None => true,
        })
    }
}

fn check_single<F, E>(hits: &[Hit], requested: &str, field: F, eq: E) -> Selection
where
    F: Fn(&Hit) -> Option<&str>,
    E: Fn(&str, &str) -> bool,
{
    let valid = observed(hits, &field);
    if !valid.iter().any(|seen| eq(seen, requested)) {
        return Selection::Mismatch {
            requested: vec![requested.to_string()],
            valid,
        };
    }
    Selection::Keep(mask(hits, |hit| field(hit).is_some_and(|seen| eq(seen, requested))))
}

/// Distinct values of a field across hits, in first-seen order.
fn observed<F>(hits: &[Hit], field: F) -> Vec<String>
where
    F: Fn(&Hit) -> Option<&str>,
{
    let mut values: Vec<String> = Vec::new();
    for value in hits.iter().filter_map(|hit| field(hit)) {
        if !values.iter().any(|seen| seen == value) {
            values.push(value.to_string());
        }
    }
    values
}

fn mask<F>(hits: &[Hit], keep: F) -> Vec<bool>
where
    F: Fn(&Hit) -> bool,
{
    hits.iter().map(keep).collect()
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_per_stage() {
        assert_eq!(FilterStage::Platform.policy(), FailurePolicy::Reject);
        assert_eq!(FilterStage::SampleType.policy(), FailurePolicy::Narrow);
        assert_eq!(FilterStage::Barcode.policy(), FailurePolicy::Narrow);
        assert_eq!(FilterStage::Access.policy(), FailurePolicy::Narrow);
        assert_eq!(
            FilterStage::ExperimentalStrategy.policy(),
            FailurePolicy::Warn
        );
        assert_eq!(FilterStage::DataType.policy(), FailurePolicy::Reject);
        assert_eq!(FilterStage::WorkflowType.policy(), FailurePolicy::Reject);
        assert_eq!(FilterStage::FileType.policy(), FailurePolicy::Narrow);
        assert_eq!(FilterStage::ORDER.first(), Some(&FilterStage::Platform));
        assert_eq!(FilterStage::ORDER.last(), Some(&FilterStage::FileType));
    }

    #[test]
    fn seg_pattern_excludes_nocnv() {
        let pattern = FilePattern::for_label("hg19.seg").unwrap();
        assert!(pattern.is_match("sample.hg19.seg.txt"));
        assert!(!pattern.is_match("sample.nocnv_hg19.seg.txt"));

        let nocnv = FilePattern::for_label("nocnv_hg19.seg").unwrap();
        assert!(nocnv.is_match("sample.nocnv_hg19.seg.txt"));
        assert!(!nocnv.is_match("sample.hg19.seg.txt"));
    }

    #[test]
    fn results_pattern_excludes_normalized() {
        let pattern = FilePattern::for_label("results").unwrap();
        assert!(pattern.is_match("unc.edu.gene.quantification.rsem.genes.results"));
        assert!(!pattern.is_match("unc.edu.rsem.genes.normalized_results"));
    }

    #[test]
    fn unknown_label_is_a_regex() {
        let pattern = FilePattern::for_label(r"rsem\.genes\.results$").unwrap();
        assert!(pattern.is_match("unc.edu.rsem.genes.results"));
        assert!(!pattern.is_match("unc.edu.rsem.genes.results.gz"));

        let err = FilePattern::for_label("genes(").unwrap_err();
        assert!(matches!(err, GdcError::InvalidPattern(message) if message.starts_with("genes(")));
    }

    #[test]
    fn only_reject_stages_have_errors() {
        for stage in FilterStage::ORDER {
            let rejection = stage.rejection(vec!["x".to_string()], vec!["y".to_string()]);
            assert_eq!(
                rejection.is_some(),
                stage.policy() == FailurePolicy::Reject,
                "{}",
                stage.name()
            );
        }
        assert!(matches!(
            FilterStage::WorkflowType.rejection(vec!["x".to_string()], Vec::new()),
            Some(GdcError::InvalidWorkflowType { .. })
        ));
        assert!(matches!(
            FilterStage::Platform.rejection(vec!["x".to_string()], Vec::new()),
            Some(GdcError::InvalidPlatform { .. })
        ));
        assert!(matches!(
            FilterStage::DataType.rejection(vec!["x".to_string()], Vec::new()),
            Some(GdcError::InvalidDataType { .. })
        ));
    }
}
