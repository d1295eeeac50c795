use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use crate::barcode::{self, Hit, UnknownTissuePolicy};
use crate::criteria::{self, QueryCriteria, RawCriteria};
use crate::domain::{FilterArg, Notice};
use crate::error::GdcError;
use crate::filter;
use crate::gdc::GdcClient;
use crate::request;

#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Drop hits whose tissue code is missing from the reference table
    /// instead of failing the query.
    pub drop_unknown_tissue_codes: bool,
}

impl QueryOptions {
    fn tissue_policy(&self) -> UnknownTissuePolicy {
        if self.drop_unknown_tissue_codes {
            UnknownTissuePolicy::DropHit
        } else {
            UnknownTissuePolicy::Fail
        }
    }
}

/// Final, read-only result of a query: the normalized criteria, the hits that
/// survived every filter and the notices raised on the way.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDescriptor {
    criteria: QueryCriteria,
    results: Vec<Hit>,
    notices: Vec<Notice>,
    created_at: String,
    tool: String,
}

impl QueryDescriptor {
    pub fn criteria(&self) -> &QueryCriteria {
        &self.criteria
    }

    pub fn results(&self) -> &[Hit] {
        &self.results
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }
}

pub fn assemble(
    criteria: QueryCriteria,
    results: Vec<Hit>,
    notices: Vec<Notice>,
) -> Result<QueryDescriptor, GdcError> {
    if results.is_empty() {
        return Err(GdcError::EmptyResult);
    }
    Ok(QueryDescriptor {
        criteria,
        results,
        notices,
        created_at: chrono::Utc::now().to_rfc3339(),
        tool: format!("gdc-query/{}", env!("CARGO_PKG_VERSION")),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MutationPipeline {
    Muse,
    Varscan2,
    Somaticsniper,
    Mutect2,
}

impl MutationPipeline {
    pub fn workflow_type(self) -> String {
        let name = match self {
            MutationPipeline::Muse => "MuSE",
            MutationPipeline::Varscan2 => "VarScan2",
            MutationPipeline::Somaticsniper => "SomaticSniper",
            MutationPipeline::Mutect2 => "MuTect2",
        };
        format!("{name} Variant Aggregation and Masking")
    }
}

impl fmt::Display for MutationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationPipeline::Muse => write!(f, "muse"),
            MutationPipeline::Varscan2 => write!(f, "varscan2"),
            MutationPipeline::Somaticsniper => write!(f, "somaticsniper"),
            MutationPipeline::Mutect2 => write!(f, "mutect2"),
        }
    }
}

/// Download and tabular parsing of the mutation files a descriptor selects.
pub trait MutationSource {
    type Output;

    fn load(&self, descriptor: &QueryDescriptor) -> Result<Self::Output, GdcError>;
}

pub fn mutation_criteria(tumor: &str, pipeline: MutationPipeline) -> RawCriteria {
    let tumor = tumor.trim().to_uppercase();
    let tumor = tumor.strip_prefix("TCGA-").unwrap_or(&tumor);
    let mut raw = RawCriteria::new(format!("TCGA-{tumor}"), "Simple Nucleotide Variation");
    raw.data_type = FilterArg::Value("Masked Somatic Mutation".to_string());
    raw.workflow_type = FilterArg::Value(pipeline.workflow_type());
    raw.access = FilterArg::Value("open".to_string());
    raw
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App<G: GdcClient> {
    client: G,
    base_url: String,
    options: QueryOptions,
}

impl<G: GdcClient> App<G> {
    pub fn new(client: G, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn query(
        &self,
        raw: RawCriteria,
        sink: &dyn ProgressSink,
    ) -> Result<QueryDescriptor, GdcError> {
        let criteria = criteria::normalize(raw);

        sink.event(ProgressEvent {
            message: format!(
                "phase=Validate; {} / {}",
                criteria.projects.join(","),
                criteria.data_category
            ),
            elapsed: None,
        });
        let validation = criteria::validate(&self.client, &criteria)?;
        let mut notices = validation.notices;

        let start = std::time::Instant::now();
        let mut raw_hits = Vec::new();
        for (project, &size) in criteria.projects.iter().zip(&validation.page_sizes) {
            let search = request::build_search_request(
                &self.base_url,
                project,
                &criteria.data_category,
                criteria.legacy,
                size,
            );
            sink.event(ProgressEvent {
                message: format!("phase=Request; {project} size={size}"),
                elapsed: None,
            });
            raw_hits.extend(self.client.search(&search)?);
        }
        sink.event(ProgressEvent {
            message: format!("gdc.response hits={}", raw_hits.len()),
            elapsed: Some(start.elapsed()),
        });

        sink.event(ProgressEvent {
            message: "phase=Decode; parsing barcodes".to_string(),
            elapsed: None,
        });
        let hits = barcode::decode_hits(
            raw_hits,
            &criteria.data_category,
            self.options.tissue_policy(),
        )?;

        sink.event(ProgressEvent {
            message: format!("phase=Filter; {} hits", hits.len()),
            elapsed: None,
        });
        let filtered = filter::run_pipeline(&criteria, hits)?;
        notices.extend(filtered.notices);
        notices.extend(filter::detect_duplicates(&filtered.hits));

        sink.event(ProgressEvent {
            message: format!("phase=Assemble; {} hits", filtered.hits.len()),
            elapsed: None,
        });
        assemble(criteria, filtered.hits, notices)
    }

    /// Masked somatic mutation files of one TCGA tumor for one calling
    /// pipeline.
    pub fn mutation_query(
        &self,
        tumor: &str,
        pipeline: MutationPipeline,
        sink: &dyn ProgressSink,
    ) -> Result<QueryDescriptor, GdcError> {
        self.query(mutation_criteria(tumor, pipeline), sink)
    }

    pub fn load_mutations<M: MutationSource>(
        &self,
        tumor: &str,
        pipeline: MutationPipeline,
        source: &M,
        sink: &dyn ProgressSink,
    ) -> Result<M::Output, GdcError> {
        let descriptor = self.mutation_query(tumor, pipeline, sink)?;
        source.load(&descriptor)
    }
}
