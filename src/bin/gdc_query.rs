use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gdc_cohort_query::app::{App, MutationPipeline, QueryOptions};
use gdc_cohort_query::config::ConfigLoader;
use gdc_cohort_query::criteria::{ProjectArg, RawCriteria};
use gdc_cohort_query::domain::FilterArg;
use gdc_cohort_query::error::GdcError;
use gdc_cohort_query::gdc::GdcHttpClient;
use gdc_cohort_query::output::{JsonOutput, LogSink};
use gdc_cohort_query::request::DEFAULT_BASE_URL;

#[derive(Parser)]
#[command(name = "gdc-query")]
#[command(about = "Query GDC files by project and category, decode barcodes and filter the cohort")]
#[command(version, author)]
struct Cli {
    /// API base URL (defaults to $GDC_API_URL, then the public GDC API).
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run a single query")]
    Query(QueryArgs),
    #[command(about = "Run every query listed in a config file")]
    Run(RunArgs),
    #[command(about = "Masked somatic mutation files for one TCGA tumor")]
    Mutations(MutationArgs),
    #[command(about = "Print the sample-type reference tables")]
    SampleTypes,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long, required = true, num_args = 1..)]
    project: Vec<String>,

    #[arg(long)]
    category: String,

    #[arg(long)]
    data_type: Option<String>,

    #[arg(long)]
    workflow_type: Option<String>,

    #[arg(long)]
    file_type: Option<String>,

    #[arg(long)]
    access: Option<String>,

    #[arg(long, num_args = 1..)]
    experimental_strategy: Vec<String>,

    #[arg(long)]
    platform: Option<String>,

    #[arg(long, num_args = 1..)]
    sample_type: Vec<String>,

    #[arg(long, value_delimiter = ',')]
    barcode: Vec<String>,

    #[arg(long)]
    legacy: bool,

    #[arg(long)]
    drop_unknown_tissue_codes: bool,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long)]
    config: Option<String>,
}

#[derive(Args)]
struct MutationArgs {
    #[arg(long)]
    tumor: String,

    #[arg(long, value_enum)]
    pipeline: MutationPipeline,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GdcError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GdcError) -> u8 {
    match error {
        GdcError::InvalidProject { .. }
        | GdcError::InvalidCategory { .. }
        | GdcError::InvalidBarcodeDefinition { .. }
        | GdcError::InvalidPlatform { .. }
        | GdcError::InvalidDataType { .. }
        | GdcError::InvalidWorkflowType { .. }
        | GdcError::MissingConfig => 2,
        GdcError::GdcHttp(_) | GdcError::GdcStatus { .. } | GdcError::GdcDecode(_) => 3,
        GdcError::EmptyResult => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base_url = cli
        .base_url
        .or_else(|| std::env::var("GDC_API_URL").ok())
        .filter(|url| !url.trim().is_empty());

    match cli.command {
        Commands::Query(args) => {
            let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            let options = QueryOptions {
                drop_unknown_tissue_codes: args.drop_unknown_tissue_codes,
            };
            let app = App::new(GdcHttpClient::with_base_url(&base_url)?, base_url)
                .with_options(options);
            let descriptor = app.query(raw_criteria(args), &LogSink)?;
            JsonOutput::print_descriptor(&descriptor).into_diagnostic()
        }
        Commands::Run(args) => {
            let resolved = ConfigLoader::resolve(args.config.as_deref())?;
            let base_url = base_url.unwrap_or(resolved.base_url);
            let app = App::new(GdcHttpClient::with_base_url(&base_url)?, base_url)
                .with_options(resolved.options);
            let descriptors = resolved
                .queries
                .into_iter()
                .map(|query| app.query(query, &LogSink))
                .collect::<Result<Vec<_>, GdcError>>()?;
            JsonOutput::print_descriptors(&descriptors).into_diagnostic()
        }
        Commands::Mutations(args) => {
            let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            let app = App::new(GdcHttpClient::with_base_url(&base_url)?, base_url);
            let descriptor = app.mutation_query(&args.tumor, args.pipeline, &LogSink)?;
            JsonOutput::print_descriptor(&descriptor).into_diagnostic()
        }
        Commands::SampleTypes => JsonOutput::print_sample_types().into_diagnostic(),
    }
}

fn raw_criteria(args: QueryArgs) -> RawCriteria {
    let project = if args.project.len() == 1 {
        ProjectArg::One(args.project[0].clone())
    } else {
        ProjectArg::Many(args.project)
    };
    RawCriteria {
        project,
        data_category: args.category,
        data_type: args.data_type.into(),
        workflow_type: args.workflow_type.into(),
        file_type: args.file_type.into(),
        access: args.access.into(),
        experimental_strategy: non_empty(args.experimental_strategy),
        platform: args.platform.into(),
        sample_type: non_empty(args.sample_type),
        barcode: non_empty(args.barcode),
        legacy: args.legacy,
    }
}

fn non_empty(values: Vec<String>) -> FilterArg<Vec<String>> {
    if values.is_empty() {
        FilterArg::Unset
    } else {
        FilterArg::Value(values)
    }
}
