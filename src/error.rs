use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GdcError {
    #[error("invalid project: {project}; valid projects: {}", .valid.join(", "))]
    InvalidProject { project: String, valid: Vec<String> },

    #[error(
        "invalid data category for {project} (legacy={legacy}): {category}; valid categories: {}",
        .valid.join(", ")
    )]
    InvalidCategory {
        project: String,
        category: String,
        legacy: bool,
        valid: Vec<String>,
    },

    #[error("invalid sample type: {}; valid sample types: {}", .values.join(", "), .valid.join(", "))]
    #[diagnostic(help("sample types are tissue definitions, e.g. \"Primary solid Tumor\""))]
    InvalidBarcodeDefinition {
        values: Vec<String>,
        valid: Vec<String>,
    },

    #[error("invalid platform: {platform}; valid platforms: {}", .valid.join(", "))]
    InvalidPlatform { platform: String, valid: Vec<String> },

    #[error("invalid data type: {data_type}; valid data types: {}", .valid.join(", "))]
    InvalidDataType {
        data_type: String,
        valid: Vec<String>,
    },

    #[error("invalid workflow type: {workflow_type}; valid workflow types: {}", .valid.join(", "))]
    InvalidWorkflowType {
        workflow_type: String,
        valid: Vec<String>,
    },

    #[error("query returned no files after filtering")]
    #[diagnostic(help("relax one of the optional filters and resubmit"))]
    EmptyResult,

    #[error("barcodes do not share a single grammar: {}", .barcodes.join(", "))]
    UnrecognizedBarcodeGrammar { barcodes: Vec<String> },

    #[error("unknown tissue code {code} in barcode {barcode}")]
    UnknownTissueCode { barcode: String, code: String },

    #[error("GDC request failed: {0}")]
    GdcHttp(String),

    #[error("GDC returned status {status}: {message}")]
    GdcStatus { status: u16, message: String },

    #[error("failed to decode GDC response: {0}")]
    GdcDecode(String),

    #[error("missing config file gdc-query.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid file name pattern: {0}")]
    InvalidPattern(String),
}
