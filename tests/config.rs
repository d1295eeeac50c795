use std::fs;

use assert_matches::assert_matches;
use tempfile::TempDir;

use gdc_cohort_query::config::ConfigLoader;
use gdc_cohort_query::criteria::{ProjectArg, normalize};
use gdc_cohort_query::domain::FilterArg;
use gdc_cohort_query::error::GdcError;
use gdc_cohort_query::request::DEFAULT_BASE_URL;

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("gdc-query.json");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn loads_queries_with_tri_state_filters() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "schema_version": 1,
            "base_url": "http://localhost:9000",
            "drop_unknown_tissue_codes": true,
            "queries": [
                {
                    "project": "TCGA-ACC",
                    "data_category": "Transcriptome Profiling",
                    "data_type": "Gene Expression Quantification",
                    "workflow_type": false,
                    "access": null,
                    "sample_type": ["Primary solid Tumor"]
                },
                {
                    "project": ["TARGET-AML", "TARGET-NBL"],
                    "data_category": "Clinical",
                    "legacy": true
                }
            ]
        }"#,
    );

    let resolved = ConfigLoader::resolve(Some(&path)).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.base_url, "http://localhost:9000");
    assert!(resolved.options.drop_unknown_tissue_codes);
    assert_eq!(resolved.queries.len(), 2);

    let first = &resolved.queries[0];
    assert_eq!(first.workflow_type, FilterArg::Disabled);
    assert_eq!(first.access, FilterArg::Unset);
    assert_eq!(first.file_type, FilterArg::Unset);
    let criteria = normalize(first.clone());
    assert_eq!(
        criteria.data_type.as_deref(),
        Some("Gene Expression Quantification")
    );
    assert_eq!(criteria.workflow_type, None);
    assert_eq!(
        criteria.sample_type,
        Some(vec!["Primary solid Tumor".to_string()])
    );

    let second = &resolved.queries[1];
    assert_eq!(
        second.project,
        ProjectArg::Many(vec!["TARGET-AML".to_string(), "TARGET-NBL".to_string()])
    );
    assert!(second.legacy);
}

#[test]
fn defaults_apply_when_fields_are_missing() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"queries": [{"project": "TCGA-ACC", "data_category": "Clinical"}]}"#,
    );
    let resolved = ConfigLoader::resolve(Some(&path)).unwrap();
    assert_eq!(resolved.schema_version, 1);
    assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
    assert!(!resolved.options.drop_unknown_tissue_codes);
}

#[test]
fn list_filters_accept_a_single_string() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"queries": [{
            "project": "TCGA-ACC",
            "data_category": "Transcriptome Profiling",
            "sample_type": "Primary solid Tumor",
            "experimental_strategy": ["RNA-Seq"],
            "barcode": false
        }]}"#,
    );
    let resolved = ConfigLoader::resolve(Some(&path)).unwrap();
    let query = &resolved.queries[0];
    assert_eq!(
        query.sample_type,
        FilterArg::Value(vec!["Primary solid Tumor".to_string()])
    );
    assert_eq!(
        query.experimental_strategy,
        FilterArg::Value(vec!["RNA-Seq".to_string()])
    );
    assert_eq!(query.barcode, FilterArg::Disabled);
}

#[test]
fn true_is_not_a_filter_value() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{"queries": [{"project": "TCGA-ACC", "data_category": "Clinical", "platform": true}]}"#,
    );
    let err = ConfigLoader::resolve(Some(&path)).unwrap_err();
    assert_matches!(err, GdcError::ConfigParse(_));
}

#[test]
fn explicit_missing_path_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, GdcError::ConfigRead(missing) => assert_eq!(missing, path));
}

#[test]
fn malformed_json_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "{ not json");
    let err = ConfigLoader::resolve(Some(&path)).unwrap_err();
    assert_matches!(err, GdcError::ConfigParse(_));
}
