use gdc_cohort_query::domain::Repository;
use gdc_cohort_query::request::{DEFAULT_BASE_URL, Expansion, build_search_request};

#[test]
fn identical_inputs_build_identical_requests() {
    let first = build_search_request(DEFAULT_BASE_URL, "TCGA-ACC", "Clinical", false, 92);
    let second = build_search_request(DEFAULT_BASE_URL, "TCGA-ACC", "Clinical", false, 92);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), first.url());
}

#[test]
fn harmonized_aliquot_request() {
    let request = build_search_request(
        DEFAULT_BASE_URL,
        "TCGA-ACC",
        "Transcriptome Profiling",
        false,
        316,
    );
    assert_eq!(request.repository, Repository::Harmonized);
    assert_eq!(request.endpoint, "https://api.gdc.cancer.gov/files");
    assert!(request.query.starts_with("pretty=true&expand="));
    assert!(request.query.contains(Expansion::AliquotLevel.fields()));
    assert!(request.query.contains("&size=316&format=JSON&filters="));
    assert!(request.query.contains("TCGA-ACC"));
    assert!(request.query.contains("Transcriptome%20Profiling"));
    assert!(!request.query.contains(' '));
}

#[test]
fn legacy_protein_request() {
    let request = build_search_request(
        "http://localhost:8080/",
        "TCGA-BRCA",
        "Protein expression",
        true,
        10,
    );
    assert_eq!(request.repository, Repository::Legacy);
    assert_eq!(request.endpoint, "http://localhost:8080/legacy/files");
    assert!(
        request
            .query
            .contains("expand=cases.samples.portions,cases.project,center,analysis&")
    );
}

#[test]
fn clinical_request_expands_cases_only() {
    let request = build_search_request(DEFAULT_BASE_URL, "TARGET-AML", "Clinical", true, 5);
    assert!(
        request
            .query
            .contains("expand=cases,cases.project,center,analysis&")
    );
    assert!(request.url().starts_with("https://api.gdc.cancer.gov/legacy/files?pretty=true"));
}
