use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::app::QueryOptions;
use crate::criteria::RawCriteria;
use crate::error::GdcError;
use crate::request::DEFAULT_BASE_URL;

pub const DEFAULT_CONFIG_FILE: &str = "gdc-query.json";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub drop_unknown_tissue_codes: Option<bool>,
    #[serde(default)]
    pub queries: Vec<RawCriteria>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub base_url: String,
    pub options: QueryOptions,
    pub queries: Vec<RawCriteria>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, GdcError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(GdcError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| GdcError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| GdcError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, GdcError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if let Some(idx) = config
            .queries
            .iter()
            .position(|query| query.data_category.trim().is_empty())
        {
            return Err(GdcError::ConfigParse(format!(
                "query #{} has an empty data_category",
                idx + 1
            )));
        }

        Ok(ResolvedConfig {
            schema_version,
            base_url: config
                .base_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            options: QueryOptions {
                drop_unknown_tissue_codes: config.drop_unknown_tissue_codes.unwrap_or(false),
            },
            queries: config.queries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults() {
        let config = Config {
            schema_version: None,
            base_url: None,
            drop_unknown_tissue_codes: None,
            queries: vec![RawCriteria::new("TCGA-ACC", "Clinical")],
        };

        let resolved = ConfigLoader::resolve_config(config).unwrap();
        assert_eq!(resolved.schema_version, 1);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert!(!resolved.options.drop_unknown_tissue_codes);
        assert_eq!(resolved.queries.len(), 1);
    }

    #[test]
    fn empty_category_is_rejected() {
        let config = Config {
            schema_version: Some(1),
            base_url: None,
            drop_unknown_tissue_codes: None,
            queries: vec![RawCriteria::new("TCGA-ACC", " ")],
        };
        assert!(matches!(
            ConfigLoader::resolve_config(config),
            Err(GdcError::ConfigParse(_))
        ));
    }
}
