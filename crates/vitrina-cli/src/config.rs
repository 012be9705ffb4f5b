//! Configuration for the Vitrina CLI.
//!
//! Provides the [`VitrinaConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `VITRINA_CONFIG` environment variable
//! 3. Platform default: `~/.config/vitrina/config.toml`
//! 4. Built-in defaults

use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vitrina_core::{Error, Result};
use vitrina_fts::TextConfig;
use vitrina_query::QueryConfig;
use vitrina_vector::VectorConfig;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Vitrina CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrinaConfig {
    /// Catalog input files.
    pub catalog: CatalogConfig,

    /// Vector backend configuration.
    pub vector: VectorConfig,

    /// Full-text backend configuration.
    pub text: TextConfig,

    /// Query router configuration.
    pub query: QueryConfig,
}

/// Catalog input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the feature matrix file.
    pub features_path: String,

    /// Path to the metadata table (CSV).
    pub data_path: String,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for VitrinaConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            vector: VectorConfig::default(),
            text: TextConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            features_path: "data/features.vtrf".to_string(),
            data_path: "data/catalog.csv".to_string(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl VitrinaConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `VITRINA_CONFIG` env var
    /// 3. Platform default: `~/.config/vitrina/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level("VITRINA");
        env_opts.add_section("catalog");
        env_opts.add_section("vector");
        env_opts.add_section("text");
        env_opts.add_section("query");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or platform default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        // 1. Explicit --config flag
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        // 2. VITRINA_CONFIG env var
        if let Ok(path) = std::env::var("VITRINA_CONFIG") {
            return Some(PathBuf::from(path));
        }

        // 3. Platform default
        Self::default_config_path()
    }

    /// Return the platform default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vitrina").join("config.toml"))
    }

    /// Check every section before an operation runs.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.features_path.is_empty() {
            return Err(Error::config("catalog.features_path must not be empty"));
        }
        if self.catalog.data_path.is_empty() {
            return Err(Error::config("catalog.data_path must not be empty"));
        }
        self.vector.validate()?;
        self.text.validate()?;
        self.query.validate()?;
        Ok(())
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `VITRINA_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "VITRINA", &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => {
            out.push((prefix.to_string(), s.clone()));
        }
        toml::Value::Integer(i) => {
            out.push((prefix.to_string(), i.to_string()));
        }
        toml::Value::Float(f) => {
            out.push((prefix.to_string(), f.to_string()));
        }
        toml::Value::Boolean(b) => {
            out.push((prefix.to_string(), b.to_string()));
        }
        toml::Value::Datetime(dt) => {
            out.push((prefix.to_string(), dt.to_string()));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// RAII guard for env var manipulation in tests.
    struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(ref val) = self.prev {
                unsafe { std::env::set_var(&self.key, val) };
            } else {
                unsafe { std::env::remove_var(&self.key) };
            }
        }
    }

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_vitrina_config_default() {
        let config = VitrinaConfig::default();
        assert_eq!(config.catalog.features_path, "data/features.vtrf");
        assert_eq!(config.catalog.data_path, "data/catalog.csv");
        assert_eq!(config.vector.collection, "image-search-engine");
        assert_eq!(config.vector.dimension, 1000);
        assert_eq!(config.text.index, "text_search_index");
        assert_eq!(config.query.top_k, 3);
        assert!(config.validate().is_ok());
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_vitrina_config_from_toml() {
        let toml_str = r#"
            [catalog]
            features_path = "/data/features.vtrf"
            data_path = "/data/catalog.csv"

            [vector]
            url = "http://qdrant:6333"
            collection = "catalog-v2"
            dimension = 512

            [text]
            url = "http://elastic:9200"

            [query]
            top_k = 5
        "#;

        let config: VitrinaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.catalog.features_path, "/data/features.vtrf");
        assert_eq!(config.vector.url, "http://qdrant:6333");
        assert_eq!(config.vector.collection, "catalog-v2");
        assert_eq!(config.vector.dimension, 512);
        // Unset vector fields keep their defaults.
        assert_eq!(config.vector.batch_size, 1000);
        assert_eq!(config.text.url, "http://elastic:9200");
        assert_eq!(config.query.top_k, 5);
    }

    #[test]
    fn test_vitrina_config_missing_sections_use_defaults() {
        let config: VitrinaConfig = toml::from_str("").unwrap();
        assert_eq!(config.vector.dimension, 1000);
        assert_eq!(config.query.top_k, 3);
    }

    #[test]
    fn test_vitrina_config_to_toml() {
        let config = VitrinaConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[vector]"));
        assert!(toml_str.contains("collection = \"image-search-engine\""));
        assert!(toml_str.contains("[text]"));
        assert!(toml_str.contains("[query]"));

        // Round-trip
        let parsed: VitrinaConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.vector.collection, config.vector.collection);
        assert_eq!(parsed.query.top_k, config.query.top_k);
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_vitrina_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                [vector]
                collection = "loaded-collection"
            "#,
        )
        .unwrap();

        let config = VitrinaConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.vector.collection, "loaded-collection");
        assert_eq!(config.vector.dimension, 1000);
    }

    #[test]
    fn test_vitrina_config_load_defaults() {
        // Load with a nonexistent file falls back to defaults
        let config = VitrinaConfig::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.vector.collection, "image-search-engine");
        assert_eq!(config.query.top_k, 3);
    }

    #[test]
    fn test_vitrina_config_load_env_overlay() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                [vector]
                collection = "file-collection"
            "#,
        )
        .unwrap();

        // Env vars override file values (confyg passes env values as strings,
        // so string fields are the reliable overlay surface).
        let _guard = EnvGuard::new("VITRINA_VECTOR_COLLECTION", "env-collection");
        let config = VitrinaConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.vector.collection, "env-collection");
    }

    // ------------------------------------------------------------------------
    // resolve_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = VitrinaConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_env() {
        let _guard = EnvGuard::new("VITRINA_CONFIG", "/env/config.toml");
        let path = VitrinaConfig::resolve_config_path(None);
        assert_eq!(path, Some(PathBuf::from("/env/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_default() {
        let _guard = EnvGuard::remove("VITRINA_CONFIG");
        let path = VitrinaConfig::resolve_config_path(None);
        assert!(path.is_some());
        let p = path.unwrap();
        assert!(p.to_str().unwrap().contains("vitrina"));
        assert!(p.to_str().unwrap().ends_with("config.toml"));
    }

    // ------------------------------------------------------------------------
    // Validation tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_validate_rejects_empty_features_path() {
        let config = VitrinaConfig {
            catalog: CatalogConfig {
                features_path: String::new(),
                ..CatalogConfig::default()
            },
            ..VitrinaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_section() {
        let mut config = VitrinaConfig::default();
        config.vector.dimension = 0;
        assert!(config.validate().is_err());

        let mut config = VitrinaConfig::default();
        config.query.top_k = 0;
        assert!(config.validate().is_err());
    }

    // ------------------------------------------------------------------------
    // to_env_vars tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_vitrina_config_to_env_vars() {
        let config = VitrinaConfig::default();
        let vars = config.to_env_vars().unwrap();
        let map: HashMap<_, _> = vars.into_iter().collect();
        assert_eq!(
            map.get("VITRINA_VECTOR_COLLECTION").unwrap(),
            "image-search-engine"
        );
        assert_eq!(map.get("VITRINA_VECTOR_DIMENSION").unwrap(), "1000");
        assert_eq!(map.get("VITRINA_QUERY_TOP_K").unwrap(), "3");
        assert_eq!(
            map.get("VITRINA_CATALOG_DATA_PATH").unwrap(),
            "data/catalog.csv"
        );
    }

    // ------------------------------------------------------------------------
    // Clone + Send + Sync
    // ------------------------------------------------------------------------

    #[test]
    fn test_vitrina_config_is_clone() {
        let config = VitrinaConfig::default();
        let cloned = config.clone();
        assert_eq!(config.vector.collection, cloned.vector.collection);
    }

    #[test]
    fn test_vitrina_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VitrinaConfig>();
    }
}
