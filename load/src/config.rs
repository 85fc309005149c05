//! Batch check configuration.
//!
//! A YAML file naming which schema applies to which documents, plus any
//! extra named patterns the schemas reference.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! patterns:
//!   semver: '^\d+\.\d+\.\d+$'
//! targets:
//!   - schema: schemas/database.yml
//!     documents:
//!       - config/database.yml
//!       - config/database.ci.yml
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file when it is loaded with [`CheckConfig::load`].

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use config_schema_core::PatternRegistry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, Result};

/// One schema and the documents it validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Schema file (YAML or JSON).
    pub schema: PathBuf,
    /// Document files validated against `schema`.
    pub documents: Vec<PathBuf>,
}

/// Top-level batch configuration.
///
/// # Examples
///
/// ```
/// # let yaml = r#"
/// # version: "1.0"
/// # patterns: { semver: '^\d+\.\d+\.\d+$' }
/// # targets: [{ schema: db.yml, documents: [a.yml, b.yml] }]
/// # "#;
/// let config: config_schema_load::CheckConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.document_count(), 2);
///
/// let patterns = config.registry().unwrap();
/// assert!(patterns.is_match("semver", "1.2.3"));
/// assert!(patterns.is_match("ip", "127.0.0.1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Extra named patterns (name → regex source) added to the built-ins.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub patterns: BTreeMap<String, String>,
    /// Schema/document groups to check.
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl CheckConfig {
    /// Loads configuration from a YAML file and resolves relative paths
    /// against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](LoadError::IoError) if the file cannot be read,
    /// [`YamlError`](LoadError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](LoadError::InvalidConfig) if the content is
    /// inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;
        config.check()?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        debug!(
            path = %path.display(),
            targets = config.targets.len(),
            documents = config.document_count(),
            "check config loaded"
        );
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](LoadError::IoError) if the file cannot be
    /// written, or [`YamlError`](LoadError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Rejects an empty version and targets without documents.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](LoadError::InvalidConfig) naming the problem.
    pub fn check(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(LoadError::InvalidConfig(
                "version cannot be empty".to_string(),
            ));
        }
        if let Some(target) = self.targets.iter().find(|t| t.documents.is_empty()) {
            return Err(LoadError::InvalidConfig(format!(
                "target '{}' lists no documents",
                target.schema.display()
            )));
        }
        Ok(())
    }

    /// Makes every relative schema and document path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for target in &mut self.targets {
            resolve(&mut target.schema, base);
            for document in &mut target.documents {
                resolve(document, base);
            }
        }
    }

    /// Builds the built-in registry extended with the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPattern`](LoadError::InvalidPattern) for the first
    /// pattern that fails to compile.
    pub fn registry(&self) -> Result<PatternRegistry> {
        let mut registry = PatternRegistry::builtin();
        for (name, pattern) in &self.patterns {
            registry
                .insert_regex(name.as_str(), pattern)
                .map_err(|source| LoadError::InvalidPattern {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(registry)
    }

    /// Total number of documents across all targets.
    pub fn document_count(&self) -> usize {
        self.targets.iter().map(|t| t.documents.len()).sum()
    }
}

fn resolve(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
patterns:
  semver: '^\d+\.\d+\.\d+$'
  env: '^(dev|staging|prod)$'
targets:
  - schema: schemas/database.yml
    documents:
      - config/database.yml
      - /etc/app/database.yml
  - schema: schemas/host.yml
    documents: [config/host.yml]
"#
    }

    fn minimal_yaml() -> &'static str {
        r#"
version: "1.0"
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.patterns.len(), 2);
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].schema, PathBuf::from("schemas/database.yml"));
        assert_eq!(config.document_count(), 3);
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: CheckConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert!(config.patterns.is_empty());
        assert!(config.targets.is_empty());
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_registry_includes_builtins_and_custom() {
        let config: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let registry = config.registry().unwrap();
        assert!(registry.is_match("env", "staging"));
        assert!(!registry.is_match("env", "qa"));
        assert!(registry.is_match("host", "example.com"));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_registry_rejects_bad_regex() {
        let mut config: CheckConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        config.patterns.insert("broken".into(), "(".into());
        let err = config.registry().unwrap_err();
        assert!(matches!(err, LoadError::InvalidPattern { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_check_rejects_empty_version() {
        let config: CheckConfig = serde_yaml::from_str("version: ' '").unwrap();
        assert!(matches!(config.check(), Err(LoadError::InvalidConfig(_))));
    }

    #[test]
    fn test_check_rejects_target_without_documents() {
        let config: CheckConfig =
            serde_yaml::from_str("version: '1'\ntargets: [{schema: s.yml, documents: []}]").unwrap();
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("s.yml"));
    }

    #[test]
    fn test_resolve_paths_keeps_absolute() {
        let mut config: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        config.resolve_paths(Path::new("/repo"));
        assert_eq!(config.targets[0].schema, PathBuf::from("/repo/schemas/database.yml"));
        assert_eq!(
            config.targets[0].documents,
            vec![
                PathBuf::from("/repo/config/database.yml"),
                PathBuf::from("/etc/app/database.yml"),
            ]
        );
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("check.yml");

        let original: CheckConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = CheckConfig::load(&path).unwrap();
        assert_eq!(loaded.version, original.version);
        assert_eq!(loaded.patterns, original.patterns);
        assert_eq!(
            loaded.targets[1].schema,
            dir.path().join("schemas/host.yml")
        );
    }
}
