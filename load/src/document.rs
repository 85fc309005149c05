//! Reading documents and schemas from disk.
//!
//! The core engine never parses text; this module turns YAML or JSON files
//! into a [`ConfigValue`] tree or a [`NodeSet`] schema. The format is chosen
//! from the file extension.
//!
//! ```no_run
//! use config_schema_core::validate;
//! use config_schema_load::{load_document, load_schema};
//!
//! let schema = load_schema("schemas/database.yml").unwrap();
//! let document = load_document("config/database.yml").unwrap();
//! let outcome = validate(&schema, &document).unwrap();
//! println!("valid: {}", outcome.is_valid());
//! ```

use std::fmt;
use std::path::Path;

use config_schema_core::{ConfigValue, NodeSet, Outcome, Validator};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{LoadError, Result};

/// Serialization format of a document or schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension (`yml`, `yaml`, `json`).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_schema_load::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_path("app.YAML").unwrap(), DocumentFormat::Yaml);
    /// assert_eq!(DocumentFormat::from_path("app.json").unwrap(), DocumentFormat::Json);
    /// assert!(DocumentFormat::from_path("app.toml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}

fn parse<T: DeserializeOwned>(raw: &str, format: DocumentFormat) -> Result<T> {
    match format {
        DocumentFormat::Yaml => Ok(serde_yaml::from_str(raw)?),
        DocumentFormat::Json => Ok(serde_json::from_str(raw)?),
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DocumentFormat::from_path(path)?;
    debug!(path = %path.display(), %format, "reading file");
    let raw = std::fs::read_to_string(path)?;
    parse(&raw, format)
}

/// Parses document text into a value tree.
///
/// # Errors
///
/// Returns [`LoadError::YamlError`] or [`LoadError::JsonError`] when the text
/// is not valid for `format`.
///
/// # Examples
///
/// ```
/// use config_schema_load::{DocumentFormat, parse_document};
///
/// let doc = parse_document("database:\n  host: localhost\n", DocumentFormat::Yaml).unwrap();
/// assert_eq!(doc.lookup("database.host").and_then(|v| v.as_str()), Some("localhost"));
/// ```
pub fn parse_document(raw: &str, format: DocumentFormat) -> Result<ConfigValue> {
    parse(raw, format)
}

/// Reads and parses a document file.
///
/// # Errors
///
/// Returns [`LoadError::UnsupportedFormat`] for an unknown extension,
/// [`LoadError::IoError`] if the file cannot be read, or a parse error.
pub fn load_document(path: impl AsRef<Path>) -> Result<ConfigValue> {
    load(path.as_ref())
}

/// Parses schema text.
///
/// Structural schema problems (an element list on a non-sequence node, an
/// element list without exactly one node, unknown keys) are reported as
/// parse errors.
///
/// # Errors
///
/// Returns [`LoadError::YamlError`] or [`LoadError::JsonError`].
pub fn parse_schema(raw: &str, format: DocumentFormat) -> Result<NodeSet> {
    parse(raw, format)
}

/// Reads and parses a schema file.
///
/// # Errors
///
/// See [`load_document`] and [`parse_schema`].
pub fn load_schema(path: impl AsRef<Path>) -> Result<NodeSet> {
    let schema: NodeSet = load(path.as_ref())?;
    debug!(fields = schema.len(), "schema loaded");
    Ok(schema)
}

/// Loads `path` and validates it with `validator`.
///
/// # Errors
///
/// Returns a load error for an unreadable document, or
/// [`LoadError::SchemaError`] when the run aborts on a malformed schema.
pub fn check_document(validator: &Validator<'_>, path: impl AsRef<Path>) -> Result<Outcome> {
    let document = load_document(path)?;
    Ok(validator.validate(&document)?)
}
