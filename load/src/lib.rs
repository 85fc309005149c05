//! File loading for configuration documents, schemas and batch checks.
//!
//! The core engine only consumes in-memory trees. This crate reads them from
//! YAML or JSON files and loads the batch [`CheckConfig`] the CLI runs.
//!
//! # Quick start
//!
//! ```no_run
//! use config_schema_core::Validator;
//! use config_schema_load::{CheckConfig, check_document, load_schema};
//!
//! let config = CheckConfig::load(".config-schema.yml").unwrap();
//! let patterns = config.registry().unwrap();
//!
//! for target in &config.targets {
//!     let schema = load_schema(&target.schema).unwrap();
//!     let validator = Validator::new(&schema).with_patterns(patterns.clone());
//!     for path in &target.documents {
//!         let outcome = check_document(&validator, path).unwrap();
//!         println!("{}: {}", path.display(), outcome.is_valid());
//!     }
//! }
//! ```

mod config;
mod document;
mod error;

pub use config::{CheckConfig, Target};
pub use document::{
    DocumentFormat, check_document, load_document, load_schema, parse_document, parse_schema,
};
pub use error::{LoadError, Result};
