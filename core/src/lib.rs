//! Schema model and recursive validation engine for configuration documents.
//!
//! This crate validates nested, dynamically-typed configuration data (the
//! map/sequence/scalar tree a YAML or JSON parser produces) against a
//! declarative schema, collecting every failure instead of stopping at the
//! first one:
//!
//! - [`ConfigValue`]: the parsed document tree; deserializes from any serde
//!   format.
//! - [`SchemaNode`] / [`NodeSet`]: per-field constraints plus
//!   nested rules for maps and sequences.
//! - [`PatternRegistry`]: named matchers for `matches` rules (`ip`, `host`,
//!   plus anything registered).
//! - [`Validator`] / [`validate`]: the engine, returning an [`Outcome`] with
//!   an [`ErrorReport`] keyed by dotted field path.
//!
//! A malformed schema (as opposed to an invalid document) surfaces as a
//! [`SchemaError`] and aborts the run.
//!
//! # Example
//!
//! ```
//! use config_schema_core::*;
//!
//! let schema = NodeSet::new().field(
//!     "config",
//!     SchemaNode::map(
//!         NodeSet::new().field("host", SchemaNode::string().required().with_matches(["ip", "host"])),
//!     )
//!     .required()
//!     .with_depth(2),
//! );
//!
//! let document: ConfigValue = serde_yaml::from_str("config:\n  host: not a host!\n").unwrap();
//! let outcome = validate(&schema, &document).unwrap();
//!
//! assert!(!outcome.is_valid());
//! assert!(outcome.errors().get("config.host").unwrap()[0].contains("must match a regex"));
//! ```

mod error;
mod pattern;
mod report;
mod schema;
mod validate;
mod value;

pub use error::SchemaError;
pub use pattern::{HOST_PATTERN, IP_PATTERN, Matcher, PatternRegistry};
pub use report::ErrorReport;
pub use schema::{NodeSet, Rules, SchemaNode};
pub use validate::{ELEMENT_SEGMENT, Outcome, Validator, validate};
pub use value::{ConfigValue, ValueType};
