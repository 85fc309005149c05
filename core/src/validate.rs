//! Recursive document validation.
//!
//! The engine walks a [`NodeSet`] and a [`ConfigValue`] in lock-step. At every
//! schema node it runs the same check pipeline, in this order:
//!
//! 1. length: size of a non-null string, map or sequence
//! 2. depth: nesting depth of a non-null map or sequence
//! 3. required: the value must not be null
//! 4. type: the runtime tag must equal the declared tag
//! 5. enum: the value must be one of the enumerated `values`
//! 6. pattern: the value must match one of the named patterns
//!
//! Every check runs regardless of earlier failures. Checks 4-6 are skipped
//! for an optional field whose value is null. Failures are recorded in an
//! [`ErrorReport`] under the field's dotted path; elements of a sequence share
//! the path `<field>.entry`.
//!
//! Descent only follows the schema. A document nested deeper than its schema
//! is never walked further, so recursion is bounded by the schema's own depth.

use serde::Serialize;
use tracing::{debug, trace};

use crate::{ConfigValue, ErrorReport, NodeSet, PatternRegistry, SchemaError, SchemaNode};

static NULL: ConfigValue = ConfigValue::Null;

/// Path segment shared by every element of a sequence.
pub const ELEMENT_SEGMENT: &str = "entry";

/// Result of a completed validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    valid: bool,
    errors: ErrorReport,
}

impl Outcome {
    fn from_report(errors: ErrorReport) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &ErrorReport {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorReport {
        self.errors
    }
}

/// Validates documents against one schema.
///
/// A validator only borrows its schema and owns no mutable state, so it can
/// be shared across threads and reused for any number of documents.
///
/// # Examples
///
/// ```
/// use config_schema_core::{ConfigValue, NodeSet, SchemaNode, Validator};
///
/// let schema = NodeSet::new().field(
///     "database",
///     SchemaNode::map(
///         NodeSet::new()
///             .field("host", SchemaNode::string().required().with_matches(["ip", "host"]))
///             .field("user", SchemaNode::string().required()),
///     )
///     .required(),
/// );
/// let document: ConfigValue = serde_json::from_str(r#"{"database": {"host": "localhost"}}"#).unwrap();
///
/// let outcome = Validator::new(&schema).validate(&document).unwrap();
/// assert!(!outcome.is_valid());
/// assert_eq!(outcome.errors().get("database.user").unwrap(), ["was required"]);
/// ```
#[derive(Debug, Clone)]
pub struct Validator<'s> {
    schema: &'s NodeSet,
    patterns: PatternRegistry,
}

impl<'s> Validator<'s> {
    /// Creates a validator using the built-in `ip` and `host` patterns.
    pub fn new(schema: &'s NodeSet) -> Self {
        Self {
            schema,
            patterns: PatternRegistry::builtin(),
        }
    }

    /// Replaces the pattern registry.
    pub fn with_patterns(mut self, patterns: PatternRegistry) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn schema(&self) -> &NodeSet {
        self.schema
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// Validates `document` and returns every failure found.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownPattern`] when a visited node names a
    /// pattern missing from the registry. The run is aborted and no partial
    /// report is returned.
    pub fn validate(&self, document: &ConfigValue) -> Result<Outcome, SchemaError> {
        debug!(fields = self.schema.len(), "validating document");

        let mut report = ErrorReport::new();
        self.validate_fields(self.schema, "", document, &mut report)?;

        debug!(
            valid = report.is_empty(),
            paths = report.len(),
            messages = report.message_count(),
            "validation finished"
        );
        Ok(Outcome::from_report(report))
    }

    fn validate_fields(
        &self,
        fields: &NodeSet,
        prefix: &str,
        value: &ConfigValue,
        report: &mut ErrorReport,
    ) -> Result<(), SchemaError> {
        for (name, node) in fields.iter() {
            let path = child_path(prefix, name);
            let child = value.get(name).unwrap_or(&NULL);
            self.validate_entry(node, &path, child, report)?;
        }
        Ok(())
    }

    fn validate_elements(
        &self,
        element: &SchemaNode,
        prefix: &str,
        value: &ConfigValue,
        report: &mut ErrorReport,
    ) -> Result<(), SchemaError> {
        // A non-sequence value was already reported by the type check.
        let Some(items) = value.as_sequence() else {
            return Ok(());
        };

        let path = child_path(prefix, ELEMENT_SEGMENT);
        for item in items {
            self.validate_entry(element, &path, item, report)?;
        }
        Ok(())
    }

    fn validate_entry(
        &self,
        node: &SchemaNode,
        path: &str,
        value: &ConfigValue,
        report: &mut ErrorReport,
    ) -> Result<(), SchemaError> {
        check_length(node, path, value, report);
        check_depth(node, path, value, report);
        check_required(node, path, value, report);
        check_type(node, path, value, report);
        check_enum(node, path, value, report);
        self.check_match(node, path, value, report)?;

        if value.is_null() {
            return Ok(());
        }

        match node {
            SchemaNode::Leaf { .. } => Ok(()),
            SchemaNode::Map { fields, .. } => self.validate_fields(fields, path, value, report),
            SchemaNode::Sequence { element, .. } => {
                self.validate_elements(element, path, value, report)
            }
        }
    }

    /// Fails if the value matches none of the node's named patterns.
    fn check_match(
        &self,
        node: &SchemaNode,
        path: &str,
        value: &ConfigValue,
        report: &mut ErrorReport,
    ) -> Result<(), SchemaError> {
        let Some(names) = &node.rules().matches else {
            return Ok(());
        };

        let matchers = names
            .iter()
            .map(|name| {
                self.patterns
                    .get(name)
                    .ok_or_else(|| SchemaError::UnknownPattern {
                        name: name.clone(),
                        path: path.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if is_optional_absent(node, value) {
            return Ok(());
        }

        let matched = value
            .as_str()
            .is_some_and(|s| matchers.iter().any(|m| m.is_match(s)));
        if !matched {
            record(
                report,
                path,
                format!(
                    "must match a regex for one of ({}), but {} did not",
                    names.join(", "),
                    render(value)
                ),
            );
        }
        Ok(())
    }
}

/// Validates `document` against `schema` with the built-in patterns.
///
/// # Errors
///
/// See [`Validator::validate`].
pub fn validate(schema: &NodeSet, document: &ConfigValue) -> Result<Outcome, SchemaError> {
    Validator::new(schema).validate(document)
}

fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn is_optional_absent(node: &SchemaNode, value: &ConfigValue) -> bool {
    !node.rules().required && value.is_null()
}

/// Null reads as "nothing" in messages.
fn render(value: &ConfigValue) -> String {
    if value.is_null() {
        "nothing".to_string()
    } else {
        value.to_string()
    }
}

fn record(report: &mut ErrorReport, path: &str, message: String) {
    trace!(path, %message, "validation failure");
    report.push(path, message);
}

/// Fails if a string, map or sequence is longer than `length`.
fn check_length(node: &SchemaNode, path: &str, value: &ConfigValue, report: &mut ErrorReport) {
    let Some(max) = node.rules().length else {
        return;
    };
    if value.is_null() {
        return;
    }

    match value.size() {
        Some(actual) if actual > max => record(
            report,
            path,
            format!("length must be at most {max}, but was {actual}"),
        ),
        Some(_) => {}
        None => record(
            report,
            path,
            format!("cannot validate length of a {}", value.type_name()),
        ),
    }
}

/// Fails if a map or sequence nests deeper than `depth`.
fn check_depth(node: &SchemaNode, path: &str, value: &ConfigValue, report: &mut ErrorReport) {
    let Some(max) = node.rules().depth else {
        return;
    };
    if value.is_null() {
        return;
    }

    if value.is_scalar() {
        record(
            report,
            path,
            format!("cannot validate depth of a {}", value.type_name()),
        );
        return;
    }

    let actual = value.depth();
    if actual > max {
        record(
            report,
            path,
            format!("depth must be at most {max}, but was {actual}"),
        );
    }
}

fn check_required(node: &SchemaNode, path: &str, value: &ConfigValue, report: &mut ErrorReport) {
    if node.rules().required && value.is_null() {
        record(report, path, "was required".to_string());
    }
}

/// Null always passes; absence is the required check's job.
fn check_type(node: &SchemaNode, path: &str, value: &ConfigValue, report: &mut ErrorReport) {
    if is_optional_absent(node, value) {
        return;
    }
    let Some(expected) = node.value_type() else {
        return;
    };
    let Some(actual) = value.value_type() else {
        return;
    };

    if actual != expected {
        record(
            report,
            path,
            format!("supposed to be a {expected} but was {actual}"),
        );
    }
}

fn check_enum(node: &SchemaNode, path: &str, value: &ConfigValue, report: &mut ErrorReport) {
    if is_optional_absent(node, value) {
        return;
    }
    let Some(values) = &node.rules().values else {
        return;
    };
    if values.iter().any(|allowed| allowed.same_scalar(value)) {
        return;
    }

    let allowed = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    record(
        report,
        path,
        format!("must be one of {allowed}, but was {}", render(value)),
    );
}
