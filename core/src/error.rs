//! Fatal schema errors.
//!
//! These describe a malformed schema rather than an invalid document. They
//! abort a validation run instead of being recorded in the
//! [`ErrorReport`](crate::ErrorReport).

use thiserror::Error;

use crate::ValueType;

/// Structural problems in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An element list `entry` was given on a node not typed as a sequence.
    #[error("entry list requires type sequence, but type was {}", type_label(.0))]
    ElementRequiresSequence(Option<ValueType>),
    /// Sequence `entry` lists describe one shape for every element.
    #[error("entry list must contain exactly one node, found {0}")]
    ElementCount(usize),
    /// Enumerated `values` may only hold scalars.
    #[error("enumerated value must be a scalar, found {0}")]
    NonScalarValue(String),
    /// A node names a pattern the registry does not know.
    #[error("unknown pattern '{name}' referenced at '{path}'")]
    UnknownPattern {
        /// Pattern name as written in the schema.
        name: String,
        /// Dotted path of the node that references it.
        path: String,
    },
}

fn type_label(value_type: &Option<ValueType>) -> &'static str {
    value_type.map_or("none", ValueType::name)
}
