//! Schema model: the rules a document is validated against.
//!
//! A schema is a [`NodeSet`], an ordered mapping from field name to
//! [`SchemaNode`]. Each node is one of three variants:
//!
//! - [`SchemaNode::Leaf`]: constraints only, with an optional declared type.
//! - [`SchemaNode::Map`]: a field with nested field rules, usually typed as a map.
//! - [`SchemaNode::Sequence`]: a sequence-typed field whose elements all
//!   satisfy one element node.
//!
//! Because nested sequence rules only exist on the `Sequence` variant, a
//! node cannot describe sequence elements while being typed as anything else.
//!
//! # Schema files
//!
//! Schemas deserialize from any serde format. Node keys are `type`,
//! `required`, `values`, `matches`, `length`, `depth`, `entry`, `default`,
//! `example` and `description`:
//!
//! ```
//! use config_schema_core::{NodeSet, ValueType};
//!
//! let schema: NodeSet = serde_yaml::from_str(r#"
//! database:
//!   type: map
//!   required: true
//!   entry:
//!     host: { type: string, required: true, matches: [ip, host] }
//!     migration_folders:
//!       type: sequence
//!       entry: [{ type: string }]
//! "#).unwrap();
//!
//! let database = schema.get("database").unwrap();
//! assert_eq!(database.value_type(), Some(ValueType::Map));
//! assert!(database.rules().required);
//! ```

use std::fmt;

use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::{ConfigValue, SchemaError, ValueType};

/// Constraints shared by every node variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    /// Absence (missing or null) is a violation.
    pub required: bool,
    /// Enumerated whitelist of scalar values.
    pub values: Option<Vec<ConfigValue>>,
    /// Pattern names; the value must match at least one.
    pub matches: Option<Vec<String>>,
    /// Maximum character count (strings) or element count (maps, sequences).
    pub length: Option<usize>,
    /// Maximum nesting depth of a map or sequence value.
    pub depth: Option<usize>,
    /// Documented default. Never applied or enforced.
    pub default: Option<ConfigValue>,
    /// Documented example. Never enforced.
    pub example: Option<ConfigValue>,
    pub description: Option<String>,
}

/// Rules for a single field.
///
/// # Examples
///
/// ```
/// use config_schema_core::{NodeSet, SchemaNode, ValueType};
///
/// let host = SchemaNode::string().required().with_matches(["ip", "host"]);
/// let ports = SchemaNode::sequence(SchemaNode::integer()).with_length(4);
/// let server = SchemaNode::map(NodeSet::new().field("host", host).field("ports", ports));
///
/// assert_eq!(server.value_type(), Some(ValueType::Map));
/// assert_eq!(server.fields().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// No nested rules.
    Leaf {
        value_type: Option<ValueType>,
        rules: Rules,
    },
    /// Field with rules for its fields.
    ///
    /// A schema file may omit `type` here, in which case the value's type
    /// is not checked and fields of a non-map value are read as absent.
    Map {
        value_type: Option<ValueType>,
        fields: NodeSet,
        rules: Rules,
    },
    /// Sequence-typed field with one rule for every element.
    Sequence {
        element: Box<SchemaNode>,
        rules: Rules,
    },
}

impl SchemaNode {
    /// A leaf with no type constraint.
    pub fn any() -> Self {
        Self::Leaf {
            value_type: None,
            rules: Rules::default(),
        }
    }

    /// A leaf that must hold `value_type`.
    ///
    /// `typed(ValueType::Map)` checks the type without descending; use
    /// [`map`](Self::map) to validate the fields as well.
    pub fn typed(value_type: ValueType) -> Self {
        Self::Leaf {
            value_type: Some(value_type),
            rules: Rules::default(),
        }
    }

    pub fn string() -> Self {
        Self::typed(ValueType::String)
    }

    pub fn integer() -> Self {
        Self::typed(ValueType::Integer)
    }

    pub fn float() -> Self {
        Self::typed(ValueType::Float)
    }

    pub fn boolean() -> Self {
        Self::typed(ValueType::Boolean)
    }

    /// A map-typed node whose fields are validated against `fields`.
    pub fn map(fields: NodeSet) -> Self {
        Self::Map {
            value_type: Some(ValueType::Map),
            fields,
            rules: Rules::default(),
        }
    }

    /// A sequence-typed node whose every element is validated against `element`.
    pub fn sequence(element: SchemaNode) -> Self {
        Self::Sequence {
            element: Box::new(element),
            rules: Rules::default(),
        }
    }

    /// Declared type. Sequence nodes always declare their own.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Leaf { value_type, .. } | Self::Map { value_type, .. } => *value_type,
            Self::Sequence { .. } => Some(ValueType::Sequence),
        }
    }

    pub fn rules(&self) -> &Rules {
        match self {
            Self::Leaf { rules, .. } | Self::Map { rules, .. } | Self::Sequence { rules, .. } => {
                rules
            }
        }
    }

    pub fn rules_mut(&mut self) -> &mut Rules {
        match self {
            Self::Leaf { rules, .. } | Self::Map { rules, .. } | Self::Sequence { rules, .. } => {
                rules
            }
        }
    }

    /// Nested field rules of a map node.
    pub fn fields(&self) -> Option<&NodeSet> {
        match self {
            Self::Map { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Element rule of a sequence node.
    pub fn element(&self) -> Option<&SchemaNode> {
        match self {
            Self::Sequence { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.rules_mut().required = true;
        self
    }

    /// Restricts the value to an enumerated set.
    pub fn with_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ConfigValue>,
    {
        self.rules_mut().values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Requires the value to match at least one named pattern.
    pub fn with_matches<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules_mut().matches = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_length(mut self, max: usize) -> Self {
        self.rules_mut().length = Some(max);
        self
    }

    pub fn with_depth(mut self, max: usize) -> Self {
        self.rules_mut().depth = Some(max);
        self
    }

    pub fn with_default(mut self, value: impl Into<ConfigValue>) -> Self {
        self.rules_mut().default = Some(value.into());
        self
    }

    pub fn with_example(mut self, value: impl Into<ConfigValue>) -> Self {
        self.rules_mut().example = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.rules_mut().description = Some(description.to_string());
        self
    }
}

/// Ordered mapping from field name to [`SchemaNode`].
///
/// Fields are visited in declaration order. Declaring a name twice keeps the
/// first position and the last node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSet {
    fields: Vec<(String, SchemaNode)>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn field(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.insert(name, node);
        self
    }

    /// Adds or replaces a field, returning the replaced node.
    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, node)),
            None => {
                self.fields.push((name, node));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SchemaNode)> for NodeSet {
    fn from_iter<I: IntoIterator<Item = (S, SchemaNode)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, node) in iter {
            set.insert(name, node);
        }
        set
    }
}

impl<'de> Deserialize<'de> for NodeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(NodeSetVisitor)
    }
}

struct NodeSetVisitor;

impl<'de> Visitor<'de> for NodeSetVisitor {
    type Value = NodeSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of field names to schema nodes")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut set = NodeSet::new();
        while let Some((name, node)) = map.next_entry::<String, SchemaNode>()? {
            set.insert(name, node);
        }
        Ok(set)
    }
}

/// Schema-file shape of a node before structural checks.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
    #[serde(default)]
    required: bool,
    #[serde(rename = "type", default)]
    value_type: Option<ValueType>,
    #[serde(default)]
    values: Option<Vec<ConfigValue>>,
    #[serde(default)]
    matches: Option<OneOrMany>,
    #[serde(default)]
    length: Option<usize>,
    #[serde(default)]
    depth: Option<usize>,
    #[serde(default)]
    default: Option<ConfigValue>,
    #[serde(default)]
    example: Option<ConfigValue>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    entry: Option<RawEntry>,
}

/// `matches: ip` and `matches: [ip, host]` are both accepted.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(name) => vec![name],
            OneOrMany::Many(names) => names,
        }
    }
}

enum RawEntry {
    Fields(NodeSet),
    Elements(Vec<SchemaNode>),
}

impl<'de> Deserialize<'de> for RawEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(EntryVisitor)
    }
}

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = RawEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of fields or a one-element list of schema nodes")
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        NodeSet::deserialize(MapAccessDeserializer::new(map)).map(RawEntry::Fields)
    }

    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Vec::<SchemaNode>::deserialize(SeqAccessDeserializer::new(seq)).map(RawEntry::Elements)
    }
}

impl TryFrom<RawNode> for SchemaNode {
    type Error = SchemaError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if let Some(values) = &raw.values {
            if let Some(bad) = values.iter().find(|v| !v.is_scalar()) {
                return Err(SchemaError::NonScalarValue(bad.to_string()));
            }
        }

        let rules = Rules {
            required: raw.required,
            values: raw.values,
            matches: raw.matches.map(Into::into),
            length: raw.length,
            depth: raw.depth,
            default: raw.default,
            example: raw.example,
            description: raw.description,
        };

        match raw.entry {
            None => Ok(Self::Leaf {
                value_type: raw.value_type,
                rules,
            }),
            Some(RawEntry::Fields(fields)) => Ok(Self::Map {
                value_type: raw.value_type,
                fields,
                rules,
            }),
            Some(RawEntry::Elements(mut elements)) => {
                if raw.value_type != Some(ValueType::Sequence) {
                    return Err(SchemaError::ElementRequiresSequence(raw.value_type));
                }
                if elements.len() != 1 {
                    return Err(SchemaError::ElementCount(elements.len()));
                }
                let element = elements.remove(0);
                Ok(Self::Sequence {
                    element: Box::new(element),
                    rules,
                })
            }
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawNode::deserialize(deserializer)?;
        SchemaNode::try_from(raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<NodeSet, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    #[test]
    fn test_parse_preserves_field_order() {
        let schema = parse("zeta: {}\nalpha: {}\nmid: {}\n").unwrap();
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_leaf_rules() {
        let schema = parse(
            r#"
vendor:
  type: string
  values: [mysql, postgres, sqlite]
  default: mysql
  example: mysql
host:
  type: string
  required: true
  matches: ip
  length: 253
"#,
        )
        .unwrap();

        let vendor = schema.get("vendor").unwrap();
        assert_eq!(vendor.value_type(), Some(ValueType::String));
        assert_eq!(vendor.rules().values.as_ref().unwrap().len(), 3);
        assert_eq!(vendor.rules().default, Some(ConfigValue::from("mysql")));
        assert!(!vendor.rules().required);

        let host = schema.get("host").unwrap();
        assert_eq!(host.rules().matches, Some(vec!["ip".to_string()]));
        assert_eq!(host.rules().length, Some(253));
    }

    #[test]
    fn test_parse_type_aliases() {
        let schema = parse("a: {type: hash}\nb: {type: array}\nc: {type: int}\nd: {type: bool}\n")
            .unwrap();
        assert_eq!(schema.get("a").unwrap().value_type(), Some(ValueType::Map));
        assert_eq!(schema.get("b").unwrap().value_type(), Some(ValueType::Sequence));
        assert_eq!(schema.get("c").unwrap().value_type(), Some(ValueType::Integer));
        assert_eq!(schema.get("d").unwrap().value_type(), Some(ValueType::Boolean));
    }

    #[test]
    fn test_parse_nested_entries() {
        let schema = parse(
            r#"
database:
  type: map
  entry:
    folders:
      type: sequence
      entry:
        - type: string
"#,
        )
        .unwrap();

        let database = schema.get("database").unwrap();
        let folders = database.fields().unwrap().get("folders").unwrap();
        assert_eq!(folders.value_type(), Some(ValueType::Sequence));
        assert_eq!(folders.element().unwrap().value_type(), Some(ValueType::String));
    }

    #[test]
    fn test_fields_entry_without_type_is_an_untyped_map_node() {
        let schema = parse("config:\n  entry:\n    host: {type: string}\n").unwrap();
        let config = schema.get("config").unwrap();
        assert!(matches!(config, SchemaNode::Map { .. }));
        assert_eq!(config.value_type(), None);
        assert!(config.fields().unwrap().get("host").is_some());
    }

    #[test]
    fn test_element_entry_requires_sequence_type() {
        let err = parse("list:\n  type: string\n  entry: [{type: integer}]\n").unwrap_err();
        assert!(err.to_string().contains("entry list requires type sequence"));

        let err = parse("list:\n  entry: [{type: integer}]\n").unwrap_err();
        assert!(err.to_string().contains("but type was none"));
    }

    #[test]
    fn test_element_entry_must_hold_one_node() {
        let err = parse("list:\n  type: sequence\n  entry: []\n").unwrap_err();
        assert!(err.to_string().contains("exactly one node, found 0"));

        let err = parse("list:\n  type: sequence\n  entry: [{}, {}]\n").unwrap_err();
        assert!(err.to_string().contains("exactly one node, found 2"));
    }

    #[test]
    fn test_fields_entry_keeps_declared_scalar_type() {
        let schema = parse("config:\n  type: string\n  entry: {host: {}}\n").unwrap();
        let config = schema.get("config").unwrap();
        assert_eq!(config.value_type(), Some(ValueType::String));
        assert_eq!(config.fields().unwrap().len(), 1);
    }

    #[test]
    fn test_scalar_entry_is_rejected() {
        let err = parse("config:\n  type: map\n  entry: 5\n").unwrap_err();
        assert!(err.to_string().contains("a mapping of fields or a one-element list"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse("config:\n  requred: true\n").is_err());
    }

    #[test]
    fn test_values_must_be_scalars() {
        let err = parse("mode:\n  values: [a, [b]]\n").unwrap_err();
        assert!(err.to_string().contains("enumerated value must be a scalar"));
    }

    #[test]
    fn test_values_accept_null_like_builder() {
        let parsed = parse("mode:\n  values: [fast, ~]\n").unwrap();
        let built = NodeSet::new().field(
            "mode",
            SchemaNode::any().with_values([ConfigValue::from("fast"), ConfigValue::Null]),
        );
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_builder_matches_parsed_schema() {
        let built = NodeSet::new().field(
            "config",
            SchemaNode::map(
                NodeSet::new().field("host", SchemaNode::string().required().with_matches(["ip", "host"])),
            )
            .required(),
        );
        let parsed = parse(
            "config:\n  type: map\n  required: true\n  entry:\n    host: {type: string, required: true, matches: [ip, host]}\n",
        )
        .unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut set = NodeSet::new().field("a", SchemaNode::any()).field("b", SchemaNode::any());
        let old = set.insert("a", SchemaNode::string());
        assert_eq!(old, Some(SchemaNode::any()));
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(set.get("a").unwrap().value_type(), Some(ValueType::String));
    }
}
