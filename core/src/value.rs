//! Runtime value model for parsed configuration documents.
//!
//! A [`ConfigValue`] is the format-agnostic tree a document parser produces:
//! maps with string keys, ordered sequences, and scalars. The engine only ever
//! reads it. [`ValueType`] is the closed set of type tags a schema can demand.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;

/// Type tag a schema node can declare for its field.
///
/// In schema files the tags are written in lowercase; `hash`, `array`, `int`
/// and `bool` are accepted as aliases.
///
/// # Examples
///
/// ```
/// use config_schema_core::{ConfigValue, ValueType};
///
/// assert_eq!(ConfigValue::from("x").value_type(), Some(ValueType::String));
/// assert_eq!(ConfigValue::Null.value_type(), None);
/// assert_eq!(ValueType::Sequence.to_string(), "Sequence");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// String-keyed mapping.
    #[serde(alias = "hash")]
    Map,
    /// Ordered list.
    #[serde(alias = "array")]
    Sequence,
    /// UTF-8 string.
    String,
    /// Signed 64-bit integer.
    #[serde(alias = "int")]
    Integer,
    /// 64-bit float. Integers do not satisfy this tag.
    Float,
    /// `true` or `false`.
    #[serde(alias = "bool")]
    Boolean,
}

impl ValueType {
    /// Human-readable tag name used in report messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::Sequence => "Sequence",
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
        }
    }

    /// Returns `true` for [`Map`](Self::Map) and [`Sequence`](Self::Sequence).
    pub fn is_container(self) -> bool {
        matches!(self, Self::Map | Self::Sequence)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of a parsed configuration document.
///
/// Maps are keyed by string. Keys that a parser reports as other scalars
/// (numbers, booleans) are stringified on deserialization so lookups by
/// field name behave the same for every source format.
///
/// # Examples
///
/// ```
/// use config_schema_core::ConfigValue;
///
/// let doc: ConfigValue = serde_json::from_str(r#"{"database": {"port": 5432}}"#).unwrap();
/// assert_eq!(doc.lookup("database.port"), Some(&ConfigValue::Integer(5432)));
/// assert_eq!(doc.depth(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Absent or explicit null.
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Runtime type tag, or `None` for [`Null`](Self::Null).
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(ValueType::Boolean),
            Self::Integer(_) => Some(ValueType::Integer),
            Self::Float(_) => Some(ValueType::Float),
            Self::String(_) => Some(ValueType::String),
            Self::Sequence(_) => Some(ValueType::Sequence),
            Self::Map(_) => Some(ValueType::Map),
        }
    }

    /// Name of the runtime type, `"Null"` included.
    pub fn type_name(&self) -> &'static str {
        self.value_type().map_or("Null", ValueType::name)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for anything that is not a map or sequence.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Map(_) | Self::Sequence(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key when `self` is a map.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follows a dotted path of map keys (`"database.host"`).
    ///
    /// An empty path returns `self`.
    pub fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |current, segment| current.get(segment))
    }

    /// Size as seen by a `length` rule: character count for strings,
    /// element count for maps and sequences, `None` for everything else.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::Sequence(items) => Some(items.len()),
            Self::Map(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Maximum nesting depth of containers below and including `self`.
    ///
    /// Scalars and `Null` have depth 0. A non-empty container has depth
    /// `1 + max(depth(child))`, so a map of scalars has depth 1. An empty
    /// container adds no level of its own: `{a: []}` has depth 1.
    ///
    /// The walk uses an explicit stack, so arbitrarily deep documents cannot
    /// exhaust the call stack.
    ///
    /// ```
    /// use config_schema_core::ConfigValue;
    ///
    /// let doc: ConfigValue = serde_json::from_str(r#"{"a": {"b": 1}}"#).unwrap();
    /// assert_eq!(doc.depth(), 2);
    /// let doc: ConfigValue = serde_json::from_str(r#"{"a": []}"#).unwrap();
    /// assert_eq!(doc.depth(), 1);
    /// ```
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&ConfigValue, usize)> = vec![(self, 0)];

        while let Some((value, level)) = stack.pop() {
            match value {
                Self::Map(map) if !map.is_empty() => {
                    stack.extend(map.values().map(|child| (child, level + 1)));
                }
                Self::Sequence(items) if !items.is_empty() => {
                    stack.extend(items.iter().map(|child| (child, level + 1)));
                }
                _ => deepest = deepest.max(level),
            }
        }

        deepest
    }

    /// Equality used for enumerated values: integers and floats compare
    /// numerically, everything else structurally.
    pub fn same_scalar(&self, other: &ConfigValue) -> bool {
        match (self, other) {
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                *i as f64 == *f
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(s),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        Self::Sequence(value)
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(value: BTreeMap<String, ConfigValue>) -> Self {
        Self::Map(value)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ConfigValue::Boolean(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConfigValue::Integer(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or(ConfigValue::Float(v as f64), ConfigValue::Integer))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConfigValue::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConfigValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(ConfigValue::String(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigValue::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((MapKey(key), value)) = map.next_entry::<MapKey, ConfigValue>()? {
            entries.insert(key, value);
        }
        Ok(ConfigValue::Map(entries))
    }
}

/// Map key accepting any scalar and storing it as a string.
struct MapKey(String);

impl<'de> Deserialize<'de> for MapKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeyVisitor)
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = MapKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar map key")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(MapKey(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(MapKey(v))
    }

    fn visit_seq<A>(self, _seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Err(de::Error::invalid_type(de::Unexpected::Seq, &self))
    }

    fn visit_map<A>(self, _map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        Err(de::Error::invalid_type(de::Unexpected::Map, &self))
    }
}
