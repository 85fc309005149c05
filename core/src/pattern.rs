//! Named pattern registry for `matches` rules.
//!
//! Schemas refer to patterns by name (`matches: [ip, host]`). The registry
//! maps those names to [`Matcher`]s so new patterns can be added without
//! touching the engine. [`PatternRegistry::builtin`] carries `ip` and `host`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

/// Name of the built-in dotted-quad IPv4 pattern.
pub const IP_PATTERN: &str = "ip";
/// Name of the built-in RFC-1123 hostname pattern.
pub const HOST_PATTERN: &str = "host";

static IP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .expect("static regex must compile")
});

static HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])\.)*(?:[A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9-]*[A-Za-z0-9])$",
    )
    .expect("static regex must compile")
});

/// Something that accepts or rejects a string.
pub trait Matcher: Send + Sync {
    fn is_match(&self, candidate: &str) -> bool;
}

impl Matcher for Regex {
    fn is_match(&self, candidate: &str) -> bool {
        Regex::is_match(self, candidate)
    }
}

struct FnMatcher<F>(F);

impl<F> Matcher for FnMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, candidate: &str) -> bool {
        (self.0)(candidate)
    }
}

/// Mapping from pattern name to matcher.
///
/// Cloning is cheap; matchers are shared.
///
/// # Examples
///
/// ```
/// use config_schema_core::PatternRegistry;
///
/// let mut patterns = PatternRegistry::builtin();
/// patterns.insert_regex("semver", r"^\d+\.\d+\.\d+$").unwrap();
/// patterns.insert_fn("lowercase", |s| s.chars().all(|c| !c.is_uppercase()));
///
/// assert!(patterns.is_match("ip", "10.0.0.1"));
/// assert!(patterns.is_match("semver", "1.2.3"));
/// assert!(!patterns.is_match("lowercase", "Nope"));
/// assert!(!patterns.is_match("unregistered", "anything"));
/// ```
#[derive(Clone)]
pub struct PatternRegistry {
    matchers: BTreeMap<String, Arc<dyn Matcher>>,
}

impl PatternRegistry {
    /// Creates a registry with no patterns at all.
    pub fn empty() -> Self {
        Self {
            matchers: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the `ip` and `host` patterns.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.insert(IP_PATTERN, IP_RE.clone());
        registry.insert(HOST_PATTERN, HOST_RE.clone());
        registry
    }

    /// Registers `matcher` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, matcher: impl Matcher + 'static) {
        self.matchers.insert(name.into(), Arc::new(matcher));
    }

    /// Compiles `source` and registers it under `name`.
    ///
    /// # Errors
    ///
    /// Returns the compilation error if `source` is not a valid regex; the
    /// registry is left unchanged.
    pub fn insert_regex(&mut self, name: impl Into<String>, source: &str) -> Result<(), regex::Error> {
        let regex = Regex::new(source)?;
        self.insert(name, regex);
        Ok(())
    }

    /// Registers a predicate closure under `name`.
    pub fn insert_fn<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.insert(name, FnMatcher(predicate));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, matcher: impl Matcher + 'static) -> Self {
        self.insert(name, matcher);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Matcher> {
        self.matchers.get(name).map(|m| m.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matchers.contains_key(name)
    }

    /// Returns `true` if `name` is registered and matches `candidate`.
    pub fn is_match(&self, name: &str, candidate: &str) -> bool {
        self.get(name).is_some_and(|m| m.is_match(candidate))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matchers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
