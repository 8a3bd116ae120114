//! URL template engine.
//!
//! A [`UrlTemplate`] is an interleaving of literal segments and placeholder
//! keys where the literals outnumber the keys by exactly one:
//!
//! ```text
//! literals: ["/users/", "/posts/", ""]
//! keys:     [        "id",       "postId"]
//! ```
//!
//! From that single description it derives a validator for parameter maps,
//! a URL builder, and the path template the serving side registers.
//!
//! # Example
//!
//! ```
//! use route_contract::template::UrlTemplate;
//! use serde_json::json;
//!
//! let template = UrlTemplate::parse("/users/{id}/posts/{postId}").unwrap();
//! assert_eq!(template.path_template(), "/users/:id/posts/:postId");
//! assert_eq!(
//!     template.build(&json!({"id": "7", "postId": "42"})).unwrap(),
//!     "/users/7/posts/42"
//! );
//! assert!(!template.validate(&json!({"id": 7})));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ContractError, Result};

/// Placeholder syntax accepted by [`UrlTemplate::parse`].
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Characters a literal may not contain: placeholder braces and the
/// serving router's own parameter markers.
const RESERVED: &[char] = &['{', '}', ':', '*'];

/// A parameterized URL path. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    literals: Vec<String>,
    keys: Vec<String>,
}

impl UrlTemplate {
    /// Create a template from its literal segments and placeholder keys.
    ///
    /// Fails with [`ContractError::Construction`] unless
    /// `literals.len() == keys.len() + 1`, every placeholder is a whole path
    /// segment, and no literal contains `{`, `}`, `:` or `*`.
    pub fn new<L, K>(literals: L, keys: K) -> Result<Self>
    where
        L: IntoIterator,
        L::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let literals: Vec<String> = literals.into_iter().map(Into::into).collect();
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();

        if literals.len() != keys.len() + 1 {
            return Err(ContractError::Construction(format!(
                "expected {} literal segments for {} keys, got {}",
                keys.len() + 1,
                keys.len(),
                literals.len()
            )));
        }
        if let Some(key) = keys.iter().find(|k| k.is_empty()) {
            return Err(ContractError::Construction(format!(
                "empty placeholder key {:?}",
                key
            )));
        }
        if let Some(literal) = literals.iter().find(|l| l.contains(RESERVED)) {
            return Err(ContractError::Construction(format!(
                "literal {:?} contains one of {:?}",
                literal,
                RESERVED.iter().collect::<String>()
            )));
        }

        // Placeholders must fill whole `/`-delimited segments, otherwise the
        // serving router would read `:name.json` as a parameter `name.json`.
        for (i, key) in keys.iter().enumerate() {
            let before = &literals[i];
            let after = &literals[i + 1];
            let ends_path = i + 1 == keys.len() && after.is_empty();
            if !before.ends_with('/') || !(after.starts_with('/') || ends_path) {
                return Err(ContractError::Construction(format!(
                    "placeholder {:?} must span a whole path segment",
                    key
                )));
            }
        }

        Ok(Self { literals, keys })
    }

    /// Parse a braced pattern such as `/users/{id}/posts/{postId}`.
    ///
    /// Braces that do not form a valid `{name}` placeholder are rejected
    /// rather than kept as literal text.
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut literals = Vec::new();
        let mut keys = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(pattern) {
            let Some(whole) = caps.get(0) else { continue };
            literals.push(pattern[last..whole.start()].to_string());
            keys.push(caps[1].to_string());
            last = whole.end();
        }
        literals.push(pattern[last..].to_string());

        if let Some(stray) = literals.iter().find(|l| l.contains('{') || l.contains('}')) {
            return Err(ContractError::Construction(format!(
                "malformed placeholder in {:?} near {:?}",
                pattern, stray
            )));
        }

        Self::new(literals, keys)
    }

    /// Literal segments, in order.
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    /// Placeholder keys, in order. May contain repeats.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The braced form of the pattern, e.g. `/users/{id}`.
    pub fn pattern(&self) -> String {
        self.render(|key| format!("{{{}}}", key))
    }

    /// The form the serving transport registers, e.g. `/users/:id`.
    pub fn path_template(&self) -> String {
        self.render(|key| format!(":{}", key))
    }

    /// True iff `input` is an object holding a string for every key.
    ///
    /// Extra keys are ignored. Never panics.
    pub fn validate(&self, input: &Value) -> bool {
        match input {
            Value::Object(map) => self
                .keys
                .iter()
                .all(|key| matches!(map.get(key), Some(Value::String(_)))),
            _ => false,
        }
    }

    /// Substitute `values` into the template.
    ///
    /// A key that appears more than once receives the same value at every
    /// occurrence.
    pub fn build(&self, values: &Value) -> Result<String> {
        if !self.validate(values) {
            return Err(ContractError::InvalidUrlParameters {
                template: self.pattern(),
            });
        }

        // validate() guarantees every key maps to a string.
        Ok(self.render(|key| {
            values
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        }))
    }

    /// Serialize a typed parameter struct and [`build`](Self::build) from it.
    pub fn build_from<P: Serialize>(&self, params: &P) -> Result<String> {
        let values = serde_json::to_value(params)?;
        self.build(&values)
    }

    /// Recover the placeholder values from a URL produced by this template.
    ///
    /// Literals are matched left to right; each value runs up to the next
    /// occurrence of the following literal (or to the end for a trailing
    /// empty literal). Returns `None` when the URL does not fit the template
    /// or when a repeated key would receive two different values.
    pub fn extract(&self, url: &str) -> Option<Map<String, Value>> {
        let mut rest = url.strip_prefix(self.literals[0].as_str())?;
        let mut out = Map::new();

        for (i, key) in self.keys.iter().enumerate() {
            let next = self.literals[i + 1].as_str();
            let is_last = i + 1 == self.keys.len();
            let end = if is_last && next.is_empty() {
                rest.len()
            } else if is_last {
                rest.strip_suffix(next)?.len()
            } else if next.is_empty() {
                return None;
            } else {
                rest.find(next)?
            };

            let value = Value::String(rest[..end].to_string());
            if let Some(previous) = out.get(key) {
                if *previous != value {
                    return None;
                }
            }
            out.insert(key.clone(), value);
            rest = &rest[end + next.len()..];
        }

        if self.keys.is_empty() && !rest.is_empty() {
            return None;
        }
        Some(out)
    }

    fn render(&self, mut substitute: impl FnMut(&str) -> String) -> String {
        let mut url = String::with_capacity(self.literals.iter().map(String::len).sum());
        for (literal, key) in self.literals.iter().zip(&self.keys) {
            url.push_str(literal);
            url.push_str(&substitute(key));
        }
        if let Some(tail) = self.literals.last() {
            url.push_str(tail);
        }
        url
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern())
    }
}
