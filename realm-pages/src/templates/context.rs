//! Data handed to a template for a single render.

use minijinja::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

use super::filters::{NumberValue, Timestamp};

/// Key under which the current realm is always available to templates.
pub const REALM_KEY: &str = "realm";

/// Values visible to a template, keyed by name.
///
/// Built fresh for each request. The `realm` key is owned by the page
/// handler: [`with_realm`](Self::with_realm) runs last and overwrites
/// whatever a handler put there.
///
/// # Example
///
/// ```rust
/// use realm_pages::templates::RenderContext;
///
/// let ctx = RenderContext::new()
///     .with("empire", "Hegemony")
///     .with("stars", 1204)
///     .with_realm("beta");
///
/// assert_eq!(ctx.get("realm").unwrap().as_str(), Some("beta"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    values: BTreeMap<String, Value>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert any serializable value.
    pub fn insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.values.insert(key.into(), Value::from_serialize(value));
        self
    }

    /// Insert an engine value as-is.
    pub fn insert_value(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Insert a point in time, usable with `local-date`.
    pub fn insert_timestamp(&mut self, key: impl Into<String>, ts: impl Into<Timestamp>) -> &mut Self {
        self.insert_value(key, Value::from(ts.into()))
    }

    /// Insert a tagged number, usable with `number`.
    pub fn insert_number(&mut self, key: impl Into<String>, n: NumberValue) -> &mut Self {
        self.insert_value(key, Value::from(n))
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder form of [`insert_timestamp`](Self::insert_timestamp).
    #[must_use]
    pub fn with_timestamp(mut self, key: impl Into<String>, ts: impl Into<Timestamp>) -> Self {
        self.insert_timestamp(key, ts);
        self
    }

    /// Set `realm`, replacing any existing value under that key.
    #[must_use]
    pub fn with_realm(mut self, realm: &str) -> Self {
        self.values.insert(REALM_KEY.to_string(), Value::from(realm));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The whole context as a single engine value.
    pub(crate) fn to_value(&self) -> Value {
        Value::from(self.values.clone())
    }
}
