//! Immutable set of named template filters.

use minijinja::value::{Rest, Value};
use minijinja::{Environment, ErrorKind};
use std::fmt;

use super::filters;
use crate::error::{Error, Result};

/// Signature shared by every filter: the piped value plus extra arguments.
pub type FilterFn = fn(&Value, &[Value]) -> std::result::Result<Value, minijinja::Error>;

/// Filters available to templates, keyed by name.
///
/// Built once at startup and handed to [`TemplateRenderer`](super::TemplateRenderer)
/// by reference. There is no way to add or remove filters afterwards.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: Vec<(&'static str, FilterFn)>,
}

impl FilterRegistry {
    /// Start an empty registry.
    pub fn builder() -> FilterRegistryBuilder {
        FilterRegistryBuilder::default()
    }

    /// `number`, `attr-escape` and `local-date`.
    pub fn standard() -> Self {
        Self::builder()
            .filter(filters::NUMBER, filters::number)
            .filter(filters::ATTR_ESCAPE, filters::attr_escape)
            .filter(filters::LOCAL_DATE, filters::local_date)
            .build()
    }

    /// Look up a filter by its canonical name.
    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.filters
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    /// Canonical filter names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply a filter outside of a template.
    pub fn apply(&self, name: &str, value: &Value) -> Result<Value> {
        let filter = self.get(name).ok_or_else(|| {
            Error::from(minijinja::Error::new(
                ErrorKind::UnknownFilter,
                format!("filter {name} is unknown"),
            ))
        })?;
        Ok(filter(value, &[])?)
    }

    /// Register every filter with the engine.
    ///
    /// Template syntax only accepts identifiers, so a name containing `-` is
    /// also registered under its `_` spelling (`attr-escape` → `attr_escape`).
    pub(crate) fn install(&self, env: &mut Environment<'static>) {
        for &(name, filter) in &self.filters {
            let call = move |value: Value, args: Rest<Value>| filter(&value, &args.0);
            env.add_filter(name, call);

            let alias = template_identifier(name);
            if alias != name {
                env.add_filter(alias, call);
            }
        }
    }
}

/// Builder for [`FilterRegistry`]. Registering a name twice keeps the later filter.
#[derive(Default)]
pub struct FilterRegistryBuilder {
    filters: Vec<(&'static str, FilterFn)>,
}

impl FilterRegistryBuilder {
    /// Add a filter under `name`.
    #[must_use]
    pub fn filter(mut self, name: &'static str, filter: FilterFn) -> Self {
        self.filters.retain(|(n, _)| *n != name);
        self.filters.push((name, filter));
        self
    }

    /// Freeze the registry.
    pub fn build(self) -> FilterRegistry {
        FilterRegistry {
            filters: self.filters,
        }
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl fmt::Debug for FilterRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|(n, _)| n))
            .finish()
    }
}

/// Spelling of a filter name usable in template syntax.
pub fn template_identifier(name: &str) -> String {
    name.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(value: &Value, _args: &[Value]) -> std::result::Result<Value, minijinja::Error> {
        Ok(Value::from(value.to_string().to_uppercase()))
    }

    #[test]
    fn test_standard_registry() {
        let registry = FilterRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["number", "attr-escape", "local-date"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.get("number").is_some());
        assert!(registry.get("attr_escape").is_none());
    }

    #[test]
    fn test_apply_by_name() {
        let registry = FilterRegistry::standard();
        let out = registry.apply("number", &Value::from(1234567)).unwrap();
        assert_eq!(out.to_string(), "1,234,567");
    }

    #[test]
    fn test_apply_unknown_filter() {
        let registry = FilterRegistry::standard();
        let err = registry.apply("shout", &Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::Template(ref e) if e.kind() == ErrorKind::UnknownFilter));
    }

    #[test]
    fn test_builder_replaces_duplicate_name() {
        let registry = FilterRegistry::builder()
            .filter("number", filters::number)
            .filter("number", shout)
            .build();
        assert_eq!(registry.len(), 1);
        let out = registry.apply("number", &Value::from("abc")).unwrap();
        assert_eq!(out.to_string(), "ABC");
    }

    #[test]
    fn test_template_identifier() {
        assert_eq!(template_identifier("attr-escape"), "attr_escape");
        assert_eq!(template_identifier("number"), "number");
    }

    #[test]
    fn test_install_registers_aliases() {
        let mut env = Environment::new();
        FilterRegistry::standard().install(&mut env);
        let out = env
            .render_str("{{ v|attr_escape }}|{{ v|number }}", minijinja::context! { v => 1234 })
            .unwrap();
        assert_eq!(out, "1234|1,234");
    }
}
