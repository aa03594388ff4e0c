//! Template definitions and resolution.
//!
//! A template is a named bundle of feature defaults and a default plan tier
//! applied to new tenants. The resolver is a read-only catalog supplied to
//! the orchestrator at construction.

use std::collections::HashMap;

use serde::Deserialize;

/// A named site template.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    /// Stable identifier, referenced by provisioning requests.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Feature flags enabled by default.
    pub features: HashMap<String, bool>,
    /// Plan tier used when the request names none.
    pub default_plan: String,
}

impl Template {
    /// Feature set after applying request overrides on top of the defaults.
    #[must_use]
    pub fn effective_features(
        &self,
        overrides: Option<&HashMap<String, bool>>,
    ) -> HashMap<String, bool> {
        let mut features = self.features.clone();
        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                features.insert(key.clone(), *value);
            }
        }
        features
    }
}

/// Read-only registry of known templates.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    templates: HashMap<String, Template>,
}

fn template(id: &str, name: &str, plan: &str, features: &[(&str, bool)]) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        default_plan: plan.to_string(),
        features: features
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect(),
    }
}

impl TemplateResolver {
    /// Build a resolver from externally supplied definitions.
    #[must_use]
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// The built-in template catalog.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(vec![
            template(
                "starter",
                "Starter site",
                "starter",
                &[("blog", true), ("shop", false), ("newsletter", false)],
            ),
            template(
                "shop",
                "Webshop",
                "business",
                &[
                    ("blog", false),
                    ("shop", true),
                    ("checkout", true),
                    ("newsletter", true),
                ],
            ),
            template(
                "blog",
                "Blog",
                "starter",
                &[("blog", true), ("shop", false), ("comments", true)],
            ),
        ])
    }

    /// Look up a template by id.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    /// Known template identifiers, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_contains_starter() {
        let resolver = TemplateResolver::with_defaults();
        let starter = resolver.resolve("starter").unwrap();
        assert_eq!(starter.default_plan, "starter");
        assert_eq!(starter.features.get("blog"), Some(&true));
    }

    #[test]
    fn test_unknown_template_is_none() {
        let resolver = TemplateResolver::with_defaults();
        assert!(resolver.resolve("bespoke").is_none());
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let resolver = TemplateResolver::with_defaults();
        let starter = resolver.resolve("starter").unwrap();

        let mut overrides = HashMap::new();
        overrides.insert("shop".to_string(), true);
        overrides.insert("search".to_string(), true);

        let effective = starter.effective_features(Some(&overrides));
        assert_eq!(effective.get("shop"), Some(&true));
        assert_eq!(effective.get("search"), Some(&true));
        assert_eq!(effective.get("blog"), Some(&true));
    }

    #[test]
    fn test_ids_sorted() {
        let resolver = TemplateResolver::with_defaults();
        assert_eq!(resolver.ids(), vec!["blog", "shop", "starter"]);
    }
}
