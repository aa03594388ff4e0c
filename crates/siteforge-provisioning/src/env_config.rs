//! Environment configuration rendering for deployed sites.

use std::collections::BTreeMap;

use crate::config::ProvisioningConfig;
use crate::template::Template;

/// Render the environment variables handed to a deployed site.
///
/// Keys are sorted so the rendered map is stable across runs, which keeps
/// deployment diffs readable.
#[must_use]
pub fn render_environment(
    config: &ProvisioningConfig,
    site_name: &str,
    domain: &str,
    template: &Template,
    feature_overrides: &BTreeMap<String, bool>,
    datastore_url: &str,
) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("SITE_NAME".to_string(), site_name.to_string());
    env.insert("SITE_DOMAIN".to_string(), config.site_domain(domain));
    env.insert("SITE_TEMPLATE".to_string(), template.id.clone());
    env.insert("DATABASE_URL".to_string(), datastore_url.to_string());
    env.insert(
        "SECRET_KEY".to_string(),
        crate::adapters::generate_secret(32),
    );

    let overrides: std::collections::HashMap<String, bool> = feature_overrides
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    for (feature, enabled) in template.effective_features(Some(&overrides)) {
        env.insert(
            format!("FEATURE_{}", feature.to_uppercase()),
            enabled.to_string(),
        );
    }
    env
}
