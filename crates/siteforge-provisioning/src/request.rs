//! Incoming tenant requests and their validation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::FieldError;
use crate::template::TemplateResolver;

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9-]+$").expect("DOMAIN_RE is a valid regex pattern")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("EMAIL_RE is a valid regex pattern")
});

/// A request to provision a new client site.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionRequest {
    /// Human-readable client name.
    #[serde(default)]
    pub name: String,

    /// Contact email of the client owner.
    #[serde(default, alias = "contactEmail")]
    pub contact_email: String,

    /// Requested subdomain, lowercase alphanumeric plus hyphen.
    #[serde(default)]
    pub domain: String,

    /// Template identifier.
    #[serde(default)]
    pub template: String,

    /// Feature overrides applied on top of the template defaults.
    #[serde(default)]
    pub features: Option<HashMap<String, bool>>,

    /// Plan tier; defaults to the template's plan when absent.
    #[serde(default)]
    pub plan: Option<String>,
}

/// Outcome of validating a [`ProvisionRequest`].
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// All violated fields, accumulated. Empty means valid.
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// Whether the request passed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pure request validation. Performs no external calls; template existence
/// is checked against the read-only [`TemplateResolver`].
pub struct RequestValidator;

impl RequestValidator {
    /// Validate a request, accumulating every violation rather than stopping
    /// at the first.
    #[must_use]
    pub fn validate(request: &ProvisionRequest, templates: &TemplateResolver) -> ValidationReport {
        let mut errors = Vec::new();

        if request.name.trim().is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }

        if request.contact_email.trim().is_empty() {
            errors.push(FieldError::new("contactEmail", "is required"));
        } else if !EMAIL_RE.is_match(&request.contact_email) {
            errors.push(FieldError::new(
                "contactEmail",
                "is not a valid email address",
            ));
        }

        if request.domain.trim().is_empty() {
            errors.push(FieldError::new("domain", "is required"));
        } else if !DOMAIN_RE.is_match(&request.domain) {
            errors.push(FieldError::new(
                "domain",
                "must contain only lowercase letters, digits and hyphens",
            ));
        }

        if request.template.trim().is_empty() {
            errors.push(FieldError::new("template", "is required"));
        } else if templates.resolve(&request.template).is_none() {
            errors.push(FieldError::new(
                "template",
                format!("unknown template '{}'", request.template),
            ));
        }

        ValidationReport { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ProvisionRequest {
        ProvisionRequest {
            name: "Acme".to_string(),
            contact_email: "a@acme.nl".to_string(),
            domain: "acme-test".to_string(),
            template: "starter".to_string(),
            features: None,
            plan: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let templates = TemplateResolver::with_defaults();
        let report = RequestValidator::validate(&valid_request(), &templates);
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn test_all_missing_fields_reported_together() {
        let templates = TemplateResolver::with_defaults();
        let request = ProvisionRequest {
            name: String::new(),
            contact_email: String::new(),
            domain: String::new(),
            template: String::new(),
            features: None,
            plan: None,
        };
        let report = RequestValidator::validate(&request, &templates);
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "contactEmail", "domain", "template"]);
    }

    #[test]
    fn test_domain_format_rejected() {
        let templates = TemplateResolver::with_defaults();
        for bad in ["Acme-Test", "acme test", "acme.test", "ächme"] {
            let mut request = valid_request();
            request.domain = bad.to_string();
            let report = RequestValidator::validate(&request, &templates);
            assert!(!report.is_valid(), "domain {bad:?} should be rejected");
            assert_eq!(report.errors[0].field, "domain");
        }
    }

    #[test]
    fn test_email_format_rejected() {
        let templates = TemplateResolver::with_defaults();
        for bad in ["not-an-email", "a@b", "a b@c.nl", "@acme.nl"] {
            let mut request = valid_request();
            request.contact_email = bad.to_string();
            let report = RequestValidator::validate(&request, &templates);
            assert!(!report.is_valid(), "email {bad:?} should be rejected");
        }
    }

    #[test]
    fn test_unknown_template_rejected() {
        let templates = TemplateResolver::with_defaults();
        let mut request = valid_request();
        request.template = "no-such-template".to_string();
        let report = RequestValidator::validate(&request, &templates);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "template");
        assert!(report.errors[0].reason.contains("no-such-template"));
    }

    #[test]
    fn test_camel_case_aliases_deserialize() {
        let request: ProvisionRequest = serde_json::from_str(
            r#"{"name":"Acme","contactEmail":"a@acme.nl","domain":"acme-test","template":"starter"}"#,
        )
        .unwrap();
        assert_eq!(request.contact_email, "a@acme.nl");
    }
}
