//! Request bodies accepted by the client management API.

use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;

use siteforge_provisioning::ProvisionRequest;

/// Body for `POST /clients`: create and provision a new client site.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    /// Human-readable client name.
    #[serde(default)]
    pub name: String,

    /// Contact email of the client owner.
    #[serde(default, alias = "contactEmail")]
    pub contact_email: String,

    /// Requested subdomain (lowercase alphanumeric plus hyphen).
    #[serde(default)]
    pub domain: String,

    /// Template identifier.
    #[serde(default)]
    pub template: String,

    /// Feature overrides applied on top of the template defaults.
    #[serde(default)]
    pub features: Option<HashMap<String, bool>>,

    /// Plan tier; defaults to the template's plan.
    #[serde(default)]
    pub plan: Option<String>,
}

impl From<CreateClientRequest> for ProvisionRequest {
    fn from(body: CreateClientRequest) -> Self {
        ProvisionRequest {
            name: body.name,
            contact_email: body.contact_email,
            domain: body.domain,
            template: body.template,
            features: body.features,
            plan: body.plan,
        }
    }
}

/// Body for `PATCH /clients/{id}`: partial configuration update.
///
/// Domain and template are fixed at provisioning time and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateClientRequest {
    /// New display name.
    pub name: Option<String>,

    /// New contact email.
    #[serde(alias = "contactEmail")]
    pub contact_email: Option<String>,

    /// New plan tier.
    pub plan: Option<String>,

    /// Replacement feature flag map.
    pub features: Option<HashMap<String, bool>>,
}

impl UpdateClientRequest {
    /// Whether the body changes anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_email.is_none()
            && self.plan.is_none()
            && self.features.is_none()
    }
}

/// Body for `POST /clients/{id}/suspend`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SuspendClientRequest {
    /// Operator-supplied reason, recorded on the client.
    pub reason: Option<String>,
}
