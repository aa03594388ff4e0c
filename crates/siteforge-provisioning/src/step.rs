//! The declarative step pipeline.
//!
//! [`PIPELINE`] is the single source of truth for step ordering, criticality
//! and compensability. The orchestrator derives forward execution from it and
//! the deprovisioner derives the reverse compensation walk from the same
//! array, so the two can never disagree about what ran in which order.

use serde::Serialize;

/// Names of the provisioning pipeline steps, in no particular order.
/// Ordering lives in [`PIPELINE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepName {
    Validate,
    ResolveTemplate,
    ProvisionDatastore,
    RenderEnvironment,
    Deploy,
    ConfigureDomain,
    BootstrapAdmin,
    RegisterClient,
}

impl StepName {
    /// Stable string form used in audit logs and API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StepName::Validate => "validate",
            StepName::ResolveTemplate => "resolve-template",
            StepName::ProvisionDatastore => "provision-datastore",
            StepName::RenderEnvironment => "render-environment",
            StepName::Deploy => "deploy",
            StepName::ConfigureDomain => "configure-domain",
            StepName::BootstrapAdmin => "bootstrap-admin",
            StepName::RegisterClient => "register-client",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of the ordered pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Step identity.
    pub name: StepName,
    /// A failed critical step aborts the remaining pipeline.
    pub critical: bool,
    /// Whether the step allocates an external resource that a compensation
    /// walk can release again.
    pub compensable: bool,
}

/// The provisioning pipeline, in execution order.
///
/// Steps execute strictly in declaration order; no step executes after a
/// critical step has failed. Compensation walks this array in reverse,
/// visiting only `compensable` steps.
pub const PIPELINE: &[Step] = &[
    Step {
        name: StepName::Validate,
        critical: true,
        compensable: false,
    },
    Step {
        name: StepName::ResolveTemplate,
        critical: true,
        compensable: false,
    },
    Step {
        name: StepName::ProvisionDatastore,
        critical: true,
        compensable: true,
    },
    Step {
        name: StepName::RenderEnvironment,
        critical: true,
        compensable: false,
    },
    Step {
        name: StepName::Deploy,
        critical: true,
        compensable: true,
    },
    Step {
        name: StepName::ConfigureDomain,
        critical: false,
        compensable: true,
    },
    Step {
        name: StepName::BootstrapAdmin,
        critical: false,
        compensable: false,
    },
    Step {
        name: StepName::RegisterClient,
        critical: true,
        compensable: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        let names: Vec<StepName> = PIPELINE.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                StepName::Validate,
                StepName::ResolveTemplate,
                StepName::ProvisionDatastore,
                StepName::RenderEnvironment,
                StepName::Deploy,
                StepName::ConfigureDomain,
                StepName::BootstrapAdmin,
                StepName::RegisterClient,
            ]
        );
    }

    #[test]
    fn test_only_domain_and_admin_are_non_critical() {
        for step in PIPELINE {
            let expected_non_critical = matches!(
                step.name,
                StepName::ConfigureDomain | StepName::BootstrapAdmin
            );
            assert_eq!(step.critical, !expected_non_critical, "{}", step.name);
        }
    }

    #[test]
    fn test_compensable_steps_allocate_resources() {
        let compensable: Vec<StepName> = PIPELINE
            .iter()
            .filter(|s| s.compensable)
            .map(|s| s.name)
            .collect();
        assert_eq!(
            compensable,
            vec![
                StepName::ProvisionDatastore,
                StepName::Deploy,
                StepName::ConfigureDomain,
            ]
        );
    }

    #[test]
    fn test_step_name_strings_are_kebab_case() {
        assert_eq!(StepName::ProvisionDatastore.as_str(), "provision-datastore");
        assert_eq!(StepName::RegisterClient.to_string(), "register-client");
    }
}
