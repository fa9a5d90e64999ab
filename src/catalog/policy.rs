//! Configuration policy documents
//!
//! A policy document is the on-disk form of one settings catalog policy: its metadata, its
//! settings tree and its assignments. It is what `policy show` writes and `policy apply` reads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::diagnostics::{Diagnostic, ReadOutcome};
use super::mapper::{read_settings, write_settings, MapperOptions};
use super::model::Setting;
use super::odata;
use super::wire::{
    GraphAssignmentTarget, GraphConfigurationPolicy, GraphPolicyAssignment,
    GraphPolicyTemplateReference, GraphSetting,
};
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub platforms: Platform,

    #[serde(default = "default_technologies")]
    pub technologies: Vec<Technology>,

    #[serde(default = "default_role_scope_tags")]
    pub role_scope_tag_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_reference: Option<PolicyTemplateReference>,

    #[serde(default)]
    pub settings: Vec<Setting>,

    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

fn default_technologies() -> Vec<Technology> {
    vec![Technology::Mdm]
}

fn default_role_scope_tags() -> Vec<String> {
    vec!["0".to_string()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "iOS")]
    IOS,
    #[serde(rename = "macOS")]
    MacOS,
    #[serde(rename = "windows10X")]
    Windows10X,
    #[serde(rename = "windows10")]
    Windows10,
    #[serde(rename = "linux")]
    Linux,
    #[serde(rename = "androidEnterprise")]
    AndroidEnterprise,
    #[serde(rename = "aosp")]
    Aosp,
    #[serde(rename = "visionOS")]
    VisionOS,
    #[serde(rename = "tvOS")]
    TvOS,
    #[serde(rename = "unknownFutureValue")]
    UnknownFutureValue,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::None => "none",
            Platform::Android => "android",
            Platform::IOS => "iOS",
            Platform::MacOS => "macOS",
            Platform::Windows10X => "windows10X",
            Platform::Windows10 => "windows10",
            Platform::Linux => "linux",
            Platform::AndroidEnterprise => "androidEnterprise",
            Platform::Aosp => "aosp",
            Platform::VisionOS => "visionOS",
            Platform::TvOS => "tvOS",
            Platform::UnknownFutureValue => "unknownFutureValue",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let platform = match s.trim() {
            "none" => Platform::None,
            "android" => Platform::Android,
            "iOS" | "ios" => Platform::IOS,
            "macOS" | "macos" => Platform::MacOS,
            "windows10X" => Platform::Windows10X,
            "windows10" | "windows" => Platform::Windows10,
            "linux" => Platform::Linux,
            "androidEnterprise" => Platform::AndroidEnterprise,
            "aosp" => Platform::Aosp,
            "visionOS" | "visionos" => Platform::VisionOS,
            "tvOS" | "tvos" => Platform::TvOS,
            "unknownFutureValue" => Platform::UnknownFutureValue,
            other => {
                return Err(CatalogError::InvalidConfig(format!(
                    "Unknown platform '{}'",
                    other
                )))
            }
        };
        Ok(platform)
    }
}

/// One flag of Graph's `deviceManagementConfigurationTechnologies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Technology {
    None,
    Mdm,
    Windows10XManagement,
    ConfigManager,
    MicrosoftSense,
    ExchangeOnline,
    MobileApplicationManagement,
    LinuxMdm,
    Enrollment,
    EndpointPrivilegeManagement,
    WindowsOsRecovery,
    Android,
    AppleRemoteManagement,
    #[serde(rename = "edgeMAM")]
    EdgeMam,
    UnknownFutureValue,
}

impl Technology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::None => "none",
            Technology::Mdm => "mdm",
            Technology::Windows10XManagement => "windows10XManagement",
            Technology::ConfigManager => "configManager",
            Technology::MicrosoftSense => "microsoftSense",
            Technology::ExchangeOnline => "exchangeOnline",
            Technology::MobileApplicationManagement => "mobileApplicationManagement",
            Technology::LinuxMdm => "linuxMdm",
            Technology::Enrollment => "enrollment",
            Technology::EndpointPrivilegeManagement => "endpointPrivilegeManagement",
            Technology::WindowsOsRecovery => "windowsOsRecovery",
            Technology::Android => "android",
            Technology::AppleRemoteManagement => "appleRemoteManagement",
            Technology::EdgeMam => "edgeMAM",
            Technology::UnknownFutureValue => "unknownFutureValue",
        }
    }

    /// Parse Graph's comma-separated flag string, e.g. `"mdm,microsoftSense"`
    ///
    /// Flags this build does not know are dropped and reported.
    pub fn parse_flags(flags: &str) -> ReadOutcome<Vec<Technology>> {
        let mut outcome = ReadOutcome::new(Vec::new());
        for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag.parse::<Technology>() {
                Ok(technology) => outcome.value.push(technology),
                Err(e) => {
                    tracing::warn!(flag, "skipping unknown technology flag");
                    outcome
                        .diagnostics
                        .push(Diagnostic::warning("Skipped technology flag", e.to_string()));
                }
            }
        }
        outcome
    }

    pub fn join_flags(technologies: &[Technology]) -> String {
        if technologies.is_empty() {
            return Technology::None.as_str().to_string();
        }
        technologies
            .iter()
            .map(Technology::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for Technology {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let technology = match s {
            "none" => Technology::None,
            "mdm" => Technology::Mdm,
            "windows10XManagement" => Technology::Windows10XManagement,
            "configManager" => Technology::ConfigManager,
            "microsoftSense" => Technology::MicrosoftSense,
            "exchangeOnline" => Technology::ExchangeOnline,
            "mobileApplicationManagement" => Technology::MobileApplicationManagement,
            "linuxMdm" => Technology::LinuxMdm,
            "enrollment" => Technology::Enrollment,
            "endpointPrivilegeManagement" => Technology::EndpointPrivilegeManagement,
            "windowsOsRecovery" => Technology::WindowsOsRecovery,
            "android" => Technology::Android,
            "appleRemoteManagement" => Technology::AppleRemoteManagement,
            "edgeMAM" => Technology::EdgeMam,
            "unknownFutureValue" => Technology::UnknownFutureValue,
            other => {
                return Err(CatalogError::InvalidConfig(format!(
                    "Unknown technology '{}'",
                    other
                )))
            }
        };
        Ok(technology)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTemplateReference {
    pub template_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_display_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Assignment {
    AllDevices,
    AllLicensedUsers,
    Group { group_id: String },
    ExclusionGroup { group_id: String },
}

// ============================================================================
// Document -> Graph
// ============================================================================

/// Build the create/update body. Any setting failure aborts.
pub fn policy_to_graph(
    policy: &ConfigurationPolicy,
    options: &MapperOptions,
) -> Result<GraphConfigurationPolicy> {
    if policy.name.trim().is_empty() {
        return Err(CatalogError::InvalidConfig(
            "Policy name must not be empty".into(),
        ));
    }

    let settings = write_settings(&policy.settings, options)?;

    Ok(GraphConfigurationPolicy {
        odata_type: Some(odata::POLICY.to_string()),
        id: None,
        name: Some(policy.name.clone()),
        description: Some(policy.description.clone()),
        platforms: Some(policy.platforms.as_str().to_string()),
        technologies: Some(Technology::join_flags(&policy.technologies)),
        role_scope_tag_ids: Some(policy.role_scope_tag_ids.clone()),
        template_reference: policy
            .template_reference
            .as_ref()
            .map(template_reference_to_graph),
        settings: Some(settings.into_iter().map(Some).collect()),
        ..Default::default()
    })
}

fn template_reference_to_graph(reference: &PolicyTemplateReference) -> GraphPolicyTemplateReference {
    GraphPolicyTemplateReference {
        odata_type: Some(odata::POLICY_TEMPLATE_REFERENCE.to_string()),
        template_id: Some(reference.template_id.clone()),
        template_family: reference.template_family.clone(),
        template_display_name: reference.template_display_name.clone(),
        template_display_version: reference.template_display_version.clone(),
    }
}

pub fn assignments_to_graph(assignments: &[Assignment]) -> Vec<GraphPolicyAssignment> {
    assignments
        .iter()
        .map(|assignment| {
            let (odata_type, group_id) = match assignment {
                Assignment::AllDevices => (odata::ALL_DEVICES_TARGET, None),
                Assignment::AllLicensedUsers => (odata::ALL_LICENSED_USERS_TARGET, None),
                Assignment::Group { group_id } => (odata::GROUP_TARGET, Some(group_id.clone())),
                Assignment::ExclusionGroup { group_id } => {
                    (odata::EXCLUSION_GROUP_TARGET, Some(group_id.clone()))
                }
            };
            GraphPolicyAssignment {
                id: None,
                target: Some(GraphAssignmentTarget {
                    odata_type: Some(odata_type.to_string()),
                    group_id,
                }),
            }
        })
        .collect()
}

// ============================================================================
// Graph -> document
// ============================================================================

/// Rebuild a document from a policy, its settings and its assignments
///
/// Settings that fail to map, unknown technology flags and unknown assignment targets are dropped
/// and reported as warnings. An unknown platform reads as `unknownFutureValue`, also with a warning.
pub fn policy_from_graph(
    policy: &GraphConfigurationPolicy,
    settings: &[Option<GraphSetting>],
    assignments: &[GraphPolicyAssignment],
) -> ReadOutcome<ConfigurationPolicy> {
    let mut outcome = read_settings(settings);

    let platforms = match policy.platforms.as_deref().unwrap_or("none").parse::<Platform>() {
        Ok(platform) => platform,
        Err(e) => {
            tracing::warn!(error = %e, "unknown platform");
            outcome
                .diagnostics
                .push(Diagnostic::warning("Unknown platform", e.to_string()));
            Platform::UnknownFutureValue
        }
    };

    let technology_outcome =
        Technology::parse_flags(policy.technologies.as_deref().unwrap_or("none"));
    outcome.diagnostics.extend(technology_outcome.diagnostics);
    let technologies = technology_outcome.value;

    let assignment_outcome = assignments_from_graph(assignments);
    outcome.diagnostics.extend(assignment_outcome.diagnostics);

    outcome.map(|settings| ConfigurationPolicy {
        id: policy.id.clone(),
        name: policy.name.clone().unwrap_or_default(),
        description: policy.description.clone().unwrap_or_default(),
        platforms,
        technologies,
        role_scope_tag_ids: policy
            .role_scope_tag_ids
            .clone()
            .unwrap_or_else(default_role_scope_tags),
        template_reference: policy
            .template_reference
            .as_ref()
            .and_then(template_reference_from_graph),
        settings,
        assignments: assignment_outcome.value,
    })
}

fn template_reference_from_graph(
    reference: &GraphPolicyTemplateReference,
) -> Option<PolicyTemplateReference> {
    let template_id = reference.template_id.as_deref().filter(|id| !id.is_empty())?;
    Some(PolicyTemplateReference {
        template_id: template_id.to_string(),
        template_family: reference.template_family.clone(),
        template_display_name: reference.template_display_name.clone(),
        template_display_version: reference.template_display_version.clone(),
    })
}

pub fn assignments_from_graph(assignments: &[GraphPolicyAssignment]) -> ReadOutcome<Vec<Assignment>> {
    let mut outcome = ReadOutcome::new(Vec::with_capacity(assignments.len()));

    for assignment in assignments {
        let target = assignment.target.as_ref();
        let odata_type = target.and_then(|t| t.odata_type.as_deref()).unwrap_or("");
        let group_id = target.and_then(|t| t.group_id.clone());

        let mapped = match (odata_type, group_id) {
            (odata::ALL_DEVICES_TARGET, _) => Some(Assignment::AllDevices),
            (odata::ALL_LICENSED_USERS_TARGET, _) => Some(Assignment::AllLicensedUsers),
            (odata::GROUP_TARGET, Some(group_id)) => Some(Assignment::Group { group_id }),
            (odata::EXCLUSION_GROUP_TARGET, Some(group_id)) => {
                Some(Assignment::ExclusionGroup { group_id })
            }
            _ => None,
        };

        match mapped {
            Some(a) => outcome.value.push(a),
            None => {
                tracing::warn!(odata_type, "skipping unsupported assignment target");
                outcome.diagnostics.push(Diagnostic::warning(
                    "Skipped assignment",
                    format!(
                        "assignment {} has unsupported target '{}'",
                        assignment.id.as_deref().unwrap_or("<unknown>"),
                        odata_type
                    ),
                ));
            }
        }
    }

    outcome
}
