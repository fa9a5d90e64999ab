//! Graph JSON shapes for settings catalog policies
//!
//! These mirror Microsoft Graph's `deviceManagementConfiguration*` resources. Every optional Graph
//! property is an `Option` so that "absent" and "present but empty" stay distinguishable on decode.
//! The mapper only ever populates the value field that matches `@odata.type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::odata::{InstanceKind, SimpleValueKind};

/// `deviceManagementConfigurationSetting`: one entry of a policy's `settings` collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSetting {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_instance: Option<GraphSettingInstance>,
}

/// `deviceManagementConfigurationSettingInstance` and its five derived types, flattened
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSettingInstance {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_definition_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_instance_template_reference: Option<GraphInstanceTemplateReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_setting_value: Option<GraphSimpleValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_setting_value: Option<GraphChoiceValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_setting_collection_value: Option<Vec<GraphSimpleValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_setting_collection_value: Option<Vec<GraphChoiceValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_setting_collection_value: Option<Vec<GraphGroupValue>>,
}

impl GraphSettingInstance {
    /// Parse the discriminator. `None` when it is missing or not one of the five known variants.
    pub fn kind(&self) -> Option<InstanceKind> {
        self.odata_type
            .as_deref()
            .and_then(InstanceKind::from_odata_type)
    }
}

/// String, integer and secret setting values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSimpleValue {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    /// JSON string for string/secret values, JSON number for integers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Only present on secret values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_reference: Option<GraphValueTemplateReference>,
}

impl GraphSimpleValue {
    pub fn kind(&self) -> Option<SimpleValueKind> {
        self.odata_type
            .as_deref()
            .and_then(SimpleValueKind::from_odata_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphChoiceValue {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GraphSettingInstance>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_reference: Option<GraphValueTemplateReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroupValue {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GraphSettingInstance>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_reference: Option<GraphValueTemplateReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphInstanceTemplateReference {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_instance_template_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphValueTemplateReference {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_value_template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_template_default: Option<bool>,
}

/// `deviceManagementConfigurationPolicy`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfigurationPolicy {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_scope_tag_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_reference: Option<GraphPolicyTemplateReference>,

    /// Elements may be JSON `null`; the read path reports those as nil settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<Option<GraphSetting>>>,

    // Read-only metadata, never sent
    #[serde(default, skip_serializing)]
    pub setting_count: Option<i64>,

    #[serde(default, skip_serializing)]
    pub created_date_time: Option<String>,

    #[serde(default, skip_serializing)]
    pub last_modified_date_time: Option<String>,

    #[serde(default, skip_serializing)]
    pub is_assigned: Option<bool>,

    /// Present in exports made with `$expand=assignments`; sent through the assign action instead
    #[serde(default, skip_serializing)]
    pub assignments: Option<Vec<GraphPolicyAssignment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPolicyTemplateReference {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_display_version: Option<String>,
}

/// `deviceManagementConfigurationPolicyAssignment`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPolicyAssignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<GraphAssignmentTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphAssignmentTarget {
    #[serde(rename = "@odata.type", default, skip_serializing_if = "Option::is_none")]
    pub odata_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Body of `POST configurationPolicies/{id}/assign`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphAssignRequest {
    pub assignments: Vec<GraphPolicyAssignment>,
}
