//! Internal settings catalog model
//!
//! This is the shape users edit in a policy document. Instance variants are an enum, so an
//! instance can never carry two value kinds at once. Simple scalars are kept as strings whatever
//! their Graph type; integers are rendered in base 10.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::odata::InstanceKind;

/// One top-level policy setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Graph's positional id within the policy ("0", "1", ...). Ignored on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub setting_instance: SettingInstance,
}

impl Setting {
    pub fn new(setting_instance: SettingInstance) -> Self {
        Self {
            id: None,
            setting_instance,
        }
    }

    pub fn setting_definition_id(&self) -> &str {
        &self.setting_instance.setting_definition_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingInstance {
    pub setting_definition_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_reference: Option<InstanceTemplateReference>,

    pub value: InstanceValue,
}

impl SettingInstance {
    pub fn kind(&self) -> InstanceKind {
        self.value.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceValue {
    Simple {
        value: SimpleValue,
    },
    Choice {
        value: ChoiceValue,
    },
    SimpleCollection {
        #[serde(default)]
        values: Vec<SimpleValue>,
    },
    ChoiceCollection {
        #[serde(default)]
        values: Vec<ChoiceValue>,
    },
    GroupCollection {
        #[serde(default)]
        groups: Vec<GroupValue>,
    },
}

impl InstanceValue {
    pub fn kind(&self) -> InstanceKind {
        match self {
            InstanceValue::Simple { .. } => InstanceKind::Simple,
            InstanceValue::Choice { .. } => InstanceKind::Choice,
            InstanceValue::SimpleCollection { .. } => InstanceKind::SimpleCollection,
            InstanceValue::ChoiceCollection { .. } => InstanceKind::ChoiceCollection,
            InstanceValue::GroupCollection { .. } => InstanceKind::GroupCollection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimpleValue {
    String {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_reference: Option<ValueTemplateReference>,
    },
    Integer {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_reference: Option<ValueTemplateReference>,
    },
    Secret {
        value: String,
        /// Absent when Graph sent no state; written back only when set
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_state: Option<SecretValueState>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template_reference: Option<ValueTemplateReference>,
    },
}

impl SimpleValue {
    pub fn string(value: impl Into<String>) -> Self {
        SimpleValue::String {
            value: value.into(),
            template_reference: None,
        }
    }

    pub fn template_reference(&self) -> Option<&ValueTemplateReference> {
        match self {
            SimpleValue::String {
                template_reference, ..
            }
            | SimpleValue::Integer {
                template_reference, ..
            }
            | SimpleValue::Secret {
                template_reference, ..
            } => template_reference.as_ref(),
        }
    }
}

/// Graph's `deviceManagementConfigurationSecretSettingValueState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecretValueState {
    /// Not yet provisioned
    Invalid,
    /// Plaintext, as sent by the client
    NotEncrypted,
    /// Encrypted token handed back by the service
    EncryptedValueToken,
}

impl SecretValueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretValueState::Invalid => "invalid",
            SecretValueState::NotEncrypted => "notEncrypted",
            SecretValueState::EncryptedValueToken => "encryptedValueToken",
        }
    }
}

impl fmt::Display for SecretValueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretValueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invalid" => Ok(SecretValueState::Invalid),
            "notEncrypted" => Ok(SecretValueState::NotEncrypted),
            "encryptedValueToken" => Ok(SecretValueState::EncryptedValueToken),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceValue {
    pub value: String,

    #[serde(default)]
    pub children: Vec<SettingInstance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_reference: Option<ValueTemplateReference>,
}

impl ChoiceValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
            template_reference: None,
        }
    }

    pub fn with_children(mut self, children: Vec<SettingInstance>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupValue {
    #[serde(default)]
    pub children: Vec<SettingInstance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_reference: Option<ValueTemplateReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceTemplateReference {
    pub setting_instance_template_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTemplateReference {
    pub setting_value_template_id: String,

    #[serde(default)]
    pub use_template_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_form_of_choice_with_children() {
        let instance = SettingInstance {
            setting_definition_id: "os_update_policy".into(),
            template_reference: None,
            value: InstanceValue::Choice {
                value: ChoiceValue::new("1").with_children(vec![SettingInstance {
                    setting_definition_id: "notes".into(),
                    template_reference: None,
                    value: InstanceValue::Simple {
                        value: SimpleValue::string("auto"),
                    },
                }]),
            },
        };

        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            json!({
                "setting_definition_id": "os_update_policy",
                "value": {
                    "kind": "choice",
                    "value": {
                        "value": "1",
                        "children": [{
                            "setting_definition_id": "notes",
                            "value": {
                                "kind": "simple",
                                "value": { "type": "string", "value": "auto" }
                            }
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn test_missing_collections_decode_as_empty() {
        let instance: SettingInstance = serde_json::from_value(json!({
            "setting_definition_id": "rules",
            "value": { "kind": "group_collection" }
        }))
        .unwrap();
        assert_eq!(
            instance.value,
            InstanceValue::GroupCollection { groups: vec![] }
        );
    }

    #[test]
    fn test_secret_state_parse() {
        assert_eq!(
            "encryptedValueToken".parse::<SecretValueState>(),
            Ok(SecretValueState::EncryptedValueToken)
        );
        assert!("encrypted".parse::<SecretValueState>().is_err());
    }
}
