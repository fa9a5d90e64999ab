//! Value constructors and setting instance builders
//!
//! Each function produces a Graph wire node with the right `@odata.type`. Template references are
//! attached per [`TemplateIds`]: value constructors look at the value id, instance builders at the
//! instance id. Children and collections are always emitted, empty or not.

use serde_json::Value;

use super::model::SecretValueState;
use super::odata::{self, InstanceKind};
use super::template::TemplateIds;
use super::wire::{GraphChoiceValue, GraphGroupValue, GraphSettingInstance, GraphSimpleValue};
use crate::error::{CatalogError, Result};

/// Narrow to Graph's Int32. Out-of-range input is an error rather than a truncation.
pub fn to_i32(raw: i64, path: &str) -> Result<i32> {
    i32::try_from(raw).map_err(|_| CatalogError::IntegerOutOfRange {
        path: path.to_string(),
        value: raw,
    })
}

pub fn build_string_value(raw: &str, templates: TemplateIds<'_>) -> GraphSimpleValue {
    GraphSimpleValue {
        odata_type: Some(odata::STRING_VALUE.to_string()),
        value: Some(Value::String(raw.to_string())),
        value_state: None,
        setting_value_template_reference: templates.value_reference(),
    }
}

pub fn build_integer_value(raw: i64, templates: TemplateIds<'_>) -> Result<GraphSimpleValue> {
    let value = to_i32(raw, "integer value")?;
    Ok(GraphSimpleValue {
        odata_type: Some(odata::INTEGER_VALUE.to_string()),
        value: Some(Value::from(value)),
        value_state: None,
        setting_value_template_reference: templates.value_reference(),
    })
}

pub fn build_secret_value(
    raw: &str,
    state: Option<SecretValueState>,
    templates: TemplateIds<'_>,
) -> GraphSimpleValue {
    GraphSimpleValue {
        odata_type: Some(odata::SECRET_VALUE.to_string()),
        value: Some(Value::String(raw.to_string())),
        value_state: state.map(|s| s.as_str().to_string()),
        setting_value_template_reference: templates.value_reference(),
    }
}

pub fn build_choice_value(
    value: &str,
    children: Vec<GraphSettingInstance>,
    templates: TemplateIds<'_>,
) -> GraphChoiceValue {
    GraphChoiceValue {
        odata_type: Some(odata::CHOICE_VALUE.to_string()),
        value: Some(value.to_string()),
        children: Some(children),
        setting_value_template_reference: templates.value_reference(),
    }
}

pub fn build_group_value(
    children: Vec<GraphSettingInstance>,
    templates: TemplateIds<'_>,
) -> GraphGroupValue {
    GraphGroupValue {
        odata_type: Some(odata::GROUP_VALUE.to_string()),
        children: Some(children),
        setting_value_template_reference: templates.value_reference(),
    }
}

fn instance_shell(
    kind: InstanceKind,
    definition_id: &str,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    GraphSettingInstance {
        odata_type: Some(kind.odata_type().to_string()),
        setting_definition_id: Some(definition_id.to_string()),
        setting_instance_template_reference: templates.instance_reference(),
        ..Default::default()
    }
}

pub fn simple_instance(
    definition_id: &str,
    value: GraphSimpleValue,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    GraphSettingInstance {
        simple_setting_value: Some(value),
        ..instance_shell(InstanceKind::Simple, definition_id, templates)
    }
}

pub fn choice_instance(
    definition_id: &str,
    value: GraphChoiceValue,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    GraphSettingInstance {
        choice_setting_value: Some(value),
        ..instance_shell(InstanceKind::Choice, definition_id, templates)
    }
}

pub fn simple_collection_instance(
    definition_id: &str,
    values: Vec<GraphSimpleValue>,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    GraphSettingInstance {
        simple_setting_collection_value: Some(values),
        ..instance_shell(InstanceKind::SimpleCollection, definition_id, templates)
    }
}

pub fn choice_collection_instance(
    definition_id: &str,
    values: Vec<GraphChoiceValue>,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    GraphSettingInstance {
        choice_setting_collection_value: Some(values),
        ..instance_shell(InstanceKind::ChoiceCollection, definition_id, templates)
    }
}

pub fn group_collection_instance(
    definition_id: &str,
    groups: Vec<GraphGroupValue>,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    GraphSettingInstance {
        group_setting_collection_value: Some(groups),
        ..instance_shell(InstanceKind::GroupCollection, definition_id, templates)
    }
}

/// Selected option id for a boolean setting: `<definition_id>_1` or `<definition_id>_0`
pub fn boolean_choice_option(definition_id: &str, value: bool) -> String {
    format!("{}_{}", definition_id, if value { 1 } else { 0 })
}

/// Booleans are choice settings whose options are suffixed `_1`/`_0`
pub fn build_boolean_choice(
    definition_id: &str,
    value: bool,
    templates: TemplateIds<'_>,
) -> GraphSettingInstance {
    let option = boolean_choice_option(definition_id, value);
    choice_instance(
        definition_id,
        build_choice_value(&option, Vec::new(), templates),
        templates,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_choice_suffixes() {
        let id = "device_vendor_msft_bitlocker_requiredeviceencryption";
        let on = build_boolean_choice(id, true, TemplateIds::NONE);
        let off = build_boolean_choice(id, false, TemplateIds::NONE);

        assert_eq!(
            on.choice_setting_value.unwrap().value.as_deref(),
            Some("device_vendor_msft_bitlocker_requiredeviceencryption_1")
        );
        assert_eq!(
            off.choice_setting_value.unwrap().value.as_deref(),
            Some("device_vendor_msft_bitlocker_requiredeviceencryption_0")
        );
    }

    #[test]
    fn test_boolean_choice_has_empty_children() {
        let instance = build_boolean_choice("x", true, TemplateIds::NONE);
        assert_eq!(
            serde_json::to_value(&instance).unwrap(),
            json!({
                "@odata.type": "#microsoft.graph.deviceManagementConfigurationChoiceSettingInstance",
                "settingDefinitionId": "x",
                "choiceSettingValue": {
                    "@odata.type": "#microsoft.graph.deviceManagementConfigurationChoiceSettingValue",
                    "value": "x_1",
                    "children": []
                }
            })
        );
    }

    #[test]
    fn test_integer_value_range() {
        assert!(build_integer_value(i64::from(i32::MAX), TemplateIds::NONE).is_ok());
        assert!(build_integer_value(i64::from(i32::MIN), TemplateIds::NONE).is_ok());

        let err = build_integer_value(i64::from(i32::MAX) + 1, TemplateIds::NONE).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IntegerOutOfRange { value: 2_147_483_648, .. }
        ));
    }

    #[test]
    fn test_string_value_attaches_value_reference_only_when_set() {
        let plain = build_string_value("auto", TemplateIds::instance("ignored-by-values"));
        assert!(plain.setting_value_template_reference.is_none());

        let templated = build_string_value(
            "auto",
            TemplateIds::value("0d9f7d4e-64b7-4c1c-9a49-7a4f8e6f3c22", true),
        );
        let reference = templated.setting_value_template_reference.unwrap();
        assert_eq!(reference.use_template_default, Some(true));
    }

    #[test]
    fn test_secret_value_carries_state() {
        let value = build_secret_value(
            "p@ss",
            Some(SecretValueState::NotEncrypted),
            TemplateIds::NONE,
        );
        assert_eq!(value.value_state.as_deref(), Some("notEncrypted"));
        assert_eq!(value.odata_type.as_deref(), Some(odata::SECRET_VALUE));
    }

    #[test]
    fn test_instance_builders_populate_exactly_one_value_field() {
        let instance = simple_collection_instance(
            "list",
            vec![build_string_value("a", TemplateIds::NONE)],
            TemplateIds::NONE,
        );
        assert!(instance.simple_setting_collection_value.is_some());
        assert!(instance.simple_setting_value.is_none());
        assert!(instance.choice_setting_value.is_none());
        assert!(instance.choice_setting_collection_value.is_none());
        assert!(instance.group_setting_collection_value.is_none());
    }
}
