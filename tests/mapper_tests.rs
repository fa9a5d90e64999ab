//! End-to-end mapping tests: Graph JSON to policy document and back

use ctl365_catalog::catalog::builders::{boolean_choice_option, build_boolean_choice};
use ctl365_catalog::catalog::wire::GraphSetting;
use ctl365_catalog::catalog::{
    read_instance, read_settings, write_settings, ChoiceValue, InstanceValue, MapperOptions,
    Setting, SettingInstance, SimpleValue, TemplateIds,
};
use ctl365_catalog::CatalogError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const SETTING: &str = "#microsoft.graph.deviceManagementConfigurationSetting";
const SIMPLE: &str = "#microsoft.graph.deviceManagementConfigurationSimpleSettingInstance";
const CHOICE: &str = "#microsoft.graph.deviceManagementConfigurationChoiceSettingInstance";
const SIMPLE_COLLECTION: &str =
    "#microsoft.graph.deviceManagementConfigurationSimpleSettingCollectionInstance";
const CHOICE_COLLECTION: &str =
    "#microsoft.graph.deviceManagementConfigurationChoiceSettingCollectionInstance";
const GROUP_COLLECTION: &str =
    "#microsoft.graph.deviceManagementConfigurationGroupSettingCollectionInstance";
const STRING_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationStringSettingValue";
const INTEGER_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationIntegerSettingValue";
const SECRET_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationSecretSettingValue";
const CHOICE_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationChoiceSettingValue";
const GROUP_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationGroupSettingValue";
const INSTANCE_REF: &str =
    "#microsoft.graph.deviceManagementConfigurationSettingInstanceTemplateReference";
const VALUE_REF: &str = "#microsoft.graph.deviceManagementConfigurationSettingValueTemplateReference";

fn parse_settings(value: Value) -> Vec<Option<GraphSetting>> {
    serde_json::from_value(value).unwrap()
}

fn round_trip(input: Value) -> Value {
    let outcome = read_settings(&parse_settings(input));
    assert!(!outcome.has_diagnostics(), "{:?}", outcome.diagnostics);

    let written = write_settings(&outcome.value, &MapperOptions::default()).unwrap();
    serde_json::to_value(written).unwrap()
}

#[test]
fn test_update_policy_choice_with_string_child() {
    let document = vec![Setting::new(SettingInstance {
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
    })];

    let written = write_settings(&document, &MapperOptions::default()).unwrap();

    let expected = json!([{
        "@odata.type": SETTING,
        "settingInstance": {
            "@odata.type": CHOICE,
            "settingDefinitionId": "os_update_policy",
            "choiceSettingValue": {
                "@odata.type": CHOICE_VALUE,
                "value": "1",
                "children": [{
                    "@odata.type": SIMPLE,
                    "settingDefinitionId": "notes",
                    "simpleSettingValue": {
                        "@odata.type": STRING_VALUE,
                        "value": "auto"
                    }
                }]
            }
        }
    }]);
    assert_eq!(serde_json::to_value(&written).unwrap(), expected);

    // Reading the body back gives the same document
    let reread = read_settings(&parse_settings(expected));
    assert_eq!(reread.value, document);
}

#[test]
fn test_every_variant_survives_a_round_trip() {
    let input = json!([
        {
            "@odata.type": SETTING,
            "id": "0",
            "settingInstance": {
                "@odata.type": SIMPLE,
                "settingDefinitionId": "device_vendor_msft_policy_config_update_activehoursstart",
                "settingInstanceTemplateReference": {
                    "@odata.type": INSTANCE_REF,
                    "settingInstanceTemplateId": "2d9e9f1c-3a5b-4c7d-8e9f-0a1b2c3d4e5f"
                },
                "simpleSettingValue": {
                    "@odata.type": INTEGER_VALUE,
                    "value": 8,
                    "settingValueTemplateReference": {
                        "@odata.type": VALUE_REF,
                        "settingValueTemplateId": "6a7b8c9d-0e1f-4a2b-9c3d-4e5f6a7b8c9d",
                        "useTemplateDefault": false
                    }
                }
            }
        },
        {
            "@odata.type": SETTING,
            "id": "1",
            "settingInstance": {
                "@odata.type": SIMPLE,
                "settingDefinitionId": "vendor_msft_wifi_presharedkey",
                "simpleSettingValue": {
                    "@odata.type": SECRET_VALUE,
                    "value": "a1b2c3",
                    "valueState": "encryptedValueToken"
                }
            }
        },
        {
            "@odata.type": SETTING,
            "id": "2",
            "settingInstance": {
                "@odata.type": SIMPLE_COLLECTION,
                "settingDefinitionId": "device_vendor_msft_policy_config_browser_allowlist",
                "simpleSettingCollectionValue": [
                    { "@odata.type": STRING_VALUE, "value": "contoso.com" },
                    { "@odata.type": STRING_VALUE, "value": "fabrikam.com" }
                ]
            }
        },
        {
            "@odata.type": SETTING,
            "id": "3",
            "settingInstance": {
                "@odata.type": CHOICE_COLLECTION,
                "settingDefinitionId": "device_vendor_msft_policy_config_defender_scantype",
                "choiceSettingCollectionValue": [
                    {
                        "@odata.type": CHOICE_VALUE,
                        "value": "device_vendor_msft_policy_config_defender_scantype_1",
                        "children": []
                    }
                ]
            }
        },
        {
            "@odata.type": SETTING,
            "id": "4",
            "settingInstance": {
                "@odata.type": GROUP_COLLECTION,
                "settingDefinitionId": "com.apple.managedclient.preferences_group",
                "groupSettingCollectionValue": [{
                    "@odata.type": GROUP_VALUE,
                    "children": [{
                        "@odata.type": CHOICE,
                        "settingDefinitionId": "com.apple.managedclient.preferences_enabled",
                        "choiceSettingValue": {
                            "@odata.type": CHOICE_VALUE,
                            "value": "com.apple.managedclient.preferences_enabled_true",
                            "children": [],
                            "settingValueTemplateReference": {
                                "@odata.type": VALUE_REF,
                                "settingValueTemplateId": "9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a",
                                "useTemplateDefault": true
                            }
                        }
                    }]
                }]
            }
        }
    ]);

    assert_eq!(round_trip(input.clone()), input);
}

#[test]
fn test_group_elements_keep_their_own_children() {
    let input = json!([{
        "settingInstance": {
            "@odata.type": GROUP_COLLECTION,
            "settingDefinitionId": "firewall_rules",
            "groupSettingCollectionValue": [
                {
                    "children": [{
                        "@odata.type": CHOICE,
                        "settingDefinitionId": "firewall_rules_direction",
                        "choiceSettingValue": { "value": "firewall_rules_direction_in" }
                    }]
                },
                {
                    "children": [{
                        "@odata.type": CHOICE,
                        "settingDefinitionId": "firewall_rules_action",
                        "choiceSettingValue": { "value": "firewall_rules_action_block" }
                    }]
                }
            ]
        }
    }]);

    let outcome = read_settings(&parse_settings(input));
    let groups = match &outcome.value[0].setting_instance.value {
        InstanceValue::GroupCollection { groups } => groups,
        other => panic!("expected a group collection, got {:?}", other),
    };

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].children.len(), 1);
    assert_eq!(groups[1].children.len(), 1);
    assert_eq!(groups[0].children[0].setting_definition_id, "firewall_rules_direction");
    assert_eq!(groups[1].children[0].setting_definition_id, "firewall_rules_action");

    let written = serde_json::to_value(
        write_settings(&outcome.value, &MapperOptions::default()).unwrap(),
    )
    .unwrap();
    let groups = &written[0]["settingInstance"]["groupSettingCollectionValue"];
    assert_eq!(
        groups[0]["children"][0]["choiceSettingValue"]["value"],
        "firewall_rules_direction_in"
    );
    assert_eq!(
        groups[1]["children"][0]["choiceSettingValue"]["value"],
        "firewall_rules_action_block"
    );
}

#[test]
fn test_boolean_choice_reads_back_to_its_option() {
    let definition_id = "device_vendor_msft_policy_config_system_allow_telemetry";

    for flag in [true, false] {
        let instance = build_boolean_choice(definition_id, flag, TemplateIds::NONE);
        let read = read_instance(Some(&instance), "settings[0]").unwrap();

        let selected = match read.value {
            InstanceValue::Choice { value } => value.value,
            other => panic!("expected a choice, got {:?}", other),
        };
        assert_eq!(selected, boolean_choice_option(definition_id, flag));

        let (prefix, suffix) = selected.rsplit_once('_').unwrap();
        assert_eq!(prefix, definition_id);
        assert_eq!(suffix, if flag { "1" } else { "0" });
    }
}

#[test]
fn test_nested_failure_skips_only_that_setting() {
    let input = json!([
        {
            "settingInstance": {
                "@odata.type": SIMPLE,
                "settingDefinitionId": "good",
                "simpleSettingValue": { "@odata.type": STRING_VALUE, "value": "ok" }
            }
        },
        {
            "settingInstance": {
                "@odata.type": GROUP_COLLECTION,
                "settingDefinitionId": "bad",
                "groupSettingCollectionValue": [
                    { "children": [] },
                    {
                        "children": [{
                            "@odata.type": SIMPLE,
                            "settingDefinitionId": "bad_child",
                            "simpleSettingValue": {
                                "@odata.type": "#microsoft.graph.deviceManagementConfigurationReferenceSettingValue",
                                "value": "x"
                            }
                        }]
                    }
                ]
            }
        }
    ]);

    let outcome = read_settings(&parse_settings(input.clone()));
    assert_eq!(outcome.value.len(), 1);
    assert_eq!(outcome.value[0].setting_definition_id(), "good");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0]
        .detail
        .contains("settings[1].group_collection[1].children[0].simple"));

    let instance = parse_settings(input)[1]
        .as_ref()
        .and_then(|s| s.setting_instance.clone());
    let err = read_instance(instance.as_ref(), "settings[1]").unwrap_err();
    assert!(matches!(err, CatalogError::UnsupportedSimpleValueType { .. }));
}

#[test]
fn test_template_validation_is_opt_in() {
    let document = vec![Setting::new(SettingInstance {
        setting_definition_id: "x".into(),
        template_reference: Some(ctl365_catalog::catalog::InstanceTemplateReference {
            setting_instance_template_id: "not-a-guid".into(),
        }),
        value: InstanceValue::Simple {
            value: SimpleValue::string("v"),
        },
    })];

    assert!(write_settings(&document, &MapperOptions::default()).is_ok());

    let strict = MapperOptions {
        validate_template_ids: true,
    };
    let err = write_settings(&document, &strict).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidTemplateId { .. }));
}
