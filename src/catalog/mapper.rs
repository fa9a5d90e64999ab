//! Recursive mapping between Graph setting trees and the internal model
//!
//! Read direction dispatches on `@odata.type`; write direction is the inverse, one builder call per
//! variant. Errors carry the path of the failing node, e.g. `settings[2].choice.children[0].simple`.
//!
//! A failing top-level setting is skipped on read (the rest of the policy still maps) but aborts
//! the whole body on write.

use serde_json::Value;

use super::builders::{
    build_choice_value, build_group_value, build_integer_value, build_secret_value,
    build_string_value, choice_collection_instance, choice_instance, group_collection_instance,
    simple_collection_instance, simple_instance, to_i32,
};
use super::diagnostics::{Diagnostic, ReadOutcome};
use super::model::{
    ChoiceValue, GroupValue, InstanceValue, SecretValueState, Setting, SettingInstance,
    SimpleValue,
};
use super::odata::{self, InstanceKind, SimpleValueKind};
use super::template::{instance_reference_from_graph, value_reference_from_graph, TemplateIds};
use super::wire::{
    GraphChoiceValue, GraphGroupValue, GraphSetting, GraphSettingInstance, GraphSimpleValue,
};
use crate::error::{CatalogError, Result};

/// Knobs for the write path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapperOptions {
    /// Require template ids to be GUIDs
    pub validate_template_ids: bool,
}

impl MapperOptions {
    fn check_templates(&self, ids: TemplateIds<'_>, path: &str) -> Result<()> {
        if self.validate_template_ids {
            ids.validate(path)?;
        }
        Ok(())
    }
}

fn missing(path: &str, field: &'static str) -> CatalogError {
    CatalogError::MissingField {
        path: path.to_string(),
        field,
    }
}

// ============================================================================
// Read: Graph -> model
// ============================================================================

/// Map every top-level setting, skipping the ones that fail
pub fn read_settings(settings: &[Option<GraphSetting>]) -> ReadOutcome<Vec<Setting>> {
    let mut outcome = ReadOutcome::new(Vec::with_capacity(settings.len()));

    for (index, setting) in settings.iter().enumerate() {
        let path = format!("settings[{}]", index);
        match read_setting(setting.as_ref(), &path) {
            Ok(mapped) => outcome.value.push(mapped),
            Err(e) => {
                let definition_id = setting
                    .as_ref()
                    .and_then(|s| s.setting_instance.as_ref())
                    .and_then(|i| i.setting_definition_id.as_deref())
                    .unwrap_or("<unknown>");
                tracing::warn!(%path, definition_id, error = %e, "skipping setting");
                outcome.diagnostics.push(Diagnostic::warning(
                    format!("Skipped setting {}", definition_id),
                    e.to_string(),
                ));
            }
        }
    }

    outcome
}

pub fn read_setting(setting: Option<&GraphSetting>, path: &str) -> Result<Setting> {
    let setting = setting.ok_or_else(|| CatalogError::NilInstance {
        path: path.to_string(),
    })?;

    let setting_instance = read_instance(setting.setting_instance.as_ref(), path)?;

    Ok(Setting {
        id: setting.id.clone(),
        setting_instance,
    })
}

pub fn read_instance(instance: Option<&GraphSettingInstance>, path: &str) -> Result<SettingInstance> {
    let instance = instance.ok_or_else(|| CatalogError::NilInstance {
        path: path.to_string(),
    })?;

    let kind = match (instance.kind(), instance.odata_type.as_deref()) {
        (Some(kind), _) => kind,
        (None, Some(other)) => {
            return Err(CatalogError::UnsupportedInstanceType {
                path: path.to_string(),
                odata_type: other.to_string(),
            })
        }
        (None, None) => {
            return Err(CatalogError::NilInstance {
                path: path.to_string(),
            })
        }
    };

    let setting_definition_id = instance
        .setting_definition_id
        .clone()
        .ok_or_else(|| missing(path, "settingDefinitionId"))?;

    let path = format!("{}.{}", path, kind.as_str());

    let value = match kind {
        InstanceKind::Simple => {
            let value = instance
                .simple_setting_value
                .as_ref()
                .ok_or_else(|| missing(&path, "simpleSettingValue"))?;
            InstanceValue::Simple {
                value: read_simple_value(value, &path)?,
            }
        }
        InstanceKind::Choice => {
            let value = instance
                .choice_setting_value
                .as_ref()
                .ok_or_else(|| missing(&path, "choiceSettingValue"))?;
            InstanceValue::Choice {
                value: read_choice_value(value, &path)?,
            }
        }
        InstanceKind::SimpleCollection => InstanceValue::SimpleCollection {
            values: read_each(
                instance.simple_setting_collection_value.as_deref(),
                &path,
                read_simple_value,
            )?,
        },
        InstanceKind::ChoiceCollection => InstanceValue::ChoiceCollection {
            values: read_each(
                instance.choice_setting_collection_value.as_deref(),
                &path,
                read_choice_value,
            )?,
        },
        InstanceKind::GroupCollection => InstanceValue::GroupCollection {
            groups: read_each(
                instance.group_setting_collection_value.as_deref(),
                &path,
                read_group_value,
            )?,
        },
    };

    Ok(SettingInstance {
        setting_definition_id,
        template_reference: instance_reference_from_graph(
            instance.setting_instance_template_reference.as_ref(),
        ),
        value,
    })
}

/// Map a collection element-wise. Absent and empty both become a fresh empty `Vec`.
fn read_each<W, M>(
    items: Option<&[W]>,
    path: &str,
    read: impl Fn(&W, &str) -> Result<M>,
) -> Result<Vec<M>> {
    items
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, item)| read(item, &format!("{}[{}]", path, i)))
        .collect()
}

fn read_children(children: Option<&[GraphSettingInstance]>, path: &str) -> Result<Vec<SettingInstance>> {
    let path = format!("{}.children", path);
    read_each(children, &path, |child, child_path| {
        read_instance(Some(child), child_path)
    })
}

fn read_simple_value(value: &GraphSimpleValue, path: &str) -> Result<SimpleValue> {
    let template_reference =
        value_reference_from_graph(value.setting_value_template_reference.as_ref());

    match value.kind() {
        Some(SimpleValueKind::String) => Ok(SimpleValue::String {
            value: read_text(value.value.as_ref()),
            template_reference,
        }),
        Some(SimpleValueKind::Integer) => {
            let raw = read_integer(value.value.as_ref(), path)?;
            Ok(SimpleValue::Integer {
                value: raw.to_string(),
                template_reference,
            })
        }
        Some(SimpleValueKind::Secret) => {
            let value_state = value
                .value_state
                .as_deref()
                .map(|state| {
                    state.parse::<SecretValueState>().map_err(|state| {
                        CatalogError::UnsupportedSecretState {
                            path: path.to_string(),
                            state,
                        }
                    })
                })
                .transpose()?;
            Ok(SimpleValue::Secret {
                value: read_text(value.value.as_ref()),
                value_state,
                template_reference,
            })
        }
        None => Err(CatalogError::UnsupportedSimpleValueType {
            path: path.to_string(),
            odata_type: value.odata_type.clone().unwrap_or_default(),
        }),
    }
}

fn read_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn read_integer(value: Option<&Value>, path: &str) -> Result<i32> {
    let raw = match value {
        None | Some(Value::Null) => return Err(missing(path, "value")),
        Some(Value::Number(n)) => n.as_i64(),
        // Some exports quote integers
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    let raw = raw.ok_or_else(|| CatalogError::InvalidInteger {
        path: path.to_string(),
        value: read_text(value),
    })?;

    to_i32(raw, path)
}

fn read_choice_value(value: &GraphChoiceValue, path: &str) -> Result<ChoiceValue> {
    let selected = value
        .value
        .clone()
        .ok_or_else(|| missing(path, "value"))?;

    Ok(ChoiceValue {
        value: selected,
        children: read_children(value.children.as_deref(), path)?,
        template_reference: value_reference_from_graph(
            value.setting_value_template_reference.as_ref(),
        ),
    })
}

fn read_group_value(value: &GraphGroupValue, path: &str) -> Result<GroupValue> {
    Ok(GroupValue {
        children: read_children(value.children.as_deref(), path)?,
        template_reference: value_reference_from_graph(
            value.setting_value_template_reference.as_ref(),
        ),
    })
}

// ============================================================================
// Write: model -> Graph
// ============================================================================

/// Build the `settings` collection of a policy body. The first failure aborts.
pub fn write_settings(settings: &[Setting], options: &MapperOptions) -> Result<Vec<GraphSetting>> {
    settings
        .iter()
        .enumerate()
        .map(|(index, setting)| write_setting(setting, options, &format!("settings[{}]", index)))
        .collect()
}

pub fn write_setting(setting: &Setting, options: &MapperOptions, path: &str) -> Result<GraphSetting> {
    Ok(GraphSetting {
        odata_type: Some(odata::SETTING.to_string()),
        id: setting.id.clone(),
        setting_instance: Some(write_instance(&setting.setting_instance, options, path)?),
    })
}

pub fn write_instance(
    instance: &SettingInstance,
    options: &MapperOptions,
    path: &str,
) -> Result<GraphSettingInstance> {
    if instance.setting_definition_id.is_empty() {
        return Err(missing(path, "setting_definition_id"));
    }

    let path = format!("{}.{}", path, instance.kind().as_str());
    let ids = TemplateIds::from_model(instance.template_reference.as_ref(), None);
    options.check_templates(ids, &path)?;

    let definition_id = instance.setting_definition_id.as_str();

    let built = match &instance.value {
        InstanceValue::Simple { value } => {
            simple_instance(definition_id, write_simple_value(value, options, &path)?, ids)
        }
        InstanceValue::Choice { value } => {
            choice_instance(definition_id, write_choice_value(value, options, &path)?, ids)
        }
        InstanceValue::SimpleCollection { values } => simple_collection_instance(
            definition_id,
            write_each(values, &path, |v, p| write_simple_value(v, options, p))?,
            ids,
        ),
        InstanceValue::ChoiceCollection { values } => choice_collection_instance(
            definition_id,
            write_each(values, &path, |v, p| write_choice_value(v, options, p))?,
            ids,
        ),
        InstanceValue::GroupCollection { groups } => group_collection_instance(
            definition_id,
            write_each(groups, &path, |g, p| write_group_value(g, options, p))?,
            ids,
        ),
    };

    Ok(built)
}

fn write_each<M, W>(items: &[M], path: &str, write: impl Fn(&M, &str) -> Result<W>) -> Result<Vec<W>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| write(item, &format!("{}[{}]", path, i)))
        .collect()
}

fn write_children(
    children: &[SettingInstance],
    options: &MapperOptions,
    path: &str,
) -> Result<Vec<GraphSettingInstance>> {
    let path = format!("{}.children", path);
    write_each(children, &path, |child, child_path| {
        write_instance(child, options, child_path)
    })
}

fn write_simple_value(
    value: &SimpleValue,
    options: &MapperOptions,
    path: &str,
) -> Result<GraphSimpleValue> {
    let ids = TemplateIds::from_model(None, value.template_reference());
    options.check_templates(ids, path)?;

    match value {
        SimpleValue::String { value, .. } => Ok(build_string_value(value, ids)),
        SimpleValue::Integer { value, .. } => {
            let raw = value
                .trim()
                .parse::<i64>()
                .map_err(|_| CatalogError::InvalidInteger {
                    path: path.to_string(),
                    value: value.clone(),
                })?;
            to_i32(raw, path)?;
            build_integer_value(raw, ids)
        }
        SimpleValue::Secret {
            value, value_state, ..
        } => Ok(build_secret_value(value, *value_state, ids)),
    }
}

fn write_choice_value(
    value: &ChoiceValue,
    options: &MapperOptions,
    path: &str,
) -> Result<GraphChoiceValue> {
    let ids = TemplateIds::from_model(None, value.template_reference.as_ref());
    options.check_templates(ids, path)?;

    let children = write_children(&value.children, options, path)?;
    Ok(build_choice_value(&value.value, children, ids))
}

fn write_group_value(
    value: &GroupValue,
    options: &MapperOptions,
    path: &str,
) -> Result<GraphGroupValue> {
    let ids = TemplateIds::from_model(None, value.template_reference.as_ref());
    options.check_templates(ids, path)?;

    let children = write_children(&value.children, options, path)?;
    Ok(build_group_value(children, ids))
}
