//! Template reference attachment
//!
//! An instance and its value each have their own optional template reference. The empty string
//! means "no reference" everywhere in this module.

use uuid::Uuid;

use super::model::{InstanceTemplateReference, ValueTemplateReference};
use super::odata;
use super::wire::{GraphInstanceTemplateReference, GraphValueTemplateReference};
use crate::error::{CatalogError, Result};

/// Template identifiers for one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateIds<'a> {
    pub instance: &'a str,
    pub value: &'a str,
    pub use_template_default: bool,
}

impl<'a> TemplateIds<'a> {
    pub const NONE: TemplateIds<'static> = TemplateIds {
        instance: "",
        value: "",
        use_template_default: false,
    };

    pub fn instance(id: &'a str) -> Self {
        Self {
            instance: id,
            ..Default::default()
        }
    }

    pub fn value(id: &'a str, use_template_default: bool) -> Self {
        Self {
            value: id,
            use_template_default,
            ..Default::default()
        }
    }

    /// Ids carried by model references; absent references become empty strings
    pub fn from_model(
        instance: Option<&'a InstanceTemplateReference>,
        value: Option<&'a ValueTemplateReference>,
    ) -> Self {
        Self {
            instance: instance
                .map(|r| r.setting_instance_template_id.as_str())
                .unwrap_or(""),
            value: value
                .map(|r| r.setting_value_template_id.as_str())
                .unwrap_or(""),
            use_template_default: value.map(|r| r.use_template_default).unwrap_or(false),
        }
    }

    pub fn instance_reference(&self) -> Option<GraphInstanceTemplateReference> {
        if self.instance.is_empty() {
            return None;
        }
        Some(GraphInstanceTemplateReference {
            odata_type: Some(odata::INSTANCE_TEMPLATE_REFERENCE.to_string()),
            setting_instance_template_id: Some(self.instance.to_string()),
        })
    }

    pub fn value_reference(&self) -> Option<GraphValueTemplateReference> {
        if self.value.is_empty() {
            return None;
        }
        Some(GraphValueTemplateReference {
            odata_type: Some(odata::VALUE_TEMPLATE_REFERENCE.to_string()),
            setting_value_template_id: Some(self.value.to_string()),
            use_template_default: Some(self.use_template_default),
        })
    }

    /// Reject non-GUID ids. Empty ids are always accepted.
    pub fn validate(&self, path: &str) -> Result<()> {
        for id in [self.instance, self.value] {
            if !id.is_empty() && Uuid::parse_str(id).is_err() {
                return Err(CatalogError::InvalidTemplateId {
                    path: path.to_string(),
                    id: id.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Graph instance reference to model form. A reference with a missing or empty id is absent.
pub fn instance_reference_from_graph(
    reference: Option<&GraphInstanceTemplateReference>,
) -> Option<InstanceTemplateReference> {
    let id = reference?.setting_instance_template_id.as_deref()?;
    if id.is_empty() {
        return None;
    }
    Some(InstanceTemplateReference {
        setting_instance_template_id: id.to_string(),
    })
}

pub fn value_reference_from_graph(
    reference: Option<&GraphValueTemplateReference>,
) -> Option<ValueTemplateReference> {
    let reference = reference?;
    let id = reference.setting_value_template_id.as_deref()?;
    if id.is_empty() {
        return None;
    }
    Some(ValueTemplateReference {
        setting_value_template_id: id.to_string(),
        use_template_default: reference.use_template_default.unwrap_or(false),
    })
}
