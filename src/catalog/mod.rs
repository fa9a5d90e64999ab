//! Settings Catalog support for modern Intune configuration
//!
//! Settings catalog policies are trees of setting instances addressed by definition id. This module
//! converts those trees between Microsoft Graph's JSON (`wire`) and the document model users edit
//! (`model`), in both directions.

pub mod builders;
pub mod diagnostics;
pub mod mapper;
pub mod model;
pub mod odata;
pub mod policy;
pub mod template;
pub mod wire;

pub use diagnostics::{Diagnostic, ReadOutcome};
pub use mapper::{read_instance, read_settings, write_instance, write_settings, MapperOptions};
pub use model::{
    ChoiceValue, GroupValue, InstanceTemplateReference, InstanceValue, SecretValueState, Setting,
    SettingInstance, SimpleValue, ValueTemplateReference,
};
pub use policy::{Assignment, ConfigurationPolicy, Platform, Technology};
pub use template::TemplateIds;
