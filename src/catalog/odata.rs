//! `@odata.type` discriminators for the settings catalog schema family

pub const SETTING: &str = "#microsoft.graph.deviceManagementConfigurationSetting";
pub const POLICY: &str = "#microsoft.graph.deviceManagementConfigurationPolicy";
pub const POLICY_TEMPLATE_REFERENCE: &str =
    "#microsoft.graph.deviceManagementConfigurationPolicyTemplateReference";

pub const SIMPLE_INSTANCE: &str =
    "#microsoft.graph.deviceManagementConfigurationSimpleSettingInstance";
pub const CHOICE_INSTANCE: &str =
    "#microsoft.graph.deviceManagementConfigurationChoiceSettingInstance";
pub const SIMPLE_COLLECTION_INSTANCE: &str =
    "#microsoft.graph.deviceManagementConfigurationSimpleSettingCollectionInstance";
pub const CHOICE_COLLECTION_INSTANCE: &str =
    "#microsoft.graph.deviceManagementConfigurationChoiceSettingCollectionInstance";
pub const GROUP_COLLECTION_INSTANCE: &str =
    "#microsoft.graph.deviceManagementConfigurationGroupSettingCollectionInstance";

pub const STRING_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationStringSettingValue";
pub const INTEGER_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationIntegerSettingValue";
pub const SECRET_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationSecretSettingValue";
pub const CHOICE_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationChoiceSettingValue";
pub const GROUP_VALUE: &str = "#microsoft.graph.deviceManagementConfigurationGroupSettingValue";

pub const INSTANCE_TEMPLATE_REFERENCE: &str =
    "#microsoft.graph.deviceManagementConfigurationSettingInstanceTemplateReference";
pub const VALUE_TEMPLATE_REFERENCE: &str =
    "#microsoft.graph.deviceManagementConfigurationSettingValueTemplateReference";

pub const ALL_DEVICES_TARGET: &str = "#microsoft.graph.allDevicesAssignmentTarget";
pub const ALL_LICENSED_USERS_TARGET: &str = "#microsoft.graph.allLicensedUsersAssignmentTarget";
pub const GROUP_TARGET: &str = "#microsoft.graph.groupAssignmentTarget";
pub const EXCLUSION_GROUP_TARGET: &str = "#microsoft.graph.exclusionGroupAssignmentTarget";

/// The five setting instance variants understood by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Simple,
    Choice,
    SimpleCollection,
    ChoiceCollection,
    GroupCollection,
}

impl InstanceKind {
    pub fn from_odata_type(odata_type: &str) -> Option<Self> {
        match odata_type {
            SIMPLE_INSTANCE => Some(InstanceKind::Simple),
            CHOICE_INSTANCE => Some(InstanceKind::Choice),
            SIMPLE_COLLECTION_INSTANCE => Some(InstanceKind::SimpleCollection),
            CHOICE_COLLECTION_INSTANCE => Some(InstanceKind::ChoiceCollection),
            GROUP_COLLECTION_INSTANCE => Some(InstanceKind::GroupCollection),
            _ => None,
        }
    }

    pub fn odata_type(self) -> &'static str {
        match self {
            InstanceKind::Simple => SIMPLE_INSTANCE,
            InstanceKind::Choice => CHOICE_INSTANCE,
            InstanceKind::SimpleCollection => SIMPLE_COLLECTION_INSTANCE,
            InstanceKind::ChoiceCollection => CHOICE_COLLECTION_INSTANCE,
            InstanceKind::GroupCollection => GROUP_COLLECTION_INSTANCE,
        }
    }

    /// Short name used in error paths
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceKind::Simple => "simple",
            InstanceKind::Choice => "choice",
            InstanceKind::SimpleCollection => "simple_collection",
            InstanceKind::ChoiceCollection => "choice_collection",
            InstanceKind::GroupCollection => "group_collection",
        }
    }
}

/// Scalar value variants carried by simple instances and simple collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleValueKind {
    String,
    Integer,
    Secret,
}

impl SimpleValueKind {
    pub fn from_odata_type(odata_type: &str) -> Option<Self> {
        match odata_type {
            STRING_VALUE => Some(SimpleValueKind::String),
            INTEGER_VALUE => Some(SimpleValueKind::Integer),
            SECRET_VALUE => Some(SimpleValueKind::Secret),
            _ => None,
        }
    }

    pub fn odata_type(self) -> &'static str {
        match self {
            SimpleValueKind::String => STRING_VALUE,
            SimpleValueKind::Integer => INTEGER_VALUE,
            SimpleValueKind::Secret => SECRET_VALUE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_kind_round_trips_discriminator() {
        for kind in [
            InstanceKind::Simple,
            InstanceKind::Choice,
            InstanceKind::SimpleCollection,
            InstanceKind::ChoiceCollection,
            InstanceKind::GroupCollection,
        ] {
            assert_eq!(InstanceKind::from_odata_type(kind.odata_type()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_discriminators() {
        assert_eq!(
            InstanceKind::from_odata_type(
                "#microsoft.graph.deviceManagementConfigurationGroupSettingInstance"
            ),
            None
        );
        assert_eq!(SimpleValueKind::from_odata_type(CHOICE_VALUE), None);
        assert_eq!(SimpleValueKind::from_odata_type(""), None);
    }
}
