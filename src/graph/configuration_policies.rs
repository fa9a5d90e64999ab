//! Settings catalog policy operations
//!
//! All calls go to the beta endpoint under `deviceManagement/configurationPolicies`.

use crate::catalog::wire::{
    GraphAssignRequest, GraphConfigurationPolicy, GraphPolicyAssignment, GraphSetting,
};
use crate::error::Result;
use crate::graph::GraphClient;

const POLICIES: &str = "deviceManagement/configurationPolicies";

const LIST_SELECT: &str =
    "id,name,description,platforms,technologies,settingCount,createdDateTime,lastModifiedDateTime,isAssigned";

/// Filter for listing policies
#[derive(Debug, Clone, Default)]
pub struct PolicyFilter {
    /// OData `$filter` passed through to Graph
    pub odata_filter: Option<String>,
    /// Case-insensitive substring match on the name, applied client side
    pub name_contains: Option<String>,
    /// Exact platform match, applied client side
    pub platform: Option<String>,
}

impl PolicyFilter {
    pub fn to_query_string(&self) -> String {
        let mut query = format!("$select={}", LIST_SELECT);
        if let Some(filter) = &self.odata_filter {
            query.push_str("&$filter=");
            query.push_str(&urlencoding::encode(filter));
        }
        query
    }

    pub fn matches(&self, policy: &GraphConfigurationPolicy) -> bool {
        if let Some(needle) = &self.name_contains {
            let name = policy.name.as_deref().unwrap_or("").to_lowercase();
            if !name.contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(platform) = &self.platform {
            if !policy
                .platforms
                .as_deref()
                .is_some_and(|p| p.eq_ignore_ascii_case(platform))
            {
                return false;
            }
        }
        true
    }
}

pub async fn list_policies(
    client: &GraphClient,
    filter: &PolicyFilter,
) -> Result<Vec<GraphConfigurationPolicy>> {
    let endpoint = format!("{}?{}", POLICIES, filter.to_query_string());
    let policies: Vec<GraphConfigurationPolicy> = client.get_all_pages(&endpoint).await?;
    Ok(policies.into_iter().filter(|p| filter.matches(p)).collect())
}

pub async fn get_policy(client: &GraphClient, policy_id: &str) -> Result<GraphConfigurationPolicy> {
    client.get(&format!("{}/{}", POLICIES, policy_id)).await
}

/// Settings come from their own paged collection; `null` entries are kept for the mapper to report
pub async fn get_policy_settings(
    client: &GraphClient,
    policy_id: &str,
) -> Result<Vec<Option<GraphSetting>>> {
    client
        .get_all_pages(&format!("{}/{}/settings", POLICIES, policy_id))
        .await
}

pub async fn get_policy_assignments(
    client: &GraphClient,
    policy_id: &str,
) -> Result<Vec<GraphPolicyAssignment>> {
    client
        .get_all_pages(&format!("{}/{}/assignments", POLICIES, policy_id))
        .await
}

pub async fn create_policy(
    client: &GraphClient,
    policy: &GraphConfigurationPolicy,
) -> Result<GraphConfigurationPolicy> {
    client.post(POLICIES, policy).await
}

pub async fn update_policy(
    client: &GraphClient,
    policy_id: &str,
    policy: &GraphConfigurationPolicy,
) -> Result<()> {
    client
        .patch(&format!("{}/{}", POLICIES, policy_id), policy)
        .await
}

pub async fn delete_policy(client: &GraphClient, policy_id: &str) -> Result<()> {
    client.delete(&format!("{}/{}", POLICIES, policy_id)).await
}

/// Replace the policy's assignments
pub async fn assign_policy(
    client: &GraphClient,
    policy_id: &str,
    assignments: Vec<GraphPolicyAssignment>,
) -> Result<()> {
    let body = GraphAssignRequest { assignments };
    client
        .post_no_content(&format!("{}/{}/assign", POLICIES, policy_id), &body)
        .await
}
