//! Integration tests for the Graph client and the configuration policy endpoints
//!
//! Uses wiremock to simulate Graph responses and verify retry behavior, rate limit handling,
//! pagination and the request shapes sent for each policy operation.

use ctl365_catalog::catalog::wire::{GraphConfigurationPolicy, GraphPolicyAssignment};
use ctl365_catalog::graph::configuration_policies::{self, PolicyFilter};
use ctl365_catalog::graph::{GraphClient, RetryPolicy};
use ctl365_catalog::CatalogError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const POLICIES: &str = "/deviceManagement/configurationPolicies";

/// Client pointed at the mock server with millisecond backoff
fn client_for(server: &MockServer) -> GraphClient {
    GraphClient::new("test-token".into())
        .with_base_url(server.uri())
        .with_retry_policy(RetryPolicy {
            max_retries: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        })
}

#[tokio::test]
async fn test_get_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc", POLICIES)))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "name": "Camera",
            "platforms": "windows10",
            "technologies": "mdm"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let policy = configuration_policies::get_policy(&client_for(&server), "abc")
        .await
        .unwrap();

    assert_eq!(policy.name.as_deref(), Some("Camera"));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc", POLICIES)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc", POLICIES)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let policy = configuration_policies::get_policy(&client_for(&server), "abc")
        .await
        .unwrap();

    assert_eq!(policy.id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_rate_limit_honours_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc", POLICIES)))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc", POLICIES)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = configuration_policies::get_policy(&client_for(&server), "abc").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/missing", POLICIES)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": "ResourceNotFound",
                "message": "Policy not found"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = configuration_policies::get_policy(&client_for(&server), "missing")
        .await
        .unwrap_err();

    match err {
        CatalogError::GraphApiError(message) => {
            assert!(message.contains("404"));
            assert!(message.contains("ResourceNotFound"));
        }
        other => panic!("expected GraphApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc", POLICIES)))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = configuration_policies::get_policy(&client_for(&server), "abc")
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::GraphApiError(_)));
}

#[tokio::test]
async fn test_list_policies_follows_next_link_and_filters() {
    let server = MockServer::start().await;
    let next_link = format!("{}{}?$skiptoken=page2", server.uri(), POLICIES);

    Mock::given(method("GET"))
        .and(path(POLICIES))
        .and(query_param("$skiptoken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "id": "3", "name": "Edge baseline", "platforms": "windows10" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(POLICIES))
        .and(query_param(
            "$select",
            "id,name,description,platforms,technologies,settingCount,createdDateTime,lastModifiedDateTime,isAssigned",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "id": "1", "name": "Defender baseline", "platforms": "windows10" },
                { "id": "2", "name": "FileVault", "platforms": "macOS" }
            ],
            "@odata.nextLink": next_link
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = PolicyFilter {
        name_contains: Some("BASELINE".into()),
        ..Default::default()
    };
    let policies = configuration_policies::list_policies(&client_for(&server), &filter)
        .await
        .unwrap();

    let ids: Vec<_> = policies.iter().filter_map(|p| p.id.as_deref()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_odata_filter_with_reserved_characters_reaches_graph_intact() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(POLICIES))
        .and(query_param("$filter", "name eq 'R&D #1'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "id": "rd", "name": "R&D #1", "platforms": "windows10" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = PolicyFilter {
        odata_filter: Some("name eq 'R&D #1'".into()),
        ..Default::default()
    };
    let policies = configuration_policies::list_policies(&client_for(&server), &filter)
        .await
        .unwrap();

    assert_eq!(policies.len(), 1);
    assert_eq!(policies[0].id.as_deref(), Some("rd"));
}

#[tokio::test]
async fn test_settings_keep_null_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/abc/settings", POLICIES)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                null,
                {
                    "id": "1",
                    "settingInstance": {
                        "@odata.type": "#microsoft.graph.deviceManagementConfigurationSimpleSettingInstance",
                        "settingDefinitionId": "notes",
                        "simpleSettingValue": {
                            "@odata.type": "#microsoft.graph.deviceManagementConfigurationStringSettingValue",
                            "value": "auto"
                        }
                    }
                }
            ]
        })))
        .mount(&server)
        .await;

    let settings = configuration_policies::get_policy_settings(&client_for(&server), "abc")
        .await
        .unwrap();

    assert_eq!(settings.len(), 2);
    assert!(settings[0].is_none());
    assert_eq!(settings[1].as_ref().and_then(|s| s.id.as_deref()), Some("1"));
}

#[tokio::test]
async fn test_create_posts_policy_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(POLICIES))
        .and(body_partial_json(json!({
            "name": "Camera",
            "platforms": "windows10",
            "technologies": "mdm"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "new-id",
            "name": "Camera"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = GraphConfigurationPolicy {
        name: Some("Camera".into()),
        platforms: Some("windows10".into()),
        technologies: Some("mdm".into()),
        ..Default::default()
    };
    let created = configuration_policies::create_policy(&client_for(&server), &body)
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("new-id"));
}

#[tokio::test]
async fn test_create_is_not_retried_after_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(POLICIES))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let body = GraphConfigurationPolicy {
        name: Some("Camera".into()),
        ..Default::default()
    };
    let err = configuration_policies::create_policy(&client_for(&server), &body)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::GraphApiError(_)));
}

#[tokio::test]
async fn test_create_is_retried_after_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(POLICIES))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(POLICIES))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "new-id" })))
        .expect(1)
        .mount(&server)
        .await;

    let body = GraphConfigurationPolicy {
        name: Some("Camera".into()),
        ..Default::default()
    };
    let created = configuration_policies::create_policy(&client_for(&server), &body)
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("new-id"));
}

#[tokio::test]
async fn test_update_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/abc", POLICIES)))
        .and(body_partial_json(json!({ "name": "Renamed" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let body = GraphConfigurationPolicy {
        name: Some("Renamed".into()),
        ..Default::default()
    };
    configuration_policies::update_policy(&client_for(&server), "abc", &body)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_policy() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/abc", POLICIES)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    configuration_policies::delete_policy(&client_for(&server), "abc")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_assign_wraps_assignments() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/abc/assign", POLICIES)))
        .and(body_partial_json(json!({
            "assignments": [{
                "target": {
                    "@odata.type": "#microsoft.graph.groupAssignmentTarget",
                    "groupId": "g-1"
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let assignments: Vec<GraphPolicyAssignment> = serde_json::from_value(json!([{
        "target": {
            "@odata.type": "#microsoft.graph.groupAssignmentTarget",
            "groupId": "g-1"
        }
    }]))
    .unwrap();

    configuration_policies::assign_policy(&client_for(&server), "abc", assignments)
        .await
        .unwrap();
}
