//! Unit tests for GitHubClient using wiremock

#[cfg(test)]
mod tests {
    use crate::client::GitHubClient;
    use crate::error::GitHubError;
    use crate::models::*;
    use labelsync_core::{LabelMutation, LabelRemote, PageResponse, Repository, SyncError};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rate_limit_json() -> serde_json::Value {
        serde_json::json!({
            "limit": 5000,
            "cost": 1,
            "remaining": 4321,
            "resetAt": "2024-01-15T11:00:00Z"
        })
    }

    fn mock_repository(name: &str, topics: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "id": format!("R_{}", name),
            "name": name,
            "url": format!("https://github.com/acme/{}", name),
            "isArchived": false,
            "nameWithOwner": format!("acme/{}", name),
            "owner": {"login": "acme"},
            "repositoryTopics": {
                "edges": topics
                    .iter()
                    .map(|t| serde_json::json!({"node": {"topic": {"name": t}}}))
                    .collect::<Vec<_>>()
            }
        })
    }

    fn repository(name: &str) -> Repository {
        Repository {
            id: format!("R_{}", name),
            name: name.to_string(),
            ..Repository::default()
        }
    }

    #[tokio::test]
    async fn test_get_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"rateLimit": rate_limit_json()}
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let rate_limit = LabelRemote::rate_limit(&client).unwrap();

        assert_eq!(rate_limit.remaining, 4321);
        assert_eq!(rate_limit.limit, 5000);
        assert!(rate_limit.reset_at.is_some());
    }

    #[tokio::test]
    async fn test_find_organization() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": {"orgName": "acme"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "rateLimit": rate_limit_json(),
                    "organization": {"id": "O_1", "login": "acme", "url": "https://github.com/acme"}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let lookup = client.find_organization("acme").unwrap();

        let org = lookup.value.unwrap();
        assert_eq!(org.id, "O_1");
        assert_eq!(org.login, "acme");
        assert_eq!(lookup.rate_limit.unwrap().remaining, 4321);
    }

    #[tokio::test]
    async fn test_find_organization_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"rateLimit": rate_limit_json(), "organization": null},
                "errors": [{
                    "type": "NOT_FOUND",
                    "message": "Could not resolve to an Organization with the login of 'nope'."
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let lookup = client.find_organization("nope").unwrap();

        assert!(lookup.value.is_none());
        assert!(lookup.rate_limit.is_some());
    }

    #[tokio::test]
    async fn test_repositories_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": {"orgId": "O_1", "cursor": "Y3Vyc29y", "increment": 2}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "rateLimit": rate_limit_json(),
                    "node": {"ghNode": {
                        "totalCount": 5,
                        "edges": [
                            {"cursor": "c3", "node": mock_repository("api", &["rust"])},
                            {"cursor": "c4", "node": mock_repository("web", &[])}
                        ]
                    }}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let response = client.repositories_page("O_1", Some("Y3Vyc29y"), 2).unwrap();

        let PageResponse::Page { rate_limit, page } = response else {
            panic!("expected a page");
        };
        assert_eq!(rate_limit.unwrap().remaining, 4321);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.edges.len(), 2);
        assert_eq!(page.edges[0].cursor, "c3");
        assert_eq!(page.edges[0].node.name, "api");
        assert_eq!(page.edges[0].node.topics, vec!["rust"]);
        assert_eq!(page.edges[1].node.name_with_owner, "acme/web");
    }

    #[tokio::test]
    async fn test_labels_page_attaches_repository() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": {"repoId": "R_api", "cursor": null, "increment": 50}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "rateLimit": rate_limit_json(),
                    "node": {"ghNode": {
                        "totalCount": 1,
                        "edges": [{"cursor": "c1", "node": {
                            "id": "LA_1", "name": "bug", "color": "d73a4a", "description": null
                        }}]
                    }}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let response = client.labels_page(&repository("api"), None, 50).unwrap();

        let PageResponse::Page { page, .. } = response else {
            panic!("expected a page");
        };
        let label = &page.edges[0].node;
        assert_eq!(label.id.as_deref(), Some("LA_1"));
        assert_eq!(label.color, "d73a4a");
        assert!(label.description.is_none());
        assert_eq!(label.repository.name, "api");
    }

    #[tokio::test]
    async fn test_labels_page_missing_repository() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"rateLimit": rate_limit_json(), "node": null}
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let response = client.labels_page(&repository("gone"), None, 50).unwrap();

        assert!(matches!(response, PageResponse::ParentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_label_mutation_variables() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": {
                    "repositoryId": "R_api",
                    "name": "bug",
                    "color": "d73a4a",
                    "description": "Something isn't working"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"createLabel": {"label": {"id": "LA_new"}}}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        client
            .mutate(&LabelMutation::Create {
                repository_id: "R_api".to_string(),
                name: "bug".to_string(),
                color: "d73a4a".to_string(),
                description: Some("Something isn't working".to_string()),
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_label_sends_label_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": {"labelId": "LA_1", "name": "Bug", "color": "ffffff"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"updateLabel": {"label": {"id": "LA_1"}}}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        client
            .update_label(&UpdateLabelInput {
                label_id: "LA_1".to_string(),
                name: "Bug".to_string(),
                color: "ffffff".to_string(),
                description: None,
            })
            .unwrap();
    }

    #[tokio::test]
    async fn test_mutation_with_errors_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"deleteLabel": null},
                "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to a node with the global id of 'LA_9'"}]
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let err = client
            .delete_label(&DeleteLabelInput {
                label_id: "LA_9".to_string(),
            })
            .unwrap_err();

        match err {
            GitHubError::GraphQl(messages) => assert!(messages[0].contains("LA_9")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_errors_without_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{"message": "Parse error on \"}\""}]
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let err = client.get_rate_limit().unwrap_err();

        assert!(matches!(err, GitHubError::GraphQl(_)));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials"
            })))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "bad-token");
        let err = client.find_organization("acme").unwrap_err();

        assert!(matches!(err, SyncError::Unauthorized));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(serde_json::json!({"message": "API rate limit exceeded"})),
            )
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let err = client.get_rate_limit().unwrap_err();

        assert!(matches!(err, GitHubError::RateLimited));
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
            .mount(&mock_server)
            .await;

        let client = GitHubClient::with_base_url(&mock_server.uri(), "test-token");
        let err = client.get_rate_limit().unwrap_err();

        match err {
            GitHubError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
