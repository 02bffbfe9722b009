use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};
use ureq::Agent;

use crate::error::{GitHubError, Result};
use crate::models::*;
use crate::queries;

/// GitHub GraphQL API client
pub struct GitHubClient {
    agent: Agent,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a new GitHub client targeting api.github.com
    pub fn new(token: &str) -> Self {
        Self::with_base_url("https://api.github.com", token)
    }

    /// Create a new GitHub client with a custom base URL (for GitHub Enterprise or testing)
    ///
    /// Queries are sent to `{base_url}/graphql`.
    pub fn with_base_url(base_url: &str, token: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// GraphQL endpoint this client posts to
    pub fn endpoint(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    /// Build the Authorization header value
    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Check response status and return error if not successful
    fn check_response(
        &self,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            return Ok(response);
        }

        // Detect rate limiting: 403 with x-ratelimit-remaining: 0
        if status == 403 {
            if let Some(remaining) = response.headers().get("x-ratelimit-remaining") {
                if remaining.to_str().unwrap_or("") == "0" {
                    return Err(GitHubError::RateLimited);
                }
            }
        }

        let body = response
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::new());

        let message = if let Ok(error_response) = serde_json::from_str::<serde_json::Value>(&body) {
            error_response
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or(&body)
                .to_string()
        } else if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };

        if status == 401 {
            Err(GitHubError::Unauthorized)
        } else {
            Err(GitHubError::Api { status, message })
        }
    }

    /// Post one document and decode the envelope
    fn post<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<GraphQlResponse<T>> {
        let body = GraphQlRequest { query, variables };
        debug!(variables = ?body.variables, "GraphQL request");

        let response = self
            .agent
            .post(&self.endpoint())
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/json")
            .send_json(&body)
            .map_err(GitHubError::Http)?;

        let mut response = self.check_response(response)?;
        let envelope: GraphQlResponse<T> = response.body_mut().read_json()?;
        for e in &envelope.errors {
            error!(kind = ?e.kind, "{}", e.message);
        }
        Ok(envelope)
    }

    /// Run a query, tolerating errors reported next to usable data
    fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        what: &str,
    ) -> Result<T> {
        let envelope = self.post::<T>(query, variables)?;
        match envelope.data {
            Some(data) => Ok(data),
            None if !envelope.errors.is_empty() => Err(GitHubError::GraphQl(
                envelope.errors.into_iter().map(|e| e.message).collect(),
            )),
            None => Err(GitHubError::EmptyResponse(what.to_string())),
        }
    }

    /// Run a mutation; any reported error fails it
    fn mutation<V: Serialize>(&self, document: &str, input: &V) -> Result<()> {
        let envelope = self.post::<serde_json::Value>(document, Some(serde_json::to_value(input)?))?;
        if !envelope.errors.is_empty() {
            return Err(GitHubError::GraphQl(
                envelope.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        Ok(())
    }

    fn log_rate_limit(rate_limit: Option<&GitHubRateLimit>) {
        if let Some(rl) = rate_limit {
            info!(
                "GitHub Tokens - remaining: {} query cost: {} (token will reset at: {})",
                rl.remaining,
                rl.cost,
                rl.reset_at.as_deref().unwrap_or("unknown")
            );
        }
    }

    // ==================== Queries ====================

    /// Current rate-limit budget of the token
    pub fn get_rate_limit(&self) -> Result<GitHubRateLimit> {
        let data: RateLimitData = self.query(queries::RATE_LIMIT, None, "rate limit")?;
        Self::log_rate_limit(data.rate_limit.as_ref());
        data.rate_limit
            .ok_or_else(|| GitHubError::EmptyResponse("rate limit".to_string()))
    }

    /// Look up an organization by login
    ///
    /// `organization` is `None` when the login does not resolve for this token.
    pub fn get_organization(&self, login: &str) -> Result<OrganizationData> {
        let data: OrganizationData = self.query(
            queries::ORGANIZATION_BY_LOGIN,
            Some(serde_json::json!({ "orgName": login })),
            "organization",
        )?;
        Self::log_rate_limit(data.rate_limit.as_ref());
        Ok(data)
    }

    /// One page of an organization's repositories
    pub fn get_organization_repositories(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<NodeData<GitHubRepository>> {
        let data: NodeData<GitHubRepository> = self.query(
            queries::ORGANIZATION_REPOSITORIES,
            Some(serde_json::json!({
                "orgId": organization_id,
                "cursor": cursor,
                "increment": increment,
            })),
            "repositories",
        )?;
        Self::log_rate_limit(data.rate_limit.as_ref());
        Ok(data)
    }

    /// One page of a repository's labels
    pub fn get_repository_labels(
        &self,
        repository_id: &str,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<NodeData<GitHubLabel>> {
        let data: NodeData<GitHubLabel> = self.query(
            queries::REPOSITORY_LABELS,
            Some(serde_json::json!({
                "repoId": repository_id,
                "cursor": cursor,
                "increment": increment,
            })),
            "labels",
        )?;
        Self::log_rate_limit(data.rate_limit.as_ref());
        Ok(data)
    }

    // ==================== Mutations ====================

    pub fn create_label(&self, input: &CreateLabelInput) -> Result<()> {
        self.mutation(queries::CREATE_LABEL, input)
    }

    pub fn update_label(&self, input: &UpdateLabelInput) -> Result<()> {
        self.mutation(queries::UPDATE_LABEL, input)
    }

    pub fn delete_label(&self, input: &DeleteLabelInput) -> Result<()> {
        self.mutation(queries::DELETE_LABEL, input)
    }
}
