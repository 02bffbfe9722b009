use serde::{Deserialize, Serialize};

/// Body of a `POST /graphql` request
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

/// Envelope of every GraphQL response
///
/// GitHub may return `data` and `errors` together, e.g. a `NOT_FOUND`
/// error next to `"organization": null`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorMessage {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Rate-limit block requested alongside every query
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRateLimit {
    pub limit: u32,
    pub cost: u32,
    pub remaining: u32,
    pub reset_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitData {
    pub rate_limit: Option<GitHubRateLimit>,
}

/// `{totalCount, edges}` connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct GitHubConnection<T> {
    pub total_count: usize,
    #[serde(default)]
    pub edges: Vec<GitHubEdge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubEdge<T> {
    pub cursor: String,
    pub node: T,
}

/// `node(id:)` lookup whose connection is aliased as `ghNode`
///
/// `gh_node` stays `None` when the id resolves to another type.
#[derive(Debug, Clone, Deserialize)]
pub struct GhNode<T> {
    #[serde(rename = "ghNode")]
    pub gh_node: Option<GitHubConnection<T>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData<T> {
    pub rate_limit: Option<GitHubRateLimit>,
    pub node: Option<GhNode<T>>,
}
