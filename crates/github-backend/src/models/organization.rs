use serde::Deserialize;

use super::GitHubRateLimit;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOrganization {
    pub id: String,
    pub login: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationData {
    pub rate_limit: Option<GitHubRateLimit>,
    pub organization: Option<GitHubOrganization>,
}
