use serde::{Deserialize, Serialize};

/// GitHub label as returned by the `labels` connection
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLabel {
    pub id: String,
    pub name: String,
    /// Color hex string WITHOUT `#` prefix (e.g., "fc2929")
    pub color: String,
    pub description: Option<String>,
}

/// Variables of the `createLabel` mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabelInput {
    pub repository_id: String,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

/// Variables of the `updateLabel` mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLabelInput {
    pub label_id: String,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
}

/// Variables of the `deleteLabel` mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLabelInput {
    pub label_id: String,
}
