use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Token budget reported by the remote service after every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub limit: u32,
    pub cost: u32,
    pub remaining: u32,
    pub reset_at: Option<DateTime<Utc>>,
}

impl Default for RateLimit {
    /// Snapshot used before the service has reported anything
    fn default() -> Self {
        Self {
            limit: 5000,
            cost: 1,
            remaining: 5000,
            reset_at: None,
        }
    }
}

/// GitHub organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub login: String,
    pub url: String,
}

/// Repository owner (user or organization)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Repository as seen by the sync engine
///
/// Repositories are matched by `name`, which is unique inside one organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub name_with_owner: String,
    pub url: String,
    pub is_archived: bool,
    pub owner: Owner,
    /// Topic names, in the order the remote returned them
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Label attached to a repository
///
/// `id` is `None` for labels that only exist as a planned creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Color hex string WITHOUT `#` prefix (e.g., "fc2929")
    pub color: String,
    pub description: Option<String>,
    pub repository: Repository,
}

/// Orders labels by name, ignoring case
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_uppercase().cmp(&b.to_uppercase())
}

/// Sort labels by name, ignoring case (stable)
pub fn sort_by_name(labels: &mut [Label]) {
    labels.sort_by(|a, b| compare_names(&a.name, &b.name));
}

/// A label field an update can change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelField {
    Name,
    Description,
    Color,
}

impl fmt::Display for LabelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelField::Name => write!(f, "name"),
            LabelField::Description => write!(f, "description"),
            LabelField::Color => write!(f, "color"),
        }
    }
}

/// Label scheduled for creation, update or deletion in a target repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedLabel {
    #[serde(flatten)]
    pub label: Label,
    /// Fields an update changes; empty for creations and deletions
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub changed_fields: Vec<LabelField>,
}

impl PlannedLabel {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            changed_fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Create => write!(f, "created"),
            ActionKind::Update => write!(f, "updated"),
            ActionKind::Delete => write!(f, "deleted"),
        }
    }
}

/// One of the three action sets produced by reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSet {
    pub kind: ActionKind,
    pub labels: Vec<PlannedLabel>,
}

impl ActionSet {
    /// Build an action set, sorting its labels by name (case-insensitive)
    pub fn new(kind: ActionKind, mut labels: Vec<PlannedLabel>) -> Self {
        labels.sort_by(|a, b| compare_names(&a.label.name, &b.label.name));
        Self { kind, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Plain labels, in plan order
    pub fn to_labels(&self) -> Vec<Label> {
        self.labels.iter().map(|p| p.label.clone()).collect()
    }
}

/// Kind-specific mutation input built from a planned label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LabelMutation {
    #[serde(rename_all = "camelCase")]
    Create {
        repository_id: String,
        name: String,
        color: String,
        description: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Update {
        label_id: String,
        name: String,
        color: String,
        description: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Delete { label_id: String },
}

impl LabelMutation {
    pub fn kind(&self) -> ActionKind {
        match self {
            LabelMutation::Create { .. } => ActionKind::Create,
            LabelMutation::Update { .. } => ActionKind::Update,
            LabelMutation::Delete { .. } => ActionKind::Delete,
        }
    }
}

/// One cursor-addressed item of a remote page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

/// The `{totalCount, edges}` envelope every paged query returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub total_count: usize,
    pub edges: Vec<Edge<T>>,
}

/// Outcome of one paged read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse<T> {
    Page {
        rate_limit: Option<RateLimit>,
        page: Page<T>,
    },
    /// The object the query hangs off (org, repository) no longer resolves
    ParentNotFound { rate_limit: Option<RateLimit> },
}

/// Result of a lookup that carries the fresh rate-limit snapshot alongside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<T> {
    pub value: Option<T>,
    pub rate_limit: Option<RateLimit>,
}
