use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SyncError};
use crate::models::Repository;

/// How topic filters combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TopicOperator {
    /// Repository must carry every filter topic
    And,
    /// Repository must carry at least one filter topic
    #[default]
    Or,
}

impl FromStr for TopicOperator {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(TopicOperator::And),
            "OR" => Ok(TopicOperator::Or),
            other => Err(SyncError::InvalidInput(format!(
                "Unknown filter operator '{}', expected AND or OR",
                other
            ))),
        }
    }
}

impl fmt::Display for TopicOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicOperator::And => write!(f, "AND"),
            TopicOperator::Or => write!(f, "OR"),
        }
    }
}

/// Criteria deciding which repositories receive the source labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFilter {
    /// Empty means no topic filtering
    pub topics: Vec<String>,
    pub operator: TopicOperator,
    pub ignore_archived: bool,
}

impl RepositoryFilter {
    pub fn matches(&self, repository: &Repository) -> bool {
        if self.ignore_archived && repository.is_archived {
            return false;
        }
        if self.topics.is_empty() {
            return true;
        }
        let has = |topic: &String| repository.topics.contains(topic);
        match self.operator {
            TopicOperator::And => self.topics.iter().all(has),
            TopicOperator::Or => self.topics.iter().any(has),
        }
    }
}

/// Keep the repositories matching `filter`, preserving their order
pub fn select_repositories(repositories: &[Repository], filter: &RepositoryFilter) -> Vec<Repository> {
    repositories
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Append the source repository to `selected` when filtering dropped it
///
/// Fails when the organization has no repository with that name.
pub fn ensure_source_repository(
    all: &[Repository],
    selected: &mut Vec<Repository>,
    source: &str,
    organization: &str,
) -> Result<()> {
    let Some(source_repo) = all.iter().find(|r| r.name == source) else {
        return Err(SyncError::SourceRepositoryNotFound {
            organization: organization.to_string(),
            repository: source.to_string(),
        });
    };
    if !selected.iter().any(|r| r.name == source) {
        selected.push(source_repo.clone());
    }
    Ok(())
}
