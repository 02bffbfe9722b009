//! Model conversions between GitHub GraphQL types and labelsync-core types

use chrono::{DateTime, Utc};
use labelsync_core::{
    Edge, Label, LabelMutation, Organization, Owner, Page, PageResponse, RateLimit, Repository,
};

use crate::models::*;

/// Convert a GitHub rate-limit block
///
/// An unparseable `resetAt` is dropped, which makes the governor resume at once.
pub fn rate_limit_to_core(rate_limit: GitHubRateLimit) -> RateLimit {
    RateLimit {
        limit: rate_limit.limit,
        cost: rate_limit.cost,
        remaining: rate_limit.remaining,
        reset_at: rate_limit
            .reset_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

pub fn organization_to_core(org: GitHubOrganization) -> Organization {
    Organization {
        id: org.id,
        login: org.login,
        url: org.url,
    }
}

pub fn repository_to_core(repo: GitHubRepository) -> Repository {
    let topics = repo.topic_names();
    Repository {
        id: repo.id,
        name: repo.name,
        name_with_owner: repo.name_with_owner,
        url: repo.url,
        is_archived: repo.is_archived,
        owner: Owner {
            login: repo.owner.login,
        },
        topics,
    }
}

/// Attach a fetched label to the repository it was read from
pub fn label_to_core(label: GitHubLabel, repository: &Repository) -> Label {
    Label {
        id: Some(label.id),
        name: label.name,
        color: label.color,
        description: label.description,
        repository: repository.clone(),
    }
}

/// Convert a `node(id:) { ghNode }` response into a core page
///
/// A null node, or a node of another type, means the parent is gone.
pub fn node_page_to_core<G, T>(data: NodeData<G>, convert: impl Fn(G) -> T) -> PageResponse<T> {
    let rate_limit = data.rate_limit.map(rate_limit_to_core);
    match data.node.and_then(|n| n.gh_node) {
        Some(connection) => PageResponse::Page {
            rate_limit,
            page: Page {
                total_count: connection.total_count,
                edges: connection
                    .edges
                    .into_iter()
                    .map(|e| Edge {
                        cursor: e.cursor,
                        node: convert(e.node),
                    })
                    .collect(),
            },
        },
        None => PageResponse::ParentNotFound { rate_limit },
    }
}

pub enum MutationInput {
    Create(CreateLabelInput),
    Update(UpdateLabelInput),
    Delete(DeleteLabelInput),
}

pub fn mutation_from_core(mutation: &LabelMutation) -> MutationInput {
    match mutation.clone() {
        LabelMutation::Create {
            repository_id,
            name,
            color,
            description,
        } => MutationInput::Create(CreateLabelInput {
            repository_id,
            name,
            color,
            description,
        }),
        LabelMutation::Update {
            label_id,
            name,
            color,
            description,
        } => MutationInput::Update(UpdateLabelInput {
            label_id,
            name,
            color,
            description,
        }),
        LabelMutation::Delete { label_id } => MutationInput::Delete(DeleteLabelInput { label_id }),
    }
}
