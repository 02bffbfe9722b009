//! GraphQL documents sent to `POST /graphql`
//!
//! Paged queries alias their connection as `ghNode` so one response shape
//! serves both organization repositories and repository labels.

pub const RATE_LIMIT: &str = "query {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
}";

pub const ORGANIZATION_BY_LOGIN: &str = "query ($orgName: String!) {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
  organization(login: $orgName) {
    id
    login
    url
  }
}";

pub const ORGANIZATION_REPOSITORIES: &str = "query ($orgId: ID!, $cursor: String, $increment: Int) {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
  node(id: $orgId) {
    ... on Organization {
      ghNode: repositories(first: $increment, after: $cursor) {
        totalCount
        edges {
          cursor
          node {
            id
            name
            url
            isArchived
            nameWithOwner
            owner {
              login
            }
            repositoryTopics(first: 20) {
              edges {
                node {
                  topic {
                    name
                  }
                }
              }
            }
          }
        }
      }
    }
  }
}";

pub const REPOSITORY_LABELS: &str = "query ($repoId: ID!, $cursor: String, $increment: Int) {
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
  node(id: $repoId) {
    ... on Repository {
      ghNode: labels(first: $increment, after: $cursor) {
        totalCount
        edges {
          cursor
          node {
            id
            name
            color
            description
          }
        }
      }
    }
  }
}";

pub const CREATE_LABEL: &str = "mutation ($repositoryId: ID!, $name: String!, $color: String!, $description: String) {
  createLabel(input: {repositoryId: $repositoryId, name: $name, color: $color, description: $description}) {
    label {
      id
    }
  }
}";

pub const UPDATE_LABEL: &str = "mutation ($labelId: ID!, $name: String!, $color: String!, $description: String) {
  updateLabel(input: {id: $labelId, name: $name, color: $color, description: $description}) {
    label {
      id
    }
  }
}";

pub const DELETE_LABEL: &str = "mutation ($labelId: ID!) {
  deleteLabel(input: {id: $labelId}) {
    clientMutationId
  }
}";
