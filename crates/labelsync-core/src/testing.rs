//! In-memory fakes shared by the unit tests

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, SyncError};
use crate::models::*;
use crate::traits::{Clock, LabelRemote};

/// Clock that records sleeps and advances its own time instead of blocking
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::from_std(duration).unwrap();
    }
}

pub fn repo(name: &str) -> Repository {
    Repository {
        id: format!("R_{}", name),
        name: name.to_string(),
        name_with_owner: format!("acme/{}", name),
        url: format!("https://github.com/acme/{}", name),
        is_archived: false,
        owner: Owner {
            login: "acme".to_string(),
        },
        topics: Vec::new(),
    }
}

pub fn repo_with_topics(name: &str, topics: &[&str], archived: bool) -> Repository {
    Repository {
        is_archived: archived,
        topics: topics.iter().map(|t| t.to_string()).collect(),
        ..repo(name)
    }
}

pub fn label(repository: &Repository, name: &str, color: &str, description: &str) -> Label {
    Label {
        id: Some(format!("LA_{}_{}", repository.name, name)),
        name: name.to_string(),
        color: color.to_string(),
        description: Some(description.to_string()),
        repository: repository.clone(),
    }
}

#[derive(Default)]
pub(crate) struct FakeState {
    mutations: Vec<LabelMutation>,
    page_requests: Vec<(String, Option<String>, usize)>,
    rate_limit_probes: usize,
}

/// In-memory organization serving pages the way the GraphQL API does
#[derive(Default)]
pub struct FakeRemote {
    pub organization: Option<Organization>,
    pub repositories: Vec<Repository>,
    pub labels: Vec<Label>,
    /// Snapshot returned by every call
    pub rate_limit: RateLimit,
    /// Mutations touching a label with one of these names fail
    pub failing_labels: Vec<String>,
    pub(crate) state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new(repositories: Vec<Repository>, labels: Vec<Label>) -> Self {
        Self {
            organization: Some(Organization {
                id: "O_acme".to_string(),
                login: "acme".to_string(),
                url: "https://github.com/acme".to_string(),
            }),
            repositories,
            labels,
            ..Default::default()
        }
    }

    pub fn mutations(&self) -> Vec<LabelMutation> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn page_requests(&self) -> Vec<(String, Option<String>, usize)> {
        self.state.lock().unwrap().page_requests.clone()
    }

    pub fn rate_limit_probes(&self) -> usize {
        self.state.lock().unwrap().rate_limit_probes
    }

    fn page<T: Clone>(
        &self,
        key: &str,
        items: Vec<T>,
        cursor: Option<&str>,
        increment: usize,
    ) -> PageResponse<T> {
        self.state.lock().unwrap().page_requests.push((
            key.to_string(),
            cursor.map(str::to_string),
            increment,
        ));
        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let edges = items
            .iter()
            .enumerate()
            .skip(start)
            .take(increment)
            .map(|(i, node)| Edge {
                cursor: (i + 1).to_string(),
                node: node.clone(),
            })
            .collect();
        PageResponse::Page {
            rate_limit: Some(self.rate_limit.clone()),
            page: Page {
                total_count: items.len(),
                edges,
            },
        }
    }
}

impl LabelRemote for FakeRemote {
    fn rate_limit(&self) -> Result<RateLimit> {
        self.state.lock().unwrap().rate_limit_probes += 1;
        Ok(self.rate_limit.clone())
    }

    fn find_organization(&self, login: &str) -> Result<Lookup<Organization>> {
        Ok(Lookup {
            value: self.organization.clone().filter(|o| o.login == login),
            rate_limit: Some(self.rate_limit.clone()),
        })
    }

    fn repositories_page(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<PageResponse<Repository>> {
        if self.organization.as_ref().map(|o| o.id.as_str()) != Some(organization_id) {
            return Ok(PageResponse::ParentNotFound { rate_limit: None });
        }
        Ok(self.page(organization_id, self.repositories.clone(), cursor, increment))
    }

    fn labels_page(
        &self,
        repository: &Repository,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<PageResponse<Label>> {
        if !self.repositories.iter().any(|r| r.id == repository.id) {
            return Ok(PageResponse::ParentNotFound { rate_limit: None });
        }
        let labels: Vec<Label> = self
            .labels
            .iter()
            .filter(|l| l.repository.name == repository.name)
            .map(|l| Label {
                repository: repository.clone(),
                ..l.clone()
            })
            .collect();
        Ok(self.page(&repository.id, labels, cursor, increment))
    }

    fn mutate(&self, mutation: &LabelMutation) -> Result<()> {
        self.state.lock().unwrap().mutations.push(mutation.clone());
        let name = match mutation {
            LabelMutation::Create { name, .. } | LabelMutation::Update { name, .. } => {
                Some(name.as_str())
            }
            LabelMutation::Delete { .. } => None,
        };
        if name.is_some_and(|n| self.failing_labels.iter().any(|f| f == n)) {
            return Err(SyncError::Api {
                status: 422,
                message: "Name has already been taken".to_string(),
            });
        }
        Ok(())
    }
}
