use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::Result;
use crate::models::*;

/// Remote label service the sync engine runs against
///
/// Each backend (currently GitHub GraphQL) provides its own implementation.
/// Paged reads return the raw `{totalCount, edges}` envelope; walking the
/// pages is the job of [`crate::pagination::PaginatedFetcher`].
pub trait LabelRemote: Send + Sync {
    /// Probe the current rate-limit budget
    fn rate_limit(&self) -> Result<RateLimit>;

    /// Find an organization by login
    fn find_organization(&self, login: &str) -> Result<Lookup<Organization>>;

    /// Fetch one page of an organization's repositories
    fn repositories_page(
        &self,
        organization_id: &str,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<PageResponse<Repository>>;

    /// Fetch one page of a repository's labels
    ///
    /// Returned labels carry `repository` as given.
    fn labels_page(
        &self,
        repository: &Repository,
        cursor: Option<&str>,
        increment: usize,
    ) -> Result<PageResponse<Label>>;

    /// Apply a single label mutation
    fn mutate(&self, mutation: &LabelMutation) -> Result<()>;
}

/// Source of time and timed waits
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
