use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::error::{Result, SyncError};
use crate::models::*;
use crate::rate_limit::RateLimitGovernor;
use crate::traits::{Clock, LabelRemote};

/// Default number of nodes requested per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Consecutive failed calls after which a fetch is abandoned
pub const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Pause before every remote read, on top of the token budget
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Size of the next page given what has been fetched so far
///
/// Returns 0 once everything has been fetched, the remainder when it fits in
/// one page, and `max_increment` otherwise.
pub fn calculate_increment(records_in_collection: usize, total_count: usize, max_increment: usize) -> usize {
    if total_count <= records_in_collection {
        0
    } else if total_count - records_in_collection <= max_increment {
        total_count - records_in_collection
    } else {
        max_increment
    }
}

/// A remote read that is walked page by page
pub trait PagedQuery<T> {
    /// Short description used in logs and errors
    fn describe(&self) -> String;

    fn fetch_page(&self, cursor: Option<&str>, increment: usize) -> Result<PageResponse<T>>;
}

/// Repositories of one organization
pub struct OrganizationRepositories<'a> {
    pub remote: &'a dyn LabelRemote,
    pub organization: &'a Organization,
}

impl PagedQuery<Repository> for OrganizationRepositories<'_> {
    fn describe(&self) -> String {
        format!("repositories of {}", self.organization.login)
    }

    fn fetch_page(&self, cursor: Option<&str>, increment: usize) -> Result<PageResponse<Repository>> {
        self.remote
            .repositories_page(&self.organization.id, cursor, increment)
    }
}

/// Labels of one repository
pub struct RepositoryLabels<'a> {
    pub remote: &'a dyn LabelRemote,
    pub repository: &'a Repository,
}

impl PagedQuery<Label> for RepositoryLabels<'_> {
    fn describe(&self) -> String {
        format!("labels of {}", self.repository.name)
    }

    fn fetch_page(&self, cursor: Option<&str>, increment: usize) -> Result<PageResponse<Label>> {
        self.remote.labels_page(self.repository, cursor, increment)
    }
}

/// Walks cursor-paginated reads whose total size is only learned from the
/// first response
pub struct PaginatedFetcher<'a> {
    clock: &'a dyn Clock,
    governor: RateLimitGovernor,
    page_size: usize,
    request_delay: Duration,
    max_consecutive_errors: u32,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(clock: &'a dyn Clock, governor: RateLimitGovernor, page_size: usize) -> Self {
        Self {
            clock,
            governor,
            page_size: page_size.max(1),
            request_delay: DEFAULT_REQUEST_DELAY,
            max_consecutive_errors: MAX_CONSECUTIVE_ERRORS,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch every node of `query`, keeping `rate_limit` current
    ///
    /// A parent object that no longer resolves ends the walk with whatever
    /// was accumulated. Too many consecutive transient failures fail the
    /// whole fetch; any other error is returned as is.
    pub fn fetch<T>(&self, query: &dyn PagedQuery<T>, rate_limit: &mut RateLimit) -> Result<Vec<T>> {
        let mut nodes: Vec<T> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut increment = self.page_size;
        let mut errors = 0u32;

        loop {
            self.clock.sleep(self.request_delay);
            self.governor.wait(rate_limit, self.clock);

            let started = Instant::now();
            let response = match query.fetch_page(cursor.as_deref(), increment) {
                Ok(response) => response,
                Err(e) if !e.is_transient() => {
                    error!(query = %query.describe(), error = %e, "Error loading content, giving up");
                    return Err(e);
                }
                Err(e) => {
                    errors += 1;
                    error!(
                        query = %query.describe(),
                        error = %e,
                        "Error loading content, current count: {}",
                        errors
                    );
                    if errors >= self.max_consecutive_errors {
                        return Err(SyncError::FetchExhausted {
                            query: query.describe(),
                            attempts: errors,
                        });
                    }
                    continue;
                }
            };
            errors = 0;

            let page = match response {
                PageResponse::Page { rate_limit: fresh, page } => {
                    if let Some(fresh) = fresh {
                        *rate_limit = fresh;
                    }
                    page
                }
                PageResponse::ParentNotFound { rate_limit: fresh } => {
                    if let Some(fresh) = fresh {
                        *rate_limit = fresh;
                    }
                    info!(
                        query = %query.describe(),
                        fetched = nodes.len(),
                        "Parent object not found, stopping pagination"
                    );
                    return Ok(nodes);
                }
            };

            let received = page.edges.len();
            if received > 0 {
                let elapsed = started.elapsed().as_secs_f64().max(0.001);
                info!(
                    "Latest call contained {} nodes, download rate: {} nodes/s",
                    received,
                    (received as f64 / elapsed).round()
                );
            }
            for edge in page.edges {
                cursor = Some(edge.cursor);
                nodes.push(edge.node);
            }

            increment = calculate_increment(nodes.len(), page.total_count, self.page_size);
            debug!(
                query = %query.describe(),
                "Fetched Count / Remote Count / Query Increment: {} / {} / {}",
                nodes.len(),
                page.total_count,
                increment
            );
            if increment == 0 || received == 0 {
                return Ok(nodes);
            }
        }
    }
}
