pub mod error;
pub mod models;
pub mod mutation;
pub mod pagination;
pub mod rate_limit;
pub mod reconcile;
pub mod selector;
pub mod sync;
pub mod traits;

#[cfg(test)]
mod testing;

pub use error::{Result, SyncError};
pub use models::*;
pub use mutation::{mutation_for, MutationDriver, MutationReport, DEFAULT_RATE_LIMIT_CHECK_INTERVAL};
pub use pagination::{calculate_increment, PaginatedFetcher, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_DELAY};
pub use rate_limit::{RateLimitGovernor, DEFAULT_MIN_TOKENS};
pub use reconcile::{DirectiveMarkers, Plan, ReconcileConfig, Reconciler};
pub use selector::{RepositoryFilter, TopicOperator};
pub use sync::{elapsed_prefix, LabelSync, SyncReport, SyncSettings};
pub use traits::{Clock, LabelRemote, SystemClock};
