pub mod client;
mod convert;
pub mod error;
pub mod models;
pub mod queries;
mod trait_impl;

#[cfg(test)]
mod client_tests;

pub use client::GitHubClient;
pub use error::{GitHubError, Result};
pub use models::*;

// Re-export labelsync-core types for convenience
pub use labelsync_core::{LabelRemote, SyncError};
