use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::models::*;
use crate::mutation::{MutationDriver, MutationReport, DEFAULT_RATE_LIMIT_CHECK_INTERVAL};
use crate::pagination::{
    OrganizationRepositories, PaginatedFetcher, RepositoryLabels, DEFAULT_PAGE_SIZE,
    DEFAULT_REQUEST_DELAY,
};
use crate::rate_limit::{RateLimitGovernor, DEFAULT_MIN_TOKENS};
use crate::reconcile::{partition_source_labels, Plan, ReconcileConfig, Reconciler};
use crate::selector::{ensure_source_repository, select_repositories, RepositoryFilter};
use crate::traits::{Clock, LabelRemote};

/// Inputs of one sync run
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub organization: String,
    pub filter: RepositoryFilter,
    pub reconcile: ReconcileConfig,
    pub page_size: usize,
    pub rate_limit_check_interval: usize,
    /// Remaining points below which the run waits for the reset
    pub min_tokens: u32,
    /// Pause before every remote read and mutation
    pub request_delay: Duration,
    /// Plan and report without mutating anything
    pub dry_run: bool,
}

impl SyncSettings {
    pub fn new(organization: &str, reconcile: ReconcileConfig) -> Self {
        Self {
            organization: organization.to_string(),
            filter: RepositoryFilter {
                ignore_archived: true,
                ..RepositoryFilter::default()
            },
            reconcile,
            page_size: DEFAULT_PAGE_SIZE,
            rate_limit_check_interval: DEFAULT_RATE_LIMIT_CHECK_INTERVAL,
            min_tokens: DEFAULT_MIN_TOKENS,
            request_delay: DEFAULT_REQUEST_DELAY,
            dry_run: false,
        }
    }
}

/// Everything a run produced, handed to persistence and output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub organization: String,
    pub repositories_total: usize,
    pub repositories_selected: usize,
    /// Labels of every selected repository except the source
    #[serde(skip)]
    pub all_labels: Vec<Label>,
    #[serde(skip)]
    pub to_create: ActionSet,
    #[serde(skip)]
    pub to_update: ActionSet,
    #[serde(skip)]
    pub to_delete: ActionSet,
    pub created: MutationReport,
    pub updated: MutationReport,
    pub deleted: MutationReport,
    pub dry_run: bool,
    pub rate_limit: RateLimit,
}

impl SyncReport {
    fn empty(organization: &str, dry_run: bool, rate_limit: RateLimit) -> Self {
        Self {
            organization: organization.to_string(),
            repositories_total: 0,
            repositories_selected: 0,
            all_labels: Vec::new(),
            to_create: ActionSet::new(ActionKind::Create, Vec::new()),
            to_update: ActionSet::new(ActionKind::Update, Vec::new()),
            to_delete: ActionSet::new(ActionKind::Delete, Vec::new()),
            created: MutationReport::default(),
            updated: MutationReport::default(),
            deleted: MutationReport::default(),
            dry_run,
            rate_limit,
        }
    }
}

/// `[+HH:MM:SS]` since `start`, prefixed to every stage of a run
pub fn elapsed_prefix(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - start).num_seconds().max(0);
    format!(
        "[+{:02}:{:02}:{:02}]",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Runs the whole pipeline: select, fetch, reconcile, mutate
pub struct LabelSync<'a> {
    remote: &'a dyn LabelRemote,
    clock: &'a dyn Clock,
    settings: SyncSettings,
    governor: RateLimitGovernor,
}

impl<'a> LabelSync<'a> {
    pub fn new(remote: &'a dyn LabelRemote, clock: &'a dyn Clock, settings: SyncSettings) -> Self {
        Self {
            remote,
            clock,
            governor: RateLimitGovernor::new(settings.min_tokens),
            settings,
        }
    }

    fn stage(&self, start: DateTime<Utc>, message: &str) {
        info!("{} {}", elapsed_prefix(start, self.clock.now()), message);
    }

    fn fetcher(&self) -> PaginatedFetcher<'a> {
        PaginatedFetcher::new(self.clock, self.governor, self.settings.page_size)
            .with_request_delay(self.settings.request_delay)
    }

    fn driver(&self) -> MutationDriver<'a> {
        MutationDriver::new(
            self.clock,
            self.governor,
            self.settings.rate_limit_check_interval,
        )
        .with_request_delay(self.settings.request_delay)
    }

    pub fn run(&self) -> Result<SyncReport> {
        let start = self.clock.now();
        let settings = &self.settings;
        let source = settings.reconcile.source_repository.as_str();
        info!("Started job at: {}", start.to_rfc2822());

        let mut rate_limit = self.remote.rate_limit()?;
        self.governor.wait(&rate_limit, self.clock);

        self.stage(start, &format!("Verifying org: {}", settings.organization));
        let lookup = self.remote.find_organization(&settings.organization)?;
        if let Some(fresh) = lookup.rate_limit {
            rate_limit = fresh;
        }
        let organization = lookup
            .value
            .ok_or_else(|| SyncError::OrganizationNotFound(settings.organization.clone()))?;
        info!(
            "Organization found: {}, with ID: {}",
            organization.login, organization.id
        );

        self.stage(start, "Initial fetch of all repositories");
        let fetcher = self.fetcher();
        let repositories = fetcher.fetch(
            &OrganizationRepositories {
                remote: self.remote,
                organization: &organization,
            },
            &mut rate_limit,
        )?;
        info!(
            "GitHub Org: {} contains a total of {} repositories",
            organization.login,
            repositories.len()
        );

        let mut selected = select_repositories(&repositories, &settings.filter);
        if selected.is_empty() {
            warn!("No repositories found based on the filter criteria");
            let mut report = SyncReport::empty(&organization.login, settings.dry_run, rate_limit);
            report.repositories_total = repositories.len();
            return Ok(report);
        }
        info!(
            "After filtering, labels will be collected for {} repositories",
            selected.len()
        );
        ensure_source_repository(&repositories, &mut selected, source, &organization.login)?;

        self.stage(
            start,
            &format!(
                "Fetching ALL labels from ALL {} repositories (filters + source repository)",
                selected.len()
            ),
        );
        let mut fetched = Vec::new();
        for repository in &selected {
            info!("Processing repository: {}", repository.name);
            fetched.extend(fetcher.fetch(
                &RepositoryLabels {
                    remote: self.remote,
                    repository,
                },
                &mut rate_limit,
            )?);
        }
        info!(
            "Fetched a total of {} labels across {} repositories",
            fetched.len(),
            selected.len()
        );

        let (source_labels, target_labels) = partition_source_labels(fetched, source);
        self.stage(start, "Preparing the list of labels to CREATE, UPDATE and DELETE");
        let Plan {
            to_create,
            to_update,
            to_delete,
        } = Reconciler::new(settings.reconcile.clone()).plan(
            &source_labels,
            &target_labels,
            &selected,
        )?;

        let mut report = SyncReport::empty(&organization.login, settings.dry_run, rate_limit);
        report.repositories_total = repositories.len();
        report.repositories_selected = selected.len();

        if settings.dry_run {
            info!(
                "Dry run: {} to create, {} to update, {} to delete, nothing will be changed",
                to_create.len(),
                to_update.len(),
                to_delete.len()
            );
        } else {
            let driver = self.driver();
            let mut rate_limit = report.rate_limit.clone();
            for (set, outcome, verb) in [
                (&to_create, &mut report.created, "Creating"),
                (&to_update, &mut report.updated, "Updating"),
                (&to_delete, &mut report.deleted, "Deleting"),
            ] {
                self.stage(start, &format!("{} labels", verb));
                info!("Will be {} a total of {} labels", verb.to_lowercase(), set.len());
                *outcome = driver.apply(self.remote, set, &mut rate_limit);
            }
            report.rate_limit = rate_limit;
        }

        self.stage(start, "Labels reconciliation complete");
        report.all_labels = target_labels;
        report.to_create = to_create;
        report.to_update = to_update;
        report.to_delete = to_delete;
        Ok(report)
    }
}
