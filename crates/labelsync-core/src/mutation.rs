use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::models::*;
use crate::pagination::DEFAULT_REQUEST_DELAY;
use crate::rate_limit::RateLimitGovernor;
use crate::traits::{Clock, LabelRemote};

/// Mutations between two rate-limit probes
pub const DEFAULT_RATE_LIMIT_CHECK_INTERVAL: usize = 100;

/// Outcome of replaying one action set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReport {
    pub attempted: usize,
    pub applied: usize,
    pub failed: usize,
}

/// Build the mutation input for one planned label
///
/// Returns `None` when an update or delete targets a label without an id.
pub fn mutation_for(kind: ActionKind, label: &Label) -> Option<LabelMutation> {
    match kind {
        ActionKind::Create => Some(LabelMutation::Create {
            repository_id: label.repository.id.clone(),
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.clone(),
        }),
        ActionKind::Update => Some(LabelMutation::Update {
            label_id: label.id.clone()?,
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.clone(),
        }),
        ActionKind::Delete => Some(LabelMutation::Delete {
            label_id: label.id.clone()?,
        }),
    }
}

/// Replays an action set one mutation at a time
///
/// There is no retry: a failed mutation is logged and the driver moves on,
/// so a run may end partially applied.
pub struct MutationDriver<'a> {
    clock: &'a dyn Clock,
    governor: RateLimitGovernor,
    check_interval: usize,
    request_delay: Duration,
}

impl<'a> MutationDriver<'a> {
    pub fn new(clock: &'a dyn Clock, governor: RateLimitGovernor, check_interval: usize) -> Self {
        Self {
            clock,
            governor,
            check_interval: check_interval.max(1),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Apply every label of `actions`, probing the rate limit before the
    /// first item and then every `check_interval` items
    pub fn apply(
        &self,
        remote: &dyn LabelRemote,
        actions: &ActionSet,
        rate_limit: &mut RateLimit,
    ) -> MutationReport {
        let total = actions.len();
        let mut report = MutationReport::default();
        info!("Will trigger the mutation of {} nodes", total);

        for (position, planned) in actions.labels.iter().enumerate() {
            self.clock.sleep(self.request_delay);

            if position % self.check_interval == 0 {
                info!(
                    "Checking current status of the rate limit (once every {} mutations)",
                    self.check_interval
                );
                match remote.rate_limit() {
                    Ok(fresh) => *rate_limit = fresh,
                    Err(e) => warn!(error = %e, "Unable to probe the rate limit"),
                }
                self.governor.wait(rate_limit, self.clock);
            }

            let label = &planned.label;
            report.attempted += 1;
            let Some(mutation) = mutation_for(actions.kind, label) else {
                warn!(
                    "Label: {} in repository: {} has no id, skipping",
                    label.name, label.repository.name
                );
                report.failed += 1;
                continue;
            };

            match remote.mutate(&mutation) {
                Ok(()) => {
                    report.applied += 1;
                    info!(
                        "{}/{} - Repository: {} - Label: {} ...{}",
                        position + 1,
                        total,
                        label.repository.url,
                        label.name,
                        actions.kind
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        error = %e,
                        "{}/{} - Repository: {} - Label: {} ...failed",
                        position + 1,
                        total,
                        label.repository.url,
                        label.name
                    );
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{label, repo, FakeClock, FakeRemote};

    fn creates(count: usize) -> ActionSet {
        let r = repo("target");
        ActionSet::new(
            ActionKind::Create,
            (0..count)
                .map(|i| {
                    let mut l = label(&r, &format!("label-{:03}", i), "ededed", "");
                    l.id = None;
                    PlannedLabel::new(l)
                })
                .collect(),
        )
    }

    #[test]
    fn builds_kind_specific_inputs() {
        let r = repo("target");
        let l = label(&r, "bug", "d73a4a", "broken");

        assert_eq!(
            mutation_for(ActionKind::Create, &l),
            Some(LabelMutation::Create {
                repository_id: "R_target".to_string(),
                name: "bug".to_string(),
                color: "d73a4a".to_string(),
                description: Some("broken".to_string()),
            })
        );
        assert_eq!(
            mutation_for(ActionKind::Delete, &l),
            Some(LabelMutation::Delete {
                label_id: "LA_target_bug".to_string()
            })
        );
        let mut no_id = l.clone();
        no_id.id = None;
        assert_eq!(mutation_for(ActionKind::Update, &no_id), None);
    }

    #[test]
    fn applies_every_item_in_order() {
        let clock = FakeClock::new();
        let remote = FakeRemote::default();
        let actions = creates(3);
        let mut rate_limit = RateLimit::default();

        let report = MutationDriver::new(&clock, RateLimitGovernor::default(), 100)
            .apply(&remote, &actions, &mut rate_limit);

        assert_eq!(
            report,
            MutationReport {
                attempted: 3,
                applied: 3,
                failed: 0
            }
        );
        let names: Vec<String> = remote
            .mutations()
            .into_iter()
            .map(|m| match m {
                LabelMutation::Create { name, .. } => name,
                other => panic!("unexpected mutation {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["label-000", "label-001", "label-002"]);
    }

    #[test]
    fn probes_rate_limit_every_interval() {
        let clock = FakeClock::new();
        let remote = FakeRemote::default();
        let mut rate_limit = RateLimit::default();

        MutationDriver::new(&clock, RateLimitGovernor::default(), 2)
            .with_request_delay(Duration::ZERO)
            .apply(&remote, &creates(5), &mut rate_limit);

        // before items 0, 2 and 4
        assert_eq!(remote.rate_limit_probes(), 3);
    }

    #[test]
    fn failures_are_skipped_not_fatal() {
        let clock = FakeClock::new();
        let remote = FakeRemote {
            failing_labels: vec!["label-001".to_string()],
            ..FakeRemote::default()
        };
        let mut rate_limit = RateLimit::default();

        let report = MutationDriver::new(&clock, RateLimitGovernor::default(), 100)
            .apply(&remote, &creates(3), &mut rate_limit);

        assert_eq!(report.applied, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(remote.mutations().len(), 3);
    }

    #[test]
    fn waits_for_reset_when_probe_reports_exhaustion() {
        let clock = FakeClock::new();
        let remote = FakeRemote {
            rate_limit: RateLimit {
                remaining: 0,
                reset_at: Some(clock.now() + chrono::TimeDelta::seconds(20)),
                ..RateLimit::default()
            },
            ..FakeRemote::default()
        };
        let mut rate_limit = RateLimit::default();

        MutationDriver::new(&clock, RateLimitGovernor::default(), 100)
            .with_request_delay(Duration::ZERO)
            .apply(&remote, &creates(1), &mut rate_limit);

        assert_eq!(clock.sleeps(), vec![Duration::ZERO, Duration::from_secs(25)]);
        assert_eq!(rate_limit.remaining, 0);
    }

    #[test]
    fn empty_action_set_does_nothing() {
        let clock = FakeClock::new();
        let remote = FakeRemote::default();
        let mut rate_limit = RateLimit::default();

        let report = MutationDriver::new(&clock, RateLimitGovernor::default(), 100)
            .apply(&remote, &creates(0), &mut rate_limit);

        assert_eq!(report, MutationReport::default());
        assert_eq!(remote.rate_limit_probes(), 0);
    }
}
