//! Diffing source labels against every target repository.
//!
//! Source label names may carry one directive marker:
//!
//! * delete: `_delete_foo` removes `foo` from every target
//! * rename: `old_rename_new` renames `old` to `new` where `new` is free
//! * partial: `_partial_area:` restyles every label containing `area:`
//!
//! Labels without a marker are synced by exact name. Markers are plain
//! substrings taken from configuration; an empty marker is disabled.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::error::{Result, SyncError};
use crate::models::*;

/// Substrings turning a source label into a directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveMarkers {
    pub delete: String,
    pub rename: String,
    pub partial: String,
}

impl Default for DirectiveMarkers {
    fn default() -> Self {
        Self {
            delete: "_delete_".to_string(),
            rename: "_rename_".to_string(),
            partial: "_partial_".to_string(),
        }
    }
}

/// What a source label asks the reconciler to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Sync by exact name
    Plain,
    Delete { target: String },
    Rename { from: &'a str, to: &'a str },
    Partial { fragment: String },
    /// Carries a marker but nothing usable around it
    Malformed,
}

fn has_marker(name: &str, marker: &str) -> bool {
    !marker.is_empty() && name.contains(marker)
}

impl DirectiveMarkers {
    /// True when `name` carries any enabled marker
    pub fn is_directive(&self, name: &str) -> bool {
        has_marker(name, &self.delete)
            || has_marker(name, &self.rename)
            || has_marker(name, &self.partial)
    }

    /// Interpret a source label name
    ///
    /// When several markers are present, delete wins over rename, which wins
    /// over partial.
    pub fn parse<'a>(&self, name: &'a str) -> Directive<'a> {
        let present = [&self.delete, &self.rename, &self.partial]
            .into_iter()
            .filter(|m| has_marker(name, m))
            .count();
        if present > 1 {
            warn!("Label: {} contains more than one directive marker", name);
        }

        if has_marker(name, &self.delete) {
            let target = name.replacen(&self.delete, "", 1);
            if target.is_empty() {
                return Directive::Malformed;
            }
            return Directive::Delete { target };
        }
        if has_marker(name, &self.rename) {
            return match name.split_once(self.rename.as_str()) {
                Some((from, to))
                    if !from.is_empty() && !to.is_empty() && !to.contains(self.rename.as_str()) =>
                {
                    Directive::Rename { from, to }
                }
                _ => Directive::Malformed,
            };
        }
        if has_marker(name, &self.partial) {
            let fragment = name.replacen(&self.partial, "", 1);
            if fragment.is_empty() {
                return Directive::Malformed;
            }
            return Directive::Partial { fragment };
        }
        Directive::Plain
    }
}

/// Everything the matching rules depend on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Name of the repository holding the reference labels
    pub source_repository: String,
    pub markers: DirectiveMarkers,
}

/// The three action sets of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub to_create: ActionSet,
    pub to_update: ActionSet,
    pub to_delete: ActionSet,
}

/// Split fetched labels into (source labels, target labels)
pub fn partition_source_labels(labels: Vec<Label>, source_repository: &str) -> (Vec<Label>, Vec<Label>) {
    labels
        .into_iter()
        .partition(|l| l.repository.name == source_repository)
}

/// Target labels grouped by repository name
struct LabelIndex<'a> {
    by_repo: HashMap<&'a str, Vec<&'a Label>>,
}

impl<'a> LabelIndex<'a> {
    fn new(labels: &'a [Label], source_repository: &str) -> Self {
        let mut by_repo: HashMap<&'a str, Vec<&'a Label>> = HashMap::new();
        for label in labels
            .iter()
            .filter(|l| l.repository.name != source_repository)
        {
            by_repo
                .entry(label.repository.name.as_str())
                .or_default()
                .push(label);
        }
        Self { by_repo }
    }

    fn in_repo(&self, repository: &str) -> &[&'a Label] {
        self.by_repo.get(repository).map(Vec::as_slice).unwrap_or(&[])
    }

    fn find(&self, repository: &str, name: &str) -> Option<&'a Label> {
        self.in_repo(repository).iter().copied().find(|l| l.name == name)
    }
}

fn same_description(a: &Option<String>, b: &Option<String>) -> bool {
    a.as_deref().unwrap_or("") == b.as_deref().unwrap_or("")
}

/// Field-diff gate: merge the new values into `existing` if anything changes
///
/// Unchanged fields keep the target's value; `None` means nothing to update.
pub fn diff_label(
    existing: &Label,
    name: &str,
    color: &str,
    description: &Option<String>,
) -> Option<PlannedLabel> {
    let mut label = existing.clone();
    let mut changed = Vec::new();

    if existing.name != name {
        label.name = name.to_string();
        changed.push(LabelField::Name);
    }
    if !same_description(&existing.description, description) {
        label.description = description.clone();
        changed.push(LabelField::Description);
    }
    if !existing.color.eq_ignore_ascii_case(color) {
        label.color = color.to_string();
        changed.push(LabelField::Color);
    }

    if changed.is_empty() {
        return None;
    }
    let fields: Vec<String> = changed.iter().map(ToString::to_string).collect();
    info!(
        "Label: {} will be updated in repository: {} - Fields to be updated: {}",
        label.name,
        label.repository.name,
        fields.join(",")
    );
    Some(PlannedLabel {
        label,
        changed_fields: changed,
    })
}

/// Computes create, update and delete sets from a fixed snapshot
///
/// All methods are pure functions of the configuration and their inputs.
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    fn targets<'r>(&self, repositories: &'r [Repository]) -> impl Iterator<Item = &'r Repository> + 'r {
        let source = self.config.source_repository.clone();
        repositories.iter().filter(move |r| r.name != source)
    }

    /// Plain source labels missing from a target repository
    pub fn create_set(
        &self,
        source_labels: &[Label],
        target_labels: &[Label],
        repositories: &[Repository],
    ) -> ActionSet {
        let index = LabelIndex::new(target_labels, &self.config.source_repository);
        let mut planned = Vec::new();

        for label in source_labels
            .iter()
            .filter(|l| !self.config.markers.is_directive(&l.name))
        {
            for repo in self.targets(repositories) {
                if index.find(&repo.name, &label.name).is_none() {
                    info!(
                        "Label: {} will be created in repository: {}",
                        label.name, repo.name
                    );
                    planned.push(PlannedLabel::new(Label {
                        id: None,
                        repository: repo.clone(),
                        ..label.clone()
                    }));
                }
            }
        }
        ActionSet::new(ActionKind::Create, planned)
    }

    /// Existing target labels named by a delete directive
    pub fn delete_set(
        &self,
        source_labels: &[Label],
        target_labels: &[Label],
        repositories: &[Repository],
    ) -> ActionSet {
        let index = LabelIndex::new(target_labels, &self.config.source_repository);
        let mut planned = Vec::new();
        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();

        for label in source_labels {
            let Directive::Delete { target } = self.config.markers.parse(&label.name) else {
                continue;
            };
            for repo in self.targets(repositories) {
                let Some(existing) = index.find(&repo.name, &target) else {
                    continue;
                };
                // `_delete_foo` and `foo_delete_` both name `foo`
                if seen.insert((existing.repository.name.as_str(), existing.id.as_deref())) {
                    info!(
                        "Label: {} will be deleted from repository: {}",
                        target, repo.name
                    );
                    planned.push(PlannedLabel::new(existing.clone()));
                }
            }
        }
        ActionSet::new(ActionKind::Delete, planned)
    }

    /// Renames, partial restyles and plain syncs that change at least one field
    pub fn update_set(
        &self,
        source_labels: &[Label],
        target_labels: &[Label],
        repositories: &[Repository],
    ) -> ActionSet {
        let index = LabelIndex::new(target_labels, &self.config.source_repository);
        let mut planned = Vec::new();

        for label in source_labels {
            let directive = self.config.markers.parse(&label.name);
            match &directive {
                Directive::Delete { .. } => continue,
                Directive::Malformed => {
                    warn!("Skipping malformed directive label: {}", label.name);
                    continue;
                }
                _ => {}
            }
            for repo in self.targets(repositories) {
                match &directive {
                    Directive::Delete { .. } | Directive::Malformed => {}
                    Directive::Rename { from, to } => {
                        let existing_from = index.find(&repo.name, from);
                        let existing_to = index.find(&repo.name, to);
                        match (existing_from, existing_to) {
                            (Some(_), Some(_)) => {
                                warn!(
                                    "Unable to rename label: {} in repository: {} - Destination label: {} already exists and cannot be overwritten",
                                    from, repo.name, to
                                );
                            }
                            (Some(existing), None) => {
                                info!(
                                    "Label: {} in repository: {} will be renamed to: {}",
                                    from, repo.name, to
                                );
                                planned.extend(diff_label(
                                    existing,
                                    to,
                                    &label.color,
                                    &label.description,
                                ));
                            }
                            (None, _) => {}
                        }
                    }
                    Directive::Partial { fragment } => {
                        let needle = fragment.to_lowercase();
                        for existing in index
                            .in_repo(&repo.name)
                            .iter()
                            .filter(|l| l.name.to_lowercase().contains(&needle))
                        {
                            planned.extend(diff_label(
                                existing,
                                &existing.name,
                                &label.color,
                                &label.description,
                            ));
                        }
                    }
                    Directive::Plain => {
                        if let Some(existing) = index.find(&repo.name, &label.name) {
                            planned.extend(diff_label(
                                existing,
                                &label.name,
                                &label.color,
                                &label.description,
                            ));
                        }
                    }
                }
            }
        }
        ActionSet::new(ActionKind::Update, planned)
    }

    /// Compute all three sets and check they do not target the same label
    ///
    /// A rename whose destination is also planned for creation is dropped,
    /// the same way a rename onto an existing label is. A target label planned
    /// for both update and delete cannot be resolved without knowing which
    /// directive the user meant, so it is reported as a configuration error.
    pub fn plan(
        &self,
        source_labels: &[Label],
        target_labels: &[Label],
        repositories: &[Repository],
    ) -> Result<Plan> {
        let to_create = self.create_set(source_labels, target_labels, repositories);
        let to_update = self.update_set(source_labels, target_labels, repositories);
        let to_delete = self.delete_set(source_labels, target_labels, repositories);

        let created: HashSet<(&str, &str)> = to_create
            .labels
            .iter()
            .map(|p| (p.label.repository.name.as_str(), p.label.name.as_str()))
            .collect();
        let (renames_onto_created, updates): (Vec<PlannedLabel>, Vec<PlannedLabel>) =
            to_update.labels.into_iter().partition(|p| {
                p.changed_fields.contains(&LabelField::Name)
                    && created.contains(&(p.label.repository.name.as_str(), p.label.name.as_str()))
            });
        for dropped in &renames_onto_created {
            warn!(
                "Unable to rename label id: {} in repository: {} - Destination label: {} is planned for creation",
                dropped.label.id.as_deref().unwrap_or_default(),
                dropped.label.repository.name,
                dropped.label.name
            );
        }
        let to_update = ActionSet::new(ActionKind::Update, updates);

        let key = |l: &Label| (l.repository.name.clone(), l.id.clone());
        let mut update_counts: HashMap<(String, Option<String>), usize> = HashMap::new();
        for planned in &to_update.labels {
            *update_counts.entry(key(&planned.label)).or_default() += 1;
        }
        for planned in &to_update.labels {
            if update_counts.get(&key(&planned.label)).copied().unwrap_or(0) > 1 {
                warn!(
                    "Label: {} in repository: {} is updated by more than one source label, the last one wins",
                    planned.label.name, planned.label.repository.name
                );
            }
        }

        let mut conflicts: Vec<String> = to_delete
            .labels
            .iter()
            .filter(|d| update_counts.contains_key(&key(&d.label)))
            .map(|d| format!("{}/{}", d.label.repository.name, d.label.name))
            .collect();
        conflicts.sort();
        conflicts.dedup();
        if !conflicts.is_empty() {
            return Err(SyncError::ConflictingDirectives(conflicts));
        }

        Ok(Plan {
            to_create,
            to_update,
            to_delete,
        })
    }
}
