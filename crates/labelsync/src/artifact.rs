//! NDJSON reports written after every run

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use labelsync_core::{sort_by_name, ActionSet, SyncReport};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const ALL_LABELS_FILE: &str = "all-labels-all-repos.ndjson";
pub const CREATE_FILE: &str = "labelsToCreate.ndjson";
pub const UPDATE_FILE: &str = "labelsToUpdate.ndjson";
pub const DELETE_FILE: &str = "labelsToDelete.ndjson";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Record<'a, T: Serialize> {
    #[serde(flatten)]
    item: &'a T,
    fetched_at: &'a str,
}

/// Write one JSON record per line, truncating `path`
pub fn write_ndjson<T: Serialize>(path: &Path, items: &[T], fetched_at: DateTime<Utc>) -> Result<()> {
    let fetched_at = fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let file = File::create(path).with_context(|| format!("Unable to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        let record = Record {
            item,
            fetched_at: &fetched_at,
        };
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn write_action_set(dir: &Path, file: &str, set: &ActionSet, fetched_at: DateTime<Utc>) -> Result<PathBuf> {
    let path = dir.join(file);
    write_ndjson(&path, &set.labels, fetched_at)?;
    Ok(path)
}

/// Persist the four collections of a run into `dir`
pub fn write_report(dir: &Path, report: &SyncReport, fetched_at: DateTime<Utc>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Unable to create {}", dir.display()))?;

    let mut all_labels = report.all_labels.clone();
    sort_by_name(&mut all_labels);
    let all_path = dir.join(ALL_LABELS_FILE);
    write_ndjson(&all_path, &all_labels, fetched_at)?;

    Ok(vec![
        all_path,
        write_action_set(dir, CREATE_FILE, &report.to_create, fetched_at)?,
        write_action_set(dir, UPDATE_FILE, &report.to_update, fetched_at)?,
        write_action_set(dir, DELETE_FILE, &report.to_delete, fetched_at)?,
    ])
}
