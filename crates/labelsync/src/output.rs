use crate::cli::{ColorChoice, OutputFormat};
use crate::config::Config;
use colored::Colorize;
use labelsync_core::{MutationReport, RateLimit, SyncReport};
use serde::Serialize;
use std::io::IsTerminal;

/// Initialize color mode based on CLI choice and environment
pub fn init_color(choice: ColorChoice) {
    let should_color = match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        // Respect NO_COLOR (https://no-color.org/), then require a terminal
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    };
    colored::control::set_override(should_color);
}

pub fn output_result<T: Serialize + Displayable>(result: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            println!("{}", result.display());
        }
    }
}

#[derive(Serialize)]
pub struct JsonError {
    pub error: bool,
    pub code: String,
    pub message: String,
}

/// Short machine-readable code for a top-level error
fn error_code(err: &anyhow::Error) -> &'static str {
    use labelsync_core::SyncError;
    match err.downcast_ref::<SyncError>() {
        Some(SyncError::Unauthorized) => "unauthorized",
        Some(SyncError::OrganizationNotFound(_)) => "organization_not_found",
        Some(SyncError::SourceRepositoryNotFound { .. }) => "source_repository_not_found",
        Some(SyncError::FetchExhausted { .. }) => "fetch_exhausted",
        Some(SyncError::ConflictingDirectives(_)) => "conflicting_directives",
        Some(_) => "sync_error",
        None => "error",
    }
}

pub fn output_error(err: &anyhow::Error, format: OutputFormat) {
    let message = match format {
        OutputFormat::Json => {
            let json_err = JsonError {
                error: true,
                code: error_code(err).to_string(),
                message: format!("{:#}", err),
            };
            serde_json::to_string_pretty(&json_err).unwrap_or_else(|_| {
                format!(r#"{{"error": true, "message": "{}"}}"#, err)
            })
        }
        OutputFormat::Text => format!("{}: {:#}", "Error".red().bold(), err),
    };
    eprintln!("{}", message);
}

pub trait Displayable {
    fn display(&self) -> String;
}

fn mutation_line(verb: &str, planned: usize, report: &MutationReport, dry_run: bool) -> String {
    let head = format!("  {:<8}{:>5} planned", verb.dimmed(), planned);
    if dry_run {
        return head;
    }
    let failed = if report.failed > 0 {
        format!("{} failed", report.failed).red().to_string()
    } else {
        format!("{} failed", report.failed).dimmed().to_string()
    };
    format!("{}, {} applied, {}", head, report.applied.to_string().green(), failed)
}

impl Displayable for SyncReport {
    fn display(&self) -> String {
        let mut output = format!(
            "{} {}\n  {}: {} of {}\n  {}: {}",
            "Organization".dimmed(),
            self.organization.cyan().bold(),
            "Repositories".dimmed(),
            self.repositories_selected,
            self.repositories_total,
            "Labels fetched".dimmed(),
            self.all_labels.len()
        );
        output.push('\n');
        output.push_str(&mutation_line("Create", self.to_create.len(), &self.created, self.dry_run));
        output.push('\n');
        output.push_str(&mutation_line("Update", self.to_update.len(), &self.updated, self.dry_run));
        output.push('\n');
        output.push_str(&mutation_line("Delete", self.to_delete.len(), &self.deleted, self.dry_run));
        if self.dry_run {
            output.push_str(&format!("\n{}", "Dry run: no label was changed".yellow()));
        }
        output
    }
}

impl Displayable for RateLimit {
    fn display(&self) -> String {
        let remaining = if self.remaining < labelsync_core::DEFAULT_MIN_TOKENS {
            self.remaining.to_string().red().bold()
        } else {
            self.remaining.to_string().green()
        };
        format!(
            "{}: {} of {}\n  {}: {}",
            "Remaining".dimmed(),
            remaining,
            self.limit,
            "Resets at".dimmed(),
            self.reset_at
                .map(|r| r.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string())
        )
    }
}

impl Displayable for Config {
    fn display(&self) -> String {
        let unset = || "(not set)".dimmed().to_string();
        let topics = if self.filter_topics.is_empty() {
            unset()
        } else {
            self.filter_topics.join(", ")
        };
        let rows = [
            ("api_url", self.api_url.clone()),
            ("token", self.token.clone().unwrap_or_else(unset)),
            ("org", self.org.clone().unwrap_or_else(unset)),
            ("src_repository", self.src_repository.clone().unwrap_or_else(unset)),
            ("filter_topics", topics),
            ("filter_operator", self.filter_operator.clone()),
            ("ignore_archived", self.ignore_archived.to_string()),
            ("tag_delete", self.tag_delete.clone()),
            ("tag_rename", self.tag_rename.clone()),
            ("tag_partial", self.tag_partial.clone()),
            ("max_query_nodes", self.max_query_nodes.to_string()),
            ("rate_limit_check", self.rate_limit_check.to_string()),
            ("min_tokens", self.min_tokens.to_string()),
            ("request_delay_ms", self.request_delay_ms.to_string()),
            ("output_dir", self.output_dir.display().to_string()),
            ("dry_run", self.dry_run.to_string()),
        ];
        rows.iter()
            .map(|(key, value)| format!("{:<18} {}", format!("{}:", key).dimmed(), value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelsync_core::SyncError;

    #[test]
    fn error_codes_follow_sync_errors() {
        let err = anyhow::Error::new(SyncError::OrganizationNotFound("acme".to_string()));
        assert_eq!(error_code(&err), "organization_not_found");
        assert_eq!(error_code(&anyhow::anyhow!("plain")), "error");
    }

    #[test]
    fn dry_run_summary_omits_outcomes() {
        colored::control::set_override(false);
        let line = mutation_line("Create", 3, &MutationReport::default(), true);
        assert!(line.contains("3 planned"));
        assert!(!line.contains("applied"));
    }

    #[test]
    fn rate_limit_summary() {
        colored::control::set_override(false);
        let text = RateLimit::default().display();
        assert!(text.contains("5000 of 5000"));
        assert!(text.contains("unknown"));
    }
}
