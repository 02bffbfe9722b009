use crate::cli::SyncArgs;
use anyhow::{anyhow, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use labelsync_core::{
    DirectiveMarkers, ReconcileConfig, RepositoryFilter, SyncSettings, TopicOperator,
    DEFAULT_MIN_TOKENS, DEFAULT_PAGE_SIZE, DEFAULT_RATE_LIMIT_CHECK_INTERVAL,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OUTPUT_DIR: &str = "labelsync-artifacts";

/// Resolved configuration
///
/// Field names double as GitHub Actions input names, so `INPUT_SRC_REPOSITORY`
/// and friends map onto them unchanged.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub token: Option<String>,
    pub api_url: String,
    pub org: Option<String>,
    pub src_repository: Option<String>,
    /// Accepts a list or a comma-separated string
    #[serde(deserialize_with = "list_or_csv")]
    pub filter_topics: Vec<String>,
    pub filter_operator: String,
    pub ignore_archived: bool,
    pub tag_delete: String,
    pub tag_rename: String,
    pub tag_partial: String,
    pub max_query_nodes: usize,
    pub rate_limit_check: usize,
    pub min_tokens: u32,
    pub request_delay_ms: u64,
    pub output_dir: PathBuf,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        let markers = DirectiveMarkers::default();
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            org: None,
            src_repository: None,
            filter_topics: Vec::new(),
            filter_operator: TopicOperator::default().to_string(),
            ignore_archived: true,
            tag_delete: markers.delete,
            tag_rename: markers.rename,
            tag_partial: markers.partial,
            max_query_nodes: DEFAULT_PAGE_SIZE,
            rate_limit_check: DEFAULT_RATE_LIMIT_CHECK_INTERVAL,
            min_tokens: DEFAULT_MIN_TOKENS,
            request_delay_ms: 1000,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dry_run: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn list_or_csv<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        ListOrCsv::Csv(value) => split_csv(&value),
    })
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let explicit_path = config_path.as_deref();
        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
        }

        for path in config_paths(explicit_path) {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // LABELSYNC_* first, then the INPUT_* variables GitHub Actions sets
        figment = figment
            .merge(Env::prefixed("LABELSYNC_").ignore(&["config"]))
            .merge(Env::prefixed("INPUT_").map(|key| match key.as_str() {
                "github_token" => "token".into(),
                _ => key.into(),
            }));

        figment
            .extract()
            .map_err(|e| anyhow!("Failed to load config: {}", e))
    }

    pub fn merge_with_cli(
        &mut self,
        api_url: Option<String>,
        token: Option<String>,
        org: Option<String>,
    ) {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(token) = token {
            self.token = Some(token);
        }
        if let Some(org) = org {
            self.org = Some(org);
        }
    }

    pub fn merge_sync_args(&mut self, args: &SyncArgs) {
        if let Some(source) = &args.source_repository {
            self.src_repository = Some(source.clone());
        }
        if !args.topics.is_empty() {
            self.filter_topics = args
                .topics
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(operator) = args.operator {
            self.filter_operator = operator.as_str().to_string();
        }
        if args.include_archived {
            self.ignore_archived = false;
        }
        if let Some(size) = args.page_size {
            self.max_query_nodes = size;
        }
        if let Some(dir) = &args.output_dir {
            self.output_dir = dir.clone();
        }
        if args.dry_run {
            self.dry_run = true;
        }
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().filter(|t| !t.is_empty()).ok_or_else(|| {
            anyhow!(
                "GitHub token not configured. Set via --token, LABELSYNC_TOKEN env var, or config file"
            )
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.require_token()?;
        if self.org.as_deref().is_none_or(str::is_empty) {
            return Err(anyhow!(
                "Organization not configured. Set via --org, LABELSYNC_ORG env var, or config file"
            ));
        }
        if self.src_repository.as_deref().is_none_or(str::is_empty) {
            return Err(anyhow!(
                "Source repository not configured. Set via --source-repository, LABELSYNC_SRC_REPOSITORY env var, or config file"
            ));
        }
        if !(1..=100).contains(&self.max_query_nodes) {
            return Err(anyhow!(
                "max_query_nodes must be between 1 and 100, got {}",
                self.max_query_nodes
            ));
        }
        if self.rate_limit_check == 0 {
            return Err(anyhow!("rate_limit_check must be at least 1"));
        }
        self.filter_operator.parse::<TopicOperator>()?;
        Ok(())
    }

    /// Settings for one sync run; call [`Config::validate`] first
    pub fn sync_settings(&self) -> Result<SyncSettings> {
        self.validate()?;
        let org = self.org.clone().unwrap_or_default();
        let mut settings = SyncSettings::new(
            &org,
            ReconcileConfig {
                source_repository: self.src_repository.clone().unwrap_or_default(),
                markers: DirectiveMarkers {
                    delete: self.tag_delete.clone(),
                    rename: self.tag_rename.clone(),
                    partial: self.tag_partial.clone(),
                },
            },
        );
        settings.filter = RepositoryFilter {
            topics: self.filter_topics.clone(),
            operator: self.filter_operator.parse()?,
            ignore_archived: self.ignore_archived,
        };
        settings.page_size = self.max_query_nodes;
        settings.rate_limit_check_interval = self.rate_limit_check;
        settings.min_tokens = self.min_tokens;
        settings.request_delay = Duration::from_millis(self.request_delay_ms);
        settings.dry_run = self.dry_run;
        Ok(settings)
    }

    /// Copy with the token masked, for display
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| "********".to_string()),
            api_url: self.api_url.clone(),
            org: self.org.clone(),
            src_repository: self.src_repository.clone(),
            filter_topics: self.filter_topics.clone(),
            filter_operator: self.filter_operator.clone(),
            tag_delete: self.tag_delete.clone(),
            tag_rename: self.tag_rename.clone(),
            tag_partial: self.tag_partial.clone(),
            output_dir: self.output_dir.clone(),
            ..*self
        }
    }
}

pub fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
        return paths;
    }

    if let Some(path) = get_project_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_xdg_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_local_config_path() {
        push_unique(&mut paths, path);
    }

    paths
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn get_project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "labelsync").map(|d| d.config_dir().join("config.toml"))
}

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("labelsync").join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("labelsync")
            .join("config.toml")
    })
}

fn get_local_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join("labelsync.toml"))
}
