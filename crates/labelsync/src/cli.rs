use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "labelsync",
    version,
    about = "Synchronize GitHub labels from a source repository across an organization"
)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to a TOML config file
    #[arg(long, env = "LABELSYNC_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitHub API base URL, e.g. https://ghe.example.com/api (overrides config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// GitHub token (overrides config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// GitHub organization login (overrides config file)
    #[arg(long, global = true)]
    pub org: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum ColorChoice {
    /// Colorize output if stdout is a terminal
    #[default]
    Auto,
    /// Always colorize output
    Always,
    /// Never colorize output
    Never,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OperatorArg {
    /// Repository must carry every topic
    And,
    /// Repository must carry at least one topic
    Or,
}

impl OperatorArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorArg::And => "AND",
            OperatorArg::Or => "OR",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Propagate the source repository labels to the selected repositories
    Sync(SyncArgs),
    /// Show the remaining GraphQL rate-limit budget of the token
    #[command(name = "rate-limit")]
    RateLimit,
    /// Inspect the resolved configuration
    #[command(visible_alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Repository holding the reference labels
    #[arg(long, short = 's', value_name = "NAME")]
    pub source_repository: Option<String>,

    /// Only sync repositories carrying these topics (comma-separated)
    #[arg(long, short = 't', value_delimiter = ',')]
    pub topics: Vec<String>,

    /// How topics combine
    #[arg(long, value_enum)]
    pub operator: Option<OperatorArg>,

    /// Also sync archived repositories
    #[arg(long)]
    pub include_archived: bool,

    /// Nodes requested per page (1-100)
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Directory receiving the NDJSON reports
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Plan and write reports without changing any label
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration (token redacted)
    Show,
    /// List the config file locations that are searched
    Path,
}
