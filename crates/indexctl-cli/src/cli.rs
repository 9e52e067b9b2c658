use clap::{Parser, Subcommand, ValueEnum};
use indexctl_core::ResourceKind;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "indexctl")]
#[command(about = "Converge search-index state to a desired state")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML). Defaults to ./indexctl.toml when present
    #[arg(short, long, global = true, env = "INDEXCTL_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the service and perform at most one write to reach the desired state
    Apply(ApplyArgs),
    /// Inspect the effective settings
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[value(alias = "indice")]
    #[serde(alias = "indice")]
    Index,
    Document,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Document => "document",
        }
    }
}

impl From<ResourceType> for ResourceKind {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Index => ResourceKind::Index,
            ResourceType::Document => ResourceKind::Document,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateName {
    #[default]
    Present,
    Absent,
    Rename,
}

impl StateName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Rename => "rename",
        }
    }
}

/// Flags for `apply`. Each one overrides the settings file and environment.
#[derive(clap::Args, Default)]
pub struct ApplyArgs {
    /// Service base URL with scheme and port (e.g. http://localhost:9200)
    #[arg(long)]
    pub url: Option<String>,
    /// Kind of entity to handle
    #[arg(short = 't', long = "type")]
    pub resource_type: Option<ResourceType>,
    /// Index name
    #[arg(short = 'n', long = "name")]
    pub resource_name: Option<String>,
    /// Desired state
    #[arg(short, long)]
    pub state: Option<StateName>,
    /// New index name (required for --state rename)
    #[arg(long = "rename-to")]
    pub rename_target: Option<String>,
    /// Mapping type path segment used when adding documents
    #[arg(long)]
    pub mapping_type: Option<String>,
    /// Document body as JSON or a literal mapping (e.g. "{'user': 'kimchy'}")
    #[arg(long, conflicts_with = "document_file")]
    pub document: Option<String>,
    /// Read the document body from a file ("-" for stdin)
    #[arg(long)]
    pub document_file: Option<String>,
    /// Report whether anything would change without modifying the service
    #[arg(long, visible_alias = "check")]
    pub dry_run: bool,
    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Username for HTTP Basic auth
    #[arg(short, long)]
    pub username: Option<String>,
    /// Password for HTTP Basic auth
    #[arg(long, env = "INDEXCTL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the settings resolved from file and environment
    Show,
}
