use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use indexctl_core::{
    BasicAuth, ClientOptions, DEFAULT_MAPPING_TYPE, DesiredState, DocumentPayload,
    ResourceDescriptor, validate_index_name, validate_mapping_type,
};
use serde::{Deserialize, Serialize};

use crate::cli::{ApplyArgs, ResourceType, StateName};

const DEFAULT_CONFIG_FILE: &str = "indexctl.toml";
const ENV_PREFIX: &str = "INDEXCTL";

/// Effective settings after merging file, environment and flags.
///
/// Aliases accept the option names used by older playbooks
/// (`type`, `indice_name`, `rename`, `state`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub url: Option<String>,
    #[serde(alias = "type")]
    pub resource_type: Option<ResourceType>,
    #[serde(alias = "indice_name", alias = "name")]
    pub resource_name: Option<String>,
    #[serde(default = "default_mapping_type")]
    pub mapping_type: String,
    #[serde(alias = "rename")]
    pub rename_target: Option<String>,
    pub document: Option<DocumentPayload>,
    #[serde(default, alias = "state")]
    pub desired_state: StateName,
    #[serde(default, alias = "check_mode")]
    pub dry_run: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_mapping_type() -> String {
    DEFAULT_MAPPING_TYPE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// One fully validated reconciliation request.
#[derive(Debug)]
pub struct Task {
    pub target: ResourceDescriptor,
    pub desired: DesiredState,
    pub dry_run: bool,
    pub client: ClientOptions,
}

impl Settings {
    pub fn into_task(self) -> Result<Task> {
        let url = self.url.context("`url` is required")?;
        let resource_type = self.resource_type.context("`resource_type` is required")?;
        let name = self
            .resource_name
            .context("`resource_name` is required")?;

        let desired = match (resource_type, self.desired_state) {
            (ResourceType::Index, StateName::Present) => DesiredState::Present,
            (ResourceType::Index, StateName::Absent) => DesiredState::Absent,
            (ResourceType::Index, StateName::Rename) => {
                let new_name = self
                    .rename_target
                    .context("`rename_target` is required when desired_state is rename")?;
                validate_index_name("`rename_target`", &new_name)?;
                DesiredState::RenamedTo(new_name)
            }
            (ResourceType::Document, StateName::Present) => {
                validate_mapping_type(&self.mapping_type)?;
                DesiredState::DocumentAdded {
                    payload: self
                        .document
                        .context("`document` is required when resource_type is document")?,
                    mapping_type: self.mapping_type,
                }
            }
            (ResourceType::Document, other) => anyhow::bail!(
                "desired_state `{}` is not supported for documents; only `present` is",
                other.as_str()
            ),
        };

        if self.timeout_secs == 0 {
            anyhow::bail!("`timeout_secs` must be greater than zero");
        }
        let auth = match (self.username, self.password) {
            (Some(username), password) => Some(BasicAuth { username, password }),
            (None, Some(_)) => anyhow::bail!("`password` is set but `username` is missing"),
            (None, None) => None,
        };

        let target = ResourceDescriptor::new(&url, resource_type.into(), &name)?;
        Ok(Task {
            target,
            desired,
            dry_run: self.dry_run,
            client: ClientOptions {
                timeout: Duration::from_secs(self.timeout_secs),
                auth,
            },
        })
    }
}

/// Merge settings: file, then `INDEXCTL__*` environment, then flags.
pub fn load_settings(path: Option<&str>, flags: Option<&ApplyArgs>) -> Result<Settings> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            builder = builder.add_source(File::from(PathBuf::from(p)).required(true));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path));
            }
        }
    }
    // Environment variable overrides, e.g. INDEXCTL__URL=http://localhost:9200
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .separator("__"),
    );

    if let Some(flags) = flags {
        let document = match &flags.document_file {
            Some(file) => Some(read_document(file)?),
            None => flags.document.clone(),
        };
        builder = builder
            .set_override_option("url", flags.url.clone())?
            .set_override_option("resource_type", flags.resource_type.map(ResourceType::as_str))?
            .set_override_option("resource_name", flags.resource_name.clone())?
            .set_override_option("desired_state", flags.state.map(StateName::as_str))?
            .set_override_option("rename_target", flags.rename_target.clone())?
            .set_override_option("mapping_type", flags.mapping_type.clone())?
            .set_override_option("document", document)?
            .set_override_option("dry_run", flags.dry_run.then_some(true))?
            .set_override_option("timeout_secs", flags.timeout_secs)?
            .set_override_option("username", flags.username.clone())?
            .set_override_option("password", flags.password.clone())?;
    }

    let cfg = builder.build().context("Failed to load settings")?;
    cfg.try_deserialize().context("Invalid settings")
}

fn read_document(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read document from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("Failed to read document file: {file}"))
}
