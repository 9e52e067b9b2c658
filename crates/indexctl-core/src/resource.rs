//! Resource descriptors, desired states and existence probing.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ReconcileError, Result};
use crate::payload::DocumentPayload;

/// Mapping type used when the caller does not name one.
pub const DEFAULT_MAPPING_TYPE: &str = "_doc";

/// Characters the index service refuses in index names. Several of them
/// (`/`, `?`, `#`) would also change which URL a request reaches.
const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' '];

/// Check a value that becomes one URL path segment.
fn check_path_segment(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ReconcileError::configuration(format!("{what} must not be empty")));
    }
    if value == "." || value == ".." {
        return Err(ReconcileError::configuration(format!(
            "Invalid {what} \"{value}\""
        )));
    }
    if let Some(c) = value.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(ReconcileError::configuration(format!(
            "Invalid {what} \"{value}\": '{c}' is not allowed"
        )));
    }
    Ok(())
}

/// Validate an index name, either the reconciled one or a rename target.
pub fn validate_index_name(what: &str, name: &str) -> Result<()> {
    check_path_segment(what, name)?;
    if name.starts_with(['-', '_', '+']) {
        return Err(ReconcileError::configuration(format!(
            "Invalid {what} \"{name}\": must not start with '-', '_' or '+'"
        )));
    }
    Ok(())
}

/// Mapping types share the index name rules, except that `_doc` style
/// leading underscores are allowed.
pub fn validate_mapping_type(mapping_type: &str) -> Result<()> {
    check_path_segment("mapping type", mapping_type)
}

/// Kind of entity being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[serde(alias = "indice")]
    Index,
    Document,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index"),
            Self::Document => f.write_str("document"),
        }
    }
}

/// Identifies what is being reconciled. Immutable for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    base_url: String,
    kind: ResourceKind,
    name: String,
}

impl ResourceDescriptor {
    pub fn new(base_url: &str, kind: ResourceKind, name: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            ReconcileError::configuration(format!("Invalid service URL \"{base_url}\": {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ReconcileError::configuration(format!(
                "Service URL must use http or https, got \"{}\"",
                parsed.scheme()
            )));
        }
        validate_index_name("resource name", name)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            kind,
            name: name.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `GET`/`PUT`/`DELETE` target for the index itself.
    pub fn probe_url(&self) -> String {
        format!("{}/{}", self.base_url, self.name)
    }

    pub fn reindex_url(&self) -> String {
        format!("{}/_reindex", self.base_url)
    }

    /// Endpoint documents are posted to: `{base}/{index}/{mapping_type}/`.
    pub fn document_url(&self, mapping_type: &str) -> String {
        format!("{}/{}/{}/", self.base_url, self.name, mapping_type)
    }
}

/// What the caller wants the remote state to look like.
#[derive(Debug, Clone, PartialEq)]
pub enum DesiredState {
    Present,
    Absent,
    RenamedTo(String),
    DocumentAdded {
        payload: DocumentPayload,
        mapping_type: String,
    },
}

impl DesiredState {
    pub fn document(payload: DocumentPayload) -> Self {
        Self::DocumentAdded {
            payload,
            mapping_type: DEFAULT_MAPPING_TYPE.to_string(),
        }
    }

    pub fn is_compatible_with(&self, kind: ResourceKind) -> bool {
        match self {
            Self::Present | Self::Absent | Self::RenamedTo(_) => kind == ResourceKind::Index,
            Self::DocumentAdded { .. } => kind == ResourceKind::Document,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::RenamedTo(_) => "rename",
            Self::DocumentAdded { .. } => "document",
        }
    }
}

/// Classified response of an existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub status_code: u16,
    pub exists: bool,
}

impl ProbeResult {
    /// Only 200 and 404 are known states; anything else aborts the call.
    pub fn classify(status_code: u16, url: &str) -> Result<Self> {
        match status_code {
            200 => Ok(Self {
                status_code,
                exists: true,
            }),
            404 => Ok(Self {
                status_code,
                exists: false,
            }),
            other => Err(ReconcileError::service_unavailable(other, url)),
        }
    }
}
