//! Desired-state reconciliation for search-index services.
//!
//! Given a target index (or a document to place in one) and a desired state,
//! [`Reconciler`] probes the service over HTTP and performs at most one write
//! to converge, reporting whether anything changed.
//!
//! ```ignore
//! use indexctl_core::{ClientOptions, DesiredState, IndexClient, Reconciler, ResourceDescriptor, ResourceKind};
//!
//! let client = IndexClient::new(ClientOptions::default())?;
//! let reconciler = Reconciler::new(client).with_dry_run(false);
//! let target = ResourceDescriptor::new("http://localhost:9200", ResourceKind::Index, "logs-2024")?;
//! let outcome = reconciler.reconcile(&target, &DesiredState::Present).await?;
//! println!("changed: {}", outcome.changed);
//! ```

pub mod client;
pub mod error;
pub mod literal;
pub mod outcome;
pub mod payload;
pub mod reconciler;
pub mod resource;

pub use client::{BasicAuth, ClientOptions, HttpReply, IndexClient};
pub use error::{ErrorCategory, ReconcileError, Result};
pub use outcome::{Outcome, Output};
pub use payload::DocumentPayload;
pub use reconciler::Reconciler;
pub use resource::{
    DEFAULT_MAPPING_TYPE, DesiredState, ProbeResult, ResourceDescriptor, ResourceKind,
    validate_index_name, validate_mapping_type,
};
