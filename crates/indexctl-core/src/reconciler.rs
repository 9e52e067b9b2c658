//! Probe-then-write convergence of index service state.
//!
//! Every operation issues exactly one existence probe (`GET`) and at most one
//! write (`PUT`, `POST` or `DELETE`). In dry-run mode the write is never
//! issued; the returned `changed` flag still reports whether it would have
//! been.

use serde_json::{Value, json};

use crate::client::IndexClient;
use crate::error::{ReconcileError, Result};
use crate::outcome::{Outcome, Output};
use crate::payload::DocumentPayload;
use crate::resource::{
    DesiredState, ProbeResult, ResourceDescriptor, validate_index_name, validate_mapping_type,
};

pub struct Reconciler {
    client: IndexClient,
    dry_run: bool,
}

impl Reconciler {
    pub fn new(client: IndexClient) -> Self {
        Self {
            client,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Converge `target` towards `desired`.
    pub async fn reconcile(
        &self,
        target: &ResourceDescriptor,
        desired: &DesiredState,
    ) -> Result<Outcome> {
        if !desired.is_compatible_with(target.kind()) {
            return Err(ReconcileError::configuration(format!(
                "desired state '{}' does not apply to resource type '{}'",
                desired.label(),
                target.kind()
            )));
        }

        match desired {
            DesiredState::Present => self.ensure_present(target).await,
            DesiredState::Absent => self.ensure_absent(target).await,
            DesiredState::RenamedTo(new_name) => self.ensure_renamed(target, new_name).await,
            DesiredState::DocumentAdded {
                payload,
                mapping_type,
            } => self.ensure_document(target, payload, mapping_type).await,
        }
    }

    async fn probe(&self, url: &str) -> Result<ProbeResult> {
        let status = self.client.probe(url).await?;
        ProbeResult::classify(status, url)
    }

    pub async fn ensure_present(&self, target: &ResourceDescriptor) -> Result<Outcome> {
        let url = target.probe_url();
        let name = target.name();
        let probe = self.probe(&url).await?;

        if probe.exists {
            return Ok(Outcome::unchanged(
                Output::new(probe.status_code).with_message(format!("Index '{name}' already exists.")),
            ));
        }
        if self.dry_run {
            tracing::info!(index = name, "index would be created");
            return Ok(Outcome::changed(
                Output::new(probe.status_code).with_message(format!("Index '{name}' would be created.")),
            ));
        }

        let reply = self.client.put(&url).await?;
        if !reply.is_success() {
            return Err(ReconcileError::write_failed(reply.status, url, reply.body));
        }
        tracing::info!(index = name, status = reply.status, "index created");
        Ok(Outcome::changed(
            Output::new(reply.status).with_message(format!("Index '{name}' has been created.")),
        ))
    }

    pub async fn ensure_absent(&self, target: &ResourceDescriptor) -> Result<Outcome> {
        let url = target.probe_url();
        let name = target.name();
        let probe = self.probe(&url).await?;

        if !probe.exists {
            return Ok(Outcome::unchanged(
                Output::new(probe.status_code).with_message(format!("Index '{name}' is already absent.")),
            ));
        }
        if self.dry_run {
            tracing::info!(index = name, "index would be deleted");
            return Ok(Outcome::changed(
                Output::new(probe.status_code).with_message(format!("Index '{name}' would be deleted.")),
            ));
        }

        let reply = self.client.delete(&url).await?;
        if !reply.is_success() {
            return Err(ReconcileError::write_failed(reply.status, url, reply.body));
        }
        tracing::info!(index = name, status = reply.status, "index deleted");
        Ok(Outcome::changed(
            Output::new(reply.status).with_message(format!("Index '{name}' has been deleted.")),
        ))
    }

    /// Copy the source index into `new_name` through the reindex API.
    ///
    /// A missing source is a no-op: there is nothing to rename.
    pub async fn ensure_renamed(
        &self,
        target: &ResourceDescriptor,
        new_name: &str,
    ) -> Result<Outcome> {
        let name = target.name();
        validate_index_name("rename target", new_name)?;

        let probe = self.probe(&target.probe_url()).await?;
        if !probe.exists {
            return Ok(Outcome::unchanged(
                Output::new(probe.status_code)
                    .with_message(format!("Index '{name}' does not exist; nothing to rename.")),
            ));
        }
        if self.dry_run {
            tracing::info!(index = name, to = new_name, "index would be renamed");
            return Ok(Outcome::changed(Output::new(probe.status_code).with_message(
                format!("Index '{name}' would be renamed to '{new_name}'."),
            )));
        }

        let url = target.reindex_url();
        let reply = self
            .client
            .post_json(&url, &reindex_body(name, new_name))
            .await?;
        if !reply.is_success() {
            return Err(ReconcileError::write_failed(reply.status, url, reply.body));
        }
        tracing::info!(index = name, to = new_name, status = reply.status, "index renamed");
        Ok(Outcome::changed(Output::new(reply.status).with_message(
            format!("Index '{name}' has been renamed to '{new_name}'."),
        )))
    }

    /// Post one document into an existing index. Success is HTTP 201 only.
    pub async fn ensure_document(
        &self,
        target: &ResourceDescriptor,
        payload: &DocumentPayload,
        mapping_type: &str,
    ) -> Result<Outcome> {
        let name = target.name();
        validate_mapping_type(mapping_type)?;
        let document = payload.resolve()?;

        let check_url = target.probe_url();
        let probe = self.probe(&check_url).await?;
        if !probe.exists {
            return Err(ReconcileError::precondition_failed(
                probe.status_code,
                format!("Index '{name}' does not exist; cannot add document."),
                check_url,
            ));
        }

        if self.dry_run {
            tracing::info!(index = name, "document would be added");
            return Ok(Outcome::changed(
                Output::new(probe.status_code)
                    .with_message(format!("Document would be added to index '{name}'.")),
            ));
        }

        let url = target.document_url(mapping_type);
        let reply = self.client.post_json(&url, &document).await?;
        if reply.status != 201 {
            return Err(ReconcileError::write_failed(reply.status, url, reply.body));
        }
        tracing::info!(index = name, status = reply.status, "document added");
        Ok(Outcome::changed(
            Output::new(reply.status).with_message(format!("Document added to index '{name}'.")),
        ))
    }
}

fn reindex_body(source: &str, dest: &str) -> Value {
    json!({
        "source": { "index": source },
        "dest": { "index": dest, "version_type": "internal" },
    })
}
