//! Diffing linkage generations into attach and detach calls

use super::config::RelationConfig;
use super::metadata::LinkageMetadata;
use crate::error::HostError;
use crate::host::Host;
use crate::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Keys to link and unlink, each unique and in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDiff {
    pub to_attach: Vec<String>,
    pub to_detach: Vec<String>,
}

impl LinkDiff {
    pub fn is_empty(&self) -> bool {
        self.to_attach.is_empty() && self.to_detach.is_empty()
    }
}

/// `to_detach = current - pending`, `to_attach = pending - current`
pub fn diff(current: &[String], pending: &[String]) -> LinkDiff {
    LinkDiff {
        to_attach: pending
            .iter()
            .filter(|key| !current.contains(key))
            .cloned()
            .collect(),
        to_detach: current
            .iter()
            .filter(|key| !pending.contains(key))
            .cloned()
            .collect(),
    }
}

/// Outcome of reconciling one relation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub relation: String,
    pub attached: Vec<String>,
    pub detached: Vec<String>,
    /// Keys whose related record no longer exists
    pub misses: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty() && self.misses.is_empty()
    }
}

/// Apply the pending generation of `config.relation` through the host and rotate it
///
/// Detaches run before attaches. A key the host cannot find is reported in
/// `misses` and skipped; any other host failure aborts. Keys whose attach
/// missed stay out of the current generation.
pub fn reconcile(
    host: &mut dyn Host,
    config: &RelationConfig,
    metadata: &mut LinkageMetadata,
) -> Result<ReconcileReport> {
    let relation = config.relation.as_str();
    let mut report = ReconcileReport {
        relation: relation.to_string(),
        ..Default::default()
    };
    if !metadata.has_pending(relation) {
        return Ok(report);
    }

    let diff = diff(&metadata.current_keys(relation), &metadata.pending_keys(relation));

    for key in diff.to_detach {
        match host.detach(config, &key) {
            Ok(()) => report.detached.push(key),
            Err(err) => record_miss(&mut report, key, err, "detach")?,
        }
    }

    let detach_misses = report.misses.len();
    for key in diff.to_attach {
        let path = metadata.pending_path(relation, &key).map(str::to_string);
        match host.attach(config, &key, path.as_deref()) {
            Ok(()) => report.attached.push(key),
            Err(err) => record_miss(&mut report, key, err, "attach")?,
        }
    }

    let attach_misses = report.misses[detach_misses..].to_vec();
    metadata.rotate_linked(relation, &attach_misses);

    if !report.is_noop() {
        info!(
            relation,
            attached = report.attached.len(),
            detached = report.detached.len(),
            misses = report.misses.len(),
            "reconciled relation"
        );
    }
    Ok(report)
}

fn record_miss(report: &mut ReconcileReport, key: String, err: HostError, operation: &str) -> Result<()> {
    if !err.is_not_found() {
        return Err(Error::host(operation, err));
    }
    warn!(relation = %report.relation, key = %key, operation, "related record not found");
    report.misses.push(key);
    Ok(())
}
