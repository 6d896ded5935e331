//! Non-fatal outcomes collected while reducers run

use crate::reducer::Phase;
use crate::relation::ReconcileReport;
use serde::Serialize;

/// A key that could not be resolved to a related record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationMiss {
    pub relation: String,
    pub key: String,
    pub path: String,
    pub phase: Phase,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub misses: Vec<RelationMiss>,
    pub reconciliations: Vec<ReconcileReport>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_miss(
        &mut self,
        relation: impl Into<String>,
        key: impl Into<String>,
        path: impl Into<String>,
        phase: Phase,
    ) {
        self.misses.push(RelationMiss {
            relation: relation.into(),
            key: key.into(),
            path: path.into(),
            phase,
        });
    }

    pub fn record_reconciliation(&mut self, report: ReconcileReport) {
        self.reconciliations.push(report);
    }

    pub fn is_empty(&self) -> bool {
        self.misses.is_empty() && self.reconciliations.is_empty()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.misses.extend(other.misses);
        self.reconciliations.extend(other.reconciliations);
    }
}
