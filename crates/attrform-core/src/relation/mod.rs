//! Relation reducers and reconciliation
//!
//! A relation reducer lets an attribute hold related records in memory while
//! only their keys are stored. Around persistence it keeps the host's links in
//! step with the keys the attribute references: save records the keys in a
//! pending generation, commit diffs it against the current one and issues the
//! minimal attach and detach calls.
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

pub mod config;
pub mod metadata;
pub mod reconcile;
pub mod reducer;

pub use config::{QueryPolicy, RelationConfig, RelationKind};
pub use metadata::{carry_namespace, strip_namespace, LinkageMetadata, PathKeys};
pub use reconcile::{diff, reconcile, LinkDiff, ReconcileReport};
pub use reducer::RelationReducer;
