//! Attribute lifecycle over a host record
//!
//! [`JsonAttributes`] ties named attribute schemas to a [`ReducerPipeline`]
//! and drives the phases at the right moments: get on read, set on write,
//! then validate, save, persist and commit when the record is saved.

use crate::diagnostics::{Diagnostics, RelationMiss};
use crate::host::Host;
use crate::reducer::{AttributeSchema, Phase, ReducerPipeline, ReducerRef};
use crate::relation::{carry_namespace, strip_namespace, ReconcileReport};
use crate::schema::Schema;
use crate::validation::{validate_attribute, AttributeValidator};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// What a save cycle did beyond persisting the record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub reconciliations: Vec<ReconcileReport>,
    pub misses: Vec<RelationMiss>,
    /// Number of times the host persisted during the cycle
    pub persisted: usize,
}

impl SaveReport {
    pub fn attached(&self) -> Vec<&str> {
        self.reconciliations
            .iter()
            .flat_map(|report| report.attached.iter().map(String::as_str))
            .collect()
    }

    pub fn detached(&self) -> Vec<&str> {
        self.reconciliations
            .iter()
            .flat_map(|report| report.detached.iter().map(String::as_str))
            .collect()
    }
}

/// Schema-described JSON attributes of one record type
#[derive(Debug, Clone, Default)]
pub struct JsonAttributes {
    pipeline: ReducerPipeline,
    attributes: IndexMap<String, AttributeSchema>,
    validator: Option<Arc<dyn AttributeValidator>>,
}

impl JsonAttributes {
    pub fn new(pipeline: ReducerPipeline) -> Self {
        Self {
            pipeline,
            attributes: IndexMap::new(),
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: impl AttributeValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_validator_arc(mut self, validator: Arc<dyn AttributeValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn attribute(self, name: impl Into<String>, schema: impl Into<Arc<Schema>>) -> Result<Self> {
        self.attribute_with_reducers(name, schema, &[])
    }

    /// Declare an attribute with reducers attached to a scoped copy of `schema`
    pub fn attribute_with_reducers(
        mut self,
        name: impl Into<String>,
        schema: impl Into<Arc<Schema>>,
        reducers: &[ReducerRef],
    ) -> Result<Self> {
        let name = name.into();
        let attribute = self.pipeline.compose(name.clone(), schema.into(), reducers)?;
        self.attributes.insert(name, attribute);
        Ok(self)
    }

    /// Reducer applied to every attribute of this record type
    pub fn container_reducer(mut self, reducer: impl Into<ReducerRef>) -> Result<Self> {
        self.pipeline.add_container_reducer(&reducer.into())?;
        Ok(self)
    }

    pub fn pipeline(&self) -> &ReducerPipeline {
        &self.pipeline
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    fn attribute_schema(&self, name: &str) -> Result<&AttributeSchema> {
        self.attributes.get(name).ok_or_else(|| Error::UnknownAttribute {
            name: name.to_string(),
        })
    }

    fn namespace(&self) -> &str {
        &self.pipeline.config().metadata_namespace
    }

    fn load(&self, host: &dyn Host, name: &str) -> Result<Value> {
        match host.raw_attribute(name) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(|err| Error::Json {
                message: format!("attribute '{name}' holds invalid JSON"),
                source: err,
            }),
            _ => Ok(Value::Null),
        }
    }

    fn store(&self, host: &mut dyn Host, name: &str, value: &Value) -> Result<()> {
        host.set_raw_attribute(name, serde_json::to_string(value)?);
        Ok(())
    }

    /// Stored value transformed by the get phase, without private reducer state
    pub fn read(&self, host: &mut dyn Host, name: &str) -> Result<Value> {
        let attribute = self.attribute_schema(name)?;
        let raw = self.load(host, name)?;
        let mut value = self.pipeline.run_phase(Phase::Get, attribute, raw, host, false)?;
        strip_namespace(&mut value, self.namespace());
        Ok(value)
    }

    pub fn read_all(&self, host: &mut dyn Host) -> Result<IndexMap<String, Value>> {
        self.names()
            .map(|name| Ok((name.to_string(), self.read(host, name)?)))
            .collect()
    }

    /// Transform `value` through the set phase and store it
    ///
    /// Private reducer state already stored for the attribute is kept.
    pub fn write(&self, host: &mut dyn Host, name: &str, mut value: Value) -> Result<()> {
        let attribute = self.attribute_schema(name)?;
        let stored = self.load(host, name)?;
        strip_namespace(&mut value, self.namespace());
        carry_namespace(&stored, &mut value, self.namespace());

        let value = self.pipeline.run_phase(Phase::Set, attribute, value, host, false)?;
        self.store(host, name, &value)
    }

    /// Validate every attribute as [`read`](Self::read) returns it
    ///
    /// Stored relation keys are expanded first, so item schemas see records.
    /// The first failing attribute is reported.
    pub fn validate(&self, host: &mut dyn Host) -> Result<()> {
        let Some(validator) = self.validator.as_deref() else {
            return Ok(());
        };
        for attribute in self.attributes.values() {
            let value = self.read(host, attribute.name())?;
            validate_attribute(attribute.schema(), &value, validator, Some(attribute.name()))?;
        }
        Ok(())
    }

    /// Run a full save cycle
    ///
    /// Validation failures abort before anything runs. When persisting fails
    /// the error is returned and commit does not run, so no links change.
    pub fn save(&self, host: &mut dyn Host) -> Result<SaveReport> {
        let span = tracing::info_span!("save", attributes = self.attributes.len());
        let _guard = span.enter();

        self.validate(host)?;

        let mut diagnostics = Diagnostics::new();
        for attribute in self.attributes.values() {
            let value = self.load(host, attribute.name())?;
            let saved = self.pipeline.run_phase_with_diagnostics(
                Phase::Save,
                attribute,
                value.clone(),
                host,
                true,
                &mut diagnostics,
            )?;
            if saved != value {
                self.store(host, attribute.name(), &saved)?;
            }
        }

        host.persist().map_err(|err| Error::host("persist", err))?;
        let mut report = SaveReport {
            persisted: 1,
            ..Default::default()
        };

        let mut changed = false;
        for attribute in self.attributes.values() {
            let value = self.load(host, attribute.name())?;
            let committed = self.pipeline.run_phase_with_diagnostics(
                Phase::Commit,
                attribute,
                value.clone(),
                host,
                true,
                &mut diagnostics,
            )?;
            if committed != value {
                self.store(host, attribute.name(), &committed)?;
                changed = true;
            }
        }
        if changed {
            debug!("commit changed stored attributes, persisting again");
            host.persist().map_err(|err| Error::host("persist", err))?;
            report.persisted += 1;
        }

        report.reconciliations = diagnostics.reconciliations;
        report.misses = diagnostics.misses;
        info!(
            attached = report.attached().len(),
            detached = report.detached().len(),
            misses = report.misses.len(),
            "save cycle complete"
        );
        Ok(report)
    }
}
