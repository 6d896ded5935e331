//! Structural validation seam
//!
//! The engine does not validate documents itself. It hands the value and the
//! schema's descriptor to an [`AttributeValidator`] and turns the messages it
//! returns into a [`ValidationFailure`].

use crate::error::{Messages, ValidationFailure};
use crate::schema::Schema;
use crate::Result;
use serde_json::Value;
use std::fmt;

pub trait AttributeValidator: Send + Sync + fmt::Debug {
    /// Messages keyed by dotted path relative to `value`; empty when valid
    fn validate(&self, value: &Value, descriptor: &Value) -> Result<Messages>;
}

/// Validate `value` against `schema`, prefixing failure paths with `prefix`
pub fn validate_attribute(
    schema: &Schema,
    value: &Value,
    validator: &dyn AttributeValidator,
    prefix: Option<&str>,
) -> Result<()> {
    let messages = validator.validate(value, &schema.to_descriptor())?;
    if messages.is_empty() {
        return Ok(());
    }
    tracing::debug!(
        attribute = prefix.unwrap_or_default(),
        paths = messages.len(),
        "validation failed"
    );
    Err(ValidationFailure::new(messages).with_prefix(prefix).into())
}
