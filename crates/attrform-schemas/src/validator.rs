//! JSON Schema backed attribute validation
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

use attrform_core::{AttributeValidator, Error, Messages, Result};
use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Validates attribute values with the `jsonschema` crate
///
/// Compiled validators are cached per descriptor, so validating the same
/// attribute repeatedly compiles its descriptor once.
#[derive(Default)]
pub struct JsonSchemaValidator {
    compiled: RwLock<HashMap<String, Arc<Validator>>>,
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a descriptor, failing with a configuration error when it is not a valid schema
    pub fn compile(&self, descriptor: &Value) -> Result<Arc<Validator>> {
        let key = descriptor.to_string();
        if let Some(validator) = self
            .compiled
            .read()
            .ok()
            .and_then(|compiled| compiled.get(&key).cloned())
        {
            return Ok(validator);
        }

        let validator = jsonschema::validator_for(descriptor).map_err(|err| {
            Error::configuration(format!("invalid schema descriptor: {err}"))
        })?;
        let validator = Arc::new(validator);
        if let Ok(mut compiled) = self.compiled.write() {
            compiled.insert(key, Arc::clone(&validator));
        }
        debug!("compiled schema descriptor");
        Ok(validator)
    }

    /// Number of compiled descriptors held in the cache
    pub fn cached(&self) -> usize {
        self.compiled.read().map(|compiled| compiled.len()).unwrap_or(0)
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("cached", &self.cached())
            .finish()
    }
}

impl AttributeValidator for JsonSchemaValidator {
    fn validate(&self, value: &Value, descriptor: &Value) -> Result<Messages> {
        let validator = self.compile(descriptor)?;
        let mut messages = Messages::new();
        for error in validator.iter_errors(value) {
            let path = pointer_to_path(&error.instance_path.to_string());
            messages.entry(path).or_default().push(error.to_string());
        }
        Ok(messages)
    }
}

/// Convert a JSON pointer (`/children/0/name`) into a dotted path (`children.0.name`)
pub fn pointer_to_path(pointer: &str) -> String {
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_pointer_to_path() {
        assert_eq!(pointer_to_path(""), "");
        assert_eq!(pointer_to_path("/name"), "name");
        assert_eq!(pointer_to_path("/children/0/id"), "children.0.id");
        assert_eq!(pointer_to_path("/a~1b/c~0d"), "a/b.c~d");
    }

    #[test]
    fn test_valid_value_has_no_messages() {
        let validator = JsonSchemaValidator::new();
        let descriptor = json!({"type": "object", "properties": {"name": {"type": "string"}}});
        let messages = validator.validate(&json!({"name": "ok"}), &descriptor).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_messages_are_keyed_by_dotted_path() {
        let validator = JsonSchemaValidator::new();
        let descriptor = json!({
            "type": "object",
            "properties": {
                "children": {"type": "array", "items": {"type": "string"}}
            }
        });
        let messages = validator
            .validate(&json!({"children": ["a", 2]}), &descriptor)
            .unwrap();
        assert_eq!(messages.keys().collect::<Vec<_>>(), vec!["children.1"]);
    }

    #[test]
    fn test_root_failure_uses_empty_path() {
        let validator = JsonSchemaValidator::new();
        let messages = validator
            .validate(&json!(5), &json!({"type": "object"}))
            .unwrap();
        assert!(messages.contains_key(""));
    }

    #[test]
    fn test_invalid_descriptor_is_configuration_error() {
        let validator = JsonSchemaValidator::new();
        let err = validator
            .validate(&json!({}), &json!({"type": "nonsense"}))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_descriptors_compile_once() {
        let validator = JsonSchemaValidator::new();
        let descriptor = json!({"type": "string"});
        validator.validate(&json!("a"), &descriptor).unwrap();
        validator.validate(&json!("b"), &descriptor).unwrap();
        assert_eq!(validator.cached(), 1);
    }
}
