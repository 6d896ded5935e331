//! Validate command handler

use super::utils::{load_document, load_schema};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{OutputWriter, ValidationReport};
use attrform_core::validation::validate_attribute;
use attrform_schemas::JsonSchemaValidator;

/// Handle the validate command
///
/// A failing document is reported in the selected output format and then
/// returned as a validation error so the process exits non-zero.
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Validating {}", args.document.display()))?;

    let schema = load_schema(&args.schema, config)?;
    let document = load_document(&args.document)?;
    let validator = JsonSchemaValidator::new();

    let outcome = validate_attribute(&schema, &document, &validator, Some(&args.attribute));
    let (mut report, result) = match outcome {
        Ok(()) => (ValidationReport::passed(&args.attribute), Ok(())),
        Err(attrform_core::Error::Validation(failure)) => {
            let report = ValidationReport::failed(&args.attribute, &failure);
            (report, Err(Error::Core(failure.into())))
        }
        Err(other) => return Err(other.into()),
    };

    if args.detailed {
        report.document = Some(document);
    }
    output.validation(&report)?;
    result
}
