//! Reduce command handler

use super::utils::{attributes, host_from, load_document, load_schema};
use crate::cli::ReduceArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{OutputWriter, PhaseReport};
use attrform_core::{Diagnostics, Phase};

/// Handle the reduce command
///
/// Runs one phase over the document exactly as the engine would, including
/// reducer state kept under the metadata namespace.
pub fn handle_reduce(args: ReduceArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let schema = load_schema(&args.schema, config)?;
    let document = load_document(&args.document)?;
    let attributes = attributes(config, &args.attribute, schema, &args.reducers, false)?;
    let attribute = attributes
        .get(&args.attribute)
        .ok_or_else(|| Error::other(format!("attribute '{}' was not declared", args.attribute)))?;

    let mut host = host_from(args.fixture.as_deref())?;
    let phase = Phase::from(args.phase);
    let mut diagnostics = Diagnostics::new();
    let value = attributes.pipeline().run_phase_with_diagnostics(
        phase,
        attribute,
        document,
        &mut host,
        args.saving,
        &mut diagnostics,
    )?;

    if output.is_verbose() && !host.journal().is_empty() {
        output.info(&format!("{} link operation(s) issued", host.journal().len()))?;
    }

    output.phase(&PhaseReport {
        phase,
        attribute: args.attribute,
        value,
        misses: diagnostics.misses,
    })
}
