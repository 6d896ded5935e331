//! Cycle command handler

use super::utils::{attributes, host_from, load_document, load_schema};
use crate::cli::CycleArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{CycleReport, OutputWriter, ValidationReport};
use std::path::Path;

/// Handle the cycle command
///
/// Loads the fixture into an in-memory host, optionally writes a new document
/// through the set phase, then saves. The journal lists every attach and
/// detach the cycle issued.
pub fn handle_cycle(args: CycleArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let schema = load_schema(&args.schema, config)?;
    let attributes = attributes(
        config,
        &args.attribute,
        schema,
        &args.reducers,
        !args.no_validate,
    )?;
    let mut host = host_from(Some(args.fixture.as_path()))?;

    if let Some(path) = &args.write {
        let document = load_document(path)?;
        output.info(&format!("Writing {} to '{}'", path.display(), args.attribute))?;
        attributes.write(&mut host, &args.attribute, document)?;
    }

    let report = match attributes.save(&mut host) {
        Ok(report) => report,
        Err(attrform_core::Error::Validation(failure)) => {
            output.validation(&ValidationReport::failed(&args.attribute, &failure))?;
            return Err(Error::Core(failure.into()));
        }
        Err(other) => return Err(other.into()),
    };

    let value = attributes.read(&mut host, &args.attribute)?;
    if let Some(path) = &args.save_to {
        save_fixture(&host.to_fixture(), path)?;
        output.success(&format!("✓ Fixture saved to {}", path.display()))?;
    }

    output.cycle(&CycleReport {
        attribute: args.attribute,
        report,
        journal: host.journal().to_vec(),
        value,
    })
}

fn save_fixture(fixture: &attrform_core::MemoryFixture, path: &Path) -> Result<()> {
    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let content = if yaml {
        serde_yaml::to_string(fixture)?
    } else {
        serde_json::to_string_pretty(fixture)?
    };
    std::fs::write(path, content)?;
    Ok(())
}
