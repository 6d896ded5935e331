//! Output formatting and writing utilities
//!
//! Every command result is a serializable report. Machine formats serialize
//! the report as is; the human format renders it for the terminal.

use crate::cli::OutputFormat;
use crate::error::Result;
use attrform_core::{LinkOperation, Node, Phase, RelationMiss, SaveReport, ValidationFailure};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::trace;

/// One row of `attrform nodes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub path: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl From<&Node> for NodeRow {
    fn from(node: &Node) -> Self {
        Self {
            path: node.path.clone(),
            type_name: node.type_name.clone(),
            // only named schemas are worth showing; anonymous ones repeat the type
            schema: node
                .schema
                .as_deref()
                .and_then(|schema| schema.explicit_name())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub path: String,
    pub messages: Vec<String>,
}

/// Result of `attrform validate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub attribute: String,
    pub valid: bool,
    pub failures: Vec<FailureEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}

impl ValidationReport {
    pub fn passed(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            valid: true,
            failures: Vec::new(),
            document: None,
        }
    }

    pub fn failed(attribute: impl Into<String>, failure: &ValidationFailure) -> Self {
        let failures = failure
            .paths()
            .into_iter()
            .zip(failure.messages().values())
            .map(|(path, messages)| FailureEntry {
                path,
                messages: messages.clone(),
            })
            .collect();
        Self {
            attribute: attribute.into(),
            valid: false,
            failures,
            document: None,
        }
    }
}

/// Result of `attrform reduce`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub attribute: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub misses: Vec<RelationMiss>,
}

/// Result of `attrform cycle`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub attribute: String,
    #[serde(flatten)]
    pub report: SaveReport,
    pub journal: Vec<LinkOperation>,
    /// The attribute as read back after the cycle
    pub value: Value,
}

pub trait OutputFormatter {
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    fn format_nodes(&self, rows: &[NodeRow]) -> Result<String>;

    fn format_validation(&self, report: &ValidationReport) -> Result<String>;

    fn format_phase(&self, report: &PhaseReport) -> Result<String>;

    fn format_cycle(&self, report: &CycleReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // human output of arbitrary data falls back to pretty JSON
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_nodes(&self, rows: &[NodeRow]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_nodes_human(rows)),
            _ => self.format(&rows),
        }
    }

    fn format_validation(&self, report: &ValidationReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_validation_human(report),
            _ => self.format(report),
        }
    }

    fn format_phase(&self, report: &PhaseReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_phase_human(report),
            _ => self.format(report),
        }
    }

    fn format_cycle(&self, report: &CycleReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_cycle_human(report),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    #[allow(dead_code)]
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }
        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    #[allow(dead_code)]
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.emit(formatted)
    }

    pub fn nodes(&mut self, rows: &[NodeRow]) -> Result<()> {
        let formatted = self.format.format_nodes(rows)?;
        self.emit(formatted)
    }

    pub fn validation(&mut self, report: &ValidationReport) -> Result<()> {
        let formatted = self.format.format_validation(report)?;
        self.emit(formatted)
    }

    pub fn phase(&mut self, report: &PhaseReport) -> Result<()> {
        let formatted = self.format.format_phase(report)?;
        self.emit(formatted)
    }

    pub fn cycle(&mut self, report: &CycleReport) -> Result<()> {
        let formatted = self.format.format_cycle(report)?;
        self.emit(formatted)
    }

    fn emit(&mut self, formatted: String) -> Result<()> {
        trace!(bytes = formatted.len(), "writing output");
        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }
}

fn format_nodes_human(rows: &[NodeRow]) -> String {
    if rows.is_empty() {
        return "No nodes\n".to_string();
    }
    let headers = ["PATH", "TYPE", "SCHEMA"];
    let cells: Vec<[&str; 3]> = rows
        .iter()
        .map(|row| {
            [
                row.path.as_str(),
                row.type_name.as_str(),
                row.schema.as_deref().unwrap_or("-"),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |row: &[&str; 3]| {
        row.iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" │ ")
            .trim_end()
            .to_string()
    };

    let mut output = render(&headers);
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|width| "─".repeat(*width))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    output.push('\n');
    for row in &cells {
        output.push_str(&render(row));
        output.push('\n');
    }
    output
}

fn format_validation_human(report: &ValidationReport) -> Result<String> {
    let mut output = String::new();
    if report.valid {
        output.push_str(&format!("✅ '{}' is valid\n", report.attribute));
    } else {
        let count: usize = report.failures.iter().map(|entry| entry.messages.len()).sum();
        output.push_str(&format!(
            "❌ Validation Failed - {} Error(s) in '{}'\n\n",
            count, report.attribute
        ));
        for entry in &report.failures {
            output.push_str(&format!("📍 Path: {}\n", entry.path));
            for message in &entry.messages {
                output.push_str(&format!("  💬 {}\n", message));
            }
        }
    }
    if let Some(document) = &report.document {
        output.push_str("\n📝 Document:\n");
        output.push_str(&serde_json::to_string_pretty(document)?);
        output.push('\n');
    }
    Ok(output)
}

fn format_phase_human(report: &PhaseReport) -> Result<String> {
    let mut output = format!("═══ {} phase: {} ═══\n\n", report.phase, report.attribute);
    output.push_str(&serde_json::to_string_pretty(&report.value)?);
    output.push('\n');
    if !report.misses.is_empty() {
        output.push('\n');
        output.push_str(&format_misses(&report.misses));
    }
    Ok(output)
}

fn format_cycle_human(report: &CycleReport) -> Result<String> {
    let save = &report.report;
    let mut output = format!("═══ Save cycle: {} ═══\n\n", report.attribute);
    output.push_str(&format!("  Persisted: {} time(s)\n", save.persisted));

    let attached = save.attached();
    let detached = save.detached();
    if attached.is_empty() && detached.is_empty() {
        output.push_str("  Links: unchanged\n");
    } else {
        if !attached.is_empty() {
            output.push_str(&format!("  Attached: {}\n", attached.join(", ")));
        }
        if !detached.is_empty() {
            output.push_str(&format!("  Detached: {}\n", detached.join(", ")));
        }
    }
    if !save.misses.is_empty() {
        output.push('\n');
        output.push_str(&format_misses(&save.misses));
    }

    if !report.journal.is_empty() {
        output.push_str("\n🔗 Link operations:\n");
        for operation in &report.journal {
            output.push_str(&format!("  • {}\n", format_operation(operation)));
        }
    }

    output.push_str("\n📝 Value:\n");
    output.push_str(&serde_json::to_string_pretty(&report.value)?);
    output.push('\n');
    Ok(output)
}

fn format_misses(misses: &[RelationMiss]) -> String {
    let mut output = format!("⚠️ {} unresolved key(s):\n", misses.len());
    for miss in misses {
        output.push_str(&format!(
            "  • {} '{}' at {} ({})\n",
            miss.relation, miss.key, miss.path, miss.phase
        ));
    }
    output
}

fn format_operation(operation: &LinkOperation) -> String {
    match operation {
        LinkOperation::Attach {
            relation,
            key,
            path: Some(path),
        } => format!("attach {relation} '{key}' at {path}"),
        LinkOperation::Attach { relation, key, .. } => format!("attach {relation} '{key}'"),
        LinkOperation::Detach { relation, key } => format!("detach {relation} '{key}'"),
    }
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
