//! Nodes command handler

use super::utils::{load_document, load_schema};
use crate::cli::NodesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{NodeRow, OutputWriter};

/// Handle the nodes command
pub fn handle_nodes(args: NodesArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let schema = load_schema(&args.schema, config)?;
    let root = args.root.as_deref();

    let nodes = match &args.data {
        Some(path) => {
            let data = load_document(path)?;
            schema.nodes_from_data(&data, root)?
        }
        None => schema.nodes(root),
    };
    tracing::debug!(schema = schema.name(), nodes = nodes.len(), "flattened schema");

    let rows: Vec<NodeRow> = nodes.iter().map(NodeRow::from).collect();
    output.nodes(&rows)
}
