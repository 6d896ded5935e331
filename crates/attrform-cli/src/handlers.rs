//! Command handlers for CLI subcommands
//!
//! Each submodule implements one subcommand. Shared loading of schemas,
//! documents and fixtures lives in [`utils`].

mod completions;
mod config;
mod cycle;
mod nodes;
mod reduce;
pub(crate) mod utils;
mod validate;

pub use completions::handle_completions;
pub use config::handle_config;
pub use cycle::handle_cycle;
pub use nodes::handle_nodes;
pub use reduce::handle_reduce;
pub use validate::handle_validate;
