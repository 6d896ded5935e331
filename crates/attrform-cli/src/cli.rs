//! Argument definitions for the `attrform` binary

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Attrform CLI - schema-driven JSON attribute transformation
///
/// Validate attribute documents against their schema, inspect the nodes a
/// schema flattens to, run single reducer phases and full save cycles against
/// a fixture store.
#[derive(Parser, Debug)]
#[command(
    name = "attrform",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print command results and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file to use instead of the discovered one
    #[arg(short, long, global = true, env = "ATTRFORM_CONFIG")]
    pub config: Option<PathBuf>,

    /// How command results are rendered
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Never colorize output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a document against a schema
    Validate(ValidateArgs),

    /// Print the nodes a schema flattens to, optionally matched against a document
    Nodes(NodesArgs),

    /// Run a single reducer phase over a document
    Reduce(ReduceArgs),

    /// Run a full save cycle against a fixture store
    Cycle(CycleArgs),

    /// Create or inspect configuration
    Config(ConfigArgs),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the document to validate (JSON or YAML)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Schema name from the schemas directory, or a path to a descriptor file
    #[arg(short, long)]
    pub schema: String,

    /// Attribute name used as the prefix of failure paths
    #[arg(short, long, default_value = "data")]
    pub attribute: String,

    /// Show the validated document
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Parser, Debug)]
pub struct NodesArgs {
    /// Schema name from the schemas directory, or a path to a descriptor file
    #[arg(short, long)]
    pub schema: String,

    /// Expand wildcard nodes against this document
    #[arg(short, long, value_name = "DOCUMENT")]
    pub data: Option<PathBuf>,

    /// Only list nodes below this path, relative to it
    #[arg(short, long)]
    pub root: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ReduceArgs {
    /// Path to the attribute document (JSON or YAML)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Schema name from the schemas directory, or a path to a descriptor file
    #[arg(short, long)]
    pub schema: String,

    /// Phase to run
    #[arg(short, long, value_enum, default_value = "get")]
    pub phase: PhaseArg,

    /// Attribute name the document is stored under
    #[arg(short, long, default_value = "data")]
    pub attribute: String,

    /// Additional reducer ids to attach to the attribute
    #[arg(long = "reducer", value_name = "ID")]
    pub reducers: Vec<String>,

    /// Fixture store providing related records
    #[arg(short, long)]
    pub fixture: Option<PathBuf>,

    /// Run as part of a save cycle
    #[arg(long)]
    pub saving: bool,
}

#[derive(Parser, Debug)]
pub struct CycleArgs {
    /// Fixture store holding the record and its related tables (JSON or YAML)
    #[arg(value_name = "FIXTURE")]
    pub fixture: PathBuf,

    /// Schema name from the schemas directory, or a path to a descriptor file
    #[arg(short, long)]
    pub schema: String,

    /// Attribute name to save
    #[arg(short, long, default_value = "data")]
    pub attribute: String,

    /// Additional reducer ids to attach to the attribute
    #[arg(long = "reducer", value_name = "ID")]
    pub reducers: Vec<String>,

    /// Write this document to the attribute before saving
    #[arg(short = 'w', long, value_name = "DOCUMENT")]
    pub write: Option<PathBuf>,

    /// Skip schema validation
    #[arg(long)]
    pub no_validate: bool,

    /// Save the resulting fixture to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the configuration (defaults to .attrform.toml)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Write to the user configuration directory instead
    #[arg(long, conflicts_with = "path")]
    pub user: bool,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Serialization used for the printed configuration
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
        #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and summaries for a terminal
    Human,
    Json,
    Yaml,
    JsonPretty,
}

/// Reducer phase selectable from the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PhaseArg {
    Get,
    Set,
    Save,
    Commit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// `-v` count, forced to zero by `--quiet`
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<PhaseArg> for attrform_core::Phase {
    fn from(phase: PhaseArg) -> Self {
        match phase {
            PhaseArg::Get => attrform_core::Phase::Get,
            PhaseArg::Set => attrform_core::Phase::Set,
            PhaseArg::Save => attrform_core::Phase::Save,
            PhaseArg::Commit => attrform_core::Phase::Commit,
        }
    }
}

impl Shell {
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["attrform", "-vv", "nodes", "--schema", "page"]);
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            quiet: true,
            ..cli
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_reduce_arguments() {
        let cli = Cli::parse_from([
            "attrform",
            "reduce",
            "page.json",
            "--schema",
            "page",
            "--phase",
            "set",
            "--reducer",
            "slug",
            "--reducer",
            "defaults",
        ]);
        match cli.command {
            Commands::Reduce(args) => {
                assert_eq!(args.phase, PhaseArg::Set);
                assert_eq!(args.attribute, "data");
                assert_eq!(args.reducers, vec!["slug", "defaults"]);
                assert!(!args.saving);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_phase_conversion() {
        assert_eq!(attrform_core::Phase::from(PhaseArg::Commit), attrform_core::Phase::Commit);
    }
}
