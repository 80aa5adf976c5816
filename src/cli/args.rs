//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::detection::Dialect;
use crate::lint::OutputFormat;

/// yamldoctor - guarded validation and repair suggestions for YAML.
#[derive(Debug, Parser)]
#[command(name = "yamldoctor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides a discovered .yamldoctor.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory searched for .yamldoctor.yml (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Template resource spec override
    #[arg(
        long,
        global = true,
        env = "YAMLDOCTOR_TEMPLATE_SPEC",
        value_name = "PATH"
    )]
    pub template_spec: Option<PathBuf>,

    /// Pipeline step schema override
    #[arg(
        long,
        global = true,
        env = "YAMLDOCTOR_PIPELINE_SPEC",
        value_name = "PATH"
    )]
    pub pipeline_spec: Option<PathBuf>,

    /// YAML parse budget in milliseconds (1-10000)
    #[arg(
        long,
        global = true,
        env = "YAMLDOCTOR_PARSE_TIMEOUT_MS",
        value_name = "MS"
    )]
    pub parse_timeout_ms: Option<u64>,

    /// Reports and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate YAML files
    Validate(ValidateArgs),

    /// List repair suggestions for a file
    Suggest(SuggestArgs),

    /// Apply repair suggestions to a file
    Fix(FixArgs),

    /// Convert between YAML and JSON
    Convert(ConvertArgs),

    /// Print a JSON Schema
    Schema(SchemaArgs),
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    /// Files or directories (directories are searched for *.yml and *.yaml)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Validate as this dialect instead of detecting it
    #[arg(long, value_name = "DIALECT")]
    pub provider: Option<Dialect>,

    /// Declarative ruleset for the rules checker
    #[arg(long, value_name = "PATH")]
    pub ruleset: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Downgrade JSON, anchor and alias findings to warnings
    #[arg(long)]
    pub relax_security: bool,

    #[arg(long)]
    pub allow_anchors: bool,

    #[arg(long)]
    pub allow_aliases: bool,

    /// Allow a local tag (repeatable), e.g. --allow-tag Ref
    #[arg(long = "allow-tag", value_name = "TAG")]
    pub allow_tags: Vec<String>,

    /// Allow the CloudFormation short-form intrinsic tags
    #[arg(long)]
    pub cloudformation_tags: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `suggest` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SuggestArgs {
    pub path: PathBuf,

    /// Analyze as this dialect instead of detecting it
    #[arg(long, value_name = "DIALECT")]
    pub provider: Option<Dialect>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `fix` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FixArgs {
    pub path: PathBuf,

    /// Analyze as this dialect instead of detecting it
    #[arg(long, value_name = "DIALECT")]
    pub provider: Option<Dialect>,

    /// Suggestion indices to apply, in order (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["all", "interactive"])]
    pub select: Vec<usize>,

    /// Apply every suggestion that has an automatic fix
    #[arg(long, conflicts_with = "interactive")]
    pub all: bool,

    /// Pick suggestions from a list
    #[arg(short, long)]
    pub interactive: bool,

    /// Write the result back to the file instead of printing it
    #[arg(short, long)]
    pub write: bool,

    /// Print a unified diff of the changes
    #[arg(long)]
    pub diff: bool,
}

/// Conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConvertTarget {
    Json,
    Yaml,
}

/// Arguments for the `convert` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ConvertArgs {
    pub path: PathBuf,

    /// Target format (default: the other one, judged by extension)
    #[arg(long, value_enum)]
    pub to: Option<ConvertTarget>,
}

/// Which schema to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaKind {
    /// The .yamldoctor.yml config file
    Config,
    /// Template resource spec override files
    TemplateSpec,
    /// Pipeline step schema override files
    PipelineSpec,
}

/// Arguments for the `schema` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub kind: SchemaKind,
}
