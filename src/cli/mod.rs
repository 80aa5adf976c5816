//! Command-line interface for yamldoctor.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, ConvertArgs, ConvertTarget, FixArgs, SchemaArgs, SchemaKind, SuggestArgs,
    ValidateArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
