//! External process execution.
//!
//! Checkers never spawn processes directly; they go through a
//! [`ToolRunner`] supplied by the caller.

pub mod command;
pub mod mock;

pub use command::{
    ProcessRunner, RunOptions, RunOutput, ToolRunner, DEFAULT_PROCESS_TIMEOUT, EXIT_NOT_FOUND,
    EXIT_TIMED_OUT,
};
pub use mock::{FakeRunner, Invocation};
