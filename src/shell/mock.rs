//! Scripted [`ToolRunner`] for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::command::{RunOptions, RunOutput, ToolRunner};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
    pub input: Option<String>,
}

/// A runner that answers from a script instead of spawning processes.
///
/// Responses are keyed by command name. Each command holds a queue: calls
/// pop from the front and the last response repeats once the queue is down
/// to one entry. Unscripted commands answer as "not found" (exit 127).
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: Mutex<HashMap<String, Vec<RunOutput>>>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `command`.
    pub fn respond(self, command: &str, output: RunOutput) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.entry(command.to_string()).or_default().push(output);
        }
        self
    }

    /// Queue a successful response with the given stdout.
    pub fn respond_ok(self, command: &str, stdout: &str) -> Self {
        self.respond(command, RunOutput::new(0, stdout, ""))
    }

    /// All invocations so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Invocations of one command.
    pub fn calls_to(&self, command: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.command == command)
            .collect()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, command: &str, args: &[String], options: &RunOptions) -> RunOutput {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(Invocation {
                command: command.to_string(),
                args: args.to_vec(),
                input: options.input.clone(),
            });
        }

        let mut responses = match self.responses.lock() {
            Ok(responses) => responses,
            Err(_) => return RunOutput::not_found("fake runner poisoned"),
        };
        match responses.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => RunOutput::not_found(format!("{}: command not found", command)),
        }
    }
}
