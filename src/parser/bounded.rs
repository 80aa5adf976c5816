//! Time-bounded YAML parsing.
//!
//! The parse runs on a worker thread while the caller waits on a channel
//! with a deadline. When the deadline passes first the caller gets
//! [`ParseError::Timeout`]; whatever the worker produces later is sent into
//! a closed channel and dropped.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::Document;
use crate::lint::{LintMessage, MessageKind, Source};

/// Default parse budget.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Smallest accepted budget.
pub const MIN_TIMEOUT_MS: u64 = 1;
/// Largest accepted budget.
pub const MAX_TIMEOUT_MS: u64 = 10_000;

/// Why a document could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The parse did not finish within its budget.
    #[error("YAML parsing timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The content is not valid YAML.
    #[error("YAML syntax error: {message}")]
    Syntax {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
}

impl ParseError {
    /// Render as the single parser message a failed validation reports.
    pub fn to_message(&self) -> LintMessage {
        let msg = LintMessage::error(Source::Parser, self.to_string()).with_kind(MessageKind::Syntax);
        match self {
            ParseError::Timeout { .. } => msg.with_rule("parse-timeout"),
            ParseError::Syntax { line, column, .. } => {
                let msg = msg.with_rule("syntax");
                match line {
                    Some(line) => msg.with_location(*line, *column),
                    None => msg,
                }
            }
        }
    }
}

/// Clamp a requested budget into the accepted range.
pub fn clamp_timeout(timeout_ms: Option<u64>) -> Duration {
    let ms = timeout_ms
        .unwrap_or(DEFAULT_TIMEOUT_MS)
        .clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Parse synchronously with no time budget.
///
/// Duplicate mapping keys and multi-document streams are rejected.
/// Keys that only differ by type (`1` and `"1"`) are rejected too, since
/// they cannot both survive as string keys.
pub fn parse_document(content: &str) -> Result<Document, ParseError> {
    let value = serde_yaml::from_str::<serde_yaml::Value>(content).map_err(|e| {
        let location = e.location();
        ParseError::Syntax {
            message: e.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    })?;
    Document::try_from(value).map_err(|e| ParseError::Syntax {
        message: e.to_string(),
        line: None,
        column: None,
    })
}

/// A parser with a wall-clock budget.
#[derive(Debug, Clone)]
pub struct BoundedParser {
    timeout: Duration,
    delay: Duration,
}

impl BoundedParser {
    /// Create a parser with the given budget (clamped to 1..=10000 ms).
    pub fn new(timeout_ms: Option<u64>) -> Self {
        Self {
            timeout: clamp_timeout(timeout_ms),
            delay: Duration::ZERO,
        }
    }

    /// Delay the worker before it starts parsing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parse `content`, failing with [`ParseError::Timeout`] when the budget runs out.
    pub fn parse(&self, content: &str) -> Result<Document, ParseError> {
        let (tx, rx) = mpsc::channel();
        let owned = content.to_owned();
        let delay = self.delay;

        let spawned = thread::Builder::new()
            .name("yaml-parse".to_string())
            .spawn(move || {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                // Receiver may be gone after a timeout; the result is discarded
                let _ = tx.send(parse_document(&owned));
            });

        if let Err(e) = spawned {
            warn!("Could not start parse worker, parsing inline: {}", e);
            return parse_document(content);
        }

        let timeout_ms = self.timeout.as_millis() as u64;
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                debug!(timeout_ms, "YAML parse exceeded its budget");
                Err(ParseError::Timeout { timeout_ms })
            }
            Err(RecvTimeoutError::Disconnected) => Err(ParseError::Syntax {
                message: "parser worker stopped without a result".to_string(),
                line: None,
                column: None,
            }),
        }
    }
}

impl Default for BoundedParser {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Parse with a budget of `timeout_ms` (default 5000, clamped to 1..=10000).
pub fn parse_bounded(content: &str, timeout_ms: Option<u64>) -> Result<Document, ParseError> {
    BoundedParser::new(timeout_ms).parse(content)
}
