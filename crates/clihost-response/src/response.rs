// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Response`]: the per-invocation accumulator.

use crate::snapshot::ResponseSnapshot;
use clihost_error::ErrorRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write as _;
use tracing::debug;

/// Exit code the processor assigns on success.
pub const EXIT_CODE_SUCCESS: i32 = 0;
/// The single well-known non-zero exit code for any failure (spec.md §6).
pub const EXIT_CODE_FAILURE: i32 = 1;

/// Rendering mode requested for a [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Human-oriented console output.
    Default,
    /// A single JSON document written to stdout on finalization.
    Json,
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self::Default
    }
}

/// One of the two console streams a [`Response`] buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Specification for a single active progress indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSpec {
    /// Label shown alongside the indicator.
    pub label: String,
    /// Total unit count, if known (a spinner has `None`).
    pub total: Option<u64>,
}

/// The lifecycle state of a [`Response`], per spec.md §4.G.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Just constructed; nothing has happened yet.
    Fresh,
    /// Syntax validation is underway.
    Validating,
    /// Profile loading / stdin draining is underway.
    Preparing,
    /// The handler (or chain step) is running.
    Executing,
    /// Terminal. No further mutation is accepted.
    Finalized,
}

/// Error returned when a [`Response`] is mutated after [`Response::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response is already finalized")]
pub struct AlreadyFinalized;

/// The per-invocation accumulator of console output, structured data,
/// progress, and terminal success/error state.
///
/// Conceptually thread-confined to the single task driving one
/// `Processor::invoke` call: nothing else holds a reference to it and it
/// is never shared across an invocation boundary.
#[derive(Debug)]
pub struct Response {
    state: ResponseState,
    format: ResponseFormat,
    silent: bool,
    stdout: String,
    stderr: String,
    progress: Option<ProgressSpec>,
    data: Value,
    message: String,
    success: Option<bool>,
    error: Option<ErrorRecord>,
    exit_code: Option<i32>,
    snapshot: Option<ResponseSnapshot>,
}

impl Response {
    /// Construct a fresh `Response`.
    #[must_use]
    pub fn new(format: ResponseFormat, silent: bool) -> Self {
        Self {
            state: ResponseState::Fresh,
            format,
            silent,
            stdout: String::new(),
            stderr: String::new(),
            progress: None,
            data: Value::Null,
            message: String::new(),
            success: None,
            error: None,
            exit_code: None,
            snapshot: None,
        }
    }

    /// Construct a `Response` seeded with prior accumulated stdout/stderr
    /// content, used to build the per-step response for a chained handler
    /// (spec.md §4.G step 5, Chained handlers).
    #[must_use]
    pub fn seeded(format: ResponseFormat, silent: bool, stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            ..Self::new(format, silent)
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ResponseState {
        self.state
    }

    /// Configured rendering format.
    #[must_use]
    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// `true` once [`Response::finalize`] has been called.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.state == ResponseState::Finalized
    }

    /// Advance to [`ResponseState::Validating`].
    pub fn begin_validating(&mut self) -> Result<(), AlreadyFinalized> {
        self.transition(ResponseState::Validating)
    }

    /// Advance to [`ResponseState::Preparing`].
    pub fn begin_preparing(&mut self) -> Result<(), AlreadyFinalized> {
        self.transition(ResponseState::Preparing)
    }

    /// Advance to [`ResponseState::Executing`].
    pub fn begin_executing(&mut self) -> Result<(), AlreadyFinalized> {
        self.transition(ResponseState::Executing)
    }

    fn transition(&mut self, next: ResponseState) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.state = next;
        Ok(())
    }

    /// Append to a console stream; re-emits live on the real stream unless
    /// `silent`.
    pub fn log(&mut self, stream: Stream, text: &str) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        match stream {
            Stream::Stdout => {
                self.stdout.push_str(text);
                if !self.silent {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
            }
            Stream::Stderr => {
                self.stderr.push_str(text);
                if !self.silent {
                    eprint!("{text}");
                    let _ = std::io::stderr().flush();
                }
            }
        }
        Ok(())
    }

    /// Set the structured data payload.
    pub fn set_data(&mut self, data: Value) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.data = data;
        Ok(())
    }

    /// Set the summary message.
    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.message = message.into();
        Ok(())
    }

    /// Start (or replace) the single active progress indicator.
    pub fn begin_progress(&mut self, spec: ProgressSpec) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.progress = Some(spec);
        Ok(())
    }

    /// Clear the active progress indicator, if any.
    pub fn end_progress(&mut self) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.progress = None;
        Ok(())
    }

    /// The active progress indicator, if any.
    #[must_use]
    pub fn progress(&self) -> Option<&ProgressSpec> {
        self.progress.as_ref()
    }

    /// Mark the invocation as successful.
    pub fn succeeded(&mut self) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.success = Some(true);
        self.error = None;
        Ok(())
    }

    /// Mark the invocation as failed without attaching a structured error.
    /// Prefer [`Response::set_error`]; `finalize` still enforces the
    /// success/error coherence invariant either way.
    pub fn failed(&mut self) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.success = Some(false);
        Ok(())
    }

    /// Attach a structured error; implies [`Response::failed`].
    pub fn set_error(&mut self, error: ErrorRecord) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.error = Some(error);
        self.success = Some(false);
        Ok(())
    }

    /// Explicitly override the exit code that would otherwise be derived
    /// from success/failure.
    pub fn set_exit_code(&mut self, code: i32) -> Result<(), AlreadyFinalized> {
        if self.state == ResponseState::Finalized {
            return Err(AlreadyFinalized);
        }
        self.exit_code = Some(code);
        Ok(())
    }

    /// Freeze the response and return its snapshot. Idempotent: calling
    /// this more than once returns the same snapshot without re-deriving
    /// it.
    pub fn finalize(&mut self) -> ResponseSnapshot {
        if let Some(snapshot) = &self.snapshot {
            return snapshot.clone();
        }

        // Enforce "exactly one terminal state" regardless of what the
        // caller explicitly set: an attached error always implies failure,
        // and the absence of any explicit call implies success.
        let success = match (&self.error, self.success) {
            (Some(_), _) => false,
            (None, Some(s)) => s,
            (None, None) => true,
        };
        let error = if success { None } else { self.error.clone() };
        let exit_code = self.exit_code.unwrap_or(if success {
            EXIT_CODE_SUCCESS
        } else {
            EXIT_CODE_FAILURE
        });

        debug!(target: "clihost.response", success, exit_code, "finalizing response");

        let snapshot = ResponseSnapshot {
            success,
            exit_code,
            message: self.message.clone(),
            data: self.data.clone(),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            error,
        };
        self.state = ResponseState::Finalized;
        self.snapshot = Some(snapshot.clone());
        snapshot
    }

    /// Write the finalized snapshot to stdout as a single JSON document.
    /// Valid only when `format() == ResponseFormat::Json`.
    pub fn write_json(&mut self) -> Result<(), AlreadyFinalized> {
        if self.format != ResponseFormat::Json {
            // Not a mutation-after-finalize error in the strict sense, but
            // the same "precondition not met" shape; callers that check
            // `format()` first never hit this.
            return Err(AlreadyFinalized);
        }
        let snapshot = self.finalize();
        if !self.silent {
            let json = serde_json::to_string(&snapshot).unwrap_or_default();
            println!("{json}");
        }
        Ok(())
    }

    /// Buffered stdout content so far (without finalizing).
    #[must_use]
    pub fn stdout_so_far(&self) -> &str {
        &self.stdout
    }

    /// Buffered stderr content so far (without finalizing).
    #[must_use]
    pub fn stderr_so_far(&self) -> &str {
        &self.stderr
    }
}
