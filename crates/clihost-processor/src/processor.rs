// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Processor`]: the `validate → prepare → execute → finalize` pipeline.

use crate::cancel::CancellationToken;
use crate::error_mapping::map_handler_failure;
use crate::handler::InvocationContext;
use crate::registry::HandlerRegistry;
use clihost_core::{Arguments, CommandNode, Invocation, ProfileRequirements};
use clihost_error::{ErrorKind, ErrorRecord, ErrorSubkind};
use clihost_profile::ProfileManager;
use clihost_response::{Response, ResponseFormat, Stream};
use clihost_validate::{validate, IssueSeverity};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// The conventional `Arguments` key stdin content is stored under when a
/// command declares `reads_stdin`.
pub const STDIN_ARGUMENT_KEY: &str = "_stdin";

/// Parameters for one [`Processor::invoke`] call.
#[derive(Debug, Clone, Default)]
pub struct InvokeParams {
    /// The arguments to run with.
    pub arguments: Arguments,
    /// Requested response format; defaults to [`ResponseFormat::Default`].
    pub format: Option<ResponseFormat>,
    /// Suppress live stdout/stderr echo.
    pub silent: bool,
    /// Cooperative cancellation signal, checked at stage boundaries.
    pub cancellation: Option<CancellationToken>,
}

/// Orchestrates one command node's pipeline: validate, prepare, execute,
/// finalize. Holds everything the pipeline needs that doesn't vary between
/// invocations (the node, its tree root, the registries).
pub struct Processor {
    node: Arc<CommandNode>,
    root: Arc<CommandNode>,
    command_path: Vec<String>,
    root_command_name: String,
    default_format: ResponseFormat,
    profiles: Arc<ProfileManager>,
    handlers: Arc<HandlerRegistry>,
    invocation_lock: Mutex<()>,
}

impl Processor {
    /// Construct a processor for `node`, reachable from `root` via
    /// `command_path` (the segments resolved to get there, for help hints).
    #[must_use]
    pub fn new(
        node: Arc<CommandNode>,
        root: Arc<CommandNode>,
        command_path: Vec<String>,
        root_command_name: impl Into<String>,
        default_format: ResponseFormat,
        profiles: Arc<ProfileManager>,
        handlers: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            node,
            root,
            command_path,
            root_command_name: root_command_name.into(),
            default_format,
            profiles,
            handlers,
            invocation_lock: Mutex::new(()),
        }
    }

    /// Render help text for this node through `response`.
    pub fn help(&self, response: &mut Response) {
        let mut text = String::new();
        text.push_str(&format!("{} {}\n", self.root_command_name, self.command_path.join(" ")));
        if let Some(description) = &self.node.description {
            text.push_str(description);
            text.push('\n');
        }
        for option in &self.node.options {
            text.push_str(&format!("  --{} ({:?})\n", option.name, option.value_type));
        }
        for positional in &self.node.positionals {
            text.push_str(&format!("  <{}>\n", positional.name));
        }
        let _ = response.log(Stream::Stdout, &text);
    }

    /// Defer to the syntax validator. Returns the validator result
    /// verbatim; does not mutate `response`.
    #[must_use]
    pub fn validate(&self, args: &Arguments) -> clihost_validate::ValidationResult {
        validate(&self.node, args)
    }

    fn help_hint(&self) -> String {
        let mut segments = vec![self.root_command_name.clone()];
        segments.extend(self.command_path.iter().cloned());
        format!("Use \"{} --help\" for usage.", segments.join(" "))
    }

    /// Run the full pipeline and return the finalized, JSON-serializable
    /// snapshot.
    pub async fn invoke(&self, params: InvokeParams) -> clihost_response::ResponseSnapshot {
        let guard = match self.invocation_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let mut response = Response::new(
                    params.format.unwrap_or(self.default_format),
                    params.silent,
                );
                response
                    .set_error(
                        ErrorRecord::new(
                            ErrorKind::Internal,
                            "this Processor already has an invocation in flight",
                        )
                        .with_subkind(ErrorSubkind::Unknown),
                    )
                    .ok();
                return self.emit(&mut response);
            }
        };
        let snapshot = self.invoke_locked(params).await;
        drop(guard);
        snapshot
    }

    async fn invoke_locked(&self, params: InvokeParams) -> clihost_response::ResponseSnapshot {
        // 1. Pre-check.
        let format = params.format.unwrap_or(self.default_format);
        if self.node.invocation.is_none() {
            let mut response = Response::new(format, params.silent);
            response
                .set_error(
                    ErrorRecord::new(ErrorKind::Internal, "command node has no invocation")
                        .with_subkind(ErrorSubkind::Unknown),
                )
                .ok();
            return self.emit(&mut response);
        }

        // 2. Construct Response.
        let mut response = Response::new(format, params.silent);
        debug!(target: "clihost.processor", stage = "construct", "response constructed");

        if let Some(token) = &params.cancellation {
            if token.is_cancelled() {
                return self.emit(&mut self.cancelled_response(format, params.silent));
            }
        }

        // 3. Validate.
        debug!(target: "clihost.processor", stage = "validate", "validating arguments");
        let result = self.validate(&params.arguments);
        if !result.valid {
            response.set_message("Command syntax invalid").ok();
            let mut details = Vec::new();
            for issue in &result.issues {
                if issue.severity == IssueSeverity::Error {
                    let line = format!("{:?}: {}", issue.reason, issue.message);
                    response.log(Stream::Stderr, &format!("{line}\n")).ok();
                    details.push(line);
                }
            }
            let hint = self.help_hint();
            response.log(Stream::Stderr, &format!("{hint}\n")).ok();
            details.push(hint);
            response
                .set_error(
                    ErrorRecord::new(ErrorKind::Syntax, "Command syntax invalid")
                        .with_details(details.join("; ")),
                )
                .ok();
            warn!(target: "clihost.processor", stage = "validate", "syntax invalid");
            return self.emit(&mut response);
        }

        if let Some(token) = &params.cancellation {
            if token.is_cancelled() {
                return self.emit(&mut self.cancelled_response_from(response));
            }
        }

        // 4. Prepare.
        debug!(target: "clihost.processor", stage = "prepare", "preparing invocation");
        let mut arguments = params.arguments.clone();
        if self.node.reads_stdin {
            match Self::drain_stdin().await {
                Ok(content) => arguments.set(STDIN_ARGUMENT_KEY, content.into()),
                Err(message) => {
                    response
                        .set_error(
                            ErrorRecord::new(ErrorKind::Preparation, message)
                                .with_subkind(ErrorSubkind::StdinFailed),
                        )
                        .ok();
                    warn!(target: "clihost.processor", stage = "prepare", "stdin drain failed");
                    return self.emit(&mut response);
                }
            }
        }

        let requirements = self.node.profile.clone().unwrap_or(ProfileRequirements {
            required: Vec::new(),
            optional: Vec::new(),
        });
        let profiles = match self.profiles.resolve_requirements(&requirements).await {
            Ok(map) => map,
            Err(err) => {
                response.set_error(err).ok();
                warn!(target: "clihost.processor", stage = "prepare", "profile resolution failed");
                return self.emit(&mut response);
            }
        };

        if let Some(token) = &params.cancellation {
            if token.is_cancelled() {
                return self.emit(&mut self.cancelled_response_from(response));
            }
        }

        // 5. Execute.
        debug!(target: "clihost.processor", stage = "execute", "executing");
        match self.node.invocation.as_ref().expect("checked above") {
            Invocation::Single(handler_ref) => {
                let Some(handler) = self.handlers.get(handler_ref) else {
                    response
                        .set_error(
                            ErrorRecord::new(ErrorKind::Internal, "Handler Instantiation Failed")
                                .with_subkind(ErrorSubkind::HandlerInstantiation)
                                .with_details(handler_ref.clone()),
                        )
                        .ok();
                    return self.emit(&mut response);
                };
                let mut ctx = InvocationContext {
                    response: &mut response,
                    profiles: &profiles,
                    arguments: &arguments,
                    definition: &self.node,
                    full_definition: &self.root,
                };
                match handler.process(&mut ctx).await {
                    Ok(()) => {
                        response.succeeded().ok();
                    }
                    Err(failure) => {
                        response.set_error(map_handler_failure(failure)).ok();
                        warn!(target: "clihost.processor", stage = "execute", "handler failed");
                    }
                }
                self.emit(&mut response)
            }
            Invocation::Chained(steps) => {
                self.execute_chain(steps, &arguments, &profiles, format, params.silent, params.cancellation.as_ref())
                    .await
            }
        }
    }

    async fn execute_chain(
        &self,
        steps: &[clihost_core::ChainedStep],
        invocation_arguments: &Arguments,
        profiles: &clihost_profile::ProfileMap,
        format: ResponseFormat,
        silent: bool,
        cancellation: Option<&CancellationToken>,
    ) -> clihost_response::ResponseSnapshot {
        let mut prior_step_data: Vec<serde_json::Value> = Vec::new();
        let mut running_stdout = String::new();
        let mut running_stderr = String::new();

        for (index, step) in steps.iter().enumerate() {
            if let Some(token) = cancellation {
                if token.is_cancelled() {
                    let mut response = Response::seeded(format, silent, running_stdout, running_stderr);
                    response
                        .set_error(
                            ErrorRecord::new(ErrorKind::Internal, "invocation was cancelled")
                                .with_subkind(ErrorSubkind::Cancelled),
                        )
                        .ok();
                    return self.emit(&mut response);
                }
            }

            let step_arguments =
                clihost_chain::link_step(invocation_arguments, step, &prior_step_data);
            let mut step_response =
                Response::seeded(format, silent || step.silent, running_stdout, running_stderr);

            let Some(handler) = self.handlers.get(&step.handler_ref) else {
                step_response
                    .set_error(
                        ErrorRecord::new(ErrorKind::Internal, "Handler Instantiation Failed")
                            .with_subkind(ErrorSubkind::HandlerInstantiation)
                            .with_details(step.handler_ref.clone()),
                    )
                    .ok();
                return self.emit(&mut step_response);
            };

            let mut ctx = InvocationContext {
                response: &mut step_response,
                profiles,
                arguments: &step_arguments,
                definition: &self.node,
                full_definition: &self.root,
            };
            let outcome = handler.process(&mut ctx).await;
            match outcome {
                Ok(()) => {
                    step_response.succeeded().ok();
                }
                Err(failure) => {
                    step_response.set_error(map_handler_failure(failure)).ok();
                    warn!(target: "clihost.processor", stage = "execute", step = index, "chain step failed");
                    return self.emit(&mut step_response);
                }
            }

            let snapshot = step_response.finalize();
            prior_step_data.push(snapshot.data.clone());
            running_stdout = snapshot.stdout.clone();
            running_stderr = snapshot.stderr.clone();

            if index == steps.len() - 1 {
                let mut final_response =
                    Response::seeded(format, silent, running_stdout.clone(), running_stderr.clone());
                final_response.set_data(snapshot.data).ok();
                final_response.set_message(snapshot.message).ok();
                final_response.succeeded().ok();
                return self.emit(&mut final_response);
            }
        }

        // An empty chain cannot occur (CommandNode::validate_definition
        // rejects it), but return a degenerate success rather than panic.
        let mut response = Response::seeded(format, silent, running_stdout, running_stderr);
        response.succeeded().ok();
        self.emit(&mut response)
    }

    async fn drain_stdin() -> Result<String, String> {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|err| format!("failed to read stdin: {err}"))?;
        Ok(buf)
    }

    fn cancelled_response(&self, format: ResponseFormat, silent: bool) -> Response {
        let mut response = Response::new(format, silent);
        response
            .set_error(
                ErrorRecord::new(ErrorKind::Internal, "invocation was cancelled")
                    .with_subkind(ErrorSubkind::Cancelled),
            )
            .ok();
        response
    }

    fn cancelled_response_from(&self, mut response: Response) -> Response {
        response
            .set_error(
                ErrorRecord::new(ErrorKind::Internal, "invocation was cancelled")
                    .with_subkind(ErrorSubkind::Cancelled),
            )
            .ok();
        response
    }

    fn emit(&self, response: &mut Response) -> clihost_response::ResponseSnapshot {
        let snapshot = response.finalize();
        if response.format() == ResponseFormat::Json {
            response.write_json().ok();
        }
        snapshot
    }
}
