// SPDX-License-Identifier: MIT OR Apache-2.0
//! The command definition tree: [`CommandNode`], [`OptionSpec`],
//! [`PositionalSpec`], and the chained-handler definition ([`ChainedStep`]).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque identifier for a host-registered handler.
///
/// Resolved at invocation time against a `name/id → factory` registry
/// (see `clihost-processor::registry`) rather than by dynamic module
/// loading — the systems-language realization of a late-bound handler.
pub type HandlerRef = String;

/// Whether a [`CommandNode`] is a leaf command or a grouping node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// A node with children but no handler of its own.
    Group,
    /// A leaf node that is invoked directly.
    Command,
}

/// Declared value type for an [`OptionSpec`] or [`PositionalSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// A UTF-8 string.
    String,
    /// A numeric value.
    Number,
    /// A boolean flag.
    Boolean,
    /// An array of values of an unspecified element type.
    Array,
}

/// An inclusive numeric range constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NumericRange {
    /// Inclusive lower bound, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Inclusive cardinality constraint for an array-typed option/positional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArrayCardinality {
    /// Minimum number of elements, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    /// Maximum number of elements, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

/// A named, typed option (`--name value`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OptionSpec {
    /// Option name, without leading dashes.
    pub name: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Whether the option must be present.
    #[serde(default)]
    pub required: bool,
    /// Closed set of allowed string values, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    /// Other option names that cannot be supplied alongside this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts_with: Option<Vec<String>>,
    /// Another option that must also be present whenever this one is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implies_presence_of: Option<String>,
    /// Numeric range constraint (only meaningful for `Number`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_range: Option<NumericRange>,
    /// Cardinality constraint (only meaningful for `Array`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_cardinality: Option<ArrayCardinality>,
}

impl OptionSpec {
    /// Build a required option of the given type with no further
    /// constraints.
    #[must_use]
    pub fn required(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            required: true,
            allowed_values: None,
            conflicts_with: None,
            implies_presence_of: None,
            numeric_range: None,
            array_cardinality: None,
        }
    }

    /// Build an optional option of the given type with no further
    /// constraints.
    #[must_use]
    pub fn optional(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            required: false,
            ..Self::required(name, value_type)
        }
    }
}

/// A positional argument (occupies a slot in `positionalList` rather than
/// being named).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PositionalSpec {
    /// Name used in validator messages and help text.
    pub name: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Whether the positional must be present.
    #[serde(default)]
    pub required: bool,
    /// Closed set of allowed string values, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
}

/// A single `fromPriorStepIndex`/`jsonPath`/`toArg` binding used by the
/// chained-handler linker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArgMapping {
    /// Index into the chain's prior steps (0-based).
    pub from_prior_step_index: usize,
    /// Dotted-path / numeric-index expression evaluated against that
    /// step's structured `data` payload.
    pub json_path: String,
    /// Destination argument name in the current step's [`Arguments`].
    ///
    /// [`Arguments`]: crate::Arguments
    pub to_arg: String,
}

/// A single step in a [`CommandNode::chained_handlers`] chain.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChainedStep {
    /// Handler to invoke for this step.
    pub handler_ref: HandlerRef,
    /// Suppress this step's own console output from the final snapshot's
    /// live stream (its buffered content still accumulates).
    #[serde(default)]
    pub silent: bool,
    /// Argument bindings pulled from prior steps' structured data.
    #[serde(default)]
    pub arg_mapping: Vec<ArgMapping>,
}

/// A profile type required or optionally consulted by a command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProfileRequirements {
    /// Profile types that must resolve for the command to run.
    #[serde(default)]
    pub required: Vec<String>,
    /// Profile types that are loaded if available but do not block
    /// invocation when absent.
    #[serde(default)]
    pub optional: Vec<String>,
}

/// How a command is invoked: a single handler, or an ordered chain.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub enum Invocation {
    /// A single handler reference.
    Single(HandlerRef),
    /// An ordered chain of handlers.
    Chained(Vec<ChainedStep>),
}

/// A node in the command definition tree: a group (has children, no
/// handler) or a command (has a handler or a non-empty chain, no
/// children).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandNode {
    /// Name, unique among siblings after alias expansion.
    pub name: String,
    /// Group or command.
    pub kind: CommandKind,
    /// One-line description for help rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternative names this node also resolves under.
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    /// Declared options, in declaration order.
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    /// Declared positionals, in declaration order.
    #[serde(default)]
    pub positionals: Vec<PositionalSpec>,
    /// How to invoke this command (`Command` nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation: Option<Invocation>,
    /// Profile types this command needs resolved before invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileRequirements>,
    /// Whether this command reads stdin into its `Arguments` under a
    /// conventional key before preparation loads profiles.
    #[serde(default)]
    pub reads_stdin: bool,
    /// Child nodes (`Group` nodes only).
    #[serde(default)]
    pub children: Vec<CommandNode>,
}

/// A violated [`CommandNode`] invariant, returned by
/// [`CommandNode::validate_definition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A `command` node has neither a handler nor a chain, or has both.
    #[error("command node `{0}` must have exactly one of handlerRef or chainedHandlers")]
    InvalidInvocation(String),
    /// A `group` node has a handler, a chain, or no children.
    #[error("group node `{0}` must have no handler and at least one child")]
    InvalidGroup(String),
    /// Two siblings resolve to the same name after alias expansion.
    #[error("duplicate sibling name `{0}` under `{1}` (after alias expansion)")]
    DuplicateSiblingName(String, String),
    /// A chained step's `fromPriorStepIndex` is not less than its own
    /// position in the chain.
    #[error("chained step {step} in `{0}` references non-prior step index {from}", step = .1, from = .2)]
    NonPriorStepReference(String, usize, usize),
}

impl CommandNode {
    /// Recursively validate the invariants in spec.md §3: a `command` node
    /// has either `handlerRef` or a non-empty `chainedHandlers`, never
    /// both; `group` nodes have at least one child and no handler; names
    /// are unique among siblings after alias expansion.
    pub fn validate_definition(&self) -> Result<(), DefinitionError> {
        match self.kind {
            CommandKind::Command => match &self.invocation {
                Some(Invocation::Single(_)) => {}
                Some(Invocation::Chained(steps)) if !steps.is_empty() => {
                    for (i, step) in steps.iter().enumerate() {
                        for mapping in &step.arg_mapping {
                            if mapping.from_prior_step_index >= i {
                                return Err(DefinitionError::NonPriorStepReference(
                                    self.name.clone(),
                                    i,
                                    mapping.from_prior_step_index,
                                ));
                            }
                        }
                    }
                }
                _ => return Err(DefinitionError::InvalidInvocation(self.name.clone())),
            },
            CommandKind::Group => {
                if self.invocation.is_some() || self.children.is_empty() {
                    return Err(DefinitionError::InvalidGroup(self.name.clone()));
                }
            }
        }

        let mut seen = BTreeSet::new();
        for child in &self.children {
            for name in std::iter::once(&child.name).chain(child.aliases.iter()) {
                if !seen.insert(name.clone()) {
                    return Err(DefinitionError::DuplicateSiblingName(
                        name.clone(),
                        self.name.clone(),
                    ));
                }
            }
            child.validate_definition()?;
        }
        Ok(())
    }

    /// Resolve a dotted command path against this node (the root),
    /// expanding aliases at each level.
    #[must_use]
    pub fn resolve_path<'a>(&'a self, path: &[impl AsRef<str>]) -> Option<&'a CommandNode> {
        let mut current = self;
        for segment in path {
            let segment = segment.as_ref();
            current = current
                .children
                .iter()
                .find(|c| c.name == segment || c.aliases.contains(segment))?;
        }
        Some(current)
    }

    /// Find an option spec by name, including its aliases' options (an
    /// option has no aliases itself; this simply looks up by declared
    /// name).
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }
}
