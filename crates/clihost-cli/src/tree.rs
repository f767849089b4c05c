// SPDX-License-Identifier: MIT OR Apache-2.0
//! The demo command tree: `greet`, `profile-demo`, `chain-demo`.

use clihost_core::{
    ArgMapping, ChainedStep, CommandKind, CommandNode, Invocation, OptionSpec, ProfileRequirements,
    ValueType,
};
use std::collections::BTreeSet;

/// Build the root of the demo command tree. Panics if the tree violates
/// [`CommandNode::validate_definition`] — a programmer error, not a runtime
/// condition.
#[must_use]
pub fn build_root() -> CommandNode {
    let root = CommandNode {
        name: "clihost".into(),
        kind: CommandKind::Group,
        description: Some("Demo host for the clihost command processor".into()),
        aliases: BTreeSet::new(),
        options: vec![],
        positionals: vec![],
        invocation: None,
        profile: None,
        reads_stdin: false,
        children: vec![greet_node(), profile_demo_node(), chain_demo_node()],
    };
    root.validate_definition()
        .expect("demo command tree must satisfy CommandNode invariants");
    root
}

fn greet_node() -> CommandNode {
    CommandNode {
        name: "greet".into(),
        kind: CommandKind::Command,
        description: Some("Print a greeting".into()),
        aliases: BTreeSet::new(),
        options: vec![OptionSpec::required("name", ValueType::String)],
        positionals: vec![],
        invocation: Some(Invocation::Single("greet".into())),
        profile: None,
        reads_stdin: false,
        children: vec![],
    }
}

fn profile_demo_node() -> CommandNode {
    CommandNode {
        name: "profile-demo".into(),
        kind: CommandKind::Command,
        description: Some("Resolve the main profile and its dependencies".into()),
        aliases: BTreeSet::new(),
        options: vec![],
        positionals: vec![],
        invocation: Some(Invocation::Single("profile-demo".into())),
        profile: Some(ProfileRequirements {
            required: vec!["main".into()],
            optional: vec![],
        }),
        reads_stdin: false,
        children: vec![],
    }
}

fn chain_demo_node() -> CommandNode {
    CommandNode {
        name: "chain-demo".into(),
        kind: CommandKind::Command,
        description: Some("Run a two-step chained handler".into()),
        aliases: BTreeSet::new(),
        options: vec![],
        positionals: vec![],
        invocation: Some(Invocation::Chained(vec![
            ChainedStep {
                handler_ref: "chain-step-one".into(),
                silent: false,
                arg_mapping: vec![],
            },
            ChainedStep {
                handler_ref: "chain-step-two".into(),
                silent: false,
                arg_mapping: vec![ArgMapping {
                    from_prior_step_index: 0,
                    json_path: "token".into(),
                    to_arg: "auth".into(),
                }],
            },
        ])),
        profile: None,
        reads_stdin: false,
        children: vec![],
    }
}
