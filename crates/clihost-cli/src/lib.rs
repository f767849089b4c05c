// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-cli
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Demo [`clihost_processor::Handler`] implementations.
pub mod handlers;
/// The demo command tree ([`tree::build_root`]).
pub mod tree;

use clihost_credential::InertCredentialManager;
use clihost_processor::{HandlerRegistry, Processor};
use clihost_profile::{MapProfileStore, ProfileDefinition, ProfileDependency, ProfileManager};
use clihost_response::ResponseFormat;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The resolved command path for each demo command, used to build the
/// `--help` hint text.
const ROOT_NAME: &str = "clihost";

/// Seed the in-memory profile store with the `main:m1 -> dep:d1` chain
/// `profile-demo` exercises.
async fn seed_demo_profiles(store: &MapProfileStore) {
    let mut dep = ProfileDefinition::new("d1", "dep");
    dep.fields
        .insert("region".into(), serde_json::json!("us-east-1"));
    store.put(dep).await;
    store.set_default("dep", "d1").await;

    let mut main = ProfileDefinition::new("m1", "main");
    main.fields
        .insert("account".into(), serde_json::json!("demo-account"));
    main.dependencies.push(ProfileDependency {
        profile_type: "dep".into(),
        name: "d1".into(),
    });
    store.put(main).await;
    store.set_default("main", "m1").await;
}

/// Build a [`Processor`] bound to the demo command at `command_path`
/// (e.g. `["greet"]`), wired with the demo handler registry and seeded
/// profile store. Returns `None` if no such command exists.
pub async fn build_processor(
    command_path: Vec<String>,
    default_format: ResponseFormat,
) -> Option<Processor> {
    let root = Arc::new(tree::build_root());
    let node = root.resolve_path(&command_path)?.clone();
    let node = Arc::new(node);

    let mut handlers = HandlerRegistry::new();
    handlers.register("greet", handlers::GreetHandler);
    handlers.register("profile-demo", handlers::ProfileDemoHandler);
    handlers.register("chain-step-one", handlers::ChainStepOneHandler);
    handlers.register("chain-step-two", handlers::ChainStepTwoHandler);

    let store = MapProfileStore::new();
    seed_demo_profiles(&store).await;
    let profiles = Arc::new(ProfileManager::new(
        Arc::new(store),
        Arc::new(InertCredentialManager::new()),
    ));

    Some(Processor::new(
        node,
        root,
        command_path,
        ROOT_NAME,
        default_format,
        profiles,
        Arc::new(handlers),
    ))
}

/// Build the `tracing_subscriber` filter for `--debug`, matching the
/// `clihost=debug` / `clihost=info` density used across this workspace.
#[must_use]
pub fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("clihost=debug")
    } else {
        EnvFilter::new("clihost=info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clihost_core::{ArgValue, Arguments};
    use clihost_processor::InvokeParams;

    #[tokio::test]
    async fn single_successful_command_scenario() {
        let processor = build_processor(vec!["greet".into()], ResponseFormat::Default)
            .await
            .unwrap();
        let mut arguments = Arguments::new();
        arguments.set("name", ArgValue::String("Ada".into()));
        let snapshot = processor
            .invoke(InvokeParams {
                arguments,
                format: Some(ResponseFormat::Default),
                silent: true,
                cancellation: None,
            })
            .await;
        assert!(snapshot.success);
        assert_eq!(snapshot.exit_code, 0);
        assert_eq!(snapshot.stdout, "hello Ada");
        assert_eq!(snapshot.data, serde_json::json!({"greeted": "Ada"}));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn syntax_failure_missing_required_option_scenario() {
        let processor = build_processor(vec!["greet".into()], ResponseFormat::Default)
            .await
            .unwrap();
        let snapshot = processor
            .invoke(InvokeParams {
                arguments: Arguments::new(),
                format: Some(ResponseFormat::Default),
                silent: true,
                cancellation: None,
            })
            .await;
        assert!(!snapshot.success);
        assert_eq!(snapshot.exit_code, 1);
        assert_eq!(
            snapshot.error.as_ref().unwrap().kind,
            clihost_error::ErrorKind::Syntax
        );
        assert!(snapshot.stderr.contains("name"));
        assert!(snapshot.stderr.contains(r#"clihost greet --help"#));
    }

    #[tokio::test]
    async fn profile_dependency_success_scenario() {
        let processor = build_processor(vec!["profile-demo".into()], ResponseFormat::Default)
            .await
            .unwrap();
        let snapshot = processor
            .invoke(InvokeParams {
                arguments: Arguments::new(),
                format: Some(ResponseFormat::Default),
                silent: true,
                cancellation: None,
            })
            .await;
        assert!(snapshot.success);
        assert!(snapshot.stdout.contains("main profile: m1"));
        assert!(snapshot.stdout.contains("dep profile: d1"));
    }

    #[tokio::test]
    async fn chained_handlers_scenario() {
        let processor = build_processor(vec!["chain-demo".into()], ResponseFormat::Default)
            .await
            .unwrap();
        let snapshot = processor
            .invoke(InvokeParams {
                arguments: Arguments::new(),
                format: Some(ResponseFormat::Default),
                silent: true,
                cancellation: None,
            })
            .await;
        assert!(snapshot.success);
        let step_one = snapshot.stdout.find("step one").unwrap();
        let step_two = snapshot.stdout.find("step two auth=T").unwrap();
        assert!(step_one < step_two);
    }

    #[tokio::test]
    async fn unknown_command_path_resolves_to_none() {
        assert!(
            build_processor(vec!["nonexistent".into()], ResponseFormat::Default)
                .await
                .is_none()
        );
    }
}
