// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo handlers wired into [`crate::build_processor`].

use async_trait::async_trait;
use clihost_processor::{Handler, HandlerFailure, InvocationContext};
use clihost_response::Stream;

/// Writes `"hello {name}"` to stdout and `{greeted: name}` as structured
/// data.
pub struct GreetHandler;

#[async_trait]
impl Handler for GreetHandler {
    async fn process(&self, ctx: &mut InvocationContext<'_>) -> Result<(), HandlerFailure> {
        let name = ctx
            .arguments
            .get("name")
            .and_then(clihost_core::ArgValue::as_str)
            .unwrap_or("world")
            .to_string();
        ctx.response
            .log(Stream::Stdout, &format!("hello {name}"))
            .ok();
        ctx.response
            .set_data(serde_json::json!({ "greeted": name }))
            .ok();
        Ok(())
    }
}

/// Reads the resolved `main` profile (and its `dep` dependency) and prints
/// their fields, demonstrating profile dependency resolution.
pub struct ProfileDemoHandler;

#[async_trait]
impl Handler for ProfileDemoHandler {
    async fn process(&self, ctx: &mut InvocationContext<'_>) -> Result<(), HandlerFailure> {
        let Some(main) = ctx.profiles.get("main") else {
            return Err(HandlerFailure::StringReject(
                "no main profile resolved".into(),
            ));
        };
        ctx.response
            .log(
                Stream::Stdout,
                &format!("main profile: {} {:?}\n", main.name, main.fields),
            )
            .ok();
        if let Some(dep) = ctx.profiles.get("dep") {
            ctx.response
                .log(
                    Stream::Stdout,
                    &format!("dep profile: {} {:?}\n", dep.name, dep.fields),
                )
                .ok();
        }
        ctx.response
            .set_data(serde_json::json!({
                "main": main.name,
                "dep": ctx.profiles.get("dep").map(|p| p.name.clone()),
            }))
            .ok();
        Ok(())
    }
}

/// First step of `chain-demo`: produces a token for the second step to
/// consume.
pub struct ChainStepOneHandler;

#[async_trait]
impl Handler for ChainStepOneHandler {
    async fn process(&self, ctx: &mut InvocationContext<'_>) -> Result<(), HandlerFailure> {
        ctx.response.log(Stream::Stdout, "step one\n").ok();
        ctx.response
            .set_data(serde_json::json!({ "token": "T" }))
            .ok();
        Ok(())
    }
}

/// Second step of `chain-demo`: receives the prior step's token bound to
/// `auth` by the chain definition's argument mapping.
pub struct ChainStepTwoHandler;

#[async_trait]
impl Handler for ChainStepTwoHandler {
    async fn process(&self, ctx: &mut InvocationContext<'_>) -> Result<(), HandlerFailure> {
        let auth = ctx
            .arguments
            .get("auth")
            .and_then(clihost_core::ArgValue::as_str)
            .unwrap_or("")
            .to_string();
        ctx.response
            .log(Stream::Stdout, &format!("step two auth={auth}\n"))
            .ok();
        ctx.response.set_data(serde_json::json!({ "auth": auth })).ok();
        Ok(())
    }
}
