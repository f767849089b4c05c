// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`link_step`]: computing one chain step's [`Arguments`] from the
//! invocation's own arguments plus prior steps' structured data.

use crate::path::evaluate;
use clihost_core::{ArgValue, Arguments, ChainedStep};
use serde_json::Value;

/// Compute the [`Arguments`] for one chain step.
///
/// 1. Starts from a shallow copy of the top-level invocation's `Arguments`.
/// 2. For each `arg_mapping` entry, evaluates `json_path` against
///    `prior_step_data[from_prior_step_index]` and binds the result at
///    `to_arg`, replacing any existing binding.
/// 3. A path that doesn't resolve binds [`ArgValue::Null`].
///
/// Deterministic and pure.
#[must_use]
pub fn link_step(
    invocation_arguments: &Arguments,
    step: &ChainedStep,
    prior_step_data: &[Value],
) -> Arguments {
    let mut args = invocation_arguments.shallow_copy();
    for mapping in &step.arg_mapping {
        let source = prior_step_data
            .get(mapping.from_prior_step_index)
            .unwrap_or(&Value::Null);
        let resolved = evaluate(source, &mapping.json_path);
        args.set(mapping.to_arg.clone(), ArgValue::from_json(&resolved));
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use clihost_core::ArgMapping;
    use serde_json::json;

    fn step(mappings: Vec<ArgMapping>) -> ChainedStep {
        ChainedStep {
            handler_ref: "h2".into(),
            silent: false,
            arg_mapping: mappings,
        }
    }

    #[test]
    fn binds_value_from_prior_step_data() {
        let mut invocation = Arguments::new();
        invocation.set("existing", ArgValue::String("kept".into()));
        let prior = vec![json!({"token": "abc123"})];
        let s = step(vec![ArgMapping {
            from_prior_step_index: 0,
            json_path: "token".into(),
            to_arg: "auth".into(),
        }]);

        let result = link_step(&invocation, &s, &prior);
        assert_eq!(result.get("auth"), Some(&ArgValue::String("abc123".into())));
        assert_eq!(result.get("existing"), Some(&ArgValue::String("kept".into())));
    }

    #[test]
    fn missing_path_binds_null() {
        let invocation = Arguments::new();
        let prior = vec![json!({"token": "abc123"})];
        let s = step(vec![ArgMapping {
            from_prior_step_index: 0,
            json_path: "nonexistent".into(),
            to_arg: "auth".into(),
        }]);
        let result = link_step(&invocation, &s, &prior);
        assert_eq!(result.get("auth"), Some(&ArgValue::Null));
    }

    #[test]
    fn mapping_overrides_existing_binding() {
        let mut invocation = Arguments::new();
        invocation.set("auth", ArgValue::String("stale".into()));
        let prior = vec![json!({"token": "fresh"})];
        let s = step(vec![ArgMapping {
            from_prior_step_index: 0,
            json_path: "token".into(),
            to_arg: "auth".into(),
        }]);
        let result = link_step(&invocation, &s, &prior);
        assert_eq!(result.get("auth"), Some(&ArgValue::String("fresh".into())));
    }

    #[test]
    fn out_of_range_step_index_binds_null() {
        let invocation = Arguments::new();
        let s = step(vec![ArgMapping {
            from_prior_step_index: 3,
            json_path: "token".into(),
            to_arg: "auth".into(),
        }]);
        let result = link_step(&invocation, &s, &[]);
        assert_eq!(result.get("auth"), Some(&ArgValue::Null));
    }

    #[test]
    fn no_mappings_returns_shallow_copy_of_invocation_arguments() {
        let mut invocation = Arguments::new();
        invocation.set("name", ArgValue::String("ada".into()));
        let s = step(vec![]);
        let result = link_step(&invocation, &s, &[]);
        assert_eq!(result, invocation);
    }
}
