// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! clihost-validate
#![deny(unsafe_code)]
#![warn(missing_docs)]

use clihost_core::{ArgValue, Arguments, CommandNode, OptionSpec, PositionalSpec, ValueType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How serious a reported [`Issue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Invalidates the command; the invocation must not proceed.
    Error,
    /// Informational; does not by itself invalidate the command.
    Warning,
}

/// The closed set of reasons an [`Issue`] can be raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    /// A required option or positional was not supplied.
    Missing,
    /// The supplied value could not be parsed as the declared type.
    TypeMismatch,
    /// `allowedValues` is present and the value isn't in it.
    NotAllowedValue,
    /// Two options in each other's `conflictsWith` were both supplied.
    Conflict,
    /// `impliesPresenceOf` names an option missing while its source is
    /// present.
    ImpliedMissing,
    /// A numeric `numericRange` was violated.
    RangeViolation,
    /// An array `arrayCardinality` was violated.
    ArrayCardinality,
    /// An option name present in `Arguments` names no declared option.
    UnknownOption,
}

/// A single violation found against an option or positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    /// How serious this issue is.
    pub severity: IssueSeverity,
    /// Name of the offending option or positional, or `None` for issues not
    /// tied to a single named slot (there are none in the current reason
    /// set, but the field stays optional for forward compatibility).
    pub option_or_positional: Option<String>,
    /// Why this issue was raised.
    pub reason: IssueReason,
    /// Renderable, human-readable message.
    pub message: String,
}

impl Issue {
    fn new(
        severity: IssueSeverity,
        option_or_positional: impl Into<String>,
        reason: IssueReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            option_or_positional: Some(option_or_positional.into()),
            reason,
            message: message.into(),
        }
    }
}

/// The result of validating an [`Arguments`] value against a [`CommandNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    /// `true` iff no [`IssueSeverity::Error`] issue was reported.
    pub valid: bool,
    /// Every issue found, in the order the corresponding spec/positional was
    /// declared.
    pub issues: Vec<Issue>,
}

fn type_matches(value: &ArgValue, expected: ValueType) -> bool {
    match (value, expected) {
        (ArgValue::Null, _) => true,
        (ArgValue::String(_), ValueType::String) => true,
        (ArgValue::Number(_), ValueType::Number) => true,
        (ArgValue::Bool(_), ValueType::Boolean) => true,
        (ArgValue::Array(_), ValueType::Array) => true,
        _ => false,
    }
}

fn allowed_value_ok(value: &ArgValue, allowed: &[String]) -> bool {
    match value.as_str() {
        Some(s) => allowed.iter().any(|a| a == s),
        None => true,
    }
}

fn validate_option(args: &Arguments, spec: &OptionSpec, issues: &mut Vec<Issue>) {
    let value = args.get(&spec.name);
    let present = args.is_present(&spec.name);

    if spec.required && !present {
        issues.push(Issue::new(
            IssueSeverity::Error,
            &spec.name,
            IssueReason::Missing,
            format!("option `{}` is required", spec.name),
        ));
        return;
    }

    let Some(value) = value.filter(|_| present) else {
        return;
    };

    if !type_matches(value, spec.value_type) {
        issues.push(Issue::new(
            IssueSeverity::Error,
            &spec.name,
            IssueReason::TypeMismatch,
            format!("option `{}` expects {:?}", spec.name, spec.value_type),
        ));
        return;
    }

    if let Some(allowed) = &spec.allowed_values {
        if !allowed_value_ok(value, allowed) {
            issues.push(Issue::new(
                IssueSeverity::Error,
                &spec.name,
                IssueReason::NotAllowedValue,
                format!(
                    "option `{}` must be one of: {}",
                    spec.name,
                    allowed.join(", ")
                ),
            ));
        }
    }

    if let Some(implied) = &spec.implies_presence_of {
        if !args.is_present(implied) {
            issues.push(Issue::new(
                IssueSeverity::Error,
                &spec.name,
                IssueReason::ImpliedMissing,
                format!(
                    "option `{}` requires `{}` to also be present",
                    spec.name, implied
                ),
            ));
        }
    }

    if let Some(range) = &spec.numeric_range {
        if let Some(n) = value.as_f64() {
            let below = range.min.is_some_and(|min| n < min);
            let above = range.max.is_some_and(|max| n > max);
            if below || above {
                issues.push(Issue::new(
                    IssueSeverity::Error,
                    &spec.name,
                    IssueReason::RangeViolation,
                    format!("option `{}` is outside its allowed range", spec.name),
                ));
            }
        }
    }

    if let Some(card) = &spec.array_cardinality {
        if let Some(items) = value.as_array() {
            let len = items.len();
            let below = card.min.is_some_and(|min| len < min);
            let above = card.max.is_some_and(|max| len > max);
            if below || above {
                issues.push(Issue::new(
                    IssueSeverity::Error,
                    &spec.name,
                    IssueReason::ArrayCardinality,
                    format!("option `{}` has an invalid number of elements", spec.name),
                ));
            }
        }
    }
}

/// Conflicts are reported once per unordered pair: only when the *first*
/// occurrence of the pair (by declaration order of `spec.conflicts_with`)
/// is walked, and only when the conflicting name sorts after the current
/// one or hasn't already produced this pair's issue.
fn validate_conflicts(args: &Arguments, options: &[OptionSpec], issues: &mut Vec<Issue>) {
    let mut reported = std::collections::BTreeSet::new();
    for spec in options {
        if !args.is_present(&spec.name) {
            continue;
        }
        let Some(conflicts) = &spec.conflicts_with else {
            continue;
        };
        for other in conflicts {
            if !args.is_present(other) {
                continue;
            }
            let pair = if spec.name < *other {
                (spec.name.clone(), other.clone())
            } else {
                (other.clone(), spec.name.clone())
            };
            if !reported.insert(pair.clone()) {
                continue;
            }
            issues.push(Issue::new(
                IssueSeverity::Error,
                spec.name.clone(),
                IssueReason::Conflict,
                format!("options `{}` and `{}` cannot both be set", pair.0, pair.1),
            ));
        }
    }
}

fn validate_positional(value: Option<&ArgValue>, spec: &PositionalSpec, issues: &mut Vec<Issue>) {
    let present = value.is_some_and(|v| !v.is_null());
    if spec.required && !present {
        issues.push(Issue::new(
            IssueSeverity::Error,
            &spec.name,
            IssueReason::Missing,
            format!("positional `{}` is required", spec.name),
        ));
        return;
    }
    let Some(value) = value.filter(|_| present) else {
        return;
    };
    if !type_matches(value, spec.value_type) {
        issues.push(Issue::new(
            IssueSeverity::Error,
            &spec.name,
            IssueReason::TypeMismatch,
            format!("positional `{}` expects {:?}", spec.name, spec.value_type),
        ));
        return;
    }
    if let Some(allowed) = &spec.allowed_values {
        if !allowed_value_ok(value, allowed) {
            issues.push(Issue::new(
                IssueSeverity::Error,
                &spec.name,
                IssueReason::NotAllowedValue,
                format!(
                    "positional `{}` must be one of: {}",
                    spec.name,
                    allowed.join(", ")
                ),
            ));
        }
    }
}

fn validate_unknown_options(args: &Arguments, options: &[OptionSpec], issues: &mut Vec<Issue>) {
    for name in args.options.keys() {
        if name == "_" {
            continue;
        }
        if !options.iter().any(|o| &o.name == name) {
            issues.push(Issue::new(
                IssueSeverity::Error,
                name.clone(),
                IssueReason::UnknownOption,
                format!("unknown option `{name}`"),
            ));
        }
    }
}

/// Validate `args` against `node`'s declared options and positionals.
///
/// Total, deterministic, and pure: every violation is reported (nothing
/// short-circuits), the same inputs always produce the same issues in the
/// same order, and no I/O is performed.
#[must_use]
pub fn validate(node: &CommandNode, args: &Arguments) -> ValidationResult {
    let mut issues = Vec::new();

    for spec in &node.options {
        validate_option(args, spec, &mut issues);
    }
    validate_conflicts(args, &node.options, &mut issues);
    for (i, spec) in node.positionals.iter().enumerate() {
        validate_positional(args.positional_list.get(i), spec, &mut issues);
    }
    validate_unknown_options(args, &node.options, &mut issues);

    let valid = issues
        .iter()
        .all(|issue| issue.severity != IssueSeverity::Error);

    ValidationResult { valid, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clihost_core::{ArrayCardinality, CommandKind, Invocation, NumericRange};
    use std::collections::BTreeSet;

    fn node(options: Vec<OptionSpec>, positionals: Vec<PositionalSpec>) -> CommandNode {
        CommandNode {
            name: "greet".into(),
            kind: CommandKind::Command,
            description: None,
            aliases: BTreeSet::new(),
            options,
            positionals,
            invocation: Some(Invocation::Single("h1".into())),
            profile: None,
            reads_stdin: false,
            children: Vec::new(),
        }
    }

    #[test]
    fn missing_required_option_is_reported() {
        let n = node(vec![OptionSpec::required("name", ValueType::String)], vec![]);
        let result = validate(&n, &Arguments::new());
        assert!(!result.valid);
        assert_eq!(result.issues[0].reason, IssueReason::Missing);
    }

    #[test]
    fn type_mismatch_is_reported() {
        let n = node(vec![OptionSpec::required("count", ValueType::Number)], vec![]);
        let mut args = Arguments::new();
        args.set("count", ArgValue::String("five".into()));
        let result = validate(&n, &args);
        assert!(!result.valid);
        assert_eq!(result.issues[0].reason, IssueReason::TypeMismatch);
    }

    #[test]
    fn allowed_values_rejects_out_of_set() {
        let mut spec = OptionSpec::optional("color", ValueType::String);
        spec.allowed_values = Some(vec!["red".into(), "blue".into()]);
        let n = node(vec![spec], vec![]);
        let mut args = Arguments::new();
        args.set("color", ArgValue::String("green".into()));
        let result = validate(&n, &args);
        assert!(!result.valid);
        assert_eq!(result.issues[0].reason, IssueReason::NotAllowedValue);
    }

    #[test]
    fn conflict_is_reported_once_per_pair() {
        let mut a = OptionSpec::optional("a", ValueType::Boolean);
        a.conflicts_with = Some(vec!["b".into()]);
        let mut b = OptionSpec::optional("b", ValueType::Boolean);
        b.conflicts_with = Some(vec!["a".into()]);
        let n = node(vec![a, b], vec![]);
        let mut args = Arguments::new();
        args.set("a", ArgValue::Bool(true));
        args.set("b", ArgValue::Bool(true));
        let result = validate(&n, &args);
        let conflicts: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.reason == IssueReason::Conflict)
            .collect();
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn implies_presence_of_reports_when_source_present_target_absent() {
        let mut spec = OptionSpec::optional("token", ValueType::String);
        spec.implies_presence_of = Some("issuer".into());
        let n = node(vec![spec], vec![]);
        let mut args = Arguments::new();
        args.set("token", ArgValue::String("x".into()));
        let result = validate(&n, &args);
        assert!(!result.valid);
        assert_eq!(result.issues[0].reason, IssueReason::ImpliedMissing);
    }

    #[test]
    fn numeric_range_violation_is_reported() {
        let mut spec = OptionSpec::optional("count", ValueType::Number);
        spec.numeric_range = Some(NumericRange {
            min: Some(1.0),
            max: Some(10.0),
        });
        let n = node(vec![spec], vec![]);
        let mut args = Arguments::new();
        args.set("count", ArgValue::Number(20.0));
        let result = validate(&n, &args);
        assert_eq!(result.issues[0].reason, IssueReason::RangeViolation);
    }

    #[test]
    fn array_cardinality_violation_is_reported() {
        let mut spec = OptionSpec::optional("tags", ValueType::Array);
        spec.array_cardinality = Some(ArrayCardinality {
            min: Some(2),
            max: None,
        });
        let n = node(vec![spec], vec![]);
        let mut args = Arguments::new();
        args.set("tags", ArgValue::Array(vec![ArgValue::String("x".into())]));
        let result = validate(&n, &args);
        assert_eq!(result.issues[0].reason, IssueReason::ArrayCardinality);
    }

    #[test]
    fn unknown_option_is_reported_and_underscore_key_is_exempt() {
        let n = node(vec![], vec![]);
        let mut args = Arguments::new();
        args.set("bogus", ArgValue::String("x".into()));
        args.set("_", ArgValue::Array(vec!["greet".into()]));
        let result = validate(&n, &args);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].reason, IssueReason::UnknownOption);
    }

    #[test]
    fn validation_is_total_not_short_circuited() {
        let mut spec = OptionSpec::required("name", ValueType::String);
        spec.allowed_values = Some(vec!["ada".into()]);
        let n = node(
            vec![spec],
            vec![PositionalSpec {
                name: "target".into(),
                value_type: ValueType::String,
                required: true,
                allowed_values: None,
            }],
        );
        // Missing both the required option and the required positional,
        // plus an unknown option: every violation should be present at once.
        let mut args = Arguments::new();
        args.set("unknown", ArgValue::String("y".into()));
        let result = validate(&n, &args);
        assert!(!result.valid);
        assert_eq!(result.issues.len(), 3);
    }

    #[test]
    fn validation_is_pure_and_deterministic() {
        let n = node(vec![OptionSpec::required("name", ValueType::String)], vec![]);
        let mut args = Arguments::new();
        args.set("name", ArgValue::String("Ada".into()));
        let first = validate(&n, &args);
        let second = validate(&n, &args);
        assert_eq!(first, second);
        assert!(first.valid);
    }
}
