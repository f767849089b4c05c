// SPDX-License-Identifier: MIT OR Apache-2.0
//! Prepared-tree emission: propagates inherited options down from group
//! nodes to their descendants and materializes alias lookup tables, so the
//! syntax validator and the processor never re-walk ancestors at
//! invocation time.

use crate::command::{CommandKind, CommandNode, OptionSpec};
use std::collections::BTreeMap;

/// A post-processed [`CommandNode`] with inherited options folded in and
/// an alias → child-index lookup table materialized.
///
/// Building a [`PreparedTree`] is idempotent: preparing an already-prepared
/// tree's underlying node again yields an equal result, because option
/// inheritance is a last-writer-wins merge keyed by option name rather
/// than a naive concatenation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedNode {
    /// The original node this was prepared from.
    pub node: CommandNode,
    /// This node's own options merged with every ancestor group's options
    /// (own options win on name collision).
    pub effective_options: Vec<OptionSpec>,
    /// Alias (and own name) → index into `children`, for O(1) resolution.
    pub alias_index: BTreeMap<String, usize>,
    /// Prepared children, in declaration order.
    pub children: Vec<PreparedNode>,
}

impl PreparedNode {
    /// Look up a child by name or alias.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&PreparedNode> {
        self.alias_index.get(name).map(|&i| &self.children[i])
    }
}

/// Prepare a [`CommandNode`] tree rooted at `root`.
#[must_use]
pub fn prepare(root: &CommandNode) -> PreparedNode {
    prepare_with_inherited(root, &BTreeMap::new())
}

fn prepare_with_inherited(
    node: &CommandNode,
    inherited: &BTreeMap<String, OptionSpec>,
) -> PreparedNode {
    let mut merged = inherited.clone();
    for opt in &node.options {
        merged.insert(opt.name.clone(), opt.clone());
    }

    let mut alias_index = BTreeMap::new();
    for (i, child) in node.children.iter().enumerate() {
        alias_index.insert(child.name.clone(), i);
        for alias in &child.aliases {
            alias_index.insert(alias.clone(), i);
        }
    }

    // Group nodes propagate `merged` (their own + ancestors') downward;
    // command nodes are leaves so the distinction only matters for the
    // recursive call below, which always passes `merged` regardless of
    // kind — a command node simply has no children to propagate to.
    let _ = node.kind;

    let children = node
        .children
        .iter()
        .map(|c| prepare_with_inherited(c, &merged))
        .collect();

    let effective_options: Vec<OptionSpec> = merged.into_values().collect();

    PreparedNode {
        node: node.clone(),
        effective_options,
        alias_index,
        children,
    }
}

/// Re-run [`prepare`] treating `tree.node` as authoritative. Exists to make
/// the idempotency invariant explicit and directly testable, rather than
/// leaving it implicit in [`prepare`]'s merge semantics.
#[must_use]
pub fn reprepare(tree: &PreparedNode) -> PreparedNode {
    prepare(&tree.node)
}
