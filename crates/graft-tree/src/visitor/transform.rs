// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-kind handler dispatch for rewrite passes.
//!
//! A [`Transformer`] follows the same traversal discipline as the
//! dispatcher, but handlers return a replacement [`Rewrite`] instead of
//! performing side effects. The result is a fresh tree: input nodes are
//! never mutated, and any subtree a pass leaves alone is shared with the
//! output (`Arc`-identical), so applying a transformer with no matching
//! handlers returns the input root itself.
//!
//! # Replacement Semantics
//!
//! - A replacement produced with [`Rewrite::Replace`] has its children
//!   recursively transformed before it is finalized; the replacement node
//!   itself is not re-dispatched. [`Rewrite::Finished`] skips that
//!   recursion ("already complete").
//! - [`Rewrite::Splice`] substitutes several nodes for one and is only
//!   valid where the node sits in a sequence-valued field; [`Rewrite::Remove`]
//!   deletes the node there. In a single-node field position a removal
//!   leaves the field explicitly absent, subject to schema validation.
//! - A handler returning `Ok(None)` declines, and the node takes the
//!   default reconstruction path exactly as if no handler were registered.
//! - A replacement that carries no location of its own inherits the
//!   original node's location, so diagnostics stay anchored after
//!   rewriting.
//!
//! Reconstruction goes through the grammar's validating builder, so a
//! handler that produces a schema-invalid tree (for example, removing a
//! required child) fails with a schema violation instead of corrupting the
//! output.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use graft_core::error::{GraftError, Result};
use graft_core::schema::Grammar;

use crate::node::{Node, NodeBuilder, NodeRef, Value};

/// A handler's replacement decision.
#[derive(Debug, Clone)]
pub enum Rewrite {
    /// Replace the node; the replacement's children are then transformed.
    Replace(NodeRef),
    /// Replace the node with an already-complete subtree; nothing beneath
    /// it is touched.
    Finished(NodeRef),
    /// Replace the node with several nodes. Sequence positions only.
    Splice(Vec<NodeRef>),
    /// Remove the node.
    Remove,
}

/// A per-kind rewrite handler.
///
/// Receives the transformer (for grammar access and explicit
/// [`Transformer::rebuild`] continuation), the matched node, and the
/// caller-supplied state. Returning `Ok(None)` falls through to the
/// default reconstruction path.
pub type RewriteFn<'h, S> =
    Box<dyn Fn(&Transformer<'h, S>, &Node, &mut S) -> Result<Option<Rewrite>> + 'h>;

/// Rebuilds a tree by applying per-kind rewrite handlers, reconstructing
/// everything else through the grammar's validating builder.
pub struct Transformer<'h, S> {
    grammar: &'h Grammar,
    handlers: HashMap<String, RewriteFn<'h, S>>,
    strict: bool,
}

enum Applied {
    One(NodeRef),
    Many(Vec<NodeRef>),
    Removed,
}

impl<'h, S> Transformer<'h, S> {
    /// Create a transformer with no handlers over `grammar`.
    pub fn new(grammar: &'h Grammar) -> Self {
        Transformer {
            grammar,
            handlers: HashMap::new(),
            strict: false,
        }
    }

    /// Require a registered handler for every kind encountered.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The grammar replacements are validated against.
    pub fn grammar(&self) -> &Grammar {
        self.grammar
    }

    /// Register a handler for a kind, replacing any previous one.
    pub fn on<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Transformer<'h, S>, &Node, &mut S) -> Result<Option<Rewrite>> + 'h,
    {
        self.handlers.insert(kind.into(), Box::new(handler));
        self
    }

    /// Transform a tree, producing the new root. The input is unmodified.
    pub fn transform(&self, root: &NodeRef, state: &mut S) -> Result<NodeRef> {
        match self.apply(root, state)? {
            Applied::One(node) => Ok(node),
            Applied::Removed => Err(GraftError::RemovedRoot),
            Applied::Many(_) => Err(GraftError::SpliceOutsideSequence {
                kind: root.kind().to_string(),
                field: "<root>".to_string(),
            }),
        }
    }

    fn apply(&self, node: &NodeRef, state: &mut S) -> Result<Applied> {
        let rewrite = match self.handlers.get(node.kind()) {
            Some(handler) => handler(self, node, state)?,
            None if self.strict => return Err(GraftError::unhandled(node.kind())),
            None => None,
        };
        match rewrite {
            None => Ok(Applied::One(self.rebuild(node, state)?)),
            Some(Rewrite::Replace(replacement)) => {
                trace!(from = node.kind(), to = replacement.kind(), "rewrite");
                let replacement = inherit_location(replacement, node);
                Ok(Applied::One(self.rebuild(&replacement, state)?))
            }
            Some(Rewrite::Finished(replacement)) => {
                trace!(
                    from = node.kind(),
                    to = replacement.kind(),
                    "rewrite (finished)"
                );
                Ok(Applied::One(inherit_location(replacement, node)))
            }
            Some(Rewrite::Splice(replacements)) => {
                let mut nodes = Vec::with_capacity(replacements.len());
                for replacement in replacements {
                    let replacement = inherit_location(replacement, node);
                    nodes.push(self.rebuild(&replacement, state)?);
                }
                Ok(Applied::Many(nodes))
            }
            Some(Rewrite::Remove) => Ok(Applied::Removed),
        }
    }

    /// Default reconstruction: rebuild the node with every node-valued
    /// field replaced by the recursive transform of its child and every
    /// sequence-valued field by the concatenation of its elements' results
    /// (one-to-zero and one-to-many included). Scalars are kept. Returns
    /// the original `Arc` untouched when no child changed.
    ///
    /// Public so a handler can continue into a node explicitly and wrap
    /// the result in [`Rewrite::Finished`].
    pub fn rebuild(&self, node: &NodeRef, state: &mut S) -> Result<NodeRef> {
        let mut changed = false;
        let mut fields = Vec::with_capacity(node.fields().count());
        for (name, value) in node.fields() {
            let value = match value {
                Value::Node(child) => match self.apply(child, state)? {
                    Applied::One(new_child) => {
                        changed |= !Arc::ptr_eq(&new_child, child);
                        Value::Node(new_child)
                    }
                    Applied::Removed => {
                        changed = true;
                        Value::Absent
                    }
                    Applied::Many(_) => {
                        return Err(GraftError::SpliceOutsideSequence {
                            kind: node.kind().to_string(),
                            field: name.to_string(),
                        });
                    }
                },
                Value::Nodes(children) => {
                    let mut elements = Vec::with_capacity(children.len());
                    for child in children {
                        match self.apply(child, state)? {
                            Applied::One(new_child) => {
                                changed |= !Arc::ptr_eq(&new_child, child);
                                elements.push(new_child);
                            }
                            Applied::Removed => changed = true,
                            Applied::Many(spliced) => {
                                changed = true;
                                elements.extend(spliced);
                            }
                        }
                    }
                    Value::Nodes(elements)
                }
                other => other.clone(),
            };
            fields.push((name.to_string(), value));
        }
        if !changed {
            return Ok(Arc::clone(node));
        }
        let mut builder = NodeBuilder::new(self.grammar, node.kind());
        for (name, value) in fields {
            builder = builder.field(name, value);
        }
        builder.maybe_location(node.location()).build()
    }
}

fn inherit_location(replacement: NodeRef, original: &Node) -> NodeRef {
    if replacement.location().is_some() {
        return replacement;
    }
    match original.location() {
        Some(location) => Node::with_location(&replacement, location),
        None => replacement,
    }
}
