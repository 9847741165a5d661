// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-kind handler dispatch for analysis passes.
//!
//! A [`Dispatcher`] applies per-kind logic to every node in a tree while
//! defaulting to transparent descent for kinds without custom logic. It
//! holds no traversal state of its own: side effects accumulate in a
//! caller-supplied state value threaded through every handler, so one
//! dispatcher can serve many trees (and many threads, one tree each).
//!
//! # Explicit Continuation
//!
//! A registered handler fully owns descent for its node. If it wants the
//! children visited it must say so by calling [`Dispatcher::descend`] —
//! returning without doing so prunes the subtree. Kinds with no handler
//! descend generically, so an empty dispatcher reaches every node.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = Dispatcher::new()
//!     .on("call", |d, node, calls: &mut usize| {
//!         *calls += 1;
//!         d.descend(node, calls)
//!     });
//! let mut calls = 0;
//! dispatcher.dispatch(&root, &mut calls)?;
//! ```

use std::collections::HashMap;

use tracing::trace;

use graft_core::error::{GraftError, Result};

use crate::node::Node;

/// A per-kind visit handler.
///
/// Receives the dispatcher (for explicit recursive descent), the matched
/// node, and the caller-supplied state.
pub type VisitFn<'h, S> = Box<dyn Fn(&Dispatcher<'h, S>, &Node, &mut S) -> Result<()> + 'h>;

/// Applies per-kind handlers over a tree, with generic descent as the
/// default for kinds without one.
pub struct Dispatcher<'h, S> {
    handlers: HashMap<String, VisitFn<'h, S>>,
    strict: bool,
}

impl<S> Default for Dispatcher<'_, S> {
    fn default() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            strict: false,
        }
    }
}

impl<'h, S> Dispatcher<'h, S> {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Dispatcher::default()
    }

    /// Require a registered handler for every kind encountered. Without
    /// this, unregistered kinds fall through to generic descent silently.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register a handler for a kind, replacing any previous one.
    pub fn on<F>(mut self, kind: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Dispatcher<'h, S>, &Node, &mut S) -> Result<()> + 'h,
    {
        self.handlers.insert(kind.into(), Box::new(handler));
        self
    }

    /// Dispatch on a node: its kind's handler if registered, generic
    /// descent otherwise.
    pub fn dispatch(&self, node: &Node, state: &mut S) -> Result<()> {
        match self.handlers.get(node.kind()) {
            Some(handler) => handler(self, node, state),
            None if self.strict => Err(GraftError::unhandled(node.kind())),
            None => {
                trace!(kind = node.kind(), "no handler, descending generically");
                self.descend(node, state)
            }
        }
    }

    /// Generic descent: dispatch on each child node in field order. A node
    /// with no children is a no-op.
    pub fn descend(&self, node: &Node, state: &mut S) -> Result<()> {
        for child in node.children() {
            self.dispatch(child, state)?;
        }
        Ok(())
    }
}
