// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A schema-driven syntax tree engine: tagged nodes, generic traversal,
//! and structure-preserving rewriting.
//!
//! An external parser produces a tree (as a JSON document or directly
//! through the validating builder), analysis passes walk it, and rewrite
//! passes build a fresh tree with targeted subtrees replaced — ready for an
//! external serializer. The node taxonomy is not hard-coded: a [`Grammar`]
//! declares the kinds and their fields, and every node is validated against
//! it at construction.
//!
//! # Overview
//!
//! - **Trees**: [`Node`]/[`NodeRef`]/[`Value`] in [`node`], built through
//!   [`NodeBuilder`], exchanged as JSON via [`json`].
//! - **Traversal**: [`walk`] yields every node lazily in depth-first
//!   pre-order.
//! - **Analysis**: [`Dispatcher`] applies per-kind handlers with generic
//!   descent as the default; [`count_matches`] and [`KindTally`] are thin
//!   metrics clients on the walker.
//! - **Rewriting**: [`Transformer`] replaces nodes without ever mutating
//!   the input tree; [`SliceRewrite`] is the bundled migration rule turning
//!   range-slice subscripts into iterator-slicing calls.
//!
//! # Quick Start
//!
//! ```
//! use graft_tree::{walk, FieldShape, FieldSpec, Grammar, NodeBuilder};
//!
//! let mut grammar = Grammar::new();
//! grammar.declare("name", vec![FieldSpec::required("id", FieldShape::Scalar)]);
//! grammar.declare("list", vec![FieldSpec::required("elts", FieldShape::NodeList)]);
//!
//! let xs = NodeBuilder::new(&grammar, "name").field("id", "xs").build()?;
//! let ys = NodeBuilder::new(&grammar, "name").field("id", "ys").build()?;
//! let list = NodeBuilder::new(&grammar, "list")
//!     .field("elts", vec![xs, ys])
//!     .build()?;
//!
//! assert_eq!(walk(&list).count(), 3);
//! assert_eq!(graft_tree::count_matches(&list, |n| n.kind() == "name"), 2);
//! # Ok::<(), graft_tree::GraftError>(())
//! ```
//!
//! # Concurrency
//!
//! Traversal within one tree is strictly sequential — ordering is part of
//! the contract. Across trees there is nothing to share: trees are
//! immutable and `Send`, transformation reads one tree and produces
//! another, so a corpus parallelizes one-tree-per-task with no locking.

pub mod json;
pub mod node;
pub mod visitor;
pub mod walk;

pub use graft_core::error::{GraftError, Result};
pub use graft_core::location::Location;
pub use graft_core::schema::{FieldShape, FieldSpec, Grammar, KindSpec};

pub use node::{Children, Node, NodeBuilder, NodeRef, Value};
pub use visitor::{
    count_matches, is_range_slice, Dispatcher, KindTally, Rewrite, SliceRewrite, Transformer,
};
pub use walk::{walk, Walk};
