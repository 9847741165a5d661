// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Generic pre-order tree walker.
//!
//! [`walk`] yields every node reachable from a root exactly once, depth
//! first and pre-order: a node is yielded before any of its descendants,
//! children in field order, sequence elements in sequence order. Non-node
//! field values are skipped. The iterator is lazy and restartable — walking
//! the same root twice produces identical sequences.

use crate::node::Node;

/// Walk a tree in depth-first pre-order.
pub fn walk(root: &Node) -> Walk<'_> {
    Walk { stack: vec![root] }
}

/// Lazy pre-order iterator over a tree's nodes. Created by [`walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        // Children go on the stack reversed so the leftmost pops first.
        let first_child = self.stack.len();
        for child in node.children() {
            self.stack.push(child.as_ref());
        }
        self.stack[first_child..].reverse();
        Some(node)
    }
}
