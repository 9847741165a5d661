// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walker-based pattern metrics.
//!
//! Thin analysis clients built on [`walk`]: [`count_matches`] counts the
//! nodes matching a predicate in one tree, and [`KindTally`] accumulates
//! per-kind occurrence counts across a whole corpus, one tree at a time.
//! Counts are deterministic and independent of evaluation order as long as
//! predicates are pure, which callers are required to supply.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::node::Node;
use crate::walk::walk;

/// Count the nodes in `root`'s tree for which `predicate` holds.
///
/// Every node is tested exactly once, in walk order.
pub fn count_matches<P>(root: &Node, predicate: P) -> usize
where
    P: Fn(&Node) -> bool,
{
    walk(root).filter(|node| predicate(node)).count()
}

/// Per-kind occurrence counts, mergeable across a corpus of trees.
///
/// Keys are ordered, so serialized reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindTally {
    counts: BTreeMap<String, usize>,
}

impl KindTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        KindTally::default()
    }

    /// Tally a single tree.
    pub fn of(root: &Node) -> Self {
        let mut tally = KindTally::new();
        tally.add(root);
        tally
    }

    /// Add every node of `root`'s tree to the tally.
    pub fn add(&mut self, root: &Node) {
        for node in walk(root) {
            *self.counts.entry(node.kind().to_string()).or_default() += 1;
        }
    }

    /// Fold another tally into this one.
    pub fn merge(&mut self, other: KindTally) {
        for (kind, count) in other.counts {
            *self.counts.entry(kind).or_default() += count;
        }
    }

    /// The count recorded for a kind.
    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Total nodes tallied.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterate `(kind, count)` pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(kind, count)| (kind.as_str(), *count))
    }
}
