// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor dispatch and tree rewriting.
//!
//! Two traversal disciplines share one registration style — a mapping from
//! node kind to handler, supplied by the caller at construction time:
//!
//! - [`Dispatcher`] runs analysis passes. Handlers perform side effects on
//!   caller-supplied shared state and decide for themselves whether to
//!   descend into children (explicit continuation via
//!   [`Dispatcher::descend`]). Kinds without a handler get transparent
//!   generic descent.
//! - [`Transformer`] runs rewrite passes. Handlers return a [`Rewrite`]
//!   describing a replacement; kinds without a handler are reconstructed
//!   with their children recursively transformed. The input tree is never
//!   mutated.
//!
//! On top of these sit two thin clients: [`count_matches`]/[`KindTally`]
//! for pattern metrics and [`SliceRewrite`] for migrating range-slice
//! subscripts to iterator-slicing calls.

mod dispatch;
mod metrics;
mod slice;
mod transform;

pub use dispatch::{Dispatcher, VisitFn};
pub use metrics::{count_matches, KindTally};
pub use slice::{is_range_slice, SliceRewrite};
pub use transform::{Rewrite, RewriteFn, Transformer};
