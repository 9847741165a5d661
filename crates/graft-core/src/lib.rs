// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Core infrastructure for graft.
//!
//! This crate provides language-agnostic infrastructure for the tree engine:
//! - Grammar schema: the kind and field declarations that trees are
//!   validated against, loaded once at startup as external configuration
//! - Error types shared across the engine
//! - Source locations for diagnostics and re-emission
//!
//! The tree model itself and everything that traverses it live in
//! `graft-tree`.

pub mod error;
pub mod location;
pub mod schema;

pub use error::{GraftError, Result};
pub use location::Location;
pub use schema::{FieldShape, FieldSpec, Grammar, KindSpec};
