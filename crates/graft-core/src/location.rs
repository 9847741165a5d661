// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Source locations for diagnostics and re-emission.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-indexed source position (line and column).
///
/// Locations are advisory: parsers attach them so diagnostics and re-emitted
/// code stay anchored to the original source. Traversal and rewrite logic
/// never consult them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Location {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(line: u32, col: u32) -> Self {
        Location { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
