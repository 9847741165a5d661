// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the graft engine.
//!
//! This module provides a unified error type ([`GraftError`]) used by every
//! fallible operation in the engine: node construction, grammar loading,
//! strict-mode dispatch, and tree rewriting.
//!
//! ## Propagation policy
//!
//! Structural errors (`SchemaViolation`) abort the operation that triggered
//! them: they mean a producer (a parser or a rewrite handler) fed
//! inconsistent data, and there is no local recovery. Pattern-matching gaps
//! are never fatal by default — `UnhandledKind` and `MalformedSlice` only
//! occur when a caller has opted into strict mode; otherwise the engine
//! degrades to generic descent and surfaces nothing.

use thiserror::Error;

use crate::location::Location;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, GraftError>;

/// Unified error type for the graft engine.
#[derive(Debug, Error)]
pub enum GraftError {
    /// Node construction did not match the declared schema for its kind:
    /// missing, extra, or duplicate field; wrong value shape; undeclared
    /// kind; or an absent value where the schema requires one.
    #[error("schema violation for kind '{kind}': {detail}")]
    SchemaViolation { kind: String, detail: String },

    /// Strict-mode dispatch or transformation encountered a kind with no
    /// registered handler.
    #[error("no handler registered for kind '{kind}'")]
    UnhandledKind { kind: String },

    /// Strict-mode slice rewriting encountered a range-slice with an absent
    /// bound.
    #[error("malformed slice: {detail}")]
    MalformedSlice {
        detail: String,
        location: Option<Location>,
    },

    /// A transformer handler removed the root node.
    #[error("transform removed the root node")]
    RemovedRoot,

    /// A handler returned a splice, or a removal landed, in a position that
    /// holds a single node rather than a sequence.
    #[error("cannot splice into single-node position '{field}' of kind '{kind}'")]
    SpliceOutsideSequence { kind: String, field: String },

    /// A grammar or tree document could not be read.
    #[error("malformed document: {detail}")]
    Document { detail: String },
}

impl From<serde_json::Error> for GraftError {
    fn from(err: serde_json::Error) -> Self {
        GraftError::Document {
            detail: err.to_string(),
        }
    }
}

impl GraftError {
    /// Create a schema violation error.
    pub fn schema(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        GraftError::SchemaViolation {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Create an unhandled-kind error.
    pub fn unhandled(kind: impl Into<String>) -> Self {
        GraftError::UnhandledKind { kind: kind.into() }
    }

    /// Create a malformed-slice error.
    pub fn malformed_slice(detail: impl Into<String>, location: Option<Location>) -> Self {
        GraftError::MalformedSlice {
            detail: detail.into(),
            location,
        }
    }

    /// Create a malformed-document error.
    pub fn document(detail: impl Into<String>) -> Self {
        GraftError::Document {
            detail: detail.into(),
        }
    }

    /// Whether this error is fatal by default, as opposed to one that only
    /// exists under a strict-mode opt-in.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            GraftError::UnhandledKind { .. } | GraftError::MalformedSlice { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod display {
        use super::*;

        #[test]
        fn schema_violation() {
            let err = GraftError::schema("call", "missing required field 'func'");
            assert_eq!(
                err.to_string(),
                "schema violation for kind 'call': missing required field 'func'"
            );
        }

        #[test]
        fn unhandled_kind() {
            let err = GraftError::unhandled("lambda");
            assert_eq!(err.to_string(), "no handler registered for kind 'lambda'");
        }

        #[test]
        fn malformed_slice() {
            let err =
                GraftError::malformed_slice("lower bound is absent", Some(Location::new(3, 7)));
            assert_eq!(err.to_string(), "malformed slice: lower bound is absent");
        }

        #[test]
        fn splice_outside_sequence() {
            let err = GraftError::SpliceOutsideSequence {
                kind: "assign".to_string(),
                field: "target".to_string(),
            };
            assert_eq!(
                err.to_string(),
                "cannot splice into single-node position 'target' of kind 'assign'"
            );
        }

        #[test]
        fn removed_root() {
            assert_eq!(
                GraftError::RemovedRoot.to_string(),
                "transform removed the root node"
            );
        }
    }

    mod classification {
        use super::*;

        #[test]
        fn structural_errors_are_fatal() {
            assert!(GraftError::schema("call", "x").is_structural());
            assert!(GraftError::RemovedRoot.is_structural());
            assert!(GraftError::document("x").is_structural());
        }

        #[test]
        fn strict_mode_errors_are_not_structural() {
            assert!(!GraftError::unhandled("lambda").is_structural());
            assert!(!GraftError::malformed_slice("x", None).is_structural());
        }
    }

    mod bridging {
        use super::*;

        #[test]
        fn serde_json_errors_become_document_errors() {
            let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            let err: GraftError = json_err.into();
            assert!(matches!(err, GraftError::Document { .. }));
        }
    }
}
