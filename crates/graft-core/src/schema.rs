// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar schema: the declared node kinds and their fields.
//!
//! A [`Grammar`] is external configuration, not engine code: it is loaded
//! once at startup from a JSON document (or declared programmatically by an
//! embedding parser) and treated as fixed from then on. The engine never
//! hard-codes a node taxonomy; every node is validated against the active
//! grammar at construction time.
//!
//! # Document Format
//!
//! ```json
//! {
//!   "kinds": {
//!     "subscript": {
//!       "fields": [
//!         { "name": "value", "shape": "node", "required": true },
//!         { "name": "index", "shape": "node", "required": true }
//!       ]
//!     },
//!     "slice": {
//!       "fields": [
//!         { "name": "lower", "shape": "node" },
//!         { "name": "upper", "shape": "node" },
//!         { "name": "step", "shape": "node" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Field order in the document is the canonical traversal order for that
//! kind. `required` defaults to `false`; an optional field may hold an
//! explicit absent value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraftError, Result};

// ============================================================================
// Field declarations
// ============================================================================

/// The shape of a single field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// A primitive value: string, integer, float, or boolean.
    Scalar,
    /// A single child node.
    Node,
    /// An ordered sequence of child nodes.
    NodeList,
}

impl FieldShape {
    /// Human-readable shape name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldShape::Scalar => "a scalar",
            FieldShape::Node => "a node",
            FieldShape::NodeList => "a node list",
        }
    }
}

/// A single field declaration within a kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within its kind.
    pub name: String,
    /// The shape of values this field holds.
    pub shape: FieldShape,
    /// Whether the field must hold a concrete value. Optional fields may
    /// hold an explicit absent value instead.
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Declare a required field.
    pub fn required(name: impl Into<String>, shape: FieldShape) -> Self {
        FieldSpec {
            name: name.into(),
            shape,
            required: true,
        }
    }

    /// Declare an optional field.
    pub fn optional(name: impl Into<String>, shape: FieldShape) -> Self {
        FieldSpec {
            name: name.into(),
            shape,
            required: false,
        }
    }
}

/// The declared fields of a single node kind, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSpec {
    /// Field declarations, in canonical traversal order.
    pub fields: Vec<FieldSpec>,
}

impl KindSpec {
    /// Create a kind spec from an ordered field list.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        KindSpec { fields }
    }

    /// Look up a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate declared field names in traversal order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    fn duplicate_field(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(i, f)| {
            self.fields[..i]
                .iter()
                .any(|prev| prev.name == f.name)
                .then_some(f.name.as_str())
        })
    }
}

// ============================================================================
// Grammar
// ============================================================================

/// The closed set of node kinds and their field declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grammar {
    kinds: HashMap<String, KindSpec>,
}

impl Grammar {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Grammar::default()
    }

    /// Load a grammar from a JSON document.
    ///
    /// Returns [`GraftError::Document`] for unreadable JSON and
    /// [`GraftError::SchemaViolation`] for a declaration that is internally
    /// inconsistent (duplicate field names within a kind).
    pub fn from_json(text: &str) -> Result<Self> {
        let grammar: Grammar = serde_json::from_str(text)?;
        for (kind, spec) in &grammar.kinds {
            if let Some(name) = spec.duplicate_field() {
                return Err(GraftError::schema(
                    kind,
                    format!("field '{name}' is declared more than once"),
                ));
            }
        }
        debug!(kinds = grammar.kinds.len(), "loaded grammar");
        Ok(grammar)
    }

    /// Declare a kind programmatically.
    ///
    /// # Panics
    ///
    /// Panics if the kind is already declared or if the field list contains
    /// a duplicate name. Grammars are fixed data; a bad declaration is a
    /// programming error, not a runtime condition.
    pub fn declare(&mut self, kind: impl Into<String>, fields: Vec<FieldSpec>) -> &mut Self {
        let kind = kind.into();
        let spec = KindSpec::new(fields);
        if let Some(name) = spec.duplicate_field() {
            panic!("kind '{kind}' declares field '{name}' more than once");
        }
        let previous = self.kinds.insert(kind.clone(), spec);
        if previous.is_some() {
            panic!("kind '{kind}' is declared more than once");
        }
        self
    }

    /// Look up a kind's declaration.
    pub fn kind(&self, name: &str) -> Option<&KindSpec> {
        self.kinds.get(name)
    }

    /// Look up a kind's declaration, failing with [`GraftError::SchemaViolation`]
    /// if it is not part of the grammar.
    pub fn expect_kind(&self, name: &str) -> Result<&KindSpec> {
        self.kind(name)
            .ok_or_else(|| GraftError::schema(name, "kind is not declared in the grammar"))
    }

    /// The number of declared kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the grammar declares no kinds.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
