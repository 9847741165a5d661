// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The tagged node model all traversal and rewriting operates over.
//!
//! A [`Node`] carries a kind discriminator, an ordered set of named fields,
//! and an optional advisory [`Location`]. Field values are [`Value`]s: a
//! primitive, a single child node, a sequence of child nodes, or an explicit
//! absent marker. Field order always equals the declared schema order for
//! the node's kind, which makes visitation sequences reproducible.
//!
//! Nodes are immutable after construction and shared by reference counting
//! ([`NodeRef`]). There is exactly one way a node comes into existence: a
//! [`NodeBuilder`], which validates the supplied fields against the active
//! [`Grammar`] and fails with a schema violation on any mismatch. Rewriting
//! never mutates a node; it builds replacements and relinks fields, sharing
//! untouched subtrees between the old and new tree.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use graft_core::error::{GraftError, Result};
use graft_core::location::Location;
use graft_core::schema::{FieldShape, Grammar};

/// A shared, immutable reference to a node.
///
/// Cloning is cheap and whole trees are `Send`, so independent trees can be
/// handed to worker threads without any locking discipline.
pub type NodeRef = Arc<Node>;

// ============================================================================
// Field values
// ============================================================================

/// The value held by a single node field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence: the field is declared for the kind but not
    /// applicable in this instance. Fields are never omitted.
    Absent,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    Str(String),
    /// A single child node.
    Node(NodeRef),
    /// An ordered sequence of child nodes.
    Nodes(Vec<NodeRef>),
}

impl Value {
    /// Whether this is the explicit absent marker.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// The child node, if this value holds a single node.
    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The child nodes, if this value holds a sequence.
    pub fn as_nodes(&self) -> Option<&[NodeRef]> {
        match self {
            Value::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// The string, if this value holds a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this value holds an integer scalar.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The boolean, if this value holds a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn matches(&self, shape: FieldShape) -> bool {
        match shape {
            FieldShape::Scalar => matches!(
                self,
                Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
            ),
            FieldShape::Node => matches!(self, Value::Node(_)),
            FieldShape::NodeList => matches!(self, Value::Nodes(_)),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Value::Absent => "an absent value",
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => "a scalar",
            Value::Node(_) => "a node",
            Value::Nodes(_) => "a node list",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<NodeRef> for Value {
    fn from(value: NodeRef) -> Self {
        Value::Node(value)
    }
}

impl From<&NodeRef> for Value {
    fn from(value: &NodeRef) -> Self {
        Value::Node(Arc::clone(value))
    }
}

impl From<Vec<NodeRef>> for Value {
    fn from(value: Vec<NodeRef>) -> Self {
        Value::Nodes(value)
    }
}

// ============================================================================
// Node
// ============================================================================

/// A single node in a syntax tree.
///
/// Fields are private; read access goes through the accessors and
/// construction goes through [`NodeBuilder`], so every live node satisfies
/// its kind's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: String,
    fields: Vec<(String, Value)>,
    location: Option<Location>,
}

impl Node {
    /// The kind discriminator.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The advisory source location, if the producer attached one.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Read a field's value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Read a field that holds a single child node. Returns `None` for
    /// absent, scalar, or sequence values as well as unknown names.
    pub fn child(&self, name: &str) -> Option<&NodeRef> {
        self.field(name).and_then(Value::as_node)
    }

    /// Iterate every child node in field order, flattening sequence-valued
    /// fields. Non-node values are skipped.
    pub fn children(&self) -> Children<'_> {
        Children {
            fields: self.fields.iter(),
            list: None,
        }
    }

    /// Rebuild a node with a location attached. The original is untouched;
    /// field values are shared with the copy.
    pub fn with_location(node: &NodeRef, location: Location) -> NodeRef {
        Arc::new(Node {
            kind: node.kind.clone(),
            fields: node.fields.clone(),
            location: Some(location),
        })
    }
}

/// Iterator over a node's direct child nodes, in field order.
pub struct Children<'a> {
    fields: std::slice::Iter<'a, (String, Value)>,
    list: Option<std::slice::Iter<'a, NodeRef>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a NodeRef;

    fn next(&mut self) -> Option<&'a NodeRef> {
        loop {
            if let Some(list) = &mut self.list {
                if let Some(node) = list.next() {
                    return Some(node);
                }
                self.list = None;
            }
            match self.fields.next()? {
                (_, Value::Node(node)) => return Some(node),
                (_, Value::Nodes(nodes)) => self.list = Some(nodes.iter()),
                _ => {}
            }
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Validating constructor for nodes of a declared kind.
///
/// Supplied fields may arrive in any order; the built node stores them in
/// schema order. Declared optional fields that are not supplied become
/// explicit [`Value::Absent`]. Any mismatch with the declaration fails with
/// [`GraftError::SchemaViolation`].
#[derive(Debug)]
pub struct NodeBuilder<'g> {
    grammar: &'g Grammar,
    kind: String,
    fields: Vec<(String, Value)>,
    location: Option<Location>,
}

impl<'g> NodeBuilder<'g> {
    /// Start building a node of `kind`.
    pub fn new(grammar: &'g Grammar, kind: impl Into<String>) -> Self {
        NodeBuilder {
            grammar,
            kind: kind.into(),
            fields: Vec::new(),
            location: None,
        }
    }

    /// Supply a field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Attach a source location.
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a source location if one is available.
    pub fn maybe_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// Validate against the grammar and build the node.
    pub fn build(self) -> Result<NodeRef> {
        let NodeBuilder {
            grammar,
            kind,
            fields: supplied,
            location,
        } = self;
        let spec = grammar.expect_kind(&kind)?;

        let mut supplied: Vec<(String, Option<Value>)> = supplied
            .into_iter()
            .map(|(name, value)| (name, Some(value)))
            .collect();

        let mut fields = Vec::with_capacity(spec.fields.len());
        for field in &spec.fields {
            let value = supplied
                .iter_mut()
                .find(|(name, value)| value.is_some() && *name == field.name)
                .and_then(|(_, value)| value.take());
            let value = match value {
                Some(value) => value,
                None if field.required => {
                    return Err(GraftError::schema(
                        &kind,
                        format!("missing required field '{}'", field.name),
                    ));
                }
                None => Value::Absent,
            };
            if value.is_absent() {
                if field.required {
                    return Err(GraftError::schema(
                        &kind,
                        format!("field '{}' is required but absent", field.name),
                    ));
                }
            } else if !value.matches(field.shape) {
                return Err(GraftError::schema(
                    &kind,
                    format!(
                        "field '{}' expects {}, got {}",
                        field.name,
                        field.shape.describe(),
                        value.describe()
                    ),
                ));
            }
            fields.push((field.name.clone(), value));
        }

        if let Some((name, _)) = supplied.iter().find(|(_, value)| value.is_some()) {
            let detail = if spec.field(name).is_some() {
                format!("field '{name}' supplied more than once")
            } else {
                format!("field '{name}' is not declared for this kind")
            };
            return Err(GraftError::schema(&kind, detail));
        }

        Ok(Arc::new(Node {
            kind,
            fields,
            location,
        }))
    }
}

// ============================================================================
// Serialization
// ============================================================================

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.location.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("kind", &self.kind)?;
        if let Some(location) = &self.location {
            map.serialize_entry("location", location)?;
        }
        map.serialize_entry("fields", &Fields(&self.fields))?;
        map.end()
    }
}

struct Fields<'a>(&'a [(String, Value)]);

impl Serialize for Fields<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Absent => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Node(node) => node.serialize(serializer),
            Value::Nodes(nodes) => {
                let mut seq = serializer.serialize_seq(Some(nodes.len()))?;
                for node in nodes {
                    seq.serialize_element(node.as_ref())?;
                }
                seq.end()
            }
        }
    }
}
