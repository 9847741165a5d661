// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! JSON interchange with external parsers and serializers.
//!
//! Trees cross the process boundary as JSON documents: a parser hands the
//! engine `{"kind": ..., "location"?: ..., "fields": {...}}` objects, and
//! the engine hands the serializer the same shape back. Loading goes
//! through the validating [`NodeBuilder`], so a malformed producer document
//! surfaces as a schema violation instead of an invalid in-memory tree.
//!
//! Field values map one-to-one: JSON `null` is the explicit absent marker,
//! objects are child nodes, arrays are node sequences, everything else is a
//! scalar. Key order in a producer's `fields` object does not matter; the
//! built node normalizes to the grammar's declared order.

use serde_json::Value as Json;

use graft_core::error::{GraftError, Result};
use graft_core::location::Location;
use graft_core::schema::Grammar;

use crate::node::{Node, NodeBuilder, NodeRef, Value};

/// Load a tree from a JSON document, validating against `grammar`.
pub fn from_json(grammar: &Grammar, text: &str) -> Result<NodeRef> {
    let doc: Json = serde_json::from_str(text)?;
    from_value(grammar, &doc)
}

/// Load a tree from an already-parsed JSON value.
pub fn from_value(grammar: &Grammar, doc: &Json) -> Result<NodeRef> {
    let obj = doc
        .as_object()
        .ok_or_else(|| GraftError::document("a node must be a JSON object"))?;
    let kind = obj
        .get("kind")
        .and_then(Json::as_str)
        .ok_or_else(|| GraftError::document("node object is missing a 'kind' string"))?;

    let mut builder = NodeBuilder::new(grammar, kind);
    if let Some(location) = obj.get("location") {
        let location: Location = serde_json::from_value(location.clone())?;
        builder = builder.location(location);
    }
    if let Some(fields) = obj.get("fields") {
        let fields = fields
            .as_object()
            .ok_or_else(|| GraftError::document("'fields' must be a JSON object"))?;
        for (name, value) in fields {
            builder = builder.field(name.as_str(), field_value(grammar, value)?);
        }
    }
    builder.build()
}

fn field_value(grammar: &Grammar, value: &Json) -> Result<Value> {
    match value {
        Json::Null => Ok(Value::Absent),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .ok_or_else(|| GraftError::document(format!("unrepresentable number {n}"))),
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| from_value(grammar, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Nodes),
        Json::Object(_) => from_value(grammar, value).map(Value::Node),
    }
}

/// Serialize a tree to a JSON value for an external serializer.
pub fn to_value(node: &Node) -> Result<Json> {
    Ok(serde_json::to_value(node)?)
}

/// Serialize a tree to a JSON string for an external serializer.
pub fn to_string(node: &Node) -> Result<String> {
    Ok(serde_json::to_string(node)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::schema::{FieldShape, FieldSpec};

    fn grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar
            .declare("name", vec![FieldSpec::required("id", FieldShape::Scalar)])
            .declare(
                "subscript",
                vec![
                    FieldSpec::required("value", FieldShape::Node),
                    FieldSpec::required("index", FieldShape::Node),
                ],
            )
            .declare(
                "slice",
                vec![
                    FieldSpec::optional("lower", FieldShape::Node),
                    FieldSpec::optional("upper", FieldShape::Node),
                    FieldSpec::optional("step", FieldShape::Node),
                ],
            )
            .declare("int", vec![FieldSpec::required("value", FieldShape::Scalar)]);
        grammar
    }

    const SLICED: &str = r#"{
        "kind": "subscript",
        "location": { "line": 2, "col": 9 },
        "fields": {
            "value": { "kind": "name", "fields": { "id": "xs" } },
            "index": {
                "kind": "slice",
                "fields": {
                    "lower": { "kind": "int", "fields": { "value": 0 } },
                    "upper": { "kind": "int", "fields": { "value": 10 } },
                    "step": null
                }
            }
        }
    }"#;

    #[test]
    fn loads_a_parser_document() {
        let grammar = grammar();
        let tree = from_json(&grammar, SLICED).unwrap();
        assert_eq!(tree.kind(), "subscript");
        assert_eq!(tree.location(), Some(Location::new(2, 9)));
        let index = tree.child("index").unwrap();
        assert_eq!(index.child("lower").unwrap().kind(), "int");
        assert!(index.field("step").unwrap().is_absent());
    }

    #[test]
    fn round_trips_through_the_serializer_hand_off() {
        let grammar = grammar();
        let tree = from_json(&grammar, SLICED).unwrap();
        let emitted = to_value(&tree).unwrap();
        let reloaded = from_value(&grammar, &emitted).unwrap();
        assert_eq!(*reloaded, *tree);
    }

    #[test]
    fn field_key_order_does_not_matter() {
        let grammar = grammar();
        let doc = r#"{
            "kind": "subscript",
            "fields": {
                "index": { "kind": "int", "fields": { "value": 0 } },
                "value": { "kind": "name", "fields": { "id": "xs" } }
            }
        }"#;
        let tree = from_json(&grammar, doc).unwrap();
        let order: Vec<&str> = tree.fields().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["value", "index"]);
    }

    #[test]
    fn schema_violations_surface_on_load() {
        let grammar = grammar();
        let doc = r#"{ "kind": "name", "fields": {} }"#;
        let err = from_json(&grammar, doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema violation for kind 'name': missing required field 'id'"
        );
    }

    #[test]
    fn non_object_nodes_are_document_errors() {
        let grammar = grammar();
        for doc in ["[1, 2]", "\"name\"", r#"{ "fields": {} }"#] {
            let err = from_json(&grammar, doc).unwrap_err();
            assert!(matches!(err, GraftError::Document { .. }), "doc: {doc}");
        }
    }
}
