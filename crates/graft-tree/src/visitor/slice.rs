// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rewrite range-slice subscripts into iterator-slicing calls.
//!
//! The migration this rule implements: `xs[a:b]` — a `subscript` whose
//! index is a `slice` with both bounds present — becomes a `call` of a
//! fixed iterator-slicing primitive, `target(xs, a, b)`. The collection
//! and both bounds are carried over verbatim (shared, not re-derived), so
//! the rewrite is cheap no matter how complex the bound expressions are,
//! and the replacement inherits the subscript's source location.
//!
//! Known limitation, by construction: the rule only fires when both bounds
//! are explicit. Single-index subscripts, half-open slices, and slices
//! with a step keep their shape — but their subexpressions are still
//! transformed, so a range-slice nested inside a non-firing node's bounds
//! is rewritten all the same. Callers who would rather hear about
//! half-open slices than skip them can opt into [`SliceRewrite::strict`].

use std::sync::Arc;

use tracing::debug;

use graft_core::error::{GraftError, Result};

use crate::node::{Node, NodeBuilder};
use crate::visitor::transform::{Rewrite, Transformer};

/// Kind the rule rewrites: an indexed access of a collection.
pub const SUBSCRIPT: &str = "subscript";
/// Kind of a range index expression, with `lower`/`upper`/`step` fields.
pub const SLICE: &str = "slice";
/// Kind of the replacement: a call with `func` and `args` fields.
pub const CALL: &str = "call";
/// Kind of the replacement's callee: a name with an `id` field.
pub const NAME: &str = "name";

/// The slice-to-iterator rewrite rule.
///
/// `target` names the iterator-slicing primitive the replacement invokes.
/// The active grammar must declare the [`CALL`] and [`NAME`] kinds, or
/// firing the rule fails with a schema violation.
#[derive(Debug, Clone)]
pub struct SliceRewrite {
    target: String,
    strict: bool,
}

impl SliceRewrite {
    /// Create the rule targeting the given primitive.
    pub fn new(target: impl Into<String>) -> Self {
        SliceRewrite {
            target: target.into(),
            strict: false,
        }
    }

    /// Treat a range-slice with an absent bound as an error instead of a
    /// silent skip.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register the rule on a transformer.
    pub fn install<S>(self, transformer: Transformer<'_, S>) -> Transformer<'_, S> {
        transformer.on(SUBSCRIPT, move |t, node, _state| self.rewrite(t, node))
    }

    fn rewrite<S>(&self, transformer: &Transformer<'_, S>, node: &Node) -> Result<Option<Rewrite>> {
        let Some(index) = node.child("index") else {
            return Ok(None);
        };
        if index.kind() != SLICE {
            // Single-index access; not a range.
            return Ok(None);
        }
        if index.child("step").is_some() {
            // Stepped slices have no three-argument call form.
            return Ok(None);
        }
        let (lower, upper) = match (index.child("lower"), index.child("upper")) {
            (Some(lower), Some(upper)) => (lower, upper),
            _ if self.strict => {
                return Err(GraftError::malformed_slice(
                    "range-slice bound is absent",
                    node.location(),
                ));
            }
            _ => return Ok(None),
        };
        let Some(collection) = node.child("value") else {
            return Ok(None);
        };

        let func = NodeBuilder::new(transformer.grammar(), NAME)
            .field("id", self.target.as_str())
            .build()?;
        let call = NodeBuilder::new(transformer.grammar(), CALL)
            .field("func", func)
            .field(
                "args",
                vec![Arc::clone(collection), Arc::clone(lower), Arc::clone(upper)],
            )
            .build()?;
        debug!(callee = %self.target, "rewrote range-slice subscript");
        Ok(Some(Rewrite::Replace(call)))
    }
}

/// Predicate matching the accesses this rule targets: a subscript whose
/// index expression is a range slice. Pair with
/// [`count_matches`](crate::visitor::count_matches) to survey a corpus
/// before migrating it.
pub fn is_range_slice(node: &Node) -> bool {
    node.kind() == SUBSCRIPT
        && node
            .child("index")
            .is_some_and(|index| index.kind() == SLICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRef;
    use graft_core::location::Location;
    use graft_core::schema::{FieldShape, FieldSpec, Grammar};

    fn grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar
            .declare("name", vec![FieldSpec::required("id", FieldShape::Scalar)])
            .declare("int", vec![FieldSpec::required("value", FieldShape::Scalar)])
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
            .declare(
                "call",
                vec![
                    FieldSpec::required("func", FieldShape::Node),
                    FieldSpec::required("args", FieldShape::NodeList),
                ],
            );
        grammar
    }

    fn name(grammar: &Grammar, id: &str) -> NodeRef {
        NodeBuilder::new(grammar, "name")
            .field("id", id)
            .build()
            .unwrap()
    }

    fn int(grammar: &Grammar, value: i64) -> NodeRef {
        NodeBuilder::new(grammar, "int")
            .field("value", value)
            .build()
            .unwrap()
    }

    fn range_subscript(
        grammar: &Grammar,
        collection: NodeRef,
        lower: Option<NodeRef>,
        upper: Option<NodeRef>,
    ) -> NodeRef {
        let mut slice = NodeBuilder::new(grammar, "slice");
        if let Some(lower) = lower {
            slice = slice.field("lower", lower);
        }
        if let Some(upper) = upper {
            slice = slice.field("upper", upper);
        }
        NodeBuilder::new(grammar, "subscript")
            .field("value", collection)
            .field("index", slice.build().unwrap())
            .location(Location::new(1, 1))
            .build()
            .unwrap()
    }

    fn transform(grammar: &Grammar, root: &NodeRef) -> NodeRef {
        SliceRewrite::new("islice")
            .install(Transformer::new(grammar))
            .transform(root, &mut ())
            .unwrap()
    }

    #[test]
    fn rewrites_a_two_bound_slice_to_a_call() {
        let grammar = grammar();
        let xs = name(&grammar, "xs");
        let root = range_subscript(
            &grammar,
            Arc::clone(&xs),
            Some(int(&grammar, 0)),
            Some(int(&grammar, 10)),
        );
        let out = transform(&grammar, &root);

        assert_eq!(out.kind(), "call");
        assert_eq!(
            out.child("func").unwrap().field("id").unwrap().as_str(),
            Some("islice")
        );
        let args = out.field("args").unwrap().as_nodes().unwrap();
        assert_eq!(args.len(), 3);
        // The collection is shared verbatim, not re-derived.
        assert!(Arc::ptr_eq(&args[0], &xs));
        assert_eq!(args[1].field("value").unwrap().as_int(), Some(0));
        assert_eq!(args[2].field("value").unwrap().as_int(), Some(10));
        // Location carries over from the subscript.
        assert_eq!(out.location(), Some(Location::new(1, 1)));
    }

    #[test]
    fn single_index_subscript_keeps_its_shape() {
        let grammar = grammar();
        let root = NodeBuilder::new(&grammar, "subscript")
            .field("value", name(&grammar, "xs"))
            .field("index", int(&grammar, 0))
            .build()
            .unwrap();
        let out = transform(&grammar, &root);
        assert!(Arc::ptr_eq(&out, &root));
    }

    #[test]
    fn half_open_slice_is_skipped_by_default() {
        let grammar = grammar();
        let root = range_subscript(&grammar, name(&grammar, "xs"), Some(int(&grammar, 0)), None);
        let out = transform(&grammar, &root);
        assert_eq!(out.kind(), "subscript");
    }

    #[test]
    fn half_open_slice_is_an_error_in_strict_mode() {
        let grammar = grammar();
        let root = range_subscript(&grammar, name(&grammar, "xs"), None, Some(int(&grammar, 9)));
        let err = SliceRewrite::new("islice")
            .strict(true)
            .install(Transformer::new(&grammar))
            .transform(&root, &mut ())
            .unwrap_err();
        assert!(matches!(err, GraftError::MalformedSlice { .. }));
    }

    #[test]
    fn stepped_slice_is_skipped() {
        let grammar = grammar();
        let slice = NodeBuilder::new(&grammar, "slice")
            .field("lower", int(&grammar, 0))
            .field("upper", int(&grammar, 10))
            .field("step", int(&grammar, 2))
            .build()
            .unwrap();
        let root = NodeBuilder::new(&grammar, "subscript")
            .field("value", name(&grammar, "xs"))
            .field("index", slice)
            .build()
            .unwrap();
        let out = transform(&grammar, &root);
        assert!(Arc::ptr_eq(&out, &root));
    }

    #[test]
    fn range_slice_nested_in_a_skipped_bound_is_still_rewritten() {
        let grammar = grammar();
        // xs[ys[0:5]:] — the outer subscript is half-open and does not
        // fire, but the inner ys[0:5] must.
        let inner = range_subscript(
            &grammar,
            name(&grammar, "ys"),
            Some(int(&grammar, 0)),
            Some(int(&grammar, 5)),
        );
        let root = range_subscript(&grammar, name(&grammar, "xs"), Some(inner), None);
        let out = transform(&grammar, &root);

        assert_eq!(out.kind(), "subscript");
        let rewritten = out.child("index").unwrap().child("lower").unwrap();
        assert_eq!(rewritten.kind(), "call");
        assert_eq!(
            rewritten.child("func").unwrap().field("id").unwrap().as_str(),
            Some("islice")
        );
    }

    #[test]
    fn range_slice_nested_in_a_firing_bound_is_rewritten_too() {
        let grammar = grammar();
        // xs[ys[0:5]:10] — both fire, the inner one inside the outer
        // replacement's arguments.
        let inner = range_subscript(
            &grammar,
            name(&grammar, "ys"),
            Some(int(&grammar, 0)),
            Some(int(&grammar, 5)),
        );
        let root = range_subscript(
            &grammar,
            name(&grammar, "xs"),
            Some(inner),
            Some(int(&grammar, 10)),
        );
        let out = transform(&grammar, &root);

        assert_eq!(out.kind(), "call");
        let args = out.field("args").unwrap().as_nodes().unwrap();
        assert_eq!(args[1].kind(), "call");
    }

    #[test]
    fn survey_predicate_matches_only_range_slices() {
        let grammar = grammar();
        let ranged = range_subscript(
            &grammar,
            name(&grammar, "xs"),
            Some(int(&grammar, 0)),
            Some(int(&grammar, 10)),
        );
        let single = NodeBuilder::new(&grammar, "subscript")
            .field("value", name(&grammar, "xs"))
            .field("index", int(&grammar, 0))
            .build()
            .unwrap();
        assert!(is_range_slice(&ranged));
        assert!(!is_range_slice(&single));
        assert!(!is_range_slice(&name(&grammar, "xs")));
    }

    #[test]
    fn missing_call_kind_surfaces_a_schema_violation() {
        let mut grammar = Grammar::new();
        grammar
            .declare("name", vec![FieldSpec::required("id", FieldShape::Scalar)])
            .declare("int", vec![FieldSpec::required("value", FieldShape::Scalar)])
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
            );
        let root = range_subscript(
            &grammar,
            name(&grammar, "xs"),
            Some(int(&grammar, 0)),
            Some(int(&grammar, 10)),
        );
        let err = SliceRewrite::new("islice")
            .install(Transformer::new(&grammar))
            .transform(&root, &mut ())
            .unwrap_err();
        assert!(matches!(err, GraftError::SchemaViolation { .. }));
    }
}
