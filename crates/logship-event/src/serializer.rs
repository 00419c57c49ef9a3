use std::cell::RefCell;
use std::collections::HashSet;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::value::{Graph, Node, Value};

/// Rendered in place of a composite already visited in the same pass.
pub const CYCLE_MARKER: &str = "<?>";

/// Rendered in place of [`Value::Undefined`].
pub const UNDEFINED_MARKER: &str = "undefined";

/// Deepest composite nesting that is expanded. Composites below it render
/// as [`CYCLE_MARKER`], which keeps the output parseable by readers with a
/// recursion limit of 128 and bounds stack use while writing.
pub const MAX_DEPTH: usize = 100;

/// Serializable view of one value inside a graph.
///
/// Composites are tracked in `seen` by arena index. The set is shared by
/// every view derived from the same root, so a composite reached twice
/// (through a cycle or a shared reference) is expanded only the first time.
/// Nesting past [`MAX_DEPTH`] is cut off the same way.
pub struct Guarded<'a> {
    graph: &'a Graph,
    value: &'a Value,
    seen: &'a RefCell<HashSet<usize>>,
    depth: usize,
}

impl<'a> Guarded<'a> {
    pub fn new(graph: &'a Graph, value: &'a Value, seen: &'a RefCell<HashSet<usize>>) -> Self {
        Self {
            graph,
            value,
            seen,
            depth: 0,
        }
    }

    fn child(&self, value: &'a Value) -> Guarded<'a> {
        Guarded {
            graph: self.graph,
            value,
            seen: self.seen,
            depth: self.depth + 1,
        }
    }

    /// Returns false when `index` was already visited.
    fn visit(&self, index: usize) -> bool {
        self.seen.borrow_mut().insert(index)
    }
}

impl Serialize for Guarded<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let index = match self.value {
            Value::Undefined => return serializer.serialize_str(UNDEFINED_MARKER),
            Value::Null => return serializer.serialize_unit(),
            Value::Bool(b) => return serializer.serialize_bool(*b),
            Value::Number(n) => return n.serialize(serializer),
            Value::String(s) => return serializer.serialize_str(s),
            Value::Array(id) => id.index(),
            Value::Object(id) => id.index(),
        };

        if self.depth >= MAX_DEPTH || !self.visit(index) {
            return serializer.serialize_str(CYCLE_MARKER);
        }

        match self.graph.node(index) {
            Some(Node::Array(items)) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.child(item))?;
                }
                seq.end()
            }
            Some(Node::Object(entries)) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, item) in entries {
                    map.serialize_entry(key, &self.child(item))?;
                }
                map.end()
            }
            // A handle from another graph has nothing to expand.
            None => serializer.serialize_str(UNDEFINED_MARKER),
        }
    }
}

/// Serialize `value` to JSON text with cycle and undefined substitution.
pub fn to_json(graph: &Graph, value: &Value) -> Result<String> {
    let seen = RefCell::new(HashSet::new());
    Ok(serde_json::to_string(&Guarded::new(graph, value, &seen))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_follow_json_rules() {
        let graph = Graph::new();
        assert_eq!(to_json(&graph, &Value::Null).unwrap(), "null");
        assert_eq!(to_json(&graph, &Value::from(true)).unwrap(), "true");
        assert_eq!(to_json(&graph, &Value::from(42)).unwrap(), "42");
        assert_eq!(to_json(&graph, &Value::from(1.5)).unwrap(), "1.5");
        assert_eq!(to_json(&graph, &Value::from("a\"b")).unwrap(), r#""a\"b""#);
    }

    #[test]
    fn undefined_at_top_level_is_a_string() {
        let graph = Graph::new();
        assert_eq!(to_json(&graph, &Value::Undefined).unwrap(), r#""undefined""#);
    }

    #[test]
    fn nullish_object_fields_are_kept_distinct() {
        let mut graph = Graph::new();
        let obj = graph.object();
        graph.insert(obj, "undef", Value::Undefined);
        graph.insert(obj, "nullVal", Value::Null);

        let json = to_json(&graph, &Value::Object(obj)).unwrap();
        assert_eq!(json, r#"{"undef":"undefined","nullVal":null}"#);
    }

    #[test]
    fn nullish_array_items_are_kept_distinct() {
        let mut graph = Graph::new();
        let arr = graph.array_of([Value::Undefined, Value::Null]);

        let json = to_json(&graph, &Value::Array(arr)).unwrap();
        assert_eq!(json, r#"["undefined",null]"#);
    }

    #[test]
    fn direct_self_reference_renders_marker() {
        let mut graph = Graph::new();
        let a = graph.object();
        graph.insert(a, "b", a);

        let json = to_json(&graph, &Value::Object(a)).unwrap();
        assert_eq!(json, r#"{"b":"<?>"}"#);
    }

    #[test]
    fn indirect_cycle_renders_marker() {
        let mut graph = Graph::new();
        let a = graph.object();
        let list = graph.array();
        graph.insert(a, "name", "a");
        graph.insert(a, "children", list);
        graph.push(list, a);
        graph.push(list, 7);

        let json = to_json(&graph, &Value::Object(a)).unwrap();
        assert_eq!(json, r#"{"name":"a","children":["<?>",7]}"#);
    }

    #[test]
    fn shared_reference_is_expanded_once() {
        let mut graph = Graph::new();
        let shared = graph.object();
        graph.insert(shared, "x", 1);
        let root = graph.array_of([Value::Object(shared), Value::Object(shared)]);

        let json = to_json(&graph, &Value::Array(root)).unwrap();
        assert_eq!(json, r#"[{"x":1},"<?>"]"#);
    }

    #[test]
    fn seen_set_is_scoped_to_one_call() {
        let mut graph = Graph::new();
        let obj = graph.object();
        graph.insert(obj, "k", "v");
        let root = Value::Object(obj);

        let first = to_json(&graph, &root).unwrap();
        let second = to_json(&graph, &root).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, r#"{"k":"v"}"#);
    }

    #[test]
    fn field_order_is_preserved() {
        let mut graph = Graph::new();
        let obj = graph.object();
        graph.insert(obj, "zeta", 1);
        graph.insert(obj, "alpha", 2);

        let json = to_json(&graph, &Value::Object(obj)).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn output_is_valid_json() {
        let mut graph = Graph::new();
        let a = graph.object();
        let b = graph.array();
        graph.insert(a, "b", b);
        graph.push(b, a);
        graph.push(b, b);
        graph.push(b, Value::Undefined);

        let json = to_json(&graph, &Value::Object(a)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["b"][0], "<?>");
        assert_eq!(parsed["b"][1], "<?>");
        assert_eq!(parsed["b"][2], "undefined");
    }

    fn nested_chain(depth: usize) -> (Graph, Value) {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..depth).map(|_| graph.array()).collect();
        for pair in ids.windows(2) {
            graph.push(pair[0], pair[1]);
        }
        (graph, Value::Array(ids[0]))
    }

    #[test]
    fn deep_nesting_is_cut_off() {
        let (graph, root) = nested_chain(100_000);

        let json = to_json(&graph, &root).unwrap();
        let mut parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let mut levels = 0;
        let innermost = loop {
            match parsed {
                serde_json::Value::Array(mut items) => {
                    levels += 1;
                    parsed = items.remove(0);
                }
                other => break other,
            }
        };
        assert_eq!(levels, MAX_DEPTH);
        assert_eq!(innermost, CYCLE_MARKER);
    }

    #[test]
    fn nesting_within_limit_is_expanded() {
        let (graph, root) = nested_chain(MAX_DEPTH);

        let json = to_json(&graph, &root).unwrap();
        assert!(!json.contains(CYCLE_MARKER));
        assert_eq!(json.matches('[').count(), MAX_DEPTH);
    }
}
