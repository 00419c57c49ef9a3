use crate::error::{EventError, Result};
use crate::serializer::to_json;
use crate::value::{Graph, Value};

/// One logged value together with the graph that owns its composites.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    graph: Graph,
    data: Value,
}

impl Event {
    /// An event carrying exactly one value.
    pub fn single(graph: Graph, value: impl Into<Value>) -> Self {
        Self {
            graph,
            data: value.into(),
        }
    }

    /// An event carrying several values, collected into one sequence.
    pub fn multi(mut graph: Graph, values: Vec<Value>) -> Result<Self> {
        if values.is_empty() {
            return Err(EventError::NoArguments);
        }
        let list = graph.array_of(values);
        Ok(Self {
            graph,
            data: Value::Array(list),
        })
    }

    /// Positional-argument convention: one value is used as-is, several are
    /// collected into a sequence, none is an error.
    pub fn from_args(graph: Graph, mut values: Vec<Value>) -> Result<Self> {
        match values.len() {
            0 => Err(EventError::NoArguments),
            1 => Ok(Self::single(graph, values.remove(0))),
            _ => Self::multi(graph, values),
        }
    }

    /// A plain text event.
    pub fn text(message: impl Into<String>) -> Self {
        Self::single(Graph::new(), Value::String(message.into()))
    }

    /// An event built from a JSON tree.
    pub fn json(value: serde_json::Value) -> Self {
        let mut graph = Graph::new();
        let data = graph.import(value);
        Self { graph, data }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The event value alone, serialized cycle-safely.
    pub fn to_json(&self) -> Result<String> {
        to_json(&self.graph, &self.data)
    }
}

impl From<serde_json::Value> for Event {
    fn from(value: serde_json::Value) -> Self {
        Self::json(value)
    }
}

impl From<&str> for Event {
    fn from(message: &str) -> Self {
        Self::text(message)
    }
}

impl From<String> for Event {
    fn from(message: String) -> Self {
        Self::text(message)
    }
}
