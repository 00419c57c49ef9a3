use serde_json::Number;

/// Handle to a sequence stored in a [`Graph`].
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayId(usize);

/// Handle to a mapping stored in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ArrayId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl ObjectId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A loggable value.
///
/// Scalars are stored inline. Composites are handles into the owning
/// [`Graph`], which is what allows a value to contain itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value at all, distinct from an explicit null.
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(ArrayId),
    Object(ObjectId),
}

impl Value {
    /// A floating point value. Non-finite numbers have no JSON form and
    /// become [`Value::Null`].
    pub fn float(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }

    /// Whether this value is a composite handle.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}

impl From<ArrayId> for Value {
    fn from(id: ArrayId) -> Self {
        Value::Array(id)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

/// A composite stored in a [`Graph`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Array(Vec<Value>),
    /// Entries in insertion order.
    Object(Vec<(String, Value)>),
}

/// Arena owning every composite of one value graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty sequence.
    pub fn array(&mut self) -> ArrayId {
        self.nodes.push(Node::Array(Vec::new()));
        ArrayId(self.nodes.len() - 1)
    }

    /// Allocate an empty mapping.
    pub fn object(&mut self) -> ObjectId {
        self.nodes.push(Node::Object(Vec::new()));
        ObjectId(self.nodes.len() - 1)
    }

    /// Allocate a sequence holding `items`.
    pub fn array_of(&mut self, items: impl IntoIterator<Item = Value>) -> ArrayId {
        let id = self.array();
        for item in items {
            self.push(id, item);
        }
        id
    }

    /// Append to a sequence. Foreign handles are ignored.
    pub fn push(&mut self, array: ArrayId, value: impl Into<Value>) {
        if let Some(Node::Array(items)) = self.nodes.get_mut(array.0) {
            items.push(value.into());
        }
    }

    /// Set a mapping entry, replacing an existing key in place.
    /// Foreign handles are ignored.
    pub fn insert(&mut self, object: ObjectId, key: impl Into<String>, value: impl Into<Value>) {
        let Some(Node::Object(entries)) = self.nodes.get_mut(object.0) else {
            return;
        };
        let key = key.into();
        let value = value.into();
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => entries.push((key, value)),
        }
    }

    /// Look up a mapping entry.
    pub fn get(&self, object: ObjectId, key: &str) -> Option<&Value> {
        match self.nodes.get(object.0)? {
            Node::Object(entries) => entries
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value),
            Node::Array(_) => None,
        }
    }

    pub(crate) fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Number of composites allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy a JSON tree into the graph and return its root value.
    pub fn import(&mut self, json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                let id = self.array();
                for item in items {
                    let value = self.import(item);
                    self.push(id, value);
                }
                Value::Array(id)
            }
            serde_json::Value::Object(map) => {
                let id = self.object();
                for (key, item) in map {
                    let value = self.import(item);
                    self.insert(id, key, value);
                }
                Value::Object(id)
            }
        }
    }
}
