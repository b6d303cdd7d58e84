//! Generic tree shared by the reader and the writer.
//!
//! The tree knows nothing about coats of arms: a block is either an ordered
//! array of values or an ordered mapping of key to value. Field meaning is
//! assigned later by the document model.

use indexmap::IndexMap;

/// Mapping keys whose repeated occurrences accumulate instead of overwriting.
pub const REPEATED_KEYS: [&str; 2] = ["colored_emblem", "instance"];

/// Whether `key` accumulates repeated occurrences.
pub fn is_repeated_key(key: &str) -> bool {
    REPEATED_KEYS.contains(&key)
}

/// A single value in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Quoted string or bare identifier.
    Str(String),
    /// Opaque `identifier { ... }` construct such as `rgb { 74 201 202 }`,
    /// kept verbatim.
    Raw(String),
    Block(Block),
    /// Every occurrence of a repeated key, in source order.
    Repeated(Vec<Value>),
}

/// A `{ ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Array(Vec<Value>),
    Map(Map),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn map(map: Map) -> Self {
        Value::Block(Block::Map(map))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Block(Block::Array(items))
    }

    /// Numeric value, integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer value; floats with no fractional part are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Text of a string or raw construct.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Raw(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Block(Block::Map(map)) => Some(map),
            _ => None,
        }
    }

    /// Array items. `{ }` reads as an empty array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Block(Block::Array(items)) => Some(items),
            _ => None,
        }
    }

    /// Numeric array items, skipping anything non-numeric.
    pub fn as_f64_array(&self) -> Vec<f64> {
        self.as_array()
            .map(|items| items.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default()
    }
}

/// Ordered key/value block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: IndexMap<String, Value>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// First entry, used for the document root.
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.entries.first()
    }

    /// Set a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Add an occurrence of `key`.
    ///
    /// Repeated keys accumulate into [`Value::Repeated`]; any other key
    /// overwrites its previous value in place.
    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !is_repeated_key(&key) {
            self.entries.insert(key, value);
            return;
        }
        match self.entries.get_mut(&key) {
            Some(Value::Repeated(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, Value::Repeated(Vec::new()));
                *existing = Value::Repeated(vec![first, value]);
            }
            None => {
                self.entries.insert(key, Value::Repeated(vec![value]));
            }
        }
    }

    /// Every occurrence of `key`: all items for a repeated key, otherwise
    /// zero or one value.
    pub fn occurrences(&self, key: &str) -> Vec<&Value> {
        match self.entries.get(key) {
            Some(Value::Repeated(items)) => items.iter().collect(),
            Some(value) => vec![value],
            None => Vec::new(),
        }
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.push(key, value);
        }
        map
    }
}

/// Classify a bare (unquoted) token.
///
/// Tokens containing `.` are tried as decimals, other tokens as integers;
/// `yes`/`no` become booleans; everything else stays a string.
pub fn scalar_from_token(token: &str) -> Value {
    if token.contains('.') {
        if let Ok(f) = token.parse::<f64>() {
            return Value::Float(f);
        }
    } else if let Ok(i) = token.parse::<i64>() {
        return Value::Int(i);
    }
    match token {
        "yes" => Value::Bool(true),
        "no" => Value::Bool(false),
        _ => Value::Str(token.to_string()),
    }
}
