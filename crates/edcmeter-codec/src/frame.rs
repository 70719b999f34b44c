use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single decoded measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unscaled unsigned integer (or a 0/1 flag).
    Integer(u32),
    /// Raw integer divided by the channel scale.
    Decimal(f64),
    /// Fixed-width text, one character per byte.
    Text(String),
}

impl Value {
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(f64::from(*v)),
            Value::Decimal(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{}", s.escape_debug()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(v) => serializer.serialize_u32(*v),
            Value::Decimal(v) => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Field name to value mapping produced by the decoder.
///
/// Fields keep the order their channels were first seen. Inserting a field
/// that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFrame {
    entries: Vec<(&'static str, Value)>,
}

impl DecodedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the field repeated.
    pub fn insert(&mut self, field: &'static str, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((field, value));
                None
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl Serialize for DecodedFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
