// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dynamic value flowing through model inputs, parameter sources and results.
///
/// Serialized adjacently tagged (`{type: int, value: 5}`) so that documents
/// round-trip without losing the distinction between ints, doubles and layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
    Layer(LayerHandle),
    /// Expression wrapper evaluated lazily by the consuming algorithm.
    Property(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used for branch decisions and logical operators.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Binary(bytes) => !bytes.is_empty(),
            Value::Layer(_) | Value::Property(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Double(d) if d.fract() == 0.0 => Some(*d as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_layer(&self) -> Option<&LayerHandle> {
        match self {
            Value::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Binary(_) => "binary",
            Value::Layer(_) => "layer",
            Value::Property(_) => "property",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => {
                if d.fract() == 0.0 && d.is_finite() {
                    write!(f, "{:.1}", d)
                } else {
                    write!(f, "{}", d)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Layer(layer) => write!(f, "{}", layer.id),
            Value::Property(expression) => write!(f, "{}", expression),
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

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
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

impl From<LayerHandle> for Value {
    fn from(value: LayerHandle) -> Self {
        Value::Layer(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

/// Kind of data a layer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Vector,
    Raster,
    Mesh,
    PointCloud,
}

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

/// Reference to a map layer owned by a layer store or by the host project.
///
/// The engine never reads layer data; it only routes handles between
/// algorithms and derives expression variables from their metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerHandle {
    pub id: String,
    pub name: String,
    /// Provider specific source uri, e.g. `/data/roads.gpkg|layername=roads`
    pub source: String,
    #[serde(default)]
    pub provider: String,
    pub kind: LayerKind,
    #[serde(default)]
    pub extent: Option<Extent>,
    #[serde(default)]
    pub temporary: bool,
}

impl LayerHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: String::new(),
            provider: String::new(),
            kind,
            extent: None,
            temporary: false,
        }
    }

    pub fn vector(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, LayerKind::Vector)
    }

    pub fn raster(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, LayerKind::Raster)
    }

    pub fn with_source(mut self, provider: impl Into<String>, source: impl Into<String>) -> Self {
        self.provider = provider.into();
        self.source = source.into();
        self
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn into_temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Splits the source uri into its path and the optional `layername=` part.
    pub fn decode_source(&self) -> (String, Option<String>) {
        let mut parts = self.source.split('|');
        let path = parts.next().unwrap_or_default().to_string();
        let layer_name = parts
            .filter_map(|part| part.strip_prefix("layername="))
            .map(|name| name.to_string())
            .next();
        (path, layer_name)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Layer(LayerHandle::vector("l1", "roads")).is_truthy());
    }

    #[test]
    fn test_binary_values_serialize_as_base64() {
        let value = Value::Binary(b"hello".to_vec());
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "binary");
        assert_eq!(json["value"], "aGVsbG8=");

        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_int_and_double_stay_distinct_in_documents() {
        let values = Value::List(vec![Value::Int(5), Value::Double(5.0)]);
        let yaml = serde_yaml::to_string(&values).unwrap();
        let back: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_decode_source() {
        let layer = LayerHandle::vector("l1", "roads")
            .with_source("ogr", "/data/network.gpkg|layername=roads");
        let (path, layer_name) = layer.decode_source();
        assert_eq!(path, "/data/network.gpkg");
        assert_eq!(layer_name.as_deref(), Some("roads"));
    }
}
