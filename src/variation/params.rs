use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;

use crate::variation::Variation;

/// Declared numeric kind of a variation parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Real,
    /// Values are truncated toward zero when set.
    Int,
}

impl ParamKind {
    pub fn coerce(self, value: f64) -> ParamValue {
        match self {
            ParamKind::Real => ParamValue::Real(value),
            ParamKind::Int => ParamValue::Int(value.trunc() as i32),
        }
    }
}

/// A parameter value as stored by a variation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Real(f64),
    Int(i32),
}

impl ParamValue {
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Real(v) => v,
            ParamValue::Int(v) => f64::from(v),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Real(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
        }
    }
}

/// Case-insensitive position of `name` within a parameter schema.
pub fn find_param(schema: &[&str], name: &str) -> Option<usize> {
    schema.iter().position(|p| p.eq_ignore_ascii_case(name))
}

/// Ordered mapping from parameter name to value.
///
/// Lookup ignores ASCII case; iteration and serialization follow insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamMap {
    entries: Vec<(String, f64)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export every parameter of `variation` in schema order.
    pub fn from_variation(variation: &dyn Variation) -> Self {
        let entries = variation
            .parameter_names()
            .iter()
            .zip(variation.parameter_values())
            .map(|(name, value)| ((*name).to_string(), value.as_f64()))
            .collect();
        Self { entries }
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl serde::Serialize for ParamMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> serde::Deserialize<'de> for ParamMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamMapVisitor;

        impl<'de> Visitor<'de> for ParamMapVisitor {
            type Value = ParamMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ParamMap, A::Error> {
                let mut out = ParamMap::new();
                while let Some((k, v)) = access.next_entry::<String, f64>()? {
                    out.insert(k, v);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(ParamMapVisitor)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variation/params.rs"]
mod tests;
