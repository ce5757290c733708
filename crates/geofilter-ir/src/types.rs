//! Scalar and type vocabulary for the filter model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a property reference.
///
/// Only used to pick the resolver's expression style; the translator never
/// inspects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Geometry,
    Envelope,
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,

    #[default]
    Unknown,
}

/// Numeric literal that keeps the form it was written in.
///
/// Integers print without a fraction (`0`), floats always carry one
/// (`10.0`) and use the shortest representation that parses back to the
/// same value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// `false` for NaN and infinities, which have no SQL literal form
    pub fn is_finite(&self) -> bool {
        match *self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            // Debug keeps the trailing `.0` and round-trips exactly
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value.into())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}
