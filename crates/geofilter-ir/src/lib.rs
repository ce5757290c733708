//! geofilter Intermediate Representation (IR)
//!
//! OGC-style spatial filter model: a named operator applied to property
//! references and exactly one geometry literal. All types are
//! deterministically serializable so a predicate can be fingerprinted,
//! logged, and shipped between processes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod types;
pub use types::*;

/// Prefix → namespace URI bindings in scope for a property reference
pub type NamespaceContext = BTreeMap<String, String>;

/// Split `prefix:name` into `(Some(prefix), name)`; unqualified names give `(None, name)`
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// One spatial filter predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialPredicate {
    pub operator: OperatorKind,

    pub operands: Vec<Operand>,

    /// Only meaningful for BEYOND and DWITHIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Number>,
}

impl SpatialPredicate {
    pub fn new(operator: OperatorKind, operands: Vec<Operand>) -> Self {
        Self {
            operator,
            operands,
            distance: None,
        }
    }

    pub fn with_distance(mut self, distance: impl Into<Number>) -> Self {
        self.distance = Some(distance.into());
        self
    }

    /// Calculate fingerprint (SHA-256) of the canonical JSON form
    pub fn fingerprint(&self) -> String {
        // Maps are BTreeMaps and keys are strings, so serialization cannot fail
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyOperand> {
        self.operands.iter().filter_map(|op| match op {
            Operand::Property(p) => Some(p),
            Operand::Geometry(_) => None,
        })
    }

    pub fn geometries(&self) -> impl Iterator<Item = &GeometryOperand> {
        self.operands.iter().filter_map(|op| match op {
            Operand::Geometry(g) => Some(g),
            Operand::Property(_) => None,
        })
    }
}

/// Spatial operators of the OGC filter model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatorKind {
    Bbox,
    Intersects,
    Contains,
    Crosses,
    Disjoint,
    Equals,
    Overlaps,
    Touches,
    Within,
    Beyond,
    DWithin,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 11] = [
        OperatorKind::Bbox,
        OperatorKind::Intersects,
        OperatorKind::Contains,
        OperatorKind::Crosses,
        OperatorKind::Disjoint,
        OperatorKind::Equals,
        OperatorKind::Overlaps,
        OperatorKind::Touches,
        OperatorKind::Within,
        OperatorKind::Beyond,
        OperatorKind::DWithin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperatorKind::Bbox => "BBOX",
            OperatorKind::Intersects => "INTERSECTS",
            OperatorKind::Contains => "CONTAINS",
            OperatorKind::Crosses => "CROSSES",
            OperatorKind::Disjoint => "DISJOINT",
            OperatorKind::Equals => "EQUALS",
            OperatorKind::Overlaps => "OVERLAPS",
            OperatorKind::Touches => "TOUCHES",
            OperatorKind::Within => "WITHIN",
            OperatorKind::Beyond => "BEYOND",
            OperatorKind::DWithin => "DWITHIN",
        }
    }

    /// Operators that take a distance argument
    pub fn is_distance(&self) -> bool {
        matches!(self, OperatorKind::Beyond | OperatorKind::DWithin)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown spatial operator: {0}")]
pub struct UnknownOperator(pub String);

impl FromStr for OperatorKind {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// Predicate operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operand", rename_all = "snake_case")]
pub enum Operand {
    Property(PropertyOperand),
    Geometry(GeometryOperand),
}

impl Operand {
    /// Property reference with an empty namespace context
    pub fn property(name: impl Into<String>) -> Self {
        Operand::Property(PropertyOperand::new(name))
    }

    pub fn geometry(geometry: GeometryOperand) -> Self {
        Operand::Geometry(geometry)
    }
}

/// Reference to a feature property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOperand {
    /// Property name, optionally qualified as `prefix:name`
    pub local_name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespace_context: NamespaceContext,

    #[serde(default)]
    pub declared_type: DataType,
}

impl PropertyOperand {
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace_context: NamespaceContext::new(),
            declared_type: DataType::Unknown,
        }
    }

    pub fn with_namespaces(mut self, namespace_context: NamespaceContext) -> Self {
        self.namespace_context = namespace_context;
        self
    }

    pub fn with_type(mut self, declared_type: DataType) -> Self {
        self.declared_type = declared_type;
        self
    }

    /// `app` for `app:geom`, `None` for `geom`
    pub fn prefix(&self) -> Option<&str> {
        split_qualified_name(&self.local_name).0
    }

    /// `geom` for both `app:geom` and `geom`
    pub fn unqualified_name(&self) -> &str {
        split_qualified_name(&self.local_name).1
    }
}

/// Geometry-shaped operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryOperand {
    Envelope {
        min: Vec<Number>,
        max: Vec<Number>,
    },
    Point {
        x: Number,
        y: Number,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<Number>,
    },
    LineString {
        coordinates: Vec<Vec<Number>>,
    },
    /// Valid in the filter model but not encodable to SQL
    Unsupported {
        kind: UnsupportedKind,
    },
}

impl GeometryOperand {
    pub fn envelope(min: Vec<Number>, max: Vec<Number>) -> Self {
        GeometryOperand::Envelope { min, max }
    }

    pub fn point(x: impl Into<Number>, y: impl Into<Number>) -> Self {
        GeometryOperand::Point {
            x: x.into(),
            y: y.into(),
            z: None,
        }
    }

    pub fn point_3d(x: impl Into<Number>, y: impl Into<Number>, z: impl Into<Number>) -> Self {
        GeometryOperand::Point {
            x: x.into(),
            y: y.into(),
            z: Some(z.into()),
        }
    }

    pub fn line_string(coordinates: Vec<Vec<Number>>) -> Self {
        GeometryOperand::LineString { coordinates }
    }

    pub fn unsupported(kind: UnsupportedKind) -> Self {
        GeometryOperand::Unsupported { kind }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            GeometryOperand::Envelope { .. } => "Envelope",
            GeometryOperand::Point { .. } => "Point",
            GeometryOperand::LineString { .. } => "LineString",
            GeometryOperand::Unsupported { kind } => kind.name(),
        }
    }

    /// Every ordinate of the geometry, in encoding order
    pub fn ordinates(&self) -> Vec<Number> {
        match self {
            GeometryOperand::Envelope { min, max } => min.iter().chain(max).copied().collect(),
            GeometryOperand::Point { x, y, z } => [Some(*x), Some(*y), *z].into_iter().flatten().collect(),
            GeometryOperand::LineString { coordinates } => coordinates.iter().flatten().copied().collect(),
            GeometryOperand::Unsupported { .. } => Vec::new(),
        }
    }
}

/// Geometry kinds the filter model accepts but the SQL encoder does not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsupportedKind {
    Curve,
    OrientableCurve,
    CompositeCurve,
    Ring,
    Surface,
    Solid,
    CompositeGeometry,
    MultiGeometry,
}

impl UnsupportedKind {
    pub fn name(&self) -> &'static str {
        match self {
            UnsupportedKind::Curve => "Curve",
            UnsupportedKind::OrientableCurve => "OrientableCurve",
            UnsupportedKind::CompositeCurve => "CompositeCurve",
            UnsupportedKind::Ring => "Ring",
            UnsupportedKind::Surface => "Surface",
            UnsupportedKind::Solid => "Solid",
            UnsupportedKind::CompositeGeometry => "CompositeGeometry",
            UnsupportedKind::MultiGeometry => "MultiGeometry",
        }
    }
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
