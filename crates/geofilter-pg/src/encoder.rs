//! Geometry encoder: geometry operands to PostGIS constructor SQL

use geofilter_ir::{GeometryOperand, Number};

use crate::error::{Result, TranslationError};

/// Spatial reference of every literal we emit (WGS84)
pub const SRID: u32 = 4326;

/// Encode a geometry operand as a SQL geometry constructor
pub fn encode(operand: &GeometryOperand) -> Result<String> {
    match operand {
        GeometryOperand::Envelope { min, max } => Ok(encode_box3d(min, max)),
        GeometryOperand::Point { x, y, z } => {
            Ok(format!("GeomFromText('{}')", point_wkt(*x, *y, *z)))
        }
        GeometryOperand::LineString { coordinates } => {
            Ok(format!("GeomFromText('{}')", linestring_wkt(coordinates)))
        }
        GeometryOperand::Unsupported { kind } => Err(TranslationError::UnsupportedGeometryKind(*kind)),
    }
}

/// `SetSRID('BOX3D( <min> ,<max>  )'::box3d, 4326)`
///
/// Every ordinate is followed by a single space; axis order and count are
/// taken from the envelope as given.
pub fn encode_box3d(min: &[Number], max: &[Number]) -> String {
    format!(
        "SetSRID('BOX3D( {},{} )'::box3d, {})",
        ordinates(min),
        ordinates(max),
        SRID
    )
}

/// `POINT(x y)` or `POINT(x y z)`
pub fn point_wkt(x: Number, y: Number, z: Option<Number>) -> String {
    match z {
        Some(z) => format!("POINT({} {} {})", x, y, z),
        None => format!("POINT({} {})", x, y),
    }
}

/// `LINESTRING(x y, x y, ...)`
pub fn linestring_wkt(coordinates: &[Vec<Number>]) -> String {
    let positions: Vec<String> = coordinates
        .iter()
        .map(|position| {
            position
                .iter()
                .map(Number::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    format!("LINESTRING({})", positions.join(", "))
}

fn ordinates(values: &[Number]) -> String {
    values.iter().map(|v| format!("{} ", v)).collect()
}
