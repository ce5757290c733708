//! geofilter CQL - text form of spatial predicates
//!
//! Parses predicates like `DWITHIN(app:geom, POINT(1 1), 5.0)` and bare WKT
//! geometry literals into the IR.

mod parser;

pub use parser::{parse_geometry, parse_predicate, ParseError, Rule};
