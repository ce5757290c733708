//! PostGIS translation of OGC spatial predicates
//!
//! Turns a [`SpatialPredicate`](geofilter_ir::SpatialPredicate) into a
//! boolean SQL expression suitable for a `WHERE` clause, and reports the
//! tables and columns that expression reads.
//!
//! ```text
//! INTERSECTS(geom, POINT(10.0 20.0))
//!   => INTERSECTS(GeomFromText(AsText(buildings.geom)),GeomFromText('POINT(10.0 20.0)'))
//! ```
//!
//! Literals are interpolated as-is; numeric operands are typed, but nothing
//! is escaped or parameterized.

pub mod encoder;
mod error;
pub mod template;
mod translator;

pub use encoder::{encode, encode_box3d, SRID};
pub use error::TranslationError;
pub use template::{template_for, Closing, OperatorTemplate};
pub use translator::{PostgisTranslator, TranslationResult};
