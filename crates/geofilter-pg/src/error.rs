//! Translation errors

use geofilter_ir::UnsupportedKind;
use geofilter_registry::ResolverError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// The encoder has no SQL form for this geometry kind
    #[error("Unsupported geometry kind: {0}")]
    UnsupportedGeometryKind(UnsupportedKind),

    /// Operand shape or distance does not fit the operator
    #[error("Malformed predicate: {0}")]
    MalformedPredicate(String),

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

pub type Result<T> = std::result::Result<T, TranslationError>;
