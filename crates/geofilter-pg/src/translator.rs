//! Predicate translator: spatial predicates to PostGIS WHERE-clause SQL

use std::collections::BTreeSet;

use geofilter_ir::{GeometryOperand, Number, OperatorKind, PropertyOperand, SpatialPredicate};
use geofilter_registry::PropertyResolver;
use serde::Serialize;
use tracing::{debug, trace};

use crate::encoder::{encode, encode_box3d};
use crate::error::{Result, TranslationError};
use crate::template::{template_for, BBOX_OPERATOR};

/// SQL fragment plus the tables and columns it reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    pub sql_fragment: String,
    pub tables: BTreeSet<String>,
    pub columns: BTreeSet<String>,
}

impl TranslationResult {
    /// AND several results together, each fragment parenthesized
    pub fn conjoin(results: Vec<TranslationResult>) -> TranslationResult {
        if results.len() == 1 {
            return results.into_iter().next().unwrap_or_default();
        }

        let mut combined = TranslationResult::default();
        let mut fragments = Vec::with_capacity(results.len());
        for result in results {
            fragments.push(format!("({})", result.sql_fragment));
            combined.tables.extend(result.tables);
            combined.columns.extend(result.columns);
        }
        combined.sql_fragment = fragments.join(" AND ");
        combined
    }
}

/// Per-call state; never outlives one `translate` call
#[derive(Debug, Default)]
struct Accumulator {
    tables: BTreeSet<String>,
    columns: BTreeSet<String>,
    properties: Vec<String>,
}

impl Accumulator {
    fn finish(self, sql_fragment: String) -> TranslationResult {
        TranslationResult {
            sql_fragment,
            tables: self.tables,
            columns: self.columns,
        }
    }
}

/// Translator for spatial predicates → PostGIS SQL
///
/// Holds nothing but the resolver, so one instance can serve any number of
/// threads.
pub struct PostgisTranslator<'a> {
    resolver: &'a dyn PropertyResolver,
}

impl<'a> PostgisTranslator<'a> {
    pub fn new(resolver: &'a dyn PropertyResolver) -> Self {
        Self { resolver }
    }

    /// Translate one predicate
    pub fn translate(&self, predicate: &SpatialPredicate) -> Result<TranslationResult> {
        let geometry = validate(predicate)?;
        let mut acc = Accumulator::default();

        let sql = match predicate.operator {
            OperatorKind::Bbox => self.translate_bbox(predicate, geometry, &mut acc)?,
            operator => self.translate_generic(operator, predicate, geometry, &mut acc)?,
        };

        let result = acc.finish(sql);
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                operator = %predicate.operator,
                fingerprint = %predicate.fingerprint(),
                tables = ?result.tables,
                "Translated spatial predicate"
            );
        }
        Ok(result)
    }

    /// Translate every predicate and AND the fragments together
    pub fn translate_all(&self, predicates: &[SpatialPredicate]) -> Result<TranslationResult> {
        if predicates.is_empty() {
            return Err(TranslationError::MalformedPredicate(
                "no predicates to translate".to_string(),
            ));
        }

        let results = predicates
            .iter()
            .map(|predicate| self.translate(predicate))
            .collect::<Result<Vec<_>>>()?;
        Ok(TranslationResult::conjoin(results))
    }

    fn translate_bbox(
        &self,
        predicate: &SpatialPredicate,
        geometry: &GeometryOperand,
        acc: &mut Accumulator,
    ) -> Result<String> {
        let GeometryOperand::Envelope { min, max } = geometry else {
            return Err(TranslationError::MalformedPredicate(format!(
                "BBOX requires an envelope operand, got {}",
                geometry.kind_name()
            )));
        };
        let bbox = encode_box3d(min, max);

        let mut comparisons = Vec::new();
        for property in predicate.properties() {
            let column = self.resolve(property, acc)?;
            comparisons.push(format!("{} {} {}", column, BBOX_OPERATOR, bbox));
        }
        Ok(comparisons.join(" AND "))
    }

    fn translate_generic(
        &self,
        operator: OperatorKind,
        predicate: &SpatialPredicate,
        geometry: &GeometryOperand,
        acc: &mut Accumulator,
    ) -> Result<String> {
        for property in predicate.properties() {
            let column = self.resolve(property, acc)?;
            acc.properties.push(format!("GeomFromText(AsText({}))", column));
        }

        let geometry_sql = encode(geometry)?;
        trace!(kind = geometry.kind_name(), fragment = %geometry_sql, "Encoded geometry");

        let template = template_for(operator);
        let properties = acc.properties.join(",");
        let call = format!("{}({},{})", template.function, properties, geometry_sql);

        match template.closing.suffix(predicate.distance) {
            Some(comparison) => Ok(format!(
                "DISTANCE({},{}) {} AND {}",
                properties, geometry_sql, comparison, call
            )),
            None => Ok(call),
        }
    }

    fn resolve(&self, property: &PropertyOperand, acc: &mut Accumulator) -> Result<String> {
        let resolved = self.resolver.resolve(
            &property.local_name,
            &property.namespace_context,
            property.declared_type,
        )?;
        trace!(
            property = %property.local_name,
            table = %resolved.table,
            column = %resolved.column,
            "Resolved property"
        );
        acc.tables.insert(resolved.table);
        acc.columns.insert(resolved.column);
        Ok(resolved.expression)
    }
}

/// Check operand shape and distance; returns the geometry operand
fn validate(predicate: &SpatialPredicate) -> Result<&GeometryOperand> {
    let operator = predicate.operator;

    if predicate.properties().next().is_none() {
        return Err(TranslationError::MalformedPredicate(format!(
            "{} needs at least one property operand",
            operator
        )));
    }

    let geometries: Vec<&GeometryOperand> = predicate.geometries().collect();
    let geometry = match geometries.as_slice() {
        [geometry] => *geometry,
        other => {
            return Err(TranslationError::MalformedPredicate(format!(
                "{} needs exactly one geometry operand, found {}",
                operator,
                other.len()
            )))
        }
    };

    check_distance(operator, predicate.distance)?;

    if let GeometryOperand::Unsupported { kind } = geometry {
        return Err(TranslationError::UnsupportedGeometryKind(*kind));
    }

    check_finite(operator, predicate.distance, geometry)?;
    Ok(geometry)
}

/// NaN and infinities have no PostGIS literal form
fn check_finite(
    operator: OperatorKind,
    distance: Option<Number>,
    geometry: &GeometryOperand,
) -> Result<()> {
    if let Some(distance) = distance.filter(|d| !d.is_finite()) {
        return Err(TranslationError::MalformedPredicate(format!(
            "{} distance {} is not a finite number",
            operator, distance
        )));
    }
    if let Some(ordinate) = geometry.ordinates().into_iter().find(|o| !o.is_finite()) {
        return Err(TranslationError::MalformedPredicate(format!(
            "{} geometry ordinate {} is not a finite number",
            geometry.kind_name(),
            ordinate
        )));
    }
    Ok(())
}

fn check_distance(operator: OperatorKind, distance: Option<Number>) -> Result<()> {
    match (operator.is_distance(), distance) {
        (true, None) => Err(TranslationError::MalformedPredicate(format!(
            "{} requires a distance",
            operator
        ))),
        (false, Some(_)) => Err(TranslationError::MalformedPredicate(format!(
            "{} does not take a distance",
            operator
        ))),
        _ => Ok(()),
    }
}
