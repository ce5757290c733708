//! Pest-based parser for CQL predicates and WKT geometry literals

use geofilter_ir::{
    DataType, GeometryOperand, NamespaceContext, Number, Operand, OperatorKind, PropertyOperand,
    SpatialPredicate, UnsupportedKind,
};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "cql.pest"]
pub struct CqlParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Pest error: {0}")]
    Pest(#[from] Box<pest::error::Error<Rule>>),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::Pest(Box::new(err))
    }
}

/// Parse a predicate such as `DWITHIN(app:geom, POINT(1 1), 5.0)`.
///
/// Every property operand gets `namespaces` as its namespace context and
/// `declared_type` as its declared type.
pub fn parse_predicate(
    source: &str,
    namespaces: &NamespaceContext,
    declared_type: DataType,
) -> Result<SpatialPredicate, ParseError> {
    let mut pairs = CqlParser::parse(Rule::predicate_input, source)?;
    let input = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;
    let predicate = first_inner(input, "predicate")?;

    let mut operator = None;
    let mut operands = Vec::new();
    let mut distance = None;

    for pair in predicate.into_inner() {
        match pair.as_rule() {
            Rule::operator => {
                let op = pair
                    .as_str()
                    .parse::<OperatorKind>()
                    .map_err(|e| ParseError::Syntax(e.to_string()))?;
                operator = Some(op);
            }
            Rule::operand => {
                let inner = first_inner(pair, "operand")?;
                let operand = match inner.as_rule() {
                    Rule::geometry => Operand::Geometry(parse_geometry_pair(inner)?),
                    Rule::property => Operand::Property(
                        PropertyOperand::new(inner.as_str())
                            .with_namespaces(namespaces.clone())
                            .with_type(declared_type),
                    ),
                    other => return Err(unexpected(other)),
                };
                operands.push(operand);
            }
            Rule::distance => {
                distance = Some(parse_number(first_inner(pair, "distance")?)?);
            }
            _ => {}
        }
    }

    Ok(SpatialPredicate {
        operator: operator.ok_or_else(|| ParseError::Syntax("Missing operator".to_string()))?,
        operands,
        distance,
    })
}

/// Parse a single WKT-style geometry literal, e.g. `POINT(1.5 2.5 3.5)`
pub fn parse_geometry(source: &str) -> Result<GeometryOperand, ParseError> {
    let mut pairs = CqlParser::parse(Rule::geometry_input, source)?;
    let input = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;
    parse_geometry_pair(first_inner(input, "geometry")?)
}

fn parse_geometry_pair(pair: Pair<Rule>) -> Result<GeometryOperand, ParseError> {
    let inner = first_inner(pair, "geometry")?;
    match inner.as_rule() {
        Rule::point => {
            let coord = parse_coord(first_inner(inner, "point coordinate")?)?;
            match coord.as_slice() {
                [x, y] => Ok(GeometryOperand::Point { x: *x, y: *y, z: None }),
                [x, y, z] => Ok(GeometryOperand::Point { x: *x, y: *y, z: Some(*z) }),
                _ => Err(ParseError::Syntax(format!(
                    "POINT takes 2 or 3 ordinates, got {}",
                    coord.len()
                ))),
            }
        }
        Rule::linestring => {
            let coordinates = inner
                .into_inner()
                .map(parse_coord)
                .collect::<Result<Vec<_>, _>>()?;
            if coordinates.len() < 2 {
                return Err(ParseError::Syntax(
                    "LINESTRING needs at least two positions".to_string(),
                ));
            }
            Ok(GeometryOperand::LineString { coordinates })
        }
        Rule::envelope => {
            let mut corners = inner.into_inner();
            let min = parse_coord(next_pair(&mut corners, "envelope minimum")?)?;
            let max = parse_coord(next_pair(&mut corners, "envelope maximum")?)?;
            Ok(GeometryOperand::Envelope { min, max })
        }
        Rule::other_geometry => {
            let tag = first_inner(inner, "geometry tag")?;
            let kind = unsupported_kind(tag.as_str()).ok_or_else(|| {
                ParseError::Syntax(format!("Unknown geometry type: {}", tag.as_str()))
            })?;
            Ok(GeometryOperand::Unsupported { kind })
        }
        other => Err(unexpected(other)),
    }
}

/// Geometry tags the model knows about but cannot encode
fn unsupported_kind(tag: &str) -> Option<UnsupportedKind> {
    let kind = match tag.to_ascii_uppercase().as_str() {
        "CIRCULARSTRING" | "CURVE" => UnsupportedKind::Curve,
        "ORIENTABLECURVE" => UnsupportedKind::OrientableCurve,
        "COMPOUNDCURVE" | "COMPOSITECURVE" => UnsupportedKind::CompositeCurve,
        "LINEARRING" | "RING" => UnsupportedKind::Ring,
        "POLYGON" | "CURVEPOLYGON" | "TRIANGLE" | "TIN" | "POLYHEDRALSURFACE" | "SURFACE" => {
            UnsupportedKind::Surface
        }
        "SOLID" => UnsupportedKind::Solid,
        "GEOMETRYCOLLECTION" => UnsupportedKind::CompositeGeometry,
        "MULTIPOINT" | "MULTILINESTRING" | "MULTICURVE" | "MULTIPOLYGON" | "MULTISURFACE" => {
            UnsupportedKind::MultiGeometry
        }
        _ => return None,
    };
    Some(kind)
}

fn parse_coord(pair: Pair<Rule>) -> Result<Vec<Number>, ParseError> {
    pair.into_inner().map(parse_number).collect()
}

fn parse_number(pair: Pair<Rule>) -> Result<Number, ParseError> {
    let text = pair.as_str();
    let is_float = text.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Number::Int(i));
        }
    }
    text.parse::<f64>()
        .map(Number::Float)
        .map_err(|_| ParseError::Syntax(format!("Invalid number: {}", text)))
}

fn first_inner<'a>(pair: Pair<'a, Rule>, what: &str) -> Result<Pair<'a, Rule>, ParseError> {
    next_pair(&mut pair.into_inner(), what)
}

fn next_pair<'a>(
    pairs: &mut pest::iterators::Pairs<'a, Rule>,
    what: &str,
) -> Result<Pair<'a, Rule>, ParseError> {
    pairs
        .next()
        .ok_or_else(|| ParseError::Syntax(format!("Missing {}", what)))
}

fn unexpected(rule: Rule) -> ParseError {
    ParseError::Syntax(format!("Unexpected element: {:?}", rule))
}
