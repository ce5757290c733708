//! End-to-end translation scenarios against a fixed property mapping
//!
//! Run with: cargo test --package geofilter-pg --test scenarios

use std::collections::BTreeSet;

use geofilter_ir::{GeometryOperand, Operand, OperatorKind, SpatialPredicate, UnsupportedKind};
use geofilter_pg::{template_for, PostgisTranslator, TranslationError};
use geofilter_registry::{PropertyBinding, PropertyRegistry};

fn setup_registry() -> PropertyRegistry {
    PropertyRegistry::new()
        .with_binding(PropertyBinding::new("geom", "buildings", "geom"))
        .with_binding(PropertyBinding::new("outline", "buildings", "outline"))
        .with_binding(PropertyBinding::new("centroid", "addresses", "location"))
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_intersects_point() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);

    let predicate = SpatialPredicate::new(
        OperatorKind::Intersects,
        vec![
            Operand::property("geom"),
            Operand::geometry(GeometryOperand::point(10.0, 20.0)),
        ],
    );
    let result = translator.translate(&predicate).expect("Translation should succeed");

    assert_eq!(
        result.sql_fragment,
        "INTERSECTS(GeomFromText(AsText(buildings.geom)),GeomFromText('POINT(10.0 20.0)'))"
    );
    assert_eq!(result.tables, set(&["buildings"]));
    assert_eq!(result.columns, set(&["geom"]));
}

#[test]
fn test_bbox_envelope() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);

    let predicate = SpatialPredicate::new(
        OperatorKind::Bbox,
        vec![
            Operand::property("geom"),
            Operand::geometry(GeometryOperand::envelope(
                vec![0.into(), 0.into()],
                vec![10.into(), 10.into()],
            )),
        ],
    );
    let result = translator.translate(&predicate).expect("Translation should succeed");

    assert_eq!(
        result.sql_fragment,
        "buildings.geom && SetSRID('BOX3D( 0 0 ,10 10  )'::box3d, 4326)"
    );
    assert_eq!(result.tables, set(&["buildings"]));
    assert_eq!(result.columns, set(&["geom"]));
}

#[test]
fn test_dwithin_point() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);

    let predicate = SpatialPredicate::new(
        OperatorKind::DWithin,
        vec![
            Operand::property("geom"),
            Operand::geometry(GeometryOperand::point(1, 1)),
        ],
    )
    .with_distance(5.0);
    let result = translator.translate(&predicate).expect("Translation should succeed");

    assert_eq!(
        result.sql_fragment,
        "DISTANCE(GeomFromText(AsText(buildings.geom)),GeomFromText('POINT(1 1)')) >= 5.0 \
         AND DWITHIN(GeomFromText(AsText(buildings.geom)),GeomFromText('POINT(1 1)'))"
    );
    assert!(result.sql_fragment.contains(") >= 5.0"));
    assert!(result.sql_fragment.ends_with("DWITHIN(GeomFromText(AsText(buildings.geom)),GeomFromText('POINT(1 1)'))"));
}

#[test]
fn test_solid_is_rejected() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);

    let predicate = SpatialPredicate::new(
        OperatorKind::Within,
        vec![
            Operand::property("geom"),
            Operand::geometry(GeometryOperand::unsupported(UnsupportedKind::Solid)),
        ],
    );

    assert_eq!(
        translator.translate(&predicate),
        Err(TranslationError::UnsupportedGeometryKind(UnsupportedKind::Solid))
    );
}

#[test]
fn test_one_wrapped_call_per_operator() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);
    let geometry = "GeomFromText('LINESTRING(0 0, 5 5)')";

    for operator in OperatorKind::ALL.into_iter().filter(|op| *op != OperatorKind::Bbox) {
        let mut predicate = SpatialPredicate::new(
            operator,
            vec![
                Operand::property("outline"),
                Operand::geometry(GeometryOperand::line_string(vec![
                    vec![0.into(), 0.into()],
                    vec![5.into(), 5.into()],
                ])),
            ],
        );
        if operator.is_distance() {
            predicate = predicate.with_distance(2.5);
        }

        let result = translator.translate(&predicate).expect("Translation should succeed");
        let call = format!(
            "{}(GeomFromText(AsText(buildings.outline)),{})",
            template_for(operator).function,
            geometry
        );
        assert_eq!(
            result.sql_fragment.matches(&call).count(),
            1,
            "{}: {}",
            operator,
            result.sql_fragment
        );
    }
}

#[test]
fn test_tables_and_columns_are_union_of_resolved_properties() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);

    let predicate = SpatialPredicate::new(
        OperatorKind::Overlaps,
        vec![
            Operand::property("geom"),
            Operand::property("outline"),
            Operand::property("geom"),
            Operand::property("centroid"),
            Operand::geometry(GeometryOperand::point(3, 4)),
        ],
    );
    let result = translator.translate(&predicate).expect("Translation should succeed");

    assert_eq!(result.tables, set(&["addresses", "buildings"]));
    assert_eq!(result.columns, set(&["geom", "location", "outline"]));
}

#[test]
fn test_result_serializes_to_json() {
    let registry = setup_registry();
    let translator = PostgisTranslator::new(&registry);

    let predicate = SpatialPredicate::new(
        OperatorKind::Contains,
        vec![
            Operand::property("geom"),
            Operand::geometry(GeometryOperand::point(0, 0)),
        ],
    );
    let result = translator.translate(&predicate).expect("Translation should succeed");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["tables"], serde_json::json!(["buildings"]));
    assert_eq!(json["columns"], serde_json::json!(["geom"]));
    assert!(json["sql_fragment"].as_str().unwrap().starts_with("CONTAINS("));
}
