//! Encoded WKT parses back to the coordinates it was built from

use geofilter_cql::{parse_geometry, parse_predicate};
use geofilter_ir::{DataType, GeometryOperand, NamespaceContext, Number};
use geofilter_pg::{encode, PostgisTranslator};
use geofilter_registry::{PropertyBinding, PropertyRegistry};

/// Pull the WKT literal out of `GeomFromText('...')`
fn wkt_of(sql: &str) -> &str {
    let start = sql.find('\'').expect("opening quote") + 1;
    let end = sql.rfind('\'').expect("closing quote");
    &sql[start..end]
}

#[test]
fn test_point_3d_round_trip() {
    let cases = [
        (0.1, 0.2, 0.3),
        (-122.419_415_5, 37.774_929_3, 16.25),
        (1e-9, 123_456_789.125, -0.0),
        (7.0, 51.0, 100.0),
    ];

    for (x, y, z) in cases {
        let sql = encode(&GeometryOperand::point_3d(x, y, z)).unwrap();
        let parsed = parse_geometry(wkt_of(&sql)).unwrap();

        match parsed {
            GeometryOperand::Point { x: px, y: py, z: Some(pz) } => {
                assert_eq!(px.as_f64(), x, "{}", sql);
                assert_eq!(py.as_f64(), y, "{}", sql);
                assert_eq!(pz.as_f64(), z, "{}", sql);
            }
            other => panic!("expected a 3D point, got {:?}", other),
        }
    }
}

#[test]
fn test_integer_ordinates_round_trip() {
    let point = GeometryOperand::point_3d(1, -2, 3);
    let sql = encode(&point).unwrap();
    assert_eq!(parse_geometry(wkt_of(&sql)).unwrap(), point);
}

#[test]
fn test_linestring_round_trip() {
    let line = GeometryOperand::line_string(vec![
        vec![Number::Float(0.5), Number::Int(0)],
        vec![Number::Float(10.25), Number::Float(-3.75)],
        vec![Number::Int(12), Number::Int(14)],
    ]);
    let sql = encode(&line).unwrap();
    assert_eq!(parse_geometry(wkt_of(&sql)).unwrap(), line);
}

#[test]
fn test_cql_text_to_sql() {
    let registry = PropertyRegistry::new()
        .with_binding(PropertyBinding::new("geom", "roads", "the_geom").in_namespace("http://example.org/app"));
    let translator = PostgisTranslator::new(&registry);

    let mut ns = NamespaceContext::new();
    ns.insert("app".to_string(), "http://example.org/app".to_string());

    let predicate = parse_predicate("BEYOND(app:geom, POINT(7 51), 0.5)", &ns, DataType::Geometry).unwrap();
    let result = translator.translate(&predicate).unwrap();

    assert_eq!(
        result.sql_fragment,
        "DISTANCE(GeomFromText(AsText(roads.the_geom)),GeomFromText('POINT(7 51)')) <= 0.5 \
         AND DISJOINT(GeomFromText(AsText(roads.the_geom)),GeomFromText('POINT(7 51)'))"
    );
}
