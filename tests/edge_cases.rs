use geo::{Point, polygon};
use sociome::{
    Config, Density, GeoTable, Geometry, IdentityCopy, KernelInterpolation, NearestDistance,
    SociomeError, SpatialFunction, Value,
};

/// Test 1: large table evaluation stays aligned
#[test]
fn test_large_table_evaluation() {
    let table = GeoTable::from_geometries((0..10_000).map(|i| {
        Geometry::point(-87.7 + (i % 100) as f64 * 0.0001, 41.8 + (i / 100) as f64 * 0.0001)
    }));

    let density = Density::new(&table, 50.0).expect("density");
    let out = density.eval(&table).expect("eval");
    assert_eq!(out.len(), 10_000);
    for (row, source) in out.iter().zip(table.geometries()) {
        assert_eq!(row.geometry(), source);
        assert!(row.get("metric").unwrap().as_f64().unwrap() >= 1.0);
    }
}

/// Test 2: coordinates at the edges of the valid range
#[test]
fn test_extreme_coordinates() {
    let table = GeoTable::from_geometries([
        Geometry::point(0.0, 90.0),
        Geometry::point(0.0, -90.0),
        Geometry::point(180.0, 0.0),
        Geometry::point(-180.0, 0.0),
    ]);
    let nearest = NearestDistance::new(&table).expect("nearest");
    let out = nearest.eval(&table).expect("eval");
    for value in out.column("metric").unwrap() {
        assert!(value.as_f64().unwrap().abs() < 1e-6);
    }
}

/// Test 3: polygons cannot be queried pointwise
#[test]
fn test_polygon_targets_rejected() {
    let source = GeoTable::from_geometries([Geometry::point(0.0, 0.0)]);
    let target = GeoTable::from_geometries([Geometry::from(polygon![
        (x: 0.0, y: 0.0),
        (x: 1.0, y: 0.0),
        (x: 1.0, y: 1.0),
    ])]);
    let density = Density::new(&source, 100.0).unwrap();
    assert!(matches!(
        density.eval(&target),
        Err(SociomeError::GeometryKind { row: 0, .. })
    ));

    // identity joins compare geometry directly and accept any kind
    let mut polygons = target.clone();
    polygons.set_column("v", vec![Value::Int(1)]).unwrap();
    let copied = IdentityCopy::new(&polygons, "v").unwrap().eval(&target).unwrap();
    assert_eq!(copied.row(0).unwrap().get("metric"), Some(&Value::Int(1)));
}

/// Test 4: empty tables on either side
#[test]
fn test_empty_tables() {
    let empty = GeoTable::new();
    let nearest = NearestDistance::new(&empty).expect("nearest");
    assert_eq!(nearest.query(&Point::new(1.0, 1.0)).unwrap(), Value::Null);

    let density = Density::new(&empty, 1000.0).expect("density");
    assert_eq!(density.query(&Point::new(1.0, 1.0)).unwrap(), Value::Int(0));
    assert!(density.eval(&empty).unwrap().is_empty());

    let mut table = GeoTable::new();
    table.attach_metric(&density, "d").expect("attach on empty");
    assert!(table.has_column("d"));
}

/// Test 5: zero radius only counts coincident points
#[test]
fn test_zero_radius() {
    let table = GeoTable::from_geometries([
        Geometry::point(1.0, 1.0),
        Geometry::point(1.0, 1.0),
        Geometry::point(1.0, 1.000001),
    ]);
    let density = Density::new(&table, 0.0).unwrap();
    assert_eq!(density.query(&Point::new(1.0, 1.0)).unwrap(), Value::Int(2));
    assert!(Density::new(&table, -5.0).is_err());
}

/// Test 6: configuration drives function parameters
#[test]
fn test_config_driven_functions() {
    let config = Config::from_json(r#"{"density_radius_m": 0.0, "kernel_precision": 1.0}"#)
        .expect("config");
    let mut table = GeoTable::with_columns(["v"]).unwrap();
    table.push_row(Geometry::point(0.0, 0.0), vec![3.0.into()]).unwrap();
    table.push_row(Geometry::point(0.0, 0.5), vec![4.0.into()]).unwrap();

    let density = Density::from_config(&table, &config).unwrap();
    assert_eq!(density.query(&Point::new(0.0, 0.0)).unwrap(), Value::Int(1));

    let kernel = KernelInterpolation::from_config(&table, "v", &config).unwrap();
    assert_eq!(kernel.query(&Point::new(0.0, 0.5)).unwrap(), Value::Float(4.0));
    assert_eq!(kernel.query(&Point::new(0.0, 0.25)).unwrap(), Value::Null);
}

/// Test 7: text in a numeric column is reported with its row
#[test]
fn test_text_in_metric_column() {
    let mut table = GeoTable::with_columns(["v"]).unwrap();
    table.push_row(Geometry::point(0.0, 0.0), vec![1.0.into()]).unwrap();
    table.push_row(Geometry::point(0.0, 1.0), vec!["n/a".into()]).unwrap();
    assert!(matches!(
        KernelInterpolation::new(&table, "v", 8e-3, 1e-6),
        Err(SociomeError::NonNumeric { row: 1, .. })
    ));
}
