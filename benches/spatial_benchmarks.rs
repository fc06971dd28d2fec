use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use geo::{Point, polygon};
use sociome::{
    Density, GeoTable, Geometry, KernelInterpolation, NearestDistance, RegressionModel,
    SpatialFunction, SpatialIndex, Value,
};

fn grid(n: usize) -> GeoTable {
    let side = (n as f64).sqrt().ceil() as usize;
    let mut table = GeoTable::with_columns(["value"]).unwrap();
    for i in 0..n {
        let lon = -87.9 + (i % side) as f64 * 0.0005;
        let lat = 41.6 + (i / side) as f64 * 0.0005;
        table
            .push_row(Geometry::point(lon, lat), vec![Value::Float((i % 17) as f64)])
            .unwrap();
    }
    table
}

fn benchmark_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_index");
    let table = grid(10_000);
    let coords = table.coordinates().unwrap();

    group.bench_function("bulk_load_10k", |b| {
        b.iter(|| SpatialIndex::new(black_box(coords.clone())))
    });

    let index = SpatialIndex::new(coords);
    group.bench_function("closest", |b| {
        b.iter(|| index.closest(black_box([-87.87, 41.62])))
    });
    group.bench_function("nearest_10", |b| {
        b.iter(|| index.nearest(black_box([-87.87, 41.62]), 10))
    });
    group.bench_function("within_radius", |b| {
        b.iter(|| index.within_radius(black_box([-87.87, 41.62]), 0.005))
    });

    group.finish();
}

fn benchmark_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_functions");

    for size in [1_000, 10_000] {
        let table = grid(size);
        group.throughput(Throughput::Elements(size as u64));

        let nearest = NearestDistance::new(&table).unwrap();
        group.bench_with_input(BenchmarkId::new("nearest_eval", size), &table, |b, t| {
            b.iter(|| nearest.eval(t).unwrap())
        });

        let density = Density::new(&table, 1000.0).unwrap();
        group.bench_with_input(BenchmarkId::new("density_eval", size), &table, |b, t| {
            b.iter(|| density.eval(t).unwrap())
        });

        let kernel = KernelInterpolation::new(&table, "value", 1e-4, 1e-6).unwrap();
        group.bench_with_input(BenchmarkId::new("kernel_eval", size), &table, |b, t| {
            b.iter(|| kernel.eval(t).unwrap())
        });
    }

    group.bench_function("kernel_query", |b| {
        let kernel = KernelInterpolation::new(&grid(10_000), "value", 1e-4, 1e-6).unwrap();
        b.iter(|| kernel.query(black_box(&Point::new(-87.87, 41.62))).unwrap())
    });

    group.finish();
}

fn benchmark_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("joins");
    let mut tracts = GeoTable::with_columns(["GEOID"]).unwrap();
    for i in 0..50 {
        let x0 = -87.9 + i as f64 * 0.001;
        tracts
            .push_row(
                Geometry::from(polygon![
                    (x: x0, y: 41.6),
                    (x: x0 + 0.001, y: 41.6),
                    (x: x0 + 0.001, y: 41.7),
                    (x: x0, y: 41.7),
                ]),
                vec![Value::Int(i)],
            )
            .unwrap();
    }
    let homes = grid(10_000);

    group.bench_function("with_subdivision_10k", |b| {
        b.iter(|| {
            let mut table = homes.clone();
            table.with_subdivision(&tracts, "tract", "GEOID").unwrap();
            table
        })
    });

    group.finish();
}

fn benchmark_regression(c: &mut Criterion) {
    let mut table = grid(5_000);
    let density = Density::new(&table, 500.0).unwrap();
    table.attach_metric(&density, "density").unwrap();

    c.bench_function("ridge_fit_5k", |b| {
        b.iter(|| {
            let mut model = RegressionModel::new("value", &["density"]);
            model.fit(&table, "pred", "resid").unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_index,
    benchmark_functions,
    benchmark_joins,
    benchmark_regression
);
criterion_main!(benches);
