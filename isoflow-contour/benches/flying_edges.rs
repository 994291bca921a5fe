use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use isoflow_contour::{ContourConfig, ContourValues, FlyingEdges, sphere_volume};
use isoflow_core::Point3f;

const RESOLUTIONS: [usize; 3] = [32, 64, 128];

fn sphere(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut g = c.benchmark_group("flying edges sphere");
    g.sample_size(10);

    for resolution in RESOLUTIONS {
        let volume = sphere_volume(Point3f::origin(), 1.0, [resolution; 3], [3.0; 3]).unwrap();
        let values = ContourValues::single(0.0);

        for (name, config) in [
            ("default", ContourConfig::default()),
            ("geometry only", ContourConfig::default().with_normals(false).with_scalars(false)),
            ("untrimmed", ContourConfig::default().with_trimming(false)),
        ] {
            let filter = FlyingEdges::new(config);
            g.bench_with_input(BenchmarkId::new(name, resolution), &(&filter, &volume, &values), |b, &(filter, volume, values)| {
                b.iter(|| std::hint::black_box(filter).contour(&volume.view(), std::hint::black_box(values)));
            });
        }
    }

    g.finish();
}

fn nested_shells(c: &mut Criterion) {
    let volume = sphere_volume(Point3f::origin(), 1.0, [96; 3], [3.0; 3]).unwrap();
    let filter = FlyingEdges::default();

    let mut g = c.benchmark_group("flying edges shells");
    g.sample_size(10);

    for count in [1, 4, 16] {
        let values = ContourValues::generate(count, -0.8, 0.4);
        g.bench_with_input(BenchmarkId::from_parameter(count), &values, |b, values| {
            b.iter(|| filter.contour(&volume.view(), std::hint::black_box(values)));
        });
    }

    g.finish();
}

criterion_group!(benches, sphere, nested_shells);
criterion_main!(benches);
