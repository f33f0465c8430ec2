use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use geo_overlay::cluster::{ClusterEngine, ClusterOptions, ClusterPoint, CollectingHost};
use geo_overlay::geo::GeoPoint;
use geo_overlay::heatmap::{generate_samples_with, DensityFieldRenderer};
use geo_overlay::map::Viewport;

fn bench_cluster_recompute(c: &mut Criterion) {
    let view = Viewport::new(116.3, 39.9, 30.0, 1600, 900);
    let mut rng = StdRng::seed_from_u64(1);
    let samples = generate_samples_with(&mut rng, GeoPoint::new(116.3, 39.9), 50.0, 2000);
    let points: Vec<ClusterPoint> = samples
        .iter()
        .enumerate()
        .map(|(i, s)| ClusterPoint::new(i.to_string(), GeoPoint::new(s.lon, s.lat), "camera"))
        .collect();

    let mut engine = ClusterEngine::new(CollectingHost::new(), ClusterOptions::default());
    engine.add_points(points, &view).unwrap();

    c.bench_function("cluster_recompute_2k", |b| {
        b.iter(|| {
            engine.recompute(black_box(&view)).unwrap();
            black_box(engine.clusters().len())
        })
    });
}

fn bench_heatmap_render(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let samples = generate_samples_with(&mut rng, GeoPoint::new(116.3, 39.9), 2.0, 500);
    let renderer = DensityFieldRenderer::with_resolution(256);

    c.bench_function("heatmap_render_500_at_256", |b| {
        b.iter(|| {
            let field = renderer
                .render(black_box(&samples), Some(0.0), Some(100.0))
                .unwrap()
                .unwrap();
            black_box(field.pixels.len())
        })
    });
}

criterion_group!(benches, bench_cluster_recompute, bench_heatmap_render);
criterion_main!(benches);
