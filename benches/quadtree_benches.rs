use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flock_quadtree::{
    compute_steering, BoidId, Circle, Flock, FlockConfig, Point, Quadtree, Rect, Vec2,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn get_rand() -> SmallRng {
    SmallRng::seed_from_u64(0xdeadbeef)
}

fn make_tree(rng: &mut SmallRng, size: usize, half: f32) -> Quadtree {
    let mut tree = Quadtree::new(0.0, 0.0, half, half);
    let points = (0..size)
        .map(|i| {
            Point::with_owner(
                rng.gen_range(-half, half),
                rng.gen_range(-half, half),
                BoidId(i as u32),
            )
        })
        .collect::<Vec<_>>();
    tree.extend(points).unwrap();
    tree
}

fn make_flock(rng: &mut SmallRng, size: usize) -> Flock {
    let config = FlockConfig::default();
    let world = config.world;
    let mut flock = Flock::new(config).unwrap();
    for _ in 0..size {
        flock.spawn(
            Vec2::new(
                rng.gen_range(world.xmin(), world.xmax()),
                rng.gen_range(world.ymin(), world.ymax()),
            ),
            Vec2::new(rng.gen_range(-100.0, 100.0), rng.gen_range(-100.0, 100.0)),
        );
    }
    flock
}

fn make_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quadtree make_table");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();

            b.iter(|| make_tree(&mut rng, size, 3900.0));
        });
    }
    group.finish();
}

fn query_circle_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quadtree query_circle sparse");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();
            let tree = make_tree(&mut rng, size, 3900.0);

            let radius = 512.0;
            let mut res = Vec::new();
            b.iter(|| {
                let circle = Circle::new(
                    rng.gen_range(-3900.0, 3900.0),
                    rng.gen_range(-3900.0, 3900.0),
                    radius,
                );
                res.clear();
                tree.query_circle_into(&circle, &mut res);
                black_box(&res);
            });
        });
    }
    group.finish();
}

fn query_circle_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quadtree query_circle dense");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();
            let tree = make_tree(&mut rng, size, 200.0);

            let radius = 50.0;
            let mut res = Vec::new();
            b.iter(|| {
                let circle = Circle::new(
                    rng.gen_range(-200.0, 200.0),
                    rng.gen_range(-200.0, 200.0),
                    radius,
                );
                res.clear();
                tree.query_circle_into(&circle, &mut res);
                black_box(&res);
            });
        });
    }
    group.finish();
}

fn query_rect_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quadtree query_rect sparse");
    for size in 8..16 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();
            let tree = make_tree(&mut rng, size, 3900.0);

            let mut res = Vec::new();
            b.iter(|| {
                let rect = Rect::new(
                    rng.gen_range(-3900.0, 3900.0),
                    rng.gen_range(-3900.0, 3900.0),
                    512.0,
                    256.0,
                );
                res.clear();
                tree.query_rect_into(&rect, &mut res);
                black_box(&res);
            });
        });
    }
    group.finish();
}

fn steering(c: &mut Criterion) {
    let mut group = c.benchmark_group("Flock compute_steering");
    for size in 8..14 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();
            let flock = make_flock(&mut rng, size);
            let index = flock.build_index().unwrap();

            b.iter(|| {
                let id = BoidId(rng.gen_range(0, size as u32));
                compute_steering(id, flock.boids(), &index, &flock.config().steering).unwrap()
            });
        });
    }
    group.finish();
}

fn flock_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("Flock step");
    group.sample_size(20);
    for size in 8..13 {
        let size = 1 << size;
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = get_rand();
            let mut flock = make_flock(&mut rng, size);

            b.iter(|| flock.step().unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    quadtree_benches,
    make_table,
    query_circle_sparse,
    query_circle_dense,
    query_rect_sparse,
    steering,
    flock_step,
);

criterion_main!(quadtree_benches);
