use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use geocache::{CacheStore, IndexedPoint, QuadTree, Quadrant, StoreBuilder};

fn grid_point(i: u64) -> IndexedPoint {
    // Spread points over the globe without coincident positions.
    let x = (i % 997) as f64 * 0.361 + 0.01;
    let y = (i / 997 % 499) as f64 * 0.3605 + 0.01;
    IndexedPoint::new(x, y, i)
}

fn bench_tree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_insert");

    for capacity in [4usize, 16, 64].iter() {
        group.throughput(Throughput::Elements(10_000));
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut tree =
                        QuadTree::new(Quadrant::new(0.0, 0.0, 360.0, 180.0), capacity);
                    for i in 0..10_000 {
                        tree.insert(grid_point(i)).unwrap();
                    }
                    tree
                });
            },
        );
    }

    group.finish();
}

fn bench_region_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_lookup");

    let mut tree = QuadTree::new(Quadrant::new(0.0, 0.0, 360.0, 180.0), 4);
    for i in 0..50_000 {
        tree.insert(grid_point(i)).unwrap();
    }

    group.bench_function("lookup_50k", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let p = grid_point(counter % 50_000);
            counter += 1;
            tree.region_lookup(black_box(p.x()), black_box(p.y()))
                .map(|leaf| leaf.points().len())
        })
    });

    group.finish();
}

fn bench_store_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_operations");

    group.bench_function("create", |b| {
        let store = CacheStore::memory();
        let mut counter = 0u64;
        b.iter(|| {
            let p = grid_point(counter);
            let (long, lat) = p.to_gps();
            counter += 1;
            // Positions repeat after enough iterations; a full pile is rejected.
            store
                .create(format!("cache:{}", counter), lat, long, ["bench"])
                .ok()
        })
    });

    let store = StoreBuilder::new().leaf_capacity(8).build().unwrap();
    for i in 0..10_000u64 {
        let (long, lat) = grid_point(i).to_gps();
        let tag = format!("tag{}", i % 50);
        store
            .create(format!("cache:{}", i), lat, long, [tag])
            .unwrap();
    }

    group.bench_function("get_by_name", |b| {
        b.iter(|| store.get_by_name(black_box("cache:5000")).unwrap())
    });

    group.bench_function("get_by_tags", |b| {
        b.iter(|| store.get_by_tags(black_box(&["tag1", "tag2"])).unwrap())
    });

    group.bench_function("find_nearest", |b| {
        b.iter(|| {
            store
                .find_nearest(black_box(40.7), black_box(-74.0), 1000.0, 10)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tree_insert,
    bench_region_lookup,
    bench_store_operations
);
criterion_main!(benches);
