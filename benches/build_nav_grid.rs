//! Measure rasterising a large map with a layer of scattered colliding tiles
//! and a set of obstacle rectangles
//!
//! Map is 200 tiles by 200 tiles of 32px, rasterised into 8px cells
//!

use bevy::prelude::*;
use bevy_flowfield_navgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Create the map geometry before benchmarking
fn prepare_geometry(tiles: u32, tile_size: f32) -> MapGeometry {
	let mut rng = StdRng::seed_from_u64(42);
	let mut layer = TileCollisionLayer::new("walls", tiles, tiles);
	for row in 0..tiles {
		for column in 0..tiles {
			if rng.random_bool(0.2) {
				layer.set_collides(column, row, true);
			}
		}
	}
	let extent = tiles as f32 * tile_size;
	let obstacles = (0..500)
		.map(|id| {
			ObstacleRect::new(
				rng.random_range(0.0..extent),
				rng.random_range(0.0..extent),
				rng.random_range(4.0..64.0),
				rng.random_range(4.0..64.0),
				"objects",
				id,
			)
		})
		.collect();
	MapGeometry::new(Vec2::splat(extent), Vec2::splat(tile_size), Vec2::ZERO)
		.with_collision_layer(layer)
		.with_obstacles(obstacles, true)
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("initialise");
	group.significance_level(0.05).sample_size(100);
	let geometry = prepare_geometry(200, 32.0);
	let config = NavGridConfig::default();
	group.bench_function("build_nav_grid", |b| {
		b.iter(|| NavGrid::new(black_box(&geometry), black_box(&config)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
