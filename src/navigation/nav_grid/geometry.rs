//! The static map data a [crate::prelude::NavGrid] is rasterised from, as handed over by
//! whatever loads the map: tile collision layers, freeform obstacle
//! rectangles and the map's pixel extents and placement in the world.
//!
//! Tile layers are always map-local. Obstacle rectangles are authored in
//! either map-local or world space depending on the map, a flag on
//! [MapGeometry] says which.
//!

use bevy::math::Rect;
use bevy::prelude::*;

use crate::error::{NavigationError, Result};

/// Rectangles with a width or height at or below this are discarded
pub const DEGENERATE_EXTENT: f32 = 0.01;

/// A grid of tiles where each tile either collides or doesn't
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileCollisionLayer {
	/// Name of the layer in the map file
	name: String,
	/// Number of tiles along `x`
	columns: u32,
	/// Number of tiles along `y`
	rows: u32,
	/// Row-major collision flags
	collides: Vec<bool>,
}

impl TileCollisionLayer {
	/// Create a layer of `columns * rows` tiles where nothing collides
	pub fn new(name: &str, columns: u32, rows: u32) -> Self {
		TileCollisionLayer {
			name: name.to_string(),
			columns,
			rows,
			collides: vec![false; columns as usize * rows as usize],
		}
	}
	/// Create a layer from row-major collision flags
	pub fn from_flags(name: &str, columns: u32, rows: u32, collides: Vec<bool>) -> Result<Self> {
		let expected = columns as usize * rows as usize;
		if collides.len() != expected {
			return Err(NavigationError::LayerSize {
				name: name.to_string(),
				expected,
				found: collides.len(),
			});
		}
		Ok(TileCollisionLayer {
			name: name.to_string(),
			columns,
			rows,
			collides,
		})
	}
	pub fn get_name(&self) -> &str {
		&self.name
	}
	pub fn get_columns(&self) -> u32 {
		self.columns
	}
	pub fn get_rows(&self) -> u32 {
		self.rows
	}
	/// Whether the tile at `(column, row)` collides, out of range tiles don't
	pub fn get_collides(&self, column: u32, row: u32) -> bool {
		if column >= self.columns || row >= self.rows {
			return false;
		}
		self.collides[(row * self.columns + column) as usize]
	}
	/// Mark a tile as colliding or not, out of range tiles are ignored
	pub fn set_collides(&mut self, column: u32, row: u32, collides: bool) {
		if column < self.columns && row < self.rows {
			self.collides[(row * self.columns + column) as usize] = collides;
		}
	}
	/// Iterate over the `(column, row)` of every colliding tile
	pub fn iter_colliding(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
		let columns = self.columns.max(1);
		self.collides
			.iter()
			.enumerate()
			.filter(|(_, collides)| **collides)
			.map(move |(i, _)| (i as u32 % columns, i as u32 / columns))
	}
	/// From a CSV export of a tile layer (as written by Tiled) generate a
	/// [TileCollisionLayer]. Any tile ID above `0` collides, `0` and negative
	/// IDs are empty. Trailing commas are tolerated but every row must hold as
	/// many tiles as the first
	#[cfg(feature = "csv")]
	pub fn from_csv(name: &str, path: &str) -> Result<Self> {
		let data = std::fs::File::open(path).map_err(|source| NavigationError::Io {
			path: path.to_string(),
			source,
		})?;
		let mut rdr = csv::ReaderBuilder::new()
			.has_headers(false)
			.flexible(true)
			.from_reader(data);
		let mut rows_of_flags: Vec<Vec<bool>> = Vec::new();
		for (row, record) in rdr.records().enumerate() {
			let record = record?;
			let mut flags = Vec::new();
			for (column, value) in record.iter().enumerate() {
				let value = value.trim();
				if value.is_empty() {
					continue;
				}
				let id: i64 = value.parse().map_err(|_| NavigationError::InvalidTileId {
					column,
					row,
					value: value.to_string(),
				})?;
				flags.push(id > 0);
			}
			if flags.is_empty() {
				continue;
			}
			if let Some(expected) = rows_of_flags.first().map(|r| r.len()) {
				if flags.len() != expected {
					return Err(NavigationError::RaggedRow {
						row,
						expected,
						found: flags.len(),
					});
				}
			}
			rows_of_flags.push(flags);
		}
		let columns = rows_of_flags.first().map(|r| r.len()).unwrap_or(0);
		let rows = rows_of_flags.len();
		let collides: Vec<bool> = rows_of_flags.into_iter().flatten().collect();
		TileCollisionLayer::from_flags(name, columns as u32, rows as u32, collides)
	}
	/// Create a [TileCollisionLayer] from a greyscale image where each pixel
	/// represents a tile. Pixels whose average colour is darker than
	/// `threshold` collide
	#[cfg(feature = "heightmap")]
	pub fn from_heightmap(name: &str, path: &str, threshold: u8) -> Result<Self> {
		use photon_rs::native::open_image;
		let img = open_image(path).map_err(|e| NavigationError::Heightmap {
			path: path.to_string(),
			message: format!("{:?}", e),
		})?;
		let img_width = img.get_width();
		let img_height = img.get_height();
		let raw_pixels = img.get_raw_pixels();
		// raw pixels are arranged from the top left of the image and come in sets of either 3 or 4 (if alpha channel is inlcuded)
		let len_if_alpha = (img_width * img_height * 4) as usize;
		let chunk_size = if len_if_alpha == raw_pixels.len() {
			4
		} else {
			3
		};
		let collides = raw_pixels
			.chunks(chunk_size)
			.map(|px| {
				// careful of u8 overflow
				let colour_avg = (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0;
				colour_avg < threshold as f32
			})
			.collect();
		TileCollisionLayer::from_flags(name, img_width, img_height, collides)
	}
}

/// An axis-aligned freeform collider, such as an object placed in a map's
/// collision object layer
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObstacleRect {
	/// Left edge
	x: f32,
	/// Top edge
	y: f32,
	/// Extent along `x`
	width: f32,
	/// Extent along `y`
	height: f32,
	/// Object layer the rectangle came from
	layer_name: String,
	/// ID of the object within the map
	id: u32,
}

impl ObstacleRect {
	/// Create a new instance of [ObstacleRect]
	pub fn new(x: f32, y: f32, width: f32, height: f32, layer_name: &str, id: u32) -> Self {
		ObstacleRect {
			x,
			y,
			width,
			height,
			layer_name: layer_name.to_string(),
			id,
		}
	}
	pub fn get_layer_name(&self) -> &str {
		&self.layer_name
	}
	pub fn get_id(&self) -> u32 {
		self.id
	}
	/// A rectangle is degenerate when any part of it is non-finite or it has
	/// (near) zero or negative extent
	pub fn is_degenerate(&self) -> bool {
		!(self.x.is_finite()
			&& self.y.is_finite()
			&& self.width.is_finite()
			&& self.height.is_finite())
			|| self.width <= DEGENERATE_EXTENT
			|| self.height <= DEGENERATE_EXTENT
	}
	/// The rectangle translated by `offset`
	pub fn get_rect(&self, offset: Vec2) -> Rect {
		let min = Vec2::new(self.x, self.y) + offset;
		Rect {
			min,
			max: min + Vec2::new(self.width, self.height),
		}
	}
}

/// Everything a map loader knows about a map's static collision
#[derive(Clone, Debug, Default)]
pub struct MapGeometry {
	/// Pixel width and height of the whole map
	map_size: Vec2,
	/// Pixel width and height of one tile
	tile_size: Vec2,
	/// World position of the map's top left corner
	placement: Vec2,
	/// Tile layers flagged as colliding
	collision_layers: Vec<TileCollisionLayer>,
	/// Freeform colliders
	obstacles: Vec<ObstacleRect>,
	/// Whether `obstacles` are relative to the map's top left rather than the
	/// world
	obstacles_are_map_local: bool,
}

impl MapGeometry {
	/// Create a new instance of [MapGeometry] with no collision data
	pub fn new(map_size: Vec2, tile_size: Vec2, placement: Vec2) -> Self {
		MapGeometry {
			map_size,
			tile_size,
			placement,
			..default()
		}
	}
	/// Add a tile collision layer
	pub fn with_collision_layer(mut self, layer: TileCollisionLayer) -> Self {
		self.collision_layers.push(layer);
		self
	}
	/// Add obstacle rectangles along with the coordinate space they were
	/// authored in. The flag is per map so the last call wins
	pub fn with_obstacles(mut self, obstacles: Vec<ObstacleRect>, map_local: bool) -> Self {
		self.obstacles.extend(obstacles);
		self.obstacles_are_map_local = map_local;
		self
	}
	pub fn get_map_size(&self) -> Vec2 {
		self.map_size
	}
	pub fn get_tile_size(&self) -> Vec2 {
		self.tile_size
	}
	pub fn get_placement(&self) -> Vec2 {
		self.placement
	}
	pub fn get_collision_layers(&self) -> &[TileCollisionLayer] {
		&self.collision_layers
	}
	pub fn get_obstacles(&self) -> &[ObstacleRect] {
		&self.obstacles
	}
	pub fn are_obstacles_map_local(&self) -> bool {
		self.obstacles_are_map_local
	}
	/// A map is only usable when its pixel size and tile size are finite and
	/// positive
	pub fn is_valid(&self) -> bool {
		let positive = |v: Vec2| v.is_finite() && v.x > 0.0 && v.y > 0.0;
		positive(self.map_size) && positive(self.tile_size) && self.placement.is_finite()
	}
	/// World rectangle of the map
	pub fn get_world_rect(&self) -> Rect {
		Rect {
			min: self.placement,
			max: self.placement + self.map_size,
		}
	}
	/// World rectangle of the tile at `(column, row)`
	pub fn get_tile_rect(&self, column: u32, row: u32) -> Rect {
		let min = self.placement + Vec2::new(column as f32, row as f32) * self.tile_size;
		Rect {
			min,
			max: min + self.tile_size,
		}
	}
	/// Offset to move an obstacle into world space
	pub fn get_obstacle_offset(&self) -> Vec2 {
		if self.are_obstacles_map_local() {
			self.placement
		} else {
			Vec2::ZERO
		}
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn layer_size_mismatch() {
		let result = TileCollisionLayer::from_flags("walls", 3, 3, vec![true; 8]);
		assert!(matches!(
			result,
			Err(NavigationError::LayerSize {
				expected: 9,
				found: 8,
				..
			})
		));
	}
	#[test]
	fn iterate_colliding_tiles() {
		let mut layer = TileCollisionLayer::new("walls", 4, 3);
		layer.set_collides(1, 0, true);
		layer.set_collides(3, 2, true);
		layer.set_collides(9, 9, true);
		let result: Vec<(u32, u32)> = layer.iter_colliding().collect();
		assert_eq!(vec![(1, 0), (3, 2)], result);
		assert!(!layer.get_collides(9, 9));
	}
	#[test]
	fn degenerate_obstacles() {
		assert!(ObstacleRect::new(0.0, 0.0, 0.0, 10.0, "objects", 1).is_degenerate());
		assert!(ObstacleRect::new(0.0, 0.0, 10.0, 0.001, "objects", 2).is_degenerate());
		assert!(ObstacleRect::new(0.0, 0.0, -5.0, 10.0, "objects", 3).is_degenerate());
		assert!(ObstacleRect::new(f32::NAN, 0.0, 5.0, 10.0, "objects", 4).is_degenerate());
		assert!(ObstacleRect::new(0.0, 0.0, f32::INFINITY, 10.0, "objects", 5).is_degenerate());
		assert!(!ObstacleRect::new(-3.0, 2.0, 1.0, 1.0, "objects", 6).is_degenerate());
	}
	#[test]
	fn obstacle_offset_follows_flag() {
		let placement = Vec2::new(100.0, 50.0);
		let geometry = MapGeometry::new(Vec2::splat(64.0), Vec2::splat(32.0), placement)
			.with_obstacles(vec![ObstacleRect::new(0.0, 0.0, 8.0, 8.0, "o", 1)], true);
		assert!(geometry.are_obstacles_map_local());
		assert_eq!(placement, geometry.get_obstacle_offset());
		let geometry = geometry.with_obstacles(vec![], false);
		assert!(!geometry.are_obstacles_map_local());
		assert_eq!(Vec2::ZERO, geometry.get_obstacle_offset());
		assert_eq!(1, geometry.get_obstacles().len());
		assert_eq!("o", geometry.get_obstacles()[0].get_layer_name());
	}
	#[test]
	fn invalid_geometry() {
		assert!(!MapGeometry::new(Vec2::splat(64.0), Vec2::ZERO, Vec2::ZERO).is_valid());
		assert!(!MapGeometry::new(Vec2::new(64.0, f32::NAN), Vec2::ONE, Vec2::ZERO).is_valid());
		assert!(MapGeometry::new(Vec2::splat(64.0), Vec2::splat(32.0), Vec2::ZERO).is_valid());
	}
	#[test]
	#[cfg(feature = "csv")]
	fn collision_layer_csv() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/csv/walls.csv";
		let layer = TileCollisionLayer::from_csv("walls", &path).unwrap();
		assert_eq!(5, layer.get_columns());
		assert_eq!(4, layer.get_rows());
		assert!(layer.get_collides(0, 0));
		assert!(!layer.get_collides(1, 1));
		assert!(layer.get_collides(2, 2));
	}
	#[test]
	#[cfg(feature = "csv")]
	fn collision_layer_csv_ragged_rows() {
		// rows of 4, 6 and 2 tiles add up to 3 rows of 4
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/csv/ragged.csv";
		let result = TileCollisionLayer::from_csv("walls", &path);
		assert!(matches!(
			result,
			Err(NavigationError::RaggedRow {
				row: 1,
				expected: 4,
				found: 6,
			})
		));
	}
	#[test]
	#[cfg(feature = "heightmap")]
	fn collision_layer_heightmap() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/heightmap/walls.png";
		let layer = TileCollisionLayer::from_heightmap("walls", &path, 128).unwrap();
		assert_eq!(4, layer.get_columns());
		assert_eq!(4, layer.get_rows());
		// black border, white interior
		assert!(layer.get_collides(0, 0));
		assert!(layer.get_collides(3, 1));
		assert!(!layer.get_collides(1, 1));
		assert!(!layer.get_collides(2, 2));
	}
}
