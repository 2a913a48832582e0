//! The NavGrid is a static walkability raster of a bounded map. It contains a
//! flat array of 8-bit values, `1` for a walkable cell and `0` for a blocked
//! one, indexed `row * width + column`.
//!
//! Cells are usually finer than the map's tiles (e.g `8px` cells over `32px`
//! tiles) so that the blocked area can hug the outline of a round agent rather
//! than whole tiles. An example of a single `32x32` colliding tile at `(16, 16)` stamped
//! over `8px` cells with `6px` of padding, `x` marks blocked:
//!
//! ```text
//!  _______________________________________
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   | x | x | x | x | x | x |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   | x | x | x | x | x | x |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   | x | x | x | x | x | x |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   | x | x | x | x | x | x |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   | x | x | x | x | x | x |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   | x | x | x | x | x | x |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |   |
//! |___|___|___|___|___|___|___|___|___|___|
//! ```
//!
//! The grid is built once per map load and never mutated afterwards.
//!

pub mod geometry;

use bevy::math::Rect;
use bevy::prelude::*;

use crate::prelude::*;

/// Mask value of a cell an agent can occupy
const WALKABLE: u8 = 1;
/// Mask value of a cell an agent cannot occupy
const BLOCKED: u8 = 0;
/// A tile is never eroded to be thinner than this many pixels
const MIN_ERODED_EXTENT: f32 = 1.0;
/// Slack used when deciding whether a cell pokes outside the map
const EXTENT_EPSILON: f32 = 0.0001;

/// A walkability raster of a bounded map
#[derive(Component, Clone, Debug, Reflect)]
pub struct NavGrid {
	/// Pixel width and height of a cell
	cell_size: f32,
	/// Number of cell columns
	width: u32,
	/// Number of cell rows
	height: u32,
	/// World position of the top left corner of cell `(0, 0)`
	origin: Vec2,
	/// Pixel width and height of the map
	map_size: Vec2,
	/// Row-major walkability, `1` walkable and `0` blocked
	mask: Vec<u8>,
}

impl Default for NavGrid {
	fn default() -> Self {
		NavGrid::empty(DEFAULT_CELL_SIZE)
	}
}

impl NavGrid {
	/// Rasterise the `geometry` of a map into a new [NavGrid].
	///
	/// 1. Every cell starts walkable
	/// 2. Each colliding tile is eroded, then stamped as blocked with padding
	/// 3. Each obstacle is moved into world space and stamped with padding
	/// 4. Any cell fully or partially outside the map is blocked
	///
	/// Invalid geometry or a bad cell size produces an empty grid on which
	/// every query reports blocked
	pub fn new(geometry: &MapGeometry, config: &NavGridConfig) -> Self {
		let cell_size = config.get_cell_size();
		if !geometry.is_valid() || !cell_size.is_finite() || cell_size <= 0.0 {
			warn!(
				"Map geometry or cell size is invalid (map {:?}, tile {:?}, cell {}), creating an empty NavGrid",
				geometry.get_map_size(),
				geometry.get_tile_size(),
				cell_size
			);
			return NavGrid::empty(cell_size);
		}
		let map_size = geometry.get_map_size();
		let width = (map_size.x / cell_size).ceil() as u32;
		let height = (map_size.y / cell_size).ceil() as u32;
		let origin = config.get_origin().unwrap_or(geometry.get_placement());
		let mut grid = NavGrid {
			cell_size,
			width,
			height,
			origin,
			map_size,
			mask: vec![WALKABLE; width as usize * height as usize],
		};
		let padding = config.get_obstacle_padding();
		let erosion = config.get_tile_erosion();
		for layer in geometry.get_collision_layers() {
			for (column, row) in layer.iter_colliding() {
				let tile = geometry.get_tile_rect(column, row);
				grid.stamp_blocked(inflate(erode(tile, erosion), padding));
			}
		}
		let offset = geometry.get_obstacle_offset();
		trace!(
			"Stamping {} obstacles, map-local: {}",
			geometry.get_obstacles().len(),
			geometry.are_obstacles_map_local()
		);
		let mut skipped = 0;
		for obstacle in geometry.get_obstacles() {
			if obstacle.is_degenerate() {
				trace!(
					"Skipping degenerate obstacle {} of layer '{}'",
					obstacle.get_id(),
					obstacle.get_layer_name()
				);
				skipped += 1;
				continue;
			}
			grid.stamp_blocked(inflate(obstacle.get_rect(offset), padding));
		}
		if skipped > 0 {
			debug!("Skipped {} degenerate obstacles", skipped);
		}
		grid.block_outside_map(geometry.get_world_rect());
		debug!(
			"Built NavGrid {}x{} cells of {}px, {} walkable",
			width,
			height,
			cell_size,
			grid.walkable_count()
		);
		grid
	}
	/// Create a [NavGrid] with zero cells
	pub fn empty(cell_size: f32) -> Self {
		NavGrid {
			cell_size,
			width: 0,
			height: 0,
			origin: Vec2::ZERO,
			map_size: Vec2::ZERO,
			mask: Vec::new(),
		}
	}
	/// Create a [NavGrid] directly from a row-major list of walkable flags,
	/// the map is taken to cover exactly `width * height` cells from
	/// `origin`. Returns an empty grid if the flags don't match the size
	pub fn from_walkable(
		width: u32,
		height: u32,
		cell_size: f32,
		origin: Vec2,
		walkable: &[bool],
	) -> Self {
		if walkable.len() != width as usize * height as usize
			|| !cell_size.is_finite()
			|| cell_size <= 0.0
		{
			warn!(
				"Cannot create a {}x{} NavGrid from {} flags, creating an empty NavGrid",
				width,
				height,
				walkable.len()
			);
			return NavGrid::empty(cell_size);
		}
		NavGrid {
			cell_size,
			width,
			height,
			origin,
			map_size: Vec2::new(width as f32, height as f32) * cell_size,
			mask: walkable
				.iter()
				.map(|w| if *w { WALKABLE } else { BLOCKED })
				.collect(),
		}
	}
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Number of cell columns
	pub fn get_width(&self) -> u32 {
		self.width
	}
	/// Number of cell rows
	pub fn get_height(&self) -> u32 {
		self.height
	}
	pub fn get_origin(&self) -> Vec2 {
		self.origin
	}
	pub fn get_map_size(&self) -> Vec2 {
		self.map_size
	}
	/// Get a reference to the walkability mask
	pub fn get_mask(&self) -> &[u8] {
		&self.mask
	}
	/// Total number of cells
	pub fn cell_count(&self) -> usize {
		self.mask.len()
	}
	/// Whether the grid has no cells at all
	pub fn is_empty(&self) -> bool {
		self.mask.is_empty()
	}
	/// Number of walkable cells
	pub fn walkable_count(&self) -> usize {
		self.mask.iter().filter(|v| **v == WALKABLE).count()
	}
	/// Check if a cell lies within the grid
	pub fn in_bounds(&self, cell: GridCell) -> bool {
		cell.get_column() >= 0
			&& cell.get_row() >= 0
			&& (cell.get_column() as u32) < self.width
			&& (cell.get_row() as u32) < self.height
	}
	/// Flat index of a cell, [None] when out of bounds
	pub fn get_index(&self, cell: GridCell) -> Option<usize> {
		if self.in_bounds(cell) {
			Some(cell.get_row() as usize * self.width as usize + cell.get_column() as usize)
		} else {
			None
		}
	}
	/// The cell of a flat index
	pub fn get_cell_from_index(&self, index: usize) -> GridCell {
		let width = (self.width as usize).max(1);
		GridCell::new((index % width) as i32, (index / width) as i32)
	}
	/// Clamp a cell into the grid
	pub fn clamp_cell(&self, cell: GridCell) -> GridCell {
		if self.is_empty() {
			return cell;
		}
		GridCell::new(
			cell.get_column().clamp(0, self.width as i32 - 1),
			cell.get_row().clamp(0, self.height as i32 - 1),
		)
	}
	/// Whether `(column, row)` is inside the grid and walkable
	pub fn is_walkable(&self, column: i32, row: i32) -> bool {
		self.is_cell_walkable(GridCell::new(column, row))
	}
	/// Whether `cell` is inside the grid and walkable
	pub fn is_cell_walkable(&self, cell: GridCell) -> bool {
		self.get_index(cell)
			.is_some_and(|index| self.mask[index] == WALKABLE)
	}
	/// Whether the cell with flat `index` is walkable, out of range is blocked
	pub fn is_index_walkable(&self, index: usize) -> bool {
		self.mask.get(index).is_some_and(|v| *v == WALKABLE)
	}
	/// Find the cell a world position sits in. The result may be outside of
	/// the grid
	pub fn world_to_cell(&self, position: Vec2) -> GridCell {
		let local = (position - self.origin) / self.cell_size;
		GridCell::new(local.x.floor() as i32, local.y.floor() as i32)
	}
	/// Whether a world position falls on a cell of the grid
	pub fn contains_point(&self, position: Vec2) -> bool {
		self.in_bounds(self.world_to_cell(position))
	}
	/// World position of the centre of a cell
	pub fn cell_to_world_centre(&self, cell: GridCell) -> Vec2 {
		let half = self.cell_size / 2.0;
		self.origin
			+ Vec2::new(
				cell.get_column() as f32 * self.cell_size + half,
				cell.get_row() as f32 * self.cell_size + half,
			)
	}
	/// If `cell` is walkable return it, otherwise search the rings around it
	/// (ring 1, ring 2, ...) up to `max_radius` and return the first walkable
	/// cell found. Each ring is scanned top edge left to right, bottom edge
	/// left to right, then the left and right cells of each row in between
	pub fn find_nearest_walkable(&self, cell: GridCell, max_radius: u32) -> Option<GridCell> {
		if self.is_empty() {
			return None;
		}
		if self.is_cell_walkable(cell) {
			return Some(cell);
		}
		let cx = cell.get_column() as i64;
		let cy = cell.get_row() as i64;
		let last_column = self.width as i64 - 1;
		let last_row = self.height as i64 - 1;
		// rings inside `first` miss the grid and ring `last` reaches its far corner
		let first = (-cx).max(cx - last_column).max(-cy).max(cy - last_row).max(1);
		let last = cx
			.max(last_column - cx)
			.max(cy)
			.max(last_row - cy)
			.min(max_radius as i64);
		for radius in first..=last {
			let top = cy - radius;
			let bottom = cy + radius;
			let left = cx - radius;
			let right = cx + radius;
			for y in [top, bottom] {
				if y < 0 || y > last_row {
					continue;
				}
				for x in left.max(0)..=right.min(last_column) {
					if self.is_walkable_in_grid(x, y) {
						return Some(GridCell::new(x as i32, y as i32));
					}
				}
			}
			for y in (top + 1).max(0)..=(bottom - 1).min(last_row) {
				for x in [left, right] {
					if (0..=last_column).contains(&x) && self.is_walkable_in_grid(x, y) {
						return Some(GridCell::new(x as i32, y as i32));
					}
				}
			}
		}
		None
	}
	/// Walkability of a cell already known to be within the grid
	fn is_walkable_in_grid(&self, column: i64, row: i64) -> bool {
		self.mask[row as usize * self.width as usize + column as usize] == WALKABLE
	}
	/// Mark every cell covered by a world rectangle as blocked. Cell bounds
	/// are found by flooring the minimum and ceiling the maximum so partial
	/// coverage blocks the whole cell
	fn stamp_blocked(&mut self, rect: Rect) {
		let min = (rect.min - self.origin) / self.cell_size;
		let max = (rect.max - self.origin) / self.cell_size;
		let column_start = min.x.floor().clamp(0.0, self.width as f32) as u32;
		let column_end = max.x.ceil().clamp(0.0, self.width as f32) as u32;
		let row_start = min.y.floor().clamp(0.0, self.height as f32) as u32;
		let row_end = max.y.ceil().clamp(0.0, self.height as f32) as u32;
		for row in row_start..row_end {
			for column in column_start..column_end {
				let index = row as usize * self.width as usize + column as usize;
				self.mask[index] = BLOCKED;
			}
		}
	}
	/// Block every cell which isn't entirely within the map's world rectangle
	fn block_outside_map(&mut self, map: Rect) {
		let map_min = map.min - Vec2::splat(EXTENT_EPSILON);
		let map_max = map.max + Vec2::splat(EXTENT_EPSILON);
		for row in 0..self.height {
			for column in 0..self.width {
				let cell_min =
					self.origin + Vec2::new(column as f32, row as f32) * self.cell_size;
				let cell_max = cell_min + Vec2::splat(self.cell_size);
				if cell_min.x < map_min.x
					|| cell_min.y < map_min.y
					|| cell_max.x > map_max.x
					|| cell_max.y > map_max.y
				{
					let index = row as usize * self.width as usize + column as usize;
					self.mask[index] = BLOCKED;
				}
			}
		}
	}
}

/// Shrink a rectangle on every side by `erosion`, never thinner than
/// [MIN_ERODED_EXTENT]
fn erode(rect: Rect, erosion: f32) -> Rect {
	let size = rect.max - rect.min;
	let limit = ((size.x.min(size.y) - MIN_ERODED_EXTENT) / 2.0).max(0.0);
	let amount = erosion.clamp(0.0, limit);
	Rect {
		min: rect.min + Vec2::splat(amount),
		max: rect.max - Vec2::splat(amount),
	}
}

/// Grow a rectangle on every side by `padding`
fn inflate(rect: Rect, padding: f32) -> Rect {
	Rect {
		min: rect.min - Vec2::splat(padding),
		max: rect.max + Vec2::splat(padding),
	}
}
