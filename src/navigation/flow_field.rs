//! The FlowField holds, for every cell of a [NavGrid], the number of steps to
//! a single target cell (the seed) and the direction of the neighbour to step
//! onto to get closer to it. Any number of agents can read their own cell and
//! follow the arrows without pathfinding of their own.
//!
//! The field is rebuilt by a breadth-first flood fill outwards from the seed
//! whenever the tracked target moves to a new cell. For a seed near the
//! centre of an open grid, with diagonals disabled, the distances form a
//! diamond:
//!
//! ```text
//!  ___________________________________________________________
//! |     |     |     |     |     |     |     |     |     |     |
//! |  8  |  7  |  6  |  5  |  4  |  5  |  6  |  7  |  8  |  9  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  7  |  6  |  5  |  4  |  3  |  4  |  5  |  6  |  7  |  8  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  6  |  5  |  4  |  3  |  2  |  3  |  4  |  5  |  6  |  7  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  5  |  4  |  3  |  2  |  1  |  2  |  3  |  4  |  5  |  6  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! |     |     |     |     |     |     |     |     |     |     |
//! |  4  |  3  |  2  |  1  |  0  |  1  |  2  |  3  |  4  |  5  |
//! |_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|
//! ```
//!
//! Unreachable and blocked cells keep a distance of `-1` and
//! [Ordinal::Zero] as their direction. Consumers are expected to fall back to
//! something else (such as moving in a straight line) when they see that.
//!
//! A target that is itself blocked, for instance when it hugs a wall and the
//! wall's padding covers it, is resolved to a nearby walkable seed by first
//! searching the window covered by the target's footprint and then searching
//! rings around it with [NavGrid::find_nearest_walkable].
//!

use std::time::Duration;

use bevy::prelude::*;

use crate::prelude::*;

/// Distance of a cell the flood fill hasn't reached
pub const UNREACHED: i32 = -1;

/// What a call to [FlowField::update_target] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetUpdate {
	/// Target is in the same cell as before and the field is valid
	Unchanged,
	/// A rebuild was wanted but the minimum rebuild gap hasn't elapsed, the
	/// previous field is left as it is
	Throttled,
	/// The target moved but the existing seed still sits under its footprint
	SeedRetained(GridCell),
	/// The field was flood filled from a new seed
	Rebuilt(GridCell),
	/// No walkable seed could be found, or the grid is unusable, so every cell
	/// is unreached
	Cleared,
}

/// Per-cell distances and directions towards a single seed cell
#[derive(Component, Clone, Debug, Reflect)]
pub struct FlowField {
	/// Expansion and throttle settings
	config: FlowFieldConfig,
	/// Columns of the [NavGrid] this field was created for
	width: u32,
	/// Rows of the [NavGrid] this field was created for
	height: u32,
	/// Steps to the seed per cell, `-1` when unreached
	distances: Vec<i32>,
	/// Direction of travel per cell
	directions: Vec<Ordinal>,
	/// Flood fill queue, each cell is pushed at most once so it never grows
	/// beyond the cell count
	queue: Vec<u32>,
	/// Index of the cell the target was last in when a rebuild was attempted
	last_requested: Option<usize>,
	/// Index of the seed the field was last flood filled from
	built_seed: Option<usize>,
	/// Elapsed time before which a non-forced rebuild is skipped
	next_rebuild_at: Duration,
}

impl FlowField {
	/// Create an unbuilt [FlowField] with buffers sized to the `nav_grid`
	pub fn new(nav_grid: &NavGrid, config: FlowFieldConfig) -> Self {
		let cell_count = nav_grid.cell_count();
		FlowField {
			config,
			width: nav_grid.get_width(),
			height: nav_grid.get_height(),
			distances: vec![UNREACHED; cell_count],
			directions: vec![Ordinal::Zero; cell_count],
			queue: Vec::with_capacity(cell_count),
			last_requested: None,
			built_seed: None,
			next_rebuild_at: Duration::ZERO,
		}
	}
	pub fn get_config(&self) -> &FlowFieldConfig {
		&self.config
	}
	pub fn get_width(&self) -> u32 {
		self.width
	}
	pub fn get_height(&self) -> u32 {
		self.height
	}
	/// Get a reference to the distances, row-major
	pub fn get_distances(&self) -> &[i32] {
		&self.distances
	}
	/// Get a reference to the directions, row-major
	pub fn get_directions(&self) -> &[Ordinal] {
		&self.directions
	}
	/// The cell the field was last built from
	pub fn get_seed(&self) -> Option<GridCell> {
		self.built_seed.map(|index| self.index_to_cell(index))
	}
	/// The cell the target was in on the last accepted update
	pub fn get_last_requested(&self) -> Option<GridCell> {
		self.last_requested.map(|index| self.index_to_cell(index))
	}
	/// A field is built when its seed is still at distance `0`
	pub fn is_built(&self) -> bool {
		self.built_seed
			.and_then(|index| self.distances.get(index))
			.is_some_and(|d| *d == 0)
	}
	/// Number of cells with a known distance to the seed
	pub fn reached_count(&self) -> usize {
		self.distances.iter().filter(|d| **d >= 0).count()
	}
	/// Steps from `(column, row)` to the seed, `-1` if unreached or out of
	/// bounds
	pub fn get_distance(&self, column: i32, row: i32) -> i32 {
		self.cell_index(GridCell::new(column, row))
			.map(|index| self.distances[index])
			.unwrap_or(UNREACHED)
	}
	/// Direction to travel from `(column, row)`, [Ordinal::Zero] if unreached,
	/// the seed itself or out of bounds
	pub fn get_direction(&self, column: i32, row: i32) -> Ordinal {
		self.cell_index(GridCell::new(column, row))
			.map(|index| self.directions[index])
			.unwrap_or(Ordinal::Zero)
	}
	/// Direction to travel from the cell containing a world position
	pub fn get_direction_at_xy(&self, nav_grid: &NavGrid, position: Vec2) -> Ordinal {
		let (column, row) = nav_grid.world_to_cell(position).get_column_row();
		self.get_direction(column, row)
	}
	/// Steps to the seed from the cell containing a world position
	pub fn get_distance_at_xy(&self, nav_grid: &NavGrid, position: Vec2) -> i32 {
		let (column, row) = nav_grid.world_to_cell(position).get_column_row();
		self.get_distance(column, row)
	}
	/// Mark every cell as unreached and forget the seed
	pub fn clear(&mut self) {
		self.distances.fill(UNREACHED);
		self.directions.fill(Ordinal::Zero);
		self.built_seed = None;
	}
	/// Track a target at world `position`. `now` is the elapsed time used for
	/// throttling and `force` bypasses both throttling and seed retention.
	///
	/// 1. A target still in the last requested cell of a built field does nothing
	/// 2. If the target moved but the current seed is still under the target's
	///    footprint the field is kept
	/// 3. Otherwise a rebuild is throttled by the minimum rebuild gap
	/// 4. A seed is chosen, the walkable footprint cell nearest to the target's
	///    cell, else the nearest walkable cell within the search radius
	/// 5. The field is flood filled from the seed
	pub fn update_target(
		&mut self,
		nav_grid: &NavGrid,
		position: Vec2,
		now: Duration,
		force: bool,
	) -> TargetUpdate {
		if nav_grid.get_width() != self.width
			|| nav_grid.get_height() != self.height
			|| nav_grid.cell_count() != self.distances.len()
		{
			error!(
				"FlowField sized {}x{} cannot track a target on a NavGrid of {}x{}",
				self.width,
				self.height,
				nav_grid.get_width(),
				nav_grid.get_height()
			);
			self.clear();
			return TargetUpdate::Cleared;
		}
		if nav_grid.is_empty() {
			self.clear();
			return TargetUpdate::Cleared;
		}
		let requested = nav_grid.clamp_cell(nav_grid.world_to_cell(position));
		let Some(requested_index) = nav_grid.get_index(requested) else {
			self.clear();
			return TargetUpdate::Cleared;
		};
		if !force && self.last_requested == Some(requested_index) && self.is_built() {
			return TargetUpdate::Unchanged;
		}
		let footprint_radius = self
			.config
			.get_footprint_cell_radius(nav_grid.get_cell_size());
		if !force && self.is_built() {
			if let Some(seed) = self.get_seed() {
				if nav_grid.is_cell_walkable(seed)
					&& seed.chebyshev_distance(&requested) <= footprint_radius
				{
					self.last_requested = Some(requested_index);
					return TargetUpdate::SeedRetained(seed);
				}
			}
		}
		if !force {
			if now < self.next_rebuild_at {
				return TargetUpdate::Throttled;
			}
			self.next_rebuild_at = now + self.config.get_min_rebuild_gap();
		}
		self.last_requested = Some(requested_index);
		let seed = find_seed_in_window(nav_grid, requested, footprint_radius).or_else(|| {
			nav_grid.find_nearest_walkable(requested, self.config.get_search_radius())
		});
		if let Some(seed) = seed {
			if self.rebuild(nav_grid, seed) {
				return TargetUpdate::Rebuilt(seed);
			}
		}
		debug!(
			"No walkable seed near {:?}, FlowField cleared",
			requested.get_column_row()
		);
		self.clear();
		TargetUpdate::Cleared
	}
	/// Flood fill the field from `seed`. Returns `false` and leaves the field
	/// cleared if the seed is not walkable or the grid doesn't match the field
	pub fn rebuild(&mut self, nav_grid: &NavGrid, seed: GridCell) -> bool {
		self.clear();
		if nav_grid.cell_count() != self.distances.len() || nav_grid.get_width() != self.width {
			return false;
		}
		let Some(seed_index) = nav_grid.get_index(seed) else {
			return false;
		};
		if !nav_grid.is_index_walkable(seed_index) {
			return false;
		}
		let allow_diagonal = self.config.allows_diagonal();
		let allow_corner_cutting = self.config.allows_corner_cutting();
		self.distances[seed_index] = 0;
		self.queue.clear();
		self.queue.push(seed_index as u32);
		let mut head = 0;
		while head < self.queue.len() {
			let index = self.queue[head] as usize;
			head += 1;
			let cell = nav_grid.get_cell_from_index(index);
			let next = self.distances[index] + 1;
			for ordinal in neighbour_ordinals(allow_diagonal) {
				if !can_step(nav_grid, cell, *ordinal, allow_corner_cutting) {
					continue;
				}
				let Some(n_index) = nav_grid.get_index(cell.step(*ordinal)) else {
					continue;
				};
				if self.distances[n_index] == UNREACHED {
					self.distances[n_index] = next;
					self.queue.push(n_index as u32);
				}
			}
		}
		// point every reached cell at its closest neighbour
		for index in 0..self.distances.len() {
			if self.distances[index] <= 0 {
				continue;
			}
			let cell = nav_grid.get_cell_from_index(index);
			let mut best = (Ordinal::Zero, i32::MAX);
			for ordinal in neighbour_ordinals(allow_diagonal) {
				if !can_step(nav_grid, cell, *ordinal, allow_corner_cutting) {
					continue;
				}
				let Some(n_index) = nav_grid.get_index(cell.step(*ordinal)) else {
					continue;
				};
				let distance = self.distances[n_index];
				if distance >= 0 && distance < best.1 {
					best = (*ordinal, distance);
				}
			}
			self.directions[index] = best.0;
		}
		self.built_seed = Some(seed_index);
		trace!(
			"Rebuilt FlowField from seed {:?}, reached {} cells",
			seed.get_column_row(),
			self.queue.len()
		);
		true
	}
	/// Flat index of a cell of this field
	fn cell_index(&self, cell: GridCell) -> Option<usize> {
		let (column, row) = cell.get_column_row();
		if column < 0 || row < 0 || column as u32 >= self.width || row as u32 >= self.height {
			return None;
		}
		Some(row as usize * self.width as usize + column as usize)
	}
	/// The cell of a flat index
	fn index_to_cell(&self, index: usize) -> GridCell {
		let width = (self.width as usize).max(1);
		GridCell::new((index % width) as i32, (index / width) as i32)
	}
}

/// Neighbour directions in tie-break precedence order
fn neighbour_ordinals(allow_diagonal: bool) -> &'static [Ordinal] {
	/// North, East, South, West then NorthEast, SouthEast, SouthWest, NorthWest
	static ALL: [Ordinal; 8] = [
		ORTHOGONAL_ORDINALS[0],
		ORTHOGONAL_ORDINALS[1],
		ORTHOGONAL_ORDINALS[2],
		ORTHOGONAL_ORDINALS[3],
		DIAGONAL_ORDINALS[0],
		DIAGONAL_ORDINALS[1],
		DIAGONAL_ORDINALS[2],
		DIAGONAL_ORDINALS[3],
	];
	if allow_diagonal {
		&ALL
	} else {
		&ALL[..4]
	}
}

/// Whether an agent can move from `cell` one step in the `ordinal` direction.
/// A diagonal step also needs both flanking orthogonal cells to be walkable
/// unless corner cutting is allowed
fn can_step(nav_grid: &NavGrid, cell: GridCell, ordinal: Ordinal, allow_corner_cutting: bool) -> bool {
	if !nav_grid.is_cell_walkable(cell.step(ordinal)) {
		return false;
	}
	if allow_corner_cutting || !ordinal.is_diagonal() {
		return true;
	}
	ordinal
		.get_flanking_ordinals()
		.is_some_and(|(a, b)| nav_grid.is_cell_walkable(cell.step(a)) && nav_grid.is_cell_walkable(cell.step(b)))
}

/// Search the square window of `radius` cells around `centre` for the
/// walkable cell nearest to it. Ties keep the first cell found scanning rows
/// top to bottom, left to right. Only the part of the window on the grid is
/// scanned
fn find_seed_in_window(nav_grid: &NavGrid, centre: GridCell, radius: i32) -> Option<GridCell> {
	if nav_grid.is_empty() {
		return None;
	}
	let cx = centre.get_column() as i64;
	let cy = centre.get_row() as i64;
	let radius = radius.max(0) as i64;
	let columns = (cx - radius).max(0)..=(cx + radius).min(nav_grid.get_width() as i64 - 1);
	let rows = (cy - radius).max(0)..=(cy + radius).min(nav_grid.get_height() as i64 - 1);
	let mut best: Option<(GridCell, i64)> = None;
	for y in rows {
		for x in columns.clone() {
			let cell = GridCell::new(x as i32, y as i32);
			if !nav_grid.is_cell_walkable(cell) {
				continue;
			}
			let d2 = (x - cx).pow(2) + (y - cy).pow(2);
			if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
				best = Some((cell, d2));
			}
		}
	}
	best.map(|(cell, _)| cell)
}
