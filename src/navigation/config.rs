//! Tunables for building a [crate::prelude::NavGrid] and maintaining a
//! [crate::prelude::FlowField].
//!
//! None of the defaults are load-bearing, they're starting points tuned for
//! `8px` cells over `32px` tiles with agents roughly `16px` across
//!

use std::time::Duration;

use bevy::prelude::*;

/// Default size of a grid cell in pixels
pub const DEFAULT_CELL_SIZE: f32 = 8.0;
/// Default outward growth of every blocked shape, `0.75` of a default cell
pub const DEFAULT_OBSTACLE_PADDING: f32 = 6.0;
/// Default minimum time between two throttled flow field rebuilds
pub const DEFAULT_MIN_REBUILD_GAP: Duration = Duration::from_millis(100);
/// Default number of rings searched for a walkable seed
pub const DEFAULT_SEARCH_RADIUS: u32 = 8;
/// Default width/height of the tracked target's body in pixels
pub const DEFAULT_FOOTPRINT_SIZE: f32 = 16.0;

/// How static map geometry is rasterised into a [crate::prelude::NavGrid]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct NavGridConfig {
	/// Pixel width and height of a cell, may be finer than the tile size to
	/// better approximate round bodies
	cell_size: f32,
	/// World position of cell `(0, 0)`'s top left corner. When [None] the
	/// map's own world placement is used
	origin: Option<Vec2>,
	/// Pixels shaved off every side of a colliding tile before it is stamped,
	/// lets agents graze tile edges
	tile_erosion: f32,
	/// Pixels every blocked shape is grown by, approximates the radius of an
	/// agent so it doesn't clip corners
	obstacle_padding: f32,
}

impl Default for NavGridConfig {
	fn default() -> Self {
		NavGridConfig {
			cell_size: DEFAULT_CELL_SIZE,
			origin: None,
			tile_erosion: 0.0,
			obstacle_padding: DEFAULT_OBSTACLE_PADDING,
		}
	}
}

impl NavGridConfig {
	/// Set the cell size
	pub fn with_cell_size(mut self, cell_size: f32) -> Self {
		self.cell_size = cell_size;
		self
	}
	/// Pin the grid origin instead of deriving it from the map placement
	pub fn with_origin(mut self, origin: Vec2) -> Self {
		self.origin = Some(origin);
		self
	}
	/// Set the tile erosion
	pub fn with_tile_erosion(mut self, tile_erosion: f32) -> Self {
		self.tile_erosion = tile_erosion;
		self
	}
	/// Set the obstacle padding
	pub fn with_obstacle_padding(mut self, obstacle_padding: f32) -> Self {
		self.obstacle_padding = obstacle_padding;
		self
	}
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	pub fn get_origin(&self) -> Option<Vec2> {
		self.origin
	}
	/// Erosion with negative or non-finite values treated as `0`
	pub fn get_tile_erosion(&self) -> f32 {
		sanitise_length(self.tile_erosion)
	}
	/// Padding with negative or non-finite values treated as `0`
	pub fn get_obstacle_padding(&self) -> f32 {
		sanitise_length(self.obstacle_padding)
	}
}

/// Clamp a pixel length to be finite and non-negative
fn sanitise_length(length: f32) -> f32 {
	if length.is_finite() {
		length.max(0.0)
	} else {
		0.0
	}
}

/// How a [crate::prelude::FlowField] expands and how often it may rebuild
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct FlowFieldConfig {
	/// Expand to and point along the four diagonals as well as the orthogonals
	allow_diagonal: bool,
	/// Permit a diagonal step even when one of the orthogonal cells flanking
	/// it is blocked
	allow_corner_cutting: bool,
	/// Minimum time between two rebuilds that aren't forced
	#[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
	min_rebuild_gap: Duration,
	/// Rings searched around a blocked target for a walkable seed once the
	/// footprint window comes up empty
	search_radius: u32,
	/// Width/height in pixels of the tracked target's body
	footprint_size: f32,
}

impl Default for FlowFieldConfig {
	fn default() -> Self {
		FlowFieldConfig {
			allow_diagonal: true,
			allow_corner_cutting: false,
			min_rebuild_gap: DEFAULT_MIN_REBUILD_GAP,
			search_radius: DEFAULT_SEARCH_RADIUS,
			footprint_size: DEFAULT_FOOTPRINT_SIZE,
		}
	}
}

impl FlowFieldConfig {
	/// Enable or disable diagonal movement
	pub fn with_diagonal(mut self, allow_diagonal: bool) -> Self {
		self.allow_diagonal = allow_diagonal;
		self
	}
	/// Enable or disable corner cutting on diagonal steps
	pub fn with_corner_cutting(mut self, allow_corner_cutting: bool) -> Self {
		self.allow_corner_cutting = allow_corner_cutting;
		self
	}
	/// Set the throttle gap
	pub fn with_min_rebuild_gap(mut self, min_rebuild_gap: Duration) -> Self {
		self.min_rebuild_gap = min_rebuild_gap;
		self
	}
	/// Set the fallback search radius in cells
	pub fn with_search_radius(mut self, search_radius: u32) -> Self {
		self.search_radius = search_radius;
		self
	}
	/// Set the footprint size in pixels
	pub fn with_footprint_size(mut self, footprint_size: f32) -> Self {
		self.footprint_size = footprint_size;
		self
	}
	pub fn allows_diagonal(&self) -> bool {
		self.allow_diagonal
	}
	pub fn allows_corner_cutting(&self) -> bool {
		self.allow_corner_cutting
	}
	pub fn get_min_rebuild_gap(&self) -> Duration {
		self.min_rebuild_gap
	}
	pub fn get_search_radius(&self) -> u32 {
		self.search_radius
	}
	pub fn get_footprint_size(&self) -> f32 {
		sanitise_length(self.footprint_size)
	}
	/// Half the footprint expressed in whole cells, rounded up so that a body
	/// straddling a cell boundary is always covered
	pub fn get_footprint_cell_radius(&self, cell_size: f32) -> i32 {
		let footprint = self.get_footprint_size();
		if cell_size <= 0.0 || !cell_size.is_finite() {
			return 0;
		}
		((footprint / 2.0) / cell_size).ceil() as i32
	}
}

/// Grouping of the grid and flow settings that the
/// [crate::prelude::NavigationPlugin] applies to every loaded map
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct NavigationConfig {
	/// Rasterisation settings
	grid: NavGridConfig,
	/// Flood fill and throttle settings
	flow: FlowFieldConfig,
}

impl NavigationConfig {
	/// Create a new instance of [NavigationConfig]
	pub fn new(grid: NavGridConfig, flow: FlowFieldConfig) -> Self {
		NavigationConfig { grid, flow }
	}
	pub fn get_grid(&self) -> &NavGridConfig {
		&self.grid
	}
	pub fn get_flow(&self) -> &FlowFieldConfig {
		&self.flow
	}
	/// From a `ron` file generate the [NavigationConfig]. Missing fields
	/// fall back to their defaults
	#[cfg(feature = "ron")]
	pub fn from_ron(path: &str) -> crate::error::Result<Self> {
		let file = std::fs::File::open(path).map_err(|source| crate::error::NavigationError::Io {
			path: path.to_string(),
			source,
		})?;
		let config: NavigationConfig = ron::de::from_reader(file)?;
		Ok(config)
	}
}

/// (De)serialize a [Duration] as a whole number of milliseconds
#[cfg(feature = "serde")]
mod duration_millis {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	/// Write the duration as milliseconds
	pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(duration.as_millis() as u64)
	}
	/// Read milliseconds into a duration
	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		let millis = u64::deserialize(deserializer)?;
		Ok(Duration::from_millis(millis))
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn default_padding_is_three_quarters_of_a_cell() {
		let config = NavGridConfig::default();
		assert_eq!(config.get_cell_size() * 0.75, config.get_obstacle_padding());
	}
	#[test]
	fn negative_lengths_are_ignored() {
		let config = NavGridConfig::default()
			.with_tile_erosion(-4.0)
			.with_obstacle_padding(f32::NAN);
		assert_eq!(0.0, config.get_tile_erosion());
		assert_eq!(0.0, config.get_obstacle_padding());
	}
	#[test]
	fn footprint_radius() {
		let config = FlowFieldConfig::default().with_footprint_size(16.0);
		assert_eq!(1, config.get_footprint_cell_radius(8.0));
		let config = config.with_footprint_size(17.0);
		assert_eq!(2, config.get_footprint_cell_radius(8.0));
		let config = config.with_footprint_size(0.0);
		assert_eq!(0, config.get_footprint_cell_radius(8.0));
		let config = config.with_footprint_size(-16.0);
		assert_eq!(0.0, config.get_footprint_size());
		assert_eq!(0, config.get_footprint_cell_radius(8.0));
		assert_eq!(0, config.get_footprint_cell_radius(0.0));
	}
	#[test]
	#[cfg(feature = "ron")]
	fn navigation_config_file() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/navigation_config.ron";
		let config = NavigationConfig::from_ron(&path).unwrap();
		assert_eq!(8.0, config.get_grid().get_cell_size());
		assert_eq!(Duration::from_millis(150), config.get_flow().get_min_rebuild_gap());
		assert!(!config.get_flow().allows_corner_cutting());
	}
	#[test]
	#[cfg(feature = "ron")]
	fn navigation_config_missing_file() {
		let result = NavigationConfig::from_ron("/does/not/exist.ron");
		assert!(matches!(
			result,
			Err(crate::error::NavigationError::Io { .. })
		));
	}
}
