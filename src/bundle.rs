//! A map entity owns one [NavGrid] and one [FlowField] built over it
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Navigation data of a single map
#[derive(Bundle, Clone, Debug)]
pub struct NavigationBundle {
	/// Walkability of the map
	nav_grid: NavGrid,
	/// Directions towards the tracked target
	flow_field: FlowField,
}

impl NavigationBundle {
	/// Create a new instance of [NavigationBundle] by rasterising the `geometry`
	/// of a map, the [FlowField] starts unbuilt
	pub fn new(geometry: &MapGeometry, config: &NavigationConfig) -> Self {
		let nav_grid = NavGrid::new(geometry, config.get_grid());
		NavigationBundle::from_nav_grid(nav_grid, *config.get_flow())
	}
	/// Create a new instance of [NavigationBundle] around an existing [NavGrid]
	pub fn from_nav_grid(nav_grid: NavGrid, flow_config: FlowFieldConfig) -> Self {
		let flow_field = FlowField::new(&nav_grid, flow_config);
		NavigationBundle {
			nav_grid,
			flow_field,
		}
	}
	pub fn get_nav_grid(&self) -> &NavGrid {
		&self.nav_grid
	}
	pub fn get_flow_field(&self) -> &FlowField {
		&self.flow_field
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn field_matches_grid() {
		let geometry = MapGeometry::new(Vec2::new(64.0, 32.0), Vec2::splat(32.0), Vec2::ZERO);
		let bundle = NavigationBundle::new(&geometry, &NavigationConfig::default());
		assert_eq!(8, bundle.get_nav_grid().get_width());
		assert_eq!(4, bundle.get_nav_grid().get_height());
		assert_eq!(
			bundle.get_nav_grid().cell_count(),
			bundle.get_flow_field().get_distances().len()
		);
		assert!(!bundle.get_flow_field().is_built());
	}
	#[test]
	fn invalid_geometry_gives_empty_bundle() {
		let geometry = MapGeometry::new(Vec2::ZERO, Vec2::splat(32.0), Vec2::ZERO);
		let bundle = NavigationBundle::new(&geometry, &NavigationConfig::default());
		assert!(bundle.get_nav_grid().is_empty());
		assert!(bundle.get_flow_field().get_distances().is_empty());
	}
}
