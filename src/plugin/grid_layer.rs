//! Logic for attaching and detaching a [NavGrid] as maps are loaded and
//! unloaded
//!

use crate::prelude::*;
use bevy::prelude::*;

/// A map has finished loading and its static collision is known. The
/// [NavigationPlugin] rasterises the geometry and inserts a
/// [NavigationBundle] on the `map` entity
#[derive(Event, Clone, Debug)]
pub struct EventMapLoaded {
	/// Entity representing the map
	map: Entity,
	/// Collision and extents of the map
	geometry: MapGeometry,
}

impl EventMapLoaded {
	/// Create a new instance of [EventMapLoaded]
	pub fn new(map: Entity, geometry: MapGeometry) -> Self {
		EventMapLoaded { map, geometry }
	}
	pub fn get_map(&self) -> Entity {
		self.map
	}
	pub fn get_geometry(&self) -> &MapGeometry {
		&self.geometry
	}
}

/// A map is going away, its [NavigationBundle] is removed
#[derive(Event, Clone, Copy, Debug)]
pub struct EventMapUnloaded {
	/// Entity representing the map
	map: Entity,
}

impl EventMapUnloaded {
	/// Create a new instance of [EventMapUnloaded]
	pub fn new(map: Entity) -> Self {
		EventMapUnloaded { map }
	}
	pub fn get_map(&self) -> Entity {
		self.map
	}
}

/// Read [EventMapLoaded] and build a [NavigationBundle] for each map
#[cfg(not(tarpaulin_include))]
pub fn build_nav_grids(
	mut events: EventReader<EventMapLoaded>,
	mut commands: Commands,
	config: Res<NavigationConfig>,
	entities: Query<Entity>,
) {
	for event in events.read() {
		if !entities.contains(event.get_map()) {
			warn!(
				"Map {:?} no longer exists, skipping NavGrid build",
				event.get_map()
			);
			continue;
		}
		let bundle = NavigationBundle::new(event.get_geometry(), &config);
		debug!(
			"Map {:?} loaded, NavGrid of {}x{} cells",
			event.get_map(),
			bundle.get_nav_grid().get_width(),
			bundle.get_nav_grid().get_height()
		);
		commands.entity(event.get_map()).insert(bundle);
	}
}

/// Read [EventMapUnloaded] and drop the navigation data of each map
#[cfg(not(tarpaulin_include))]
pub fn remove_nav_grids(
	mut events: EventReader<EventMapUnloaded>,
	mut commands: Commands,
	maps: Query<Entity, With<NavGrid>>,
) {
	for event in events.read() {
		if maps.contains(event.get_map()) {
			debug!("Map {:?} unloaded, dropping NavGrid", event.get_map());
			commands
				.entity(event.get_map())
				.remove::<NavigationBundle>();
		}
	}
}
