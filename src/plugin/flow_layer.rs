//! Logic relating to keeping each [FlowField] pointed at the tracked target
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Marks the entity every [FlowField] leads towards, such as the player.
/// Only one entity should carry it at a time
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
pub struct FlowFieldTarget;

/// Rebuild flow fields on the next update regardless of throttling and seed
/// retention. With a `map` only that map's field is rebuilt
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct EventForceFlowFieldRebuild {
	/// The one map to rebuild, [None] for all of them
	map: Option<Entity>,
}

impl EventForceFlowFieldRebuild {
	/// Force every map's [FlowField] to rebuild
	pub fn all() -> Self {
		EventForceFlowFieldRebuild { map: None }
	}
	/// Force a single map's [FlowField] to rebuild
	pub fn for_map(map: Entity) -> Self {
		EventForceFlowFieldRebuild { map: Some(map) }
	}
	pub fn get_map(&self) -> Option<Entity> {
		self.map
	}
}

/// Feed the position of the [FlowFieldTarget] into the [FlowField] of every
/// map, rebuilding it when the target has moved to a new cell
#[cfg(not(tarpaulin_include))]
pub fn track_flow_field_target(
	mut events: EventReader<EventForceFlowFieldRebuild>,
	mut maps: Query<(Entity, &NavGrid, &mut FlowField)>,
	targets: Query<&Transform, With<FlowFieldTarget>>,
	time: Res<Time>,
) {
	// coalesce requests, any number of them in a frame is one rebuild
	let mut force_all = false;
	let mut forced_maps = Vec::new();
	for event in events.read() {
		match event.get_map() {
			Some(map) => forced_maps.push(map),
			None => force_all = true,
		}
	}
	let target = match targets.single() {
		Ok(target) => target.translation.truncate(),
		Err(e) => {
			trace!("No single FlowFieldTarget to track: {}", e);
			return;
		}
	};
	for (map, nav_grid, mut flow_field) in &mut maps {
		let force = force_all || forced_maps.contains(&map);
		match flow_field.update_target(nav_grid, target, time.elapsed(), force) {
			TargetUpdate::Rebuilt(seed) => {
				trace!("Map {:?} FlowField rebuilt from {:?}", map, seed)
			}
			TargetUpdate::Cleared => {
				trace!("Map {:?} FlowField cleared, target unreachable", map)
			}
			_ => {}
		}
	}
}
