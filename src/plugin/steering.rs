//! Moving agents, either along the [FlowField] of the map they're on or in a
//! straight line at the [FlowFieldTarget]
//!

use crate::prelude::*;
use bevy::prelude::*;

/// How an agent decides which way to move each frame
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum MovementStrategy {
	/// Follow the directions of the [FlowField], going straight for the
	/// target when the agent's cell has no known path
	#[default]
	FlowField,
	/// Always head straight for the target ignoring collision
	Direct,
	/// Stand still
	Idle,
}

/// An entity steered towards the [FlowFieldTarget]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
#[require(MovementStrategy)]
pub struct FlowFieldAgent {
	/// Pixels per second
	speed: f32,
}

impl FlowFieldAgent {
	/// Create a new instance of [FlowFieldAgent]
	pub fn new(speed: f32) -> Self {
		FlowFieldAgent { speed }
	}
	pub fn get_speed(&self) -> f32 {
		self.speed
	}
}

/// The unit direction an agent at `position` should move in. `navigation` is
/// the grid and field of the map the agent is on, if any
pub fn steering_direction(
	strategy: MovementStrategy,
	navigation: Option<(&NavGrid, &FlowField)>,
	position: Vec2,
	target: Vec2,
) -> Vec2 {
	let direct = (target - position).normalize_or_zero();
	match strategy {
		MovementStrategy::Idle => Vec2::ZERO,
		MovementStrategy::Direct => direct,
		MovementStrategy::FlowField => {
			let Some((nav_grid, flow_field)) = navigation else {
				return direct;
			};
			match flow_field.get_direction_at_xy(nav_grid, position) {
				// seed cell, unreached cell or off the grid
				Ordinal::Zero => direct,
				ordinal => ordinal.to_unit_vector(),
			}
		}
	}
}

/// Move every [FlowFieldAgent] according to its [MovementStrategy]
#[cfg(not(tarpaulin_include))]
pub fn steer_agents(
	mut agents: Query<(&FlowFieldAgent, &MovementStrategy, &mut Transform)>,
	maps: Query<(&NavGrid, &FlowField)>,
	targets: Query<&Transform, (With<FlowFieldTarget>, Without<FlowFieldAgent>)>,
	time: Res<Time>,
) {
	let Ok(target) = targets.single() else {
		return;
	};
	let target = target.translation.truncate();
	let delta = time.delta_secs();
	for (agent, strategy, mut transform) in &mut agents {
		let position = transform.translation.truncate();
		let navigation = maps
			.iter()
			.find(|(nav_grid, _)| nav_grid.contains_point(position));
		let direction = steering_direction(*strategy, navigation, position, target);
		// don't overshoot the target
		let step = (agent.get_speed() * delta).min(position.distance(target));
		let moved = position + direction * step;
		transform.translation.x = moved.x;
		transform.translation.y = moved.y;
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	/// `5x5` open grid with the field built towards cell `(4,2)`
	fn open_navigation() -> (NavGrid, FlowField) {
		let grid = NavGrid::from_walkable(5, 5, 8.0, Vec2::ZERO, &[true; 25]);
		let mut field = FlowField::new(&grid, FlowFieldConfig::default().with_footprint_size(0.0));
		field.update_target(&grid, grid.cell_to_world_centre(GridCell::new(4, 2)), Duration::ZERO, false);
		(grid, field)
	}
	#[test]
	fn idle_stands_still() {
		let result = steering_direction(MovementStrategy::Idle, None, Vec2::ZERO, Vec2::new(5.0, 0.0));
		assert_eq!(Vec2::ZERO, result);
	}
	#[test]
	fn direct_heads_for_target() {
		let (grid, field) = open_navigation();
		let result = steering_direction(MovementStrategy::Direct, Some((&grid, &field)), Vec2::ZERO, Vec2::new(0.0, 10.0));
		assert_eq!(Vec2::new(0.0, 1.0), result);
	}
	#[test]
	fn follows_the_field() {
		let (grid, field) = open_navigation();
		let position = grid.cell_to_world_centre(GridCell::new(0, 2));
		// the target is off to the south but the field points east
		let result = steering_direction(MovementStrategy::FlowField, Some((&grid, &field)), position, Vec2::new(4.0, 100.0));
		assert_eq!(Vec2::new(1.0, 0.0), result);
	}
	#[test]
	fn unreached_cell_falls_back_to_direct() {
		let (grid, field) = open_navigation();
		let position = Vec2::new(-50.0, 0.0);
		let target = Vec2::new(-50.0, -10.0);
		let result = steering_direction(MovementStrategy::FlowField, Some((&grid, &field)), position, target);
		assert_eq!(Vec2::new(0.0, -1.0), result);
	}
	#[test]
	fn no_map_falls_back_to_direct() {
		let result = steering_direction(MovementStrategy::FlowField, None, Vec2::ZERO, Vec2::new(-3.0, 0.0));
		assert_eq!(Vec2::new(-1.0, 0.0), result);
	}
}
