//! Defines the Bevy [Plugin] for NavGrid navigation
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod flow_layer;
pub mod grid_layer;
pub mod steering;

/// Ordering of the navigation systems within `Update`
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum NavigationSet {
	/// Build and drop [NavGrid]s as maps come and go
	Grid,
	/// Track the target, rebuild [FlowField]s and steer agents
	Flow,
}

/// Add to an [App] to build a [NavigationBundle] for every map announced with
/// [EventMapLoaded] and steer [FlowFieldAgent]s to the [FlowFieldTarget].
/// Insert a [NavigationConfig] resource beforehand to change the defaults
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Ordinal>()
			.register_type::<GridCell>()
			.register_type::<NavGrid>()
			.register_type::<FlowField>()
			.register_type::<NavigationConfig>()
			.register_type::<FlowFieldTarget>()
			.register_type::<FlowFieldAgent>()
			.register_type::<MovementStrategy>()
			.init_resource::<NavigationConfig>()
			.add_event::<grid_layer::EventMapLoaded>()
			.add_event::<grid_layer::EventMapUnloaded>()
			.add_event::<flow_layer::EventForceFlowFieldRebuild>()
			.configure_sets(Update, (NavigationSet::Grid, NavigationSet::Flow).chain())
			.add_systems(
				Update,
				(
					(grid_layer::remove_nav_grids, grid_layer::build_nav_grids)
						.chain()
						.in_set(NavigationSet::Grid),
					(flow_layer::track_flow_field_target, steering::steer_agents)
						.chain()
						.in_set(NavigationSet::Flow),
				),
			);
	}
}
