//! `use bevy_flowfield_navgrid_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::navigation::{
	config::*,
	flow_field::*,
	nav_grid::{geometry::*, *},
	utilities::*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	error::NavigationError,
	plugin::{flow_layer::*, grid_layer::*, steering::*, *},
};
