//! This is a plugin for Bevy game engine to rasterise a bounded map into a
//! walkability grid and steer crowds of agents towards a moving target with a
//! FlowField
//!

pub mod bundle;
pub mod error;
pub mod navigation;
pub mod plugin;

pub mod prelude;
