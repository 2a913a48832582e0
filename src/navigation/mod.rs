//! Navigation over a bounded, top-down map for a crowd of agents chasing a
//! single moving target.
//!
//! [Fixing Pathfinding Once and For All](https://web.archive.org/web/20150905073624/http://www.ai-blog.net/archives/000152.html)
//!
//! [leifnode](https://leifnode.com/2013/12/flow-field-pathfinding/)
//!
//! A map's static collision is rasterised once into a [nav_grid::NavGrid] and a
//! [flow_field::FlowField] is flood filled over it from the cell the target
//! stands in. Every agent then only needs to look up the direction stored in
//! its own cell, so the cost of a frame doesn't grow with the number of
//! agents.
//!
//! Cells are indexed from the top-left corner of the map, rows growing with
//! world `y`.
//!
//! Definitions:
//!
//! * NavGrid - a `width x height` array of 8-bit values, `1` walkable and `0`
//!   blocked, built from tile collision layers and obstacle rectangles
//!
//! ```text
//!  _____________________________
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! |__|__|__|__|__|__|__|__|__|__|
//! ```
//!
//! * Seed - the walkable cell a FlowField is built from, the target's own cell
//!   or the nearest walkable cell to it
//! * Distance - number of steps from a cell to the seed, `-1` if it can't be
//!   reached
//! * Direction - an [utilities::Ordinal] per cell pointing at the neighbour
//!   which is one step closer to the seed
//!

pub mod config;
pub mod flow_field;
pub mod nav_grid;
pub mod utilities;
