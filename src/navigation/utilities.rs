//! Useful structures and tools shared by the [crate::prelude::NavGrid] and
//! [crate::prelude::FlowField]
//!

use bevy::prelude::*;

/// The orthogonal directions in the order a [crate::prelude::FlowField]
/// prefers them when two neighbours share the same distance
pub const ORTHOGONAL_ORDINALS: [Ordinal; 4] =
	[Ordinal::North, Ordinal::East, Ordinal::South, Ordinal::West];
/// The diagonal directions in the order they are considered after the
/// orthogonals
pub const DIAGONAL_ORDINALS: [Ordinal; 4] = [
	Ordinal::NorthEast,
	Ordinal::SouthEast,
	Ordinal::SouthWest,
	Ordinal::NorthWest,
];

/// The 8 directions of movement stored per cell of a
/// [crate::prelude::FlowField]. North points towards decreasing rows, i.e
/// towards a smaller world `y`.
///
/// Each variant has a fixed byte code so a field can be dumped or sent to a
/// debug overlay as raw values
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash, Reflect)]
#[repr(u8)]
pub enum Ordinal {
	/// No direction, the cell is the seed, unreached or blocked
	#[default]
	Zero = 0,
	North = 1,
	East = 2,
	South = 3,
	West = 4,
	NorthEast = 5,
	SouthEast = 6,
	SouthWest = 7,
	NorthWest = 8,
}

impl Ordinal {
	/// Get the byte code of the direction
	pub fn get_code(&self) -> u8 {
		*self as u8
	}
	/// Convert a byte code back into an [Ordinal], unknown codes become
	/// [Ordinal::Zero]
	pub fn from_code(code: u8) -> Self {
		match code {
			1 => Ordinal::North,
			2 => Ordinal::East,
			3 => Ordinal::South,
			4 => Ordinal::West,
			5 => Ordinal::NorthEast,
			6 => Ordinal::SouthEast,
			7 => Ordinal::SouthWest,
			8 => Ordinal::NorthWest,
			_ => Ordinal::Zero,
		}
	}
	/// The `(column, row)` offset of a single step in this direction
	pub fn get_offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, -1),
			Ordinal::East => (1, 0),
			Ordinal::South => (0, 1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthEast => (1, -1),
			Ordinal::SouthEast => (1, 1),
			Ordinal::SouthWest => (-1, 1),
			Ordinal::NorthWest => (-1, -1),
			Ordinal::Zero => (0, 0),
		}
	}
	/// Whether the direction is one of the four diagonals
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// For a diagonal step get the two orthogonal directions either side of
	/// it, i.e `NorthEast` is flanked by `North` and `East`
	pub fn get_flanking_ordinals(&self) -> Option<(Ordinal, Ordinal)> {
		match self {
			Ordinal::NorthEast => Some((Ordinal::North, Ordinal::East)),
			Ordinal::SouthEast => Some((Ordinal::South, Ordinal::East)),
			Ordinal::SouthWest => Some((Ordinal::South, Ordinal::West)),
			Ordinal::NorthWest => Some((Ordinal::North, Ordinal::West)),
			_ => None,
		}
	}
	/// Returns the opposite [Ordinal] of the current
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::East => Ordinal::West,
			Ordinal::South => Ordinal::North,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::NorthWest => Ordinal::SouthEast,
			Ordinal::Zero => Ordinal::Zero,
		}
	}
	/// A unit step vector in grid space (`+x` is East, `+y` is South).
	/// [Ordinal::Zero] gives [Vec2::ZERO]
	pub fn to_unit_vector(&self) -> Vec2 {
		let (x, y) = self.get_offset();
		Vec2::new(x as f32, y as f32).normalize_or_zero()
	}
	/// For two cells next to each other find the [Ordinal] pointing from the
	/// `source` to the `target`. Returns [None] if they are not orthogonally
	/// or diagonally adjacent
	pub fn cell_to_cell_direction(target: GridCell, source: GridCell) -> Option<Self> {
		let direction = (
			target.get_column() - source.get_column(),
			target.get_row() - source.get_row(),
		);
		match direction {
			(0, -1) => Some(Ordinal::North),
			(1, -1) => Some(Ordinal::NorthEast),
			(1, 0) => Some(Ordinal::East),
			(1, 1) => Some(Ordinal::SouthEast),
			(0, 1) => Some(Ordinal::South),
			(-1, 1) => Some(Ordinal::SouthWest),
			(-1, 0) => Some(Ordinal::West),
			(-1, -1) => Some(Ordinal::NorthWest),
			_ => None,
		}
	}
}

/// ID of a cell within a [crate::prelude::NavGrid]. Coordinates are signed
/// so that positions outside of the grid can still be expressed, they are
/// simply never walkable
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct GridCell((i32, i32));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(column: i32, row: i32) -> Self {
		GridCell((column, row))
	}
	/// Get the `(column, row)` tuple
	pub fn get_column_row(&self) -> (i32, i32) {
		self.0
	}
	/// Get the column
	pub fn get_column(&self) -> i32 {
		self.0 .0
	}
	/// Get the row
	pub fn get_row(&self) -> i32 {
		self.0 .1
	}
	/// The neighbouring cell one step away in the `ordinal` direction
	pub fn step(&self, ordinal: Ordinal) -> GridCell {
		let (x, y) = ordinal.get_offset();
		GridCell::new(self.get_column() + x, self.get_row() + y)
	}
	/// Chebyshev distance between two cells, i.e the ring a cell sits on
	/// around another
	pub fn chebyshev_distance(&self, other: &GridCell) -> i32 {
		(self.get_column() - other.get_column())
			.abs()
			.max((self.get_row() - other.get_row()).abs())
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn ordinal_codes_roundtrip() {
		for ord in ORTHOGONAL_ORDINALS.iter().chain(DIAGONAL_ORDINALS.iter()) {
			assert_eq!(*ord, Ordinal::from_code(ord.get_code()));
		}
		assert_eq!(Ordinal::Zero, Ordinal::from_code(200));
	}
	#[test]
	fn flanks_of_diagonals() {
		assert_eq!(
			Some((Ordinal::South, Ordinal::West)),
			Ordinal::SouthWest.get_flanking_ordinals()
		);
		assert_eq!(None, Ordinal::East.get_flanking_ordinals());
	}
	#[test]
	fn unit_vector_diagonal_is_normalised() {
		let v = Ordinal::NorthWest.to_unit_vector();
		assert!((v.length() - 1.0).abs() < 0.0001);
		assert!(v.x < 0.0 && v.y < 0.0);
		assert_eq!(Vec2::ZERO, Ordinal::Zero.to_unit_vector());
	}
	#[test]
	fn cell_to_cell_north() {
		let target = GridCell::new(6, 2);
		let source = GridCell::new(6, 3);
		let result = Ordinal::cell_to_cell_direction(target, source);
		assert_eq!(Some(Ordinal::North), result);
	}
	#[test]
	fn cell_to_cell_south_west() {
		let target = GridCell::new(6, 9);
		let source = GridCell::new(7, 8);
		let result = Ordinal::cell_to_cell_direction(target, source);
		assert_eq!(Some(Ordinal::SouthWest), result);
	}
	#[test]
	fn cell_to_cell_not_adjacent() {
		let target = GridCell::new(0, 0);
		let source = GridCell::new(2, 0);
		assert_eq!(None, Ordinal::cell_to_cell_direction(target, source));
	}
	#[test]
	fn step_and_inverse() {
		let cell = GridCell::new(4, 4);
		for ord in DIAGONAL_ORDINALS.iter() {
			assert_eq!(cell, cell.step(*ord).step(ord.inverse()));
		}
	}
	#[test]
	fn chebyshev() {
		let a = GridCell::new(1, 1);
		let b = GridCell::new(4, -1);
		assert_eq!(3, a.chebyshev_distance(&b));
	}
}
