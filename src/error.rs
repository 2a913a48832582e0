//! Errors raised while loading navigation data from disk.
//!
//! Building and querying a [crate::prelude::NavGrid] or
//! [crate::prelude::FlowField] never fails, bad input degrades to an empty
//! or all-walkable grid instead. Only the file loaders return these.

use thiserror::Error;

/// Result type alias using [NavigationError]
pub type Result<T> = std::result::Result<T, NavigationError>;

/// Failures from loading configuration or collision data
#[derive(Debug, Error)]
pub enum NavigationError {
	/// A file could not be opened
	#[error("Failed opening '{path}': {source}")]
	Io {
		/// Path of the file
		path: String,
		/// Underlying IO error
		#[source]
		source: std::io::Error,
	},
	/// A `ron` file could not be deserialized
	#[cfg(feature = "ron")]
	#[error("Failed deserializing navigation config: {0}")]
	Ron(#[from] ron::error::SpannedError),
	/// A `csv` file could not be read
	#[cfg(feature = "csv")]
	#[error("Failed reading collision csv: {0}")]
	Csv(#[from] csv::Error),
	/// A value in a collision csv is not a tile ID
	#[cfg(feature = "csv")]
	#[error("Collision csv expects integer tile IDs, found '{value}' at column {column}, row {row}")]
	InvalidTileId {
		/// Column of the value
		column: usize,
		/// Row of the value
		row: usize,
		/// The offending text
		value: String,
	},
	/// A row of a collision csv has a different number of tiles to the first
	#[cfg(feature = "csv")]
	#[error("Collision csv row {row} has {found} tiles, the first row has {expected}")]
	RaggedRow {
		/// Row with the mismatched length
		row: usize,
		/// Tiles in the first row
		expected: usize,
		/// Tiles in this row
		found: usize,
	},
	/// A heightmap image could not be opened
	#[cfg(feature = "heightmap")]
	#[error("Failed opening heightmap '{path}': {message}")]
	Heightmap {
		/// Path of the image
		path: String,
		/// Description from the image decoder
		message: String,
	},
	/// The number of collision flags doesn't match the layer dimensions
	#[error("Collision layer '{name}' expects {expected} cells, found {found}")]
	LayerSize {
		/// Name of the layer
		name: String,
		/// `columns * rows`
		expected: usize,
		/// Number supplied
		found: usize,
	},
}
