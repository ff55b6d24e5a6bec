use std::fmt;

use thiserror::Error;

use crate::model::segmenter::{CaseMode, Category};

/// Every failure the engine can report to its caller.
///
/// Cancellation of unbounded generation is not an error and never
/// surfaces here.
#[derive(Error, Debug)]
pub enum Error {
	/// The corpus held no usable (non-blank) name.
	#[error("no input records: the corpus contains no names")]
	NoInputRecords,

	/// At least one pool ended up empty after segmentation.
	#[error("insufficient data after preprocessing: empty {} pool", CategoryList(.missing))]
	InsufficientData { missing: Vec<Category> },

	/// Requested bounds violate `1 <= min_len <= max_len`.
	#[error("invalid length bounds: min {min_len}, max {max_len} (expected 1 <= min <= max)")]
	InvalidBounds { min_len: usize, max_len: usize },

	/// No composition fell within the bounds before the retry budget ran out.
	#[error("length bounds unsatisfiable: no name within [{min_len}, {max_len}] after {attempts} attempts")]
	LengthBoundsUnsatisfiable { min_len: usize, max_len: usize, attempts: usize },

	/// A finite batch stopped on a failed draw.
	#[error("generation aborted after {produced} of {requested} names: {source}")]
	BatchAborted {
		produced: usize,
		requested: usize,
		#[source]
		source: Box<Error>,
	},

	/// Pools segmented with different case modes cannot be merged.
	#[error("cannot merge pools built with {left:?} and {right:?} case modes")]
	CaseModeMismatch { left: CaseMode, right: CaseMode },

	/// A pool-building worker exited without delivering its chunk.
	#[error("pool building failed: {received} of {expected} chunks delivered")]
	BuildFailed { expected: usize, received: usize },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Pool cache could not be encoded or decoded.
	#[error("pool cache error: {0}")]
	Cache(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

struct CategoryList<'a>(&'a [Category]);

impl fmt::Display for CategoryList<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, category) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{category}")?;
		}
		Ok(())
	}
}
