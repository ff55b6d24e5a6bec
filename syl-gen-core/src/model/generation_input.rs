use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::composer::LengthBounds;
use super::segmenter::CaseMode;

/// How many names a session produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationMode {
	/// Exactly this many names (never zero).
	Finite(usize),
	/// Names until cancelled.
	Unbounded,
}

/// Parameters of a generation session.
///
/// `GenerationInput` gathers everything a caller may tune before a
/// session starts: how many names, their length bounds, the random seed,
/// whether to dump the pools first and how corpus casing is handled.
///
/// # Invariants
/// - `bounds` always satisfies `1 <= min_len <= max_len`
///
/// Missing fields take their default when deserialized.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationInput {
	/// Number of names to produce, 0 for unbounded generation.
	pub count: usize,

	/// Seed of the session random source. `None` seeds from the OS and
	/// results are not reproducible.
	pub seed: Option<u64>,

	/// Dump the pools before generating.
	pub debug: bool,

	/// Casing used when building pools from a corpus.
	pub case_mode: CaseMode,

	/// Accepted name lengths, in characters.
	bounds: LengthBounds,
}

impl GenerationInput {
	/// Creates an input with defaults: unbounded, lengths 2..=20, no seed.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the current length bounds.
	pub fn bounds(&self) -> LengthBounds {
		self.bounds
	}

	/// Sets the length bounds.
	///
	/// # Errors
	/// Returns `InvalidBounds` unless `1 <= min_len <= max_len`; the
	/// previous bounds are kept in that case.
	pub fn set_bounds(&mut self, min_len: usize, max_len: usize) -> Result<()> {
		self.bounds = LengthBounds::new(min_len, max_len)?;
		Ok(())
	}

	/// Finite or unbounded, derived from `count`.
	pub fn mode(&self) -> GenerationMode {
		match self.count {
			0 => GenerationMode::Unbounded,
			n => GenerationMode::Finite(n),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	#[test]
	fn defaults_match_the_cli() {
		let input = GenerationInput::new();
		assert_eq!(input.mode(), GenerationMode::Unbounded);
		assert_eq!(input.bounds().min_len(), 2);
		assert_eq!(input.bounds().max_len(), 20);
		assert_eq!(input.seed, None);
		assert!(!input.debug);
		assert_eq!(input.case_mode, CaseMode::Fold);
	}

	#[test]
	fn count_selects_the_mode() {
		let mut input = GenerationInput::new();
		input.count = 5;
		assert_eq!(input.mode(), GenerationMode::Finite(5));
	}

	#[test]
	fn survives_postcard_encoding() {
		let mut input = GenerationInput::new();
		input.count = 3;
		input.seed = Some(7);
		input.set_bounds(3, 9).unwrap();
		let bytes = postcard::to_stdvec(&input).unwrap();
		assert_eq!(postcard::from_bytes::<GenerationInput>(&bytes).unwrap(), input);
	}

	#[test]
	fn invalid_bounds_keep_previous_value() {
		let mut input = GenerationInput::new();
		input.set_bounds(4, 8).unwrap();
		assert!(matches!(input.set_bounds(9, 8), Err(Error::InvalidBounds { min_len: 9, max_len: 8 })));
		assert_eq!(input.bounds(), LengthBounds::new(4, 8).unwrap());
	}
}
