use log::warn;

use rand::Rng;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::pool_set::PoolSet;
use super::segmenter::Category;

/// Draws tried by `compose` before giving up.
pub const MAX_ATTEMPTS: usize = 1000;

/// Default minimum name length, in characters.
pub const DEFAULT_MIN_LEN: usize = 2;

/// Default maximum name length, in characters.
pub const DEFAULT_MAX_LEN: usize = 20;

/// Inclusive character-length bounds for generated names.
///
/// # Invariants
/// - `1 <= min_len <= max_len`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "RawBounds")]
pub struct LengthBounds {
	min_len: usize,
	max_len: usize,
}

#[derive(Deserialize)]
struct RawBounds {
	min_len: usize,
	max_len: usize,
}

impl TryFrom<RawBounds> for LengthBounds {
	type Error = Error;

	fn try_from(raw: RawBounds) -> Result<Self> {
		Self::new(raw.min_len, raw.max_len)
	}
}

impl Default for LengthBounds {
	fn default() -> Self {
		Self { min_len: DEFAULT_MIN_LEN, max_len: DEFAULT_MAX_LEN }
	}
}

impl LengthBounds {
	/// Creates validated bounds.
	///
	/// # Errors
	/// Returns `InvalidBounds` unless `1 <= min_len <= max_len`.
	pub fn new(min_len: usize, max_len: usize) -> Result<Self> {
		if min_len == 0 || min_len > max_len {
			return Err(Error::InvalidBounds { min_len, max_len });
		}
		Ok(Self { min_len, max_len })
	}

	pub fn min_len(&self) -> usize {
		self.min_len
	}

	pub fn max_len(&self) -> usize {
		self.max_len
	}

	/// Returns `true` if a name of `len` characters is accepted.
	pub fn contains(&self, len: usize) -> bool {
		(self.min_len..=self.max_len).contains(&len)
	}

	fn unsatisfiable(&self, attempts: usize) -> Error {
		Error::LengthBoundsUnsatisfiable { min_len: self.min_len, max_len: self.max_len, attempts }
	}
}

/// Concatenates one weighted draw from each pool.
///
/// Returns `None` only if a pool is empty, which a `PoolSet` rules out.
pub fn draw<R: Rng + ?Sized>(pools: &PoolSet, rng: &mut R) -> Option<String> {
	let mut name = String::new();
	for category in Category::ALL {
		name.push_str(pools.pool(category).sample(rng)?);
	}
	Some(name)
}

/// Builds one name whose length lies within `bounds`.
///
/// Up to `MAX_ATTEMPTS` compositions are drawn; the first one of
/// acceptable length is returned. Lengths are counted in characters.
///
/// # Errors
/// - `LengthBoundsUnsatisfiable` if no attempt fits. Bounds that no
///   composition can reach fail immediately, without drawing.
/// - `InsufficientData` if a pool is empty.
pub fn compose<R: Rng + ?Sized>(pools: &PoolSet, bounds: LengthBounds, rng: &mut R) -> Result<String> {
	let (shortest, longest) = pools.composition_length_range();
	if bounds.min_len > longest || bounds.max_len < shortest {
		return Err(bounds.unsatisfiable(0));
	}

	for _ in 0..MAX_ATTEMPTS {
		let name = draw(pools, rng).ok_or_else(|| Error::InsufficientData {
			missing: Category::ALL.into_iter().filter(|c| pools.pool(*c).is_empty()).collect(),
		})?;
		if bounds.contains(name.chars().count()) {
			return Ok(name);
		}
	}

	warn!(
		"no name within [{}, {}] after {MAX_ATTEMPTS} attempts",
		bounds.min_len, bounds.max_len
	);
	Err(bounds.unsatisfiable(MAX_ATTEMPTS))
}
