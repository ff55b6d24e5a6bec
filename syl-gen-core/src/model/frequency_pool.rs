use indexmap::IndexMap;

use rand::Rng;

use serde::{Deserialize, Serialize};


/// Frequency table of the segments observed for one category.
///
/// Each distinct segment maps to the number of times it was seen in the
/// corpus. Segments keep the order in which they were first discovered,
/// which makes seeded sampling reproducible and breaks ties in reports.
///
/// ## Responsibilities:
/// - Accumulate segment occurrences during pool building
/// - Draw a segment using weighted random sampling
/// - Merge with another pool of the same category (parallel building)
///
/// ## Invariants
/// - Every stored segment is non-empty
/// - Every occurrence count is strictly positive
/// - `total` is the sum of all counts
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyPool {
	/// Segment -> number of occurrences, in discovery order.
	/// Example: { "ma" => 42, "lu" => 3 }
	segments: IndexMap<String, usize>,
	/// Sum of every occurrence count.
	total: usize,
}

impl FrequencyPool {
	/// Creates a new empty pool.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `segment`.
	///
	/// - Empty segments are ignored.
	/// - Known segments have their count increased, new ones start at 1.
	///
	/// Returns `true` if the segment was recorded.
	pub fn add(&mut self, segment: &str) -> bool {
		self.add_count(segment, 1)
	}

	fn add_count(&mut self, segment: &str, occurrence: usize) -> bool {
		if segment.is_empty() || occurrence == 0 {
			return false;
		}
		match self.segments.get_mut(segment) {
			Some(count) => *count += occurrence,
			None => {
				self.segments.insert(segment.to_owned(), occurrence);
			}
		}
		self.total += occurrence;
		true
	}

	/// Number of distinct segments.
	pub fn unique(&self) -> usize {
		self.segments.len()
	}

	/// Sum of all occurrence counts.
	pub fn total(&self) -> usize {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Occurrence count of `segment`, 0 if unseen.
	pub fn count(&self, segment: &str) -> usize {
		self.segments.get(segment).copied().unwrap_or(0)
	}

	/// Iterates over `(segment, count)` in discovery order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.segments.iter().map(|(segment, count)| (segment.as_str(), *count))
	}

	/// Character length of the shortest and longest segment.
	///
	/// Returns `None` for an empty pool.
	pub fn length_range(&self) -> Option<(usize, usize)> {
		self.segments
			.keys()
			.map(|segment| segment.chars().count())
			.fold(None, |range, len| match range {
				None => Some((len, len)),
				Some((min, max)) => Some((min.min(len), max.max(len))),
			})
	}

	/// Draws a segment using weighted random sampling.
	///
	/// The probability of selecting a segment is proportional to its
	/// occurrence count. Draws are independent: the pool is not modified.
	///
	/// This method performs:
	/// - a single random draw in `0..total`
	/// - a cumulative subtraction over the segments in discovery order
	///
	/// Returns `None` if the pool is empty.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);

		let mut fallback: Option<&str> = None;
		for (segment, occurrence) in &self.segments {
			if r < *occurrence {
				return Some(segment.as_str());
			}
			r -= occurrence;
			fallback = Some(segment.as_str());
		}

		// Unreachable while `total` matches the counts
		fallback
	}

	/// Segments sorted by descending count.
	///
	/// Ties keep discovery order (the sort is stable).
	pub fn most_common(&self) -> Vec<(&str, usize)> {
		let mut entries: Vec<(&str, usize)> = self.iter().collect();
		entries.sort_by(|a, b| b.1.cmp(&a.1));
		entries
	}

	/// Merges another pool into this one.
	///
	/// Counts of shared segments are summed. Segments only present in
	/// `other` are appended after the existing ones, in `other`'s order.
	pub fn merge(&mut self, other: &Self) {
		for (segment, occurrence) in &other.segments {
			self.add_count(segment, *occurrence);
		}
	}

	/// Rebuilds `total` from the stored counts and drops invalid entries.
	///
	/// Used after deserializing a pool from an untrusted cache.
	pub(crate) fn repair(&mut self) {
		self.segments.retain(|segment, count| !segment.is_empty() && *count > 0);
		self.total = self.segments.values().sum();
	}
}
