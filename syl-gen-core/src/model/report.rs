use std::fmt;

use serde::Serialize;

use super::pool_set::PoolSet;
use super::segmenter::Category;

/// One row of a pool dump.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
	pub segment: String,
	pub count: usize,
}

/// Dump of a single pool, most common segments first.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CategoryReport {
	pub category: Category,
	/// Number of distinct segments.
	pub unique: usize,
	/// Sum of all occurrence counts.
	pub total: usize,
	pub entries: Vec<ReportEntry>,
}

/// Read-only snapshot of the three pools of a `PoolSet`.
///
/// Entries are sorted by descending count, ties in discovery order.
/// The `Display` implementation prints one block per pool:
///
/// ```text
/// === Prefix (4 unique | 4 total) ===
/// a               1
/// ```
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolReport {
	pub categories: Vec<CategoryReport>,
}

impl PoolReport {
	pub(crate) fn new(pools: &PoolSet) -> Self {
		let categories = Category::ALL
			.into_iter()
			.map(|category| {
				let pool = pools.pool(category);
				CategoryReport {
					category,
					unique: pool.unique(),
					total: pool.total(),
					entries: pool
						.most_common()
						.into_iter()
						.map(|(segment, count)| ReportEntry { segment: segment.to_owned(), count })
						.collect(),
				}
			})
			.collect();
		Self { categories }
	}
}

impl fmt::Display for CategoryReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self.category {
			Category::Prefix => "Prefix",
			Category::Middle => "Middle",
			Category::Suffix => "Suffix",
		};
		writeln!(f, "=== {label} ({} unique | {} total) ===", self.unique, self.total)?;
		for entry in &self.entries {
			writeln!(f, "{:<15} {}", entry.segment, entry.count)?;
		}
		Ok(())
	}
}

impl fmt::Display for PoolReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, category) in self.categories.iter().enumerate() {
			if i > 0 {
				writeln!(f)?;
			}
			write!(f, "{category}")?;
		}
		Ok(())
	}
}
