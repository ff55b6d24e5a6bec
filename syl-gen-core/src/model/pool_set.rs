use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};

use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::io::{file_stem, is_newer, read_corpus, with_extension};
use super::frequency_pool::FrequencyPool;
use super::report::PoolReport;
use super::segmenter::{segment_with, CaseMode, Category};

/// Corpora smaller than this are segmented on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// Chunks per CPU when building in parallel.
const CHUNK_FACTOR: usize = 8;

/// Accumulates segment pools from raw names.
///
/// A builder may hold empty pools; `finish` turns it into a `PoolSet`
/// once every category has at least one segment.
///
/// # Responsibilities
/// - Segment each name and count its non-empty segments
/// - Merge partial builders produced by worker threads
/// - Validate the pools before generation
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PoolBuilder {
	case_mode: CaseMode,
	prefixes: FrequencyPool,
	middles: FrequencyPool,
	suffixes: FrequencyPool,
	records: usize,
}

impl PoolBuilder {
	/// Creates an empty builder segmenting with `case_mode`.
	pub fn new(case_mode: CaseMode) -> Self {
		Self { case_mode, ..Self::default() }
	}

	/// Segments one raw name and records its non-empty segments.
	///
	/// Blank names are skipped. Returns `true` if the name was used.
	pub fn add_name(&mut self, name: &str) -> bool {
		let name = name.trim();
		if name.is_empty() {
			return false;
		}

		let segments = segment_with(name, self.case_mode);
		self.prefixes.add(segments.get(Category::Prefix));
		self.middles.add(segments.get(Category::Middle));
		self.suffixes.add(segments.get(Category::Suffix));
		self.records += 1;
		true
	}

	/// Adds every name of `names`.
	pub fn add_names<I, S>(&mut self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for name in names {
			self.add_name(name.as_ref());
		}
	}

	/// Number of names recorded so far.
	pub fn records(&self) -> usize {
		self.records
	}

	/// Merges another builder into this one.
	///
	/// # Errors
	/// Returns an error if the two builders segment with different case modes.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.case_mode != other.case_mode {
			return Err(Error::CaseModeMismatch { left: self.case_mode, right: other.case_mode });
		}
		self.prefixes.merge(&other.prefixes);
		self.middles.merge(&other.middles);
		self.suffixes.merge(&other.suffixes);
		self.records += other.records;
		Ok(())
	}

	/// Validates the pools and freezes them into a `PoolSet`.
	///
	/// # Errors
	/// - `NoInputRecords` if no name was ever added
	/// - `InsufficientData` listing every empty category
	pub fn finish(self) -> Result<PoolSet> {
		if self.records == 0 {
			return Err(Error::NoInputRecords);
		}

		let missing: Vec<Category> = Category::ALL
			.into_iter()
			.filter(|category| self.pool(*category).is_empty())
			.collect();
		if !missing.is_empty() {
			return Err(Error::InsufficientData { missing });
		}

		debug!(
			"pools built from {} names: {} prefixes, {} middles, {} suffixes",
			self.records,
			self.prefixes.unique(),
			self.middles.unique(),
			self.suffixes.unique()
		);

		Ok(PoolSet {
			case_mode: self.case_mode,
			prefixes: self.prefixes,
			middles: self.middles,
			suffixes: self.suffixes,
			records: self.records,
			sources: Vec::new(),
		})
	}

	fn pool(&self, category: Category) -> &FrequencyPool {
		match category {
			Category::Prefix => &self.prefixes,
			Category::Middle => &self.middles,
			Category::Suffix => &self.suffixes,
		}
	}
}

/// The three segment pools of a corpus, ready for sampling.
///
/// A `PoolSet` only exists with three non-empty pools and is never
/// modified by generation, so it can be shared between readers freely.
///
/// - `sources`: names of the corpus files merged into this set.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PoolSet {
	case_mode: CaseMode,
	prefixes: FrequencyPool,
	middles: FrequencyPool,
	suffixes: FrequencyPool,
	records: usize,
	#[serde(skip)]
	sources: Vec<String>,
}

impl PoolSet {
	/// Builds the pools for a sequence of raw names.
	///
	/// Blank names are ignored. Large inputs are segmented in parallel;
	/// the result is identical to a sequential build.
	///
	/// # Errors
	/// - `NoInputRecords` if `names` holds no usable name
	/// - `InsufficientData` if a category pool stays empty
	pub fn from_names<I, S>(names: I, case_mode: CaseMode) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let names: Vec<String> = names
			.into_iter()
			.map(|name| name.as_ref().trim().to_owned())
			.filter(|name| !name.is_empty())
			.collect();

		if names.is_empty() {
			return Err(Error::NoInputRecords);
		}

		let builder = if names.len() < PARALLEL_THRESHOLD {
			let mut builder = PoolBuilder::new(case_mode);
			builder.add_names(&names);
			builder
		} else {
			Self::build_parallel(&names, case_mode)?
		};
		builder.finish()
	}

	/// Loads the pools of a corpus file (one name per line).
	///
	/// - `cache`: when `true`, reuse `<stem>.bin` next to the corpus if it
	///   is newer than the corpus and uses the same case mode, otherwise
	///   build and (re)write it with `postcard`.
	///
	/// The file stem is recorded in `sources`.
	pub fn from_file<P: AsRef<Path>>(filepath: P, case_mode: CaseMode, cache: bool) -> Result<Self> {
		let path = filepath.as_ref();
		let mut set = if cache {
			Self::load_or_build(path, case_mode)?
		} else {
			Self::build_from_file(path, case_mode)?
		};
		set.sources.push(file_stem(path)?);
		Ok(set)
	}

	/// Builds one `PoolSet` from several corpus files.
	///
	/// The names of every file are pooled before validation, so a file may
	/// leave a category empty as long as another one fills it. Sources are
	/// recorded in the order given.
	///
	/// # Errors
	/// - `Io` if a file cannot be read
	/// - `NoInputRecords` / `InsufficientData` for the combined names
	pub fn from_files<P: AsRef<Path>>(paths: &[P], case_mode: CaseMode) -> Result<Self> {
		let mut names = Vec::new();
		let mut sources = Vec::with_capacity(paths.len());
		for path in paths {
			let path = path.as_ref();
			let corpus = read_corpus(path)?;
			info!("loaded {} names from {}", corpus.len(), path.display());
			names.extend(corpus);
			sources.push(file_stem(path)?);
		}

		let mut set = Self::from_names(names, case_mode)?;
		set.sources = sources;
		Ok(set)
	}

	fn build_from_file(path: &Path, case_mode: CaseMode) -> Result<Self> {
		let names = read_corpus(path)?;
		info!("loaded {} names from {}", names.len(), path.display());
		Self::from_names(names, case_mode)
	}

	fn load_or_build(path: &Path, case_mode: CaseMode) -> Result<Self> {
		let binary_data_path = with_extension(path, "bin")?;

		if is_newer(&binary_data_path, path) {
			let bytes = std::fs::read(&binary_data_path)?;
			match postcard::from_bytes::<PoolSet>(&bytes) {
				Ok(set) if set.case_mode == case_mode => match set.revalidate() {
					Ok(set) => {
						debug!("pool cache hit: {}", binary_data_path.display());
						return Ok(set);
					}
					Err(e) => warn!("discarding invalid pool cache {}: {e}", binary_data_path.display()),
				},
				Ok(_) => debug!("pool cache {} uses another case mode, rebuilding", binary_data_path.display()),
				Err(e) => warn!("discarding unreadable pool cache {}: {e}", binary_data_path.display()),
			}
		}

		let set = Self::build_from_file(path, case_mode)?;
		let bytes = postcard::to_stdvec(&set)?;
		std::fs::write(&binary_data_path, bytes)?;
		debug!("pool cache written: {}", binary_data_path.display());
		Ok(set)
	}

	/// Runs the invariant checks again on a deserialized set.
	fn revalidate(self) -> Result<Self> {
		let mut builder = PoolBuilder {
			case_mode: self.case_mode,
			prefixes: self.prefixes,
			middles: self.middles,
			suffixes: self.suffixes,
			records: self.records,
		};
		builder.prefixes.repair();
		builder.middles.repair();
		builder.suffixes.repair();
		builder.finish()
	}

	/// Splits the names into chunks, builds partial pools in worker threads
	/// and merges them back in chunk order.
	///
	/// # Behavior
	/// - Chunk count is CPU cores * `CHUNK_FACTOR`.
	/// - Partial builders are collected through an MPSC channel.
	/// - Merging in chunk order keeps the sequential discovery order, so
	///   seeded generation does not depend on thread scheduling.
	fn build_parallel(names: &[String], case_mode: CaseMode) -> Result<PoolBuilder> {
		let chunks = num_cpus::get() * CHUNK_FACTOR;
		let chunk_size = names.len().div_ceil(chunks).max(1);

		let (tx, rx) = mpsc::channel();
		let mut expected = 0;
		for (index, chunk) in names.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			expected += 1;

			thread::spawn(move || {
				let mut partial = PoolBuilder::new(case_mode);
				partial.add_names(&chunk);
				// The receiver outlives every worker
				let _ = tx.send((index, partial));
			});
		}
		drop(tx);

		let mut partials: Vec<(usize, PoolBuilder)> = rx.iter().collect();
		if partials.len() != expected {
			return Err(Error::BuildFailed { expected, received: partials.len() });
		}
		partials.sort_by_key(|(index, _)| *index);

		let mut builder = PoolBuilder::new(case_mode);
		for (_, partial) in &partials {
			builder.merge(partial)?;
		}
		Ok(builder)
	}

	/// Merges another set into this one (counts summed, sources appended).
	///
	/// # Errors
	/// Returns an error if the sets were built with different case modes.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.case_mode != other.case_mode {
			return Err(Error::CaseModeMismatch { left: self.case_mode, right: other.case_mode });
		}
		self.prefixes.merge(&other.prefixes);
		self.middles.merge(&other.middles);
		self.suffixes.merge(&other.suffixes);
		self.records += other.records;
		self.sources.extend(other.sources.iter().cloned());
		Ok(())
	}

	/// Returns the pool of `category`.
	pub fn pool(&self, category: Category) -> &FrequencyPool {
		match category {
			Category::Prefix => &self.prefixes,
			Category::Middle => &self.middles,
			Category::Suffix => &self.suffixes,
		}
	}

	pub fn prefixes(&self) -> &FrequencyPool {
		&self.prefixes
	}

	pub fn middles(&self) -> &FrequencyPool {
		&self.middles
	}

	pub fn suffixes(&self) -> &FrequencyPool {
		&self.suffixes
	}

	pub fn case_mode(&self) -> CaseMode {
		self.case_mode
	}

	/// Number of corpus names the pools were built from.
	pub fn records(&self) -> usize {
		self.records
	}

	/// Names of the corpus files merged into this set, in load order.
	pub fn sources(&self) -> &[String] {
		&self.sources
	}

	/// Shortest and longest possible composition, in characters.
	pub fn composition_length_range(&self) -> (usize, usize) {
		Category::ALL
			.into_iter()
			.filter_map(|category| self.pool(category).length_range())
			.fold((0, 0), |(min, max), (lo, hi)| (min + lo, max + hi))
	}

	/// Read-only report of every pool, most common segments first.
	pub fn report(&self) -> PoolReport {
		PoolReport::new(self)
	}
}

/// Builds the pools for `names`, folding case.
///
/// Shorthand for `PoolSet::from_names(names, CaseMode::Fold)`.
pub fn build_pools<I, S>(names: I) -> Result<PoolSet>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	PoolSet::from_names(names, CaseMode::Fold)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::{Duration, SystemTime};

	use tempfile::TempDir;

	fn segments(pool: &FrequencyPool) -> Vec<(&str, usize)> {
		pool.iter().collect()
	}

	#[test]
	fn builds_three_pools() {
		let set = build_pools(["anna", "elena", "marco", "luca"]).unwrap();
		assert_eq!(segments(set.prefixes()), vec![("a", 1), ("e", 1), ("ma", 1), ("lu", 1)]);
		assert_eq!(segments(set.middles()), vec![("le", 1)]);
		assert_eq!(segments(set.suffixes()), vec![("nna", 1), ("na", 1), ("rco", 1), ("ca", 1)]);
		assert_eq!(set.records(), 4);
	}

	#[test]
	fn counts_repeated_segments() {
		let set = build_pools(["elena", "Elena", "selena"]).unwrap();
		assert_eq!(set.prefixes().count("e"), 2);
		assert_eq!(set.prefixes().count("se"), 1);
		assert_eq!(set.middles().count("le"), 3);
		assert_eq!(set.suffixes().total(), 3);
	}

	#[test]
	fn blank_corpus_has_no_records() {
		assert!(matches!(build_pools(Vec::<String>::new()), Err(Error::NoInputRecords)));
		assert!(matches!(build_pools(["", "   ", "\t"]), Err(Error::NoInputRecords)));
	}

	#[test]
	fn single_syllable_corpus_is_insufficient() {
		match build_pools(["a", "bo", "tri"]) {
			Err(Error::InsufficientData { missing }) => {
				assert_eq!(missing, vec![Category::Middle, Category::Suffix]);
			}
			other => panic!("expected InsufficientData, got {other:?}"),
		}
	}

	#[test]
	fn two_syllable_corpus_lacks_middles() {
		match build_pools(["luca", "marco"]) {
			Err(Error::InsufficientData { missing }) => assert_eq!(missing, vec![Category::Middle]),
			other => panic!("expected InsufficientData, got {other:?}"),
		}
	}

	#[test]
	fn parallel_build_matches_sequential() {
		let base = ["anna", "elena", "marco", "luca", "bartholomew", "zoé", "giovanni"];
		let names: Vec<String> = (0..PARALLEL_THRESHOLD + 500)
			.map(|i| format!("{}{}", base[i % base.len()], ["", "ra", "tisse"][i % 3]))
			.collect();

		let parallel = PoolSet::from_names(&names, CaseMode::Fold).unwrap();

		let mut sequential = PoolBuilder::new(CaseMode::Fold);
		sequential.add_names(&names);
		let sequential = sequential.finish().unwrap();

		for category in Category::ALL {
			assert_eq!(segments(parallel.pool(category)), segments(sequential.pool(category)));
		}
		assert_eq!(parallel.records(), sequential.records());
	}

	#[test]
	fn merge_rejects_other_case_mode() {
		let mut folded = PoolSet::from_names(["elena"], CaseMode::Fold).unwrap();
		let preserved = PoolSet::from_names(["Elena"], CaseMode::Preserve).unwrap();
		assert!(matches!(folded.merge(&preserved), Err(Error::CaseModeMismatch { .. })));
	}

	#[test]
	fn merge_sums_pools() {
		let mut left = build_pools(["elena"]).unwrap();
		let right = build_pools(["selena", "marina"]).unwrap();
		left.merge(&right).unwrap();
		assert_eq!(left.middles().count("le"), 2);
		assert_eq!(left.middles().count("ri"), 1);
		assert_eq!(left.records(), 3);
	}

	#[test]
	fn composition_range_adds_extremes() {
		let set = build_pools(["anna", "elena", "marco", "luca"]).unwrap();
		// prefixes 1..=2, middle 2..=2, suffixes 2..=3
		assert_eq!(set.composition_length_range(), (5, 7));
	}

	#[test]
	fn file_cache_is_written_and_reused() {
		let dir = TempDir::new().unwrap();
		let corpus = dir.path().join("heroes.txt");
		std::fs::write(&corpus, "anna\nelena\n\nmarco\nluca\n").unwrap();

		let built = PoolSet::from_file(&corpus, CaseMode::Fold, true).unwrap();
		let cache = dir.path().join("heroes.bin");
		assert!(cache.exists());
		assert_eq!(built.sources(), ["heroes".to_owned()]);

		// Make sure the cache is strictly newer than the corpus
		let later = SystemTime::now() + Duration::from_secs(60);
		std::fs::File::options().write(true).open(&cache).unwrap().set_modified(later).unwrap();

		let cached = PoolSet::from_file(&corpus, CaseMode::Fold, true).unwrap();
		for category in Category::ALL {
			assert_eq!(segments(cached.pool(category)), segments(built.pool(category)));
		}
		assert_eq!(cached.sources(), ["heroes".to_owned()]);
	}

	#[test]
	fn corrupt_cache_is_rebuilt() {
		let dir = TempDir::new().unwrap();
		let corpus = dir.path().join("heroes.txt");
		std::fs::write(&corpus, "anna\nelena\nmarco\nluca\n").unwrap();
		let cache = dir.path().join("heroes.bin");
		std::fs::write(&cache, [0xff, 0xff, 0xff]).unwrap();
		let later = SystemTime::now() + Duration::from_secs(60);
		std::fs::File::options().write(true).open(&cache).unwrap().set_modified(later).unwrap();

		let set = PoolSet::from_file(&corpus, CaseMode::Fold, true).unwrap();
		assert_eq!(set.middles().count("le"), 1);
	}

	#[test]
	fn missing_corpus_is_an_io_error() {
		let dir = TempDir::new().unwrap();
		let result = PoolSet::from_file(dir.path().join("nope.txt"), CaseMode::Fold, false);
		assert!(matches!(result, Err(Error::Io(_))));
	}

	#[test]
	fn files_are_validated_together() {
		let dir = TempDir::new().unwrap();
		let two = dir.path().join("twosyl.txt");
		let three = dir.path().join("threesyl.txt");
		std::fs::write(&two, "luca\nmarco\n").unwrap();
		std::fs::write(&three, "elena\n").unwrap();

		assert!(matches!(
			PoolSet::from_file(&two, CaseMode::Fold, false),
			Err(Error::InsufficientData { .. })
		));

		let set = PoolSet::from_files(&[&two, &three], CaseMode::Fold).unwrap();
		let expected = PoolSet::from_names(["luca", "marco", "elena"], CaseMode::Fold).unwrap();
		assert_eq!(segments(set.prefixes()), segments(expected.prefixes()));
		assert_eq!(segments(set.middles()), vec![("le", 1)]);
		assert_eq!(segments(set.suffixes()), segments(expected.suffixes()));
		assert_eq!(set.records(), 3);
		assert_eq!(set.sources(), ["twosyl", "threesyl"]);
	}

	#[test]
	fn files_without_any_middle_stay_insufficient() {
		let dir = TempDir::new().unwrap();
		let first = dir.path().join("first.txt");
		let second = dir.path().join("second.txt");
		std::fs::write(&first, "luca\n").unwrap();
		std::fs::write(&second, "marco\n").unwrap();

		let result = PoolSet::from_files(&[first, second], CaseMode::Fold);
		assert!(matches!(result, Err(Error::InsufficientData { missing }) if missing == vec![Category::Middle]));
	}
}
