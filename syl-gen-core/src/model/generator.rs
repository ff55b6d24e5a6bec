use std::io::Write;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use super::cancellation::CancellationToken;
use super::composer::{compose, LengthBounds};
use super::generation_input::{GenerationInput, GenerationMode};
use super::pool_set::PoolSet;

/// High-level name generator over a read-only `PoolSet`.
///
/// # Responsibilities
/// - Own the random source of one generation session
/// - Produce single names, finite batches, or an unbounded stream
///
/// Two generators built from the same pools, bounds and seed produce the
/// same sequence of names. Sessions never share random state.
#[derive(Debug)]
pub struct Generator<'a, R = StdRng> {
	pools: &'a PoolSet,
	bounds: LengthBounds,
	rng: R,
}

impl<'a> Generator<'a, StdRng> {
	/// Creates a generator configured from `input`.
	///
	/// Uses `input.seed` when present, otherwise seeds from the OS.
	pub fn new(pools: &'a PoolSet, input: &GenerationInput) -> Self {
		let rng = match input.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Self::with_rng(pools, input.bounds(), rng)
	}
}

impl<'a, R: Rng> Generator<'a, R> {
	/// Creates a generator drawing from a caller-supplied random source.
	pub fn with_rng(pools: &'a PoolSet, bounds: LengthBounds, rng: R) -> Self {
		Self { pools, bounds, rng }
	}

	pub fn pools(&self) -> &'a PoolSet {
		self.pools
	}

	pub fn bounds(&self) -> LengthBounds {
		self.bounds
	}

	/// Composes one name within the bounds.
	///
	/// # Errors
	/// `LengthBoundsUnsatisfiable` when the retry budget runs out.
	pub fn next_name(&mut self) -> Result<String> {
		compose(self.pools, self.bounds, &mut self.rng)
	}

	/// Produces exactly `count` names.
	///
	/// # Errors
	/// The first failed draw aborts the batch. The returned `BatchAborted`
	/// tells how many names had been produced before the failure; those
	/// names are not returned.
	pub fn generate(&mut self, count: usize) -> Result<Vec<String>> {
		let mut names = Vec::with_capacity(count);
		for _ in 0..count {
			match self.next_name() {
				Ok(name) => names.push(name),
				Err(e) => {
					return Err(Error::BatchAborted {
						produced: names.len(),
						requested: count,
						source: Box::new(e),
					});
				}
			}
		}
		Ok(names)
	}

	/// Turns the generator into an endless stream of names.
	///
	/// The stream checks `cancel` before each name and ends once it is set.
	/// A name composed while cancellation arrives is dropped, never
	/// yielded. After an error the stream is exhausted.
	pub fn into_stream(self, cancel: CancellationToken) -> NameStream<'a, R> {
		NameStream { generator: self, cancel, done: false }
	}
}

/// Lazy, unbounded sequence of names. See [`Generator::into_stream`].
#[derive(Debug)]
pub struct NameStream<'a, R = StdRng> {
	generator: Generator<'a, R>,
	cancel: CancellationToken,
	done: bool,
}

impl<R> NameStream<'_, R> {
	/// `true` once the stream stopped because of cancellation.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}
}

impl<R: Rng> Iterator for NameStream<'_, R> {
	type Item = Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done || self.cancel.is_cancelled() {
			return None;
		}

		let result = self.generator.next_name();
		if self.cancel.is_cancelled() {
			self.done = true;
			return None;
		}
		if result.is_err() {
			self.done = true;
		}
		Some(result)
	}
}

/// How a `run` ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
	/// Every requested name was written.
	Completed { written: usize },
	/// Unbounded generation stopped on cancellation.
	Cancelled { written: usize },
}

/// Runs a full generation session and writes one name per line to `out`.
///
/// # Behavior
/// - With `input.debug`, the pool report is written first, then
///   generation continues.
/// - Finite mode builds the whole batch before writing anything, so a
///   failure writes no name at all.
/// - Unbounded mode writes and flushes each name as soon as it is drawn
///   and returns `Cancelled` once `cancel` is set.
///
/// # Errors
/// Composition failures (`BatchAborted` in finite mode,
/// `LengthBoundsUnsatisfiable` in unbounded mode) and write errors.
pub fn run<W: Write>(
	pools: &PoolSet,
	input: &GenerationInput,
	cancel: &CancellationToken,
	out: &mut W,
) -> Result<RunOutcome> {
	if input.debug {
		writeln!(out, "{}", pools.report())?;
	}

	let mut generator = Generator::new(pools, input);
	match input.mode() {
		GenerationMode::Finite(count) => {
			let names = generator.generate(count)?;
			for name in &names {
				writeln!(out, "{name}")?;
			}
			out.flush()?;
			Ok(RunOutcome::Completed { written: names.len() })
		}
		GenerationMode::Unbounded => {
			let mut written = 0;
			for name in generator.into_stream(cancel.clone()) {
				writeln!(out, "{}", name?)?;
				out.flush()?;
				written += 1;
			}
			debug!("unbounded generation cancelled after {written} names");
			Ok(RunOutcome::Cancelled { written })
		}
	}
}
