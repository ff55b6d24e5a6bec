//! Top-level module for the syllable-pool name generation system.
//!
//! This module provides:
//! - The syllable segmenter (`segmenter`)
//! - Per-category frequency pools (`FrequencyPool`) and their triple (`PoolSet`)
//! - Weighted composition under length bounds (`composer`)
//! - Session configuration (`GenerationInput`)
//! - The generation driver (`Generator`, `run`) and its cancellation token
//! - A read-only pool dump for debugging (`PoolReport`)

/// Syllable-based decomposition of a name into prefix, middle and suffix.
pub mod segmenter;

/// Frequency table of the segments of one category.
///
/// Supports weighted sampling and merging of partial pools.
pub mod frequency_pool;

/// The prefix, middle and suffix pools of a corpus.
///
/// Handles corpus loading, parallel building, validation, merging and
/// the optional binary cache.
pub mod pool_set;

/// One-name composition with bounded retries and length validation.
pub mod composer;

/// Session parameters (count, bounds, seed, debug, case mode).
pub mod generation_input;

/// Finite and unbounded generation over a `PoolSet`.
pub mod generator;

/// Cooperative cancellation of unbounded generation.
pub mod cancellation;

/// Sorted, read-only dump of the pools.
pub mod report;
