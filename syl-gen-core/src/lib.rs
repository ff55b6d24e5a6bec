//! Syllable-pool name generation library.
//!
//! This crate provides a name generator that learns from a corpus:
//! - Syllable-based segmentation of names into prefix, middle and suffix
//! - Frequency pools of the observed segments
//! - Weighted recombination of segments under length bounds
//! - Finite or cancellable unbounded generation with seedable randomness
//! - Corpus I/O helpers (loading, cleaning, listing)
//!
//! ```
//! use syl_gen_core::model::generation_input::GenerationInput;
//! use syl_gen_core::model::generator::Generator;
//! use syl_gen_core::model::pool_set::build_pools;
//!
//! let pools = build_pools(["anna", "elena", "marco", "luca"]).unwrap();
//! let mut input = GenerationInput::new();
//! input.seed = Some(42);
//! let names = Generator::new(&pools, &input).generate(3).unwrap();
//! assert_eq!(names.len(), 3);
//! ```

/// Segmentation, pools and generation logic.
pub mod model;

/// I/O utilities (corpus files, cleaning, path helpers).
pub mod io;

/// Error type shared by the whole crate.
pub mod error;

pub use error::{Error, Result};
