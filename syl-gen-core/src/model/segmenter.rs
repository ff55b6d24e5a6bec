use std::fmt;

use serde::{Deserialize, Serialize};

/// Vowels recognised by the syllable scan, lower-case only.
///
/// `y` is treated as a vowel. Upper-case input is folded before lookup.
const VOWELS: &[char] = &[
	'a', 'e', 'i', 'o', 'u', 'y',
	'á', 'é', 'í', 'ó', 'ú',
	'à', 'è', 'ì', 'ò', 'ù',
	'â', 'ê', 'î', 'ô', 'û',
	'ä', 'ë', 'ï', 'ö', 'ü',
];

/// The three segment classes a name decomposes into.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Prefix,
	Middle,
	Suffix,
}

impl Category {
	pub const ALL: [Category; 3] = [Category::Prefix, Category::Middle, Category::Suffix];
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Category::Prefix => "prefix",
			Category::Middle => "middle",
			Category::Suffix => "suffix",
		})
	}
}

/// How letter case is treated while segmenting.
///
/// Vowel detection is always case-insensitive; the mode only decides
/// which form of the text ends up in the segments.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseMode {
	/// Lower-case the name, segments are lower-case.
	#[default]
	Fold,
	/// Keep the corpus casing in the segments.
	Preserve,
}

/// Result of decomposing one name. Any part may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segments {
	pub prefix: String,
	pub middle: String,
	pub suffix: String,
}

impl Segments {
	/// Returns the segment stored for `category`.
	pub fn get(&self, category: Category) -> &str {
		match category {
			Category::Prefix => &self.prefix,
			Category::Middle => &self.middle,
			Category::Suffix => &self.suffix,
		}
	}

	pub fn into_tuple(self) -> (String, String, String) {
		(self.prefix, self.middle, self.suffix)
	}
}

/// Returns `true` if `c` is one of the recognised vowels (any case).
pub fn is_vowel(c: char) -> bool {
	c.to_lowercase().all(|lower| VOWELS.contains(&lower))
}

/// Splits a name into syllables.
///
/// A syllable is a run of zero or more consonants closed by a single vowel.
/// Trailing consonants with no vowel after them form a final syllable, so
/// concatenating the result always gives back `name` unchanged.
pub fn syllables(name: &str) -> Vec<String> {
	let mut syllables = Vec::new();
	let mut current = String::new();

	for c in name.chars() {
		current.push(c);
		if is_vowel(c) {
			syllables.push(std::mem::take(&mut current));
		}
	}

	if !current.is_empty() {
		syllables.push(current);
	}

	syllables
}

/// Decomposes `name` into (prefix, middle, suffix), folding case.
///
/// Equivalent to `segment_with(name, CaseMode::Fold)`.
pub fn segment(name: &str) -> Segments {
	segment_with(name, CaseMode::Fold)
}

/// Decomposes `name` into (prefix, middle, suffix).
///
/// Classification by syllable count:
/// - 0: all segments empty
/// - 1: prefix only
/// - 2: prefix and suffix
/// - 3: one syllable each
/// - 4+: first, inner syllables joined, last
///
/// Surrounding whitespace is ignored.
pub fn segment_with(name: &str, case_mode: CaseMode) -> Segments {
	let name = name.trim();
	let normalized = match case_mode {
		CaseMode::Fold => name.to_lowercase(),
		CaseMode::Preserve => name.to_owned(),
	};

	let mut parts = syllables(&normalized);
	match parts.len() {
		0 => Segments::default(),
		1 => Segments { prefix: parts.remove(0), ..Segments::default() },
		_ => {
			let suffix = parts.pop().unwrap_or_default();
			let prefix = parts.remove(0);
			Segments { prefix, middle: parts.concat(), suffix }
		}
	}
}
