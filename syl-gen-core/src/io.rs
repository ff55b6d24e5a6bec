use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a corpus file and returns its names.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Trims every line and drops blank ones
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect())
}

/// Writes one line per item, overwriting `filename`.
pub fn write_lines<P, I, S>(filename: P, lines: I) -> io::Result<()>
where
	P: AsRef<Path>,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut writer = BufWriter::new(File::create(filename)?);
	for line in lines {
		writeln!(writer, "{}", line.as_ref())?;
	}
	writer.flush()
}

/// Filters raw lines down to usable corpus names.
///
/// - `skip_header`: drop the first line unconditionally
/// - Trims lines, drops blank ones
/// - Drops lines containing `.` or `…` (abbreviations, truncated entries)
/// - Removes duplicates, keeping the first occurrence
pub fn clean_lines<I, S>(lines: I, skip_header: bool) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = HashSet::new();
	lines
		.into_iter()
		.skip(usize::from(skip_header))
		.filter_map(|line| {
			let line = line.as_ref().trim();
			if line.is_empty() || line.contains('.') || line.contains('…') {
				return None;
			}
			seen.insert(line.to_owned()).then(|| line.to_owned())
		})
		.collect()
}

/// Cleans `input` into `output` (see [`clean_lines`]).
///
/// Returns the number of names written.
pub fn clean_file<PI, PO>(input: PI, output: PO, skip_header: bool) -> io::Result<usize>
where
	PI: AsRef<Path>,
	PO: AsRef<Path>,
{
	let contents = fs::read_to_string(input)?;
	let names = clean_lines(contents.lines(), skip_header);
	if let Some(parent) = output.as_ref().parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}
	write_lines(output, &names)?;
	Ok(names.len())
}

/// Path of the sibling file with `extension` instead of the current one.
///
/// `chapters/elves.txt` + `"bin"` → `chapters/elves.bin`
pub fn with_extension<P: AsRef<Path>>(path: P, extension: &str) -> io::Result<PathBuf> {
	let path = path.as_ref();
	if path.file_stem().is_none() {
		return Err(no_file_name(path));
	}
	Ok(path.with_extension(extension))
}

/// File name without its extension (`./chapters/elves.txt` → `elves`).
pub fn file_stem<P: AsRef<Path>>(path: P) -> io::Result<String> {
	let path = path.as_ref();
	path.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.ok_or_else(|| no_file_name(path))
}

fn no_file_name(path: &Path) -> io::Error {
	io::Error::new(io::ErrorKind::InvalidInput, format!("'{}' has no file name", path.display()))
}

/// Returns `true` if `path` exists and was modified after `reference`.
///
/// Any metadata error counts as "not newer".
pub fn is_newer<P: AsRef<Path>, R: AsRef<Path>>(path: P, reference: R) -> bool {
	let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
	match (modified(path.as_ref()), modified(reference.as_ref())) {
		(Some(candidate), Some(reference)) => candidate > reference,
		_ => false,
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
