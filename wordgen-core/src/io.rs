use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use log::info;

use crate::analyzer::{Analyzer, AnalyzerConfig};
use crate::error::Result;
use crate::model::AnalysisResult;

/// Lines of a wordlist, one corpus entry each.
///
/// Invalid UTF-8 bytes become U+FFFD rather than failing the file. Both
/// `\n` and `\r\n` end a line.
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut bytes = Vec::new();
	File::open(filename)?.read_to_end(&mut bytes)?;
	Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect())
}

/// Sibling of a wordlist with another extension: `data/words.txt` with
/// `"bin"` gives the cache path `data/words.bin`.
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "wordlist path has no file name"))?;

	Ok(parent.join(stem).with_extension(output_extension))
}

/// Name a wordlist is reported under: its file stem, `rockyou` for
/// `./data/rockyou.txt`.
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "wordlist path has no file name"))?;

	Ok(stem.to_string_lossy().into_owned())
}

/// Wordlist folder as given, except `.` and `./` which become the working
/// directory.
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// File names (not paths) of the wordlists in `dir` ending in `.extension`,
/// sorted so directory analysis visits them in a stable order.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut wordlists = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() || !path.extension().is_some_and(|ext| ext == extension) {
			continue;
		}
		if let Some(name) = path.file_name() {
			wordlists.push(name.to_string_lossy().into_owned());
		}
	}
	wordlists.sort();
	Ok(wordlists)
}

/// Writes an analysis to disk in postcard's compact binary form.
pub fn save_analysis<P: AsRef<Path>>(analysis: &AnalysisResult, filepath: P) -> Result<()> {
	let bytes = postcard::to_stdvec(analysis)?;
	fs::write(filepath, bytes)?;
	Ok(())
}

/// Reads an analysis written by `save_analysis`.
pub fn load_analysis<P: AsRef<Path>>(filepath: P) -> Result<AnalysisResult> {
	let bytes = fs::read(filepath)?;
	Ok(postcard::from_bytes(&bytes)?)
}

/// Loads the analysis of a wordlist, using a binary cache when possible.
///
/// - `words.txt` is cached as `words.bin` in the same folder.
/// - A cache built with the same length window is loaded as-is; delete it to
///   pick up changes to the wordlist.
/// - A cache built with another window is rebuilt and overwritten.
/// - Otherwise the file is analyzed in parallel and the cache is written.
pub fn load_or_analyze<P: AsRef<Path>>(filepath: P, config: AnalyzerConfig) -> Result<AnalysisResult> {
	let binary_data_path = build_output_path(&filepath, "bin")?;
	if binary_data_path.exists() {
		let cached = load_analysis(&binary_data_path)?;
		if cached.window() == config {
			info!("Loading cached analysis: {}", binary_data_path.display());
			return Ok(cached);
		}
		info!(
			"Cached analysis {} uses window {:?}, rebuilding for {:?}",
			binary_data_path.display(),
			cached.window(),
			config
		);
	}

	let analysis = Analyzer::new(config)?.analyze_file(&filepath)?;
	save_analysis(&analysis, &binary_data_path)?;
	info!("Cached analysis written to {}", binary_data_path.display());
	Ok(analysis)
}

/// Analyzes every wordlist with `extension` in a directory.
///
/// Returns the analysis of each file keyed by its stem, and the analysis of
/// all files merged together.
pub fn analyze_directory(
	folder: &str,
	extension: &str,
	config: AnalyzerConfig,
) -> Result<(BTreeMap<String, AnalysisResult>, AnalysisResult)> {
	let folder = normalize_folder(folder);
	if !folder.is_dir() {
		return Err(io::Error::new(
			io::ErrorKind::NotFound,
			format!("Expected a directory, got: {}", folder.display()),
		)
		.into());
	}

	let mut per_file = BTreeMap::new();
	let mut merged: Option<Analyzer> = None;
	for file in list_files(&folder, extension)? {
		let full_path = folder.join(&file);
		let mut analyzer = Analyzer::new(config)?;
		let analysis = analyzer.analyze_file(&full_path)?;
		merged = Some(match merged.take() {
			Some(mut merged) => {
				merged.merge(&analyzer)?;
				merged
			}
			None => analyzer,
		});
		per_file.insert(get_filename(&full_path)?, analysis);
	}

	let merged = match merged {
		Some(merged) => merged.result()?,
		// No wordlist: the analysis of an empty corpus
		None => Analyzer::new(config)?.analyze(std::iter::empty::<&str>())?,
	};
	Ok((per_file, merged))
}
