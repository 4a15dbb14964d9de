use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::io::read_file;
use crate::model::{AnalysisResult, CharacterClass, CooccurrenceIndex, LengthStats, WordAnalysis};

/// Reference keyboard used to report keys never seen in the corpus.
pub const FULL_KEYBOARD: &str = concat!(
	"`1234567890-=qwertyuiop[]\\asdfghjkl;'zxcvbnm,./",
	"~!@#$%^&*()_+QWERTYUIOP{}|ASDFGHJKL:\"ZXCVBNM<>?"
);

/// Length window applied to the corpus.
///
/// Words outside `[min_length, max_length]` (in characters) are skipped
/// silently.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AnalyzerConfig {
	pub min_length: usize,
	pub max_length: usize,
}

impl Default for AnalyzerConfig {
	fn default() -> Self {
		Self { min_length: 1, max_length: 256 }
	}
}

impl AnalyzerConfig {
	/// Creates a validated window.
	pub fn new(min_length: usize, max_length: usize) -> Result<Self, AnalysisError> {
		let config = Self { min_length, max_length };
		config.validate()?;
		Ok(config)
	}

	/// # Errors
	/// `InvalidLengthWindow` if `min_length` is 0 or greater than `max_length`.
	pub fn validate(&self) -> Result<(), AnalysisError> {
		if self.min_length == 0 || self.min_length > self.max_length {
			return Err(AnalysisError::InvalidLengthWindow {
				min: self.min_length,
				max: self.max_length,
			});
		}
		Ok(())
	}

	pub fn accepts(&self, length: usize) -> bool {
		(self.min_length..=self.max_length).contains(&length)
	}
}

/// Builds an `AnalysisResult` from a corpus.
///
/// # Responsibilities
/// - Filter entries (blank, outside the length window)
/// - Accumulate per-length, per-position and global statistics
/// - Record positional co-occurrence for every retained word
/// - Merge with other partial analyzers (parallel or batch analysis)
///
/// All aggregation is commutative, so the produced snapshot does not depend on
/// the order in which words were fed.
#[derive(Clone, Debug)]
pub struct Analyzer {
	config: AnalyzerConfig,
	total_words: u64,
	unique_words: BTreeSet<String>,
	charset: BTreeSet<char>,
	length_stats: BTreeMap<usize, LengthStats>,
	char_frequency: BTreeMap<char, u64>,
	class_frequency: BTreeMap<CharacterClass, u64>,
	cooccurrence: CooccurrenceIndex,
	analyzed: bool,
}

impl Analyzer {
	/// Creates an analyzer for the given length window.
	///
	/// # Errors
	/// Returns an error if the window is invalid.
	pub fn new(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
		config.validate()?;
		Ok(Self::empty(config))
	}

	fn empty(config: AnalyzerConfig) -> Self {
		Self {
			config,
			total_words: 0,
			unique_words: BTreeSet::new(),
			charset: BTreeSet::new(),
			length_stats: BTreeMap::new(),
			char_frequency: BTreeMap::new(),
			class_frequency: BTreeMap::new(),
			cooccurrence: CooccurrenceIndex::new(),
			analyzed: false,
		}
	}

	pub fn config(&self) -> &AnalyzerConfig {
		&self.config
	}

	/// Drops all accumulated statistics.
	pub fn reset(&mut self) {
		*self = Self::empty(self.config);
	}

	/// Analyzes a whole corpus from scratch.
	///
	/// An empty corpus (or one fully excluded by the length window) is valid
	/// and yields `total_words == 0`.
	pub fn analyze<I, S>(&mut self, words: I) -> Result<AnalysisResult, AnalysisError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.reset();
		self.feed(words);
		info!(
			"Analysis complete: {} words, {} unique",
			self.total_words,
			self.unique_words.len()
		);
		self.result()
	}

	/// Same output as `analyze`, built on worker threads.
	///
	/// # Behavior
	/// - Splits the corpus into `num_cpus * 8` chunks.
	/// - Each thread fills a partial analyzer with its chunk.
	/// - Partial analyzers are gathered over a channel and merged.
	pub fn analyze_parallel(&mut self, words: &[String]) -> Result<AnalysisResult, AnalysisError> {
		let chunks = num_cpus::get() * 8;
		let chunk_size = words.len().div_ceil(chunks).max(1);
		let config = self.config;

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in words.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					let mut partial = Analyzer::empty(config);
					partial.feed(chunk);
					// The receiver outlives the scope
					let _ = tx.send(partial);
				});
			}
		});
		drop(tx);

		let mut merged = Analyzer::empty(config);
		merged.analyzed = true;
		for partial in rx.iter() {
			merged.merge(&partial)?;
		}
		*self = merged;

		info!(
			"Parallel analysis complete: {} words, {} unique",
			self.total_words,
			self.unique_words.len()
		);
		self.result()
	}

	/// Reads a wordlist file and analyzes it.
	pub fn analyze_file<P: AsRef<Path>>(&mut self, filepath: P) -> crate::error::Result<AnalysisResult> {
		info!("Analyzing file: {}", filepath.as_ref().display());
		let lines = read_file(filepath)?;
		Ok(self.analyze_parallel(&lines)?)
	}

	/// Adds words to the current statistics without resetting.
	///
	/// Returns how many entries were retained.
	pub fn feed<I, S>(&mut self, words: I) -> usize
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.analyzed = true;
		words.into_iter().filter(|word| self.add_word(word.as_ref())).count()
	}

	/// Adds one corpus entry.
	///
	/// Returns `false` if the entry was blank or outside the length window.
	pub fn add_word(&mut self, entry: &str) -> bool {
		self.analyzed = true;

		let word = entry.trim();
		if word.is_empty() {
			return false;
		}

		let chars: Vec<char> = word.chars().collect();
		let length = chars.len();
		if !self.config.accepts(length) {
			let preview: String = chars.iter().take(20).collect();
			debug!("Skipping word of length {length}: {preview}...");
			return false;
		}

		let stats = self.length_stats.entry(length).or_insert_with(|| LengthStats::new(length));
		if let Err(err) = stats.add_word(word) {
			debug!("Skipping word: {err}");
			return false;
		}

		self.total_words += 1;
		self.unique_words.insert(word.to_owned());
		for c in &chars {
			self.charset.insert(*c);
			*self.char_frequency.entry(*c).or_insert(0) += 1;
			*self.class_frequency.entry(CharacterClass::from_char(*c)).or_insert(0) += 1;
		}
		self.cooccurrence.record_word(&chars);
		true
	}

	/// Folds another partial analyzer into this one.
	///
	/// Counts are added, sets are unioned.
	///
	/// # Errors
	/// Returns an error if the two length windows differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), AnalysisError> {
		if self.config != other.config {
			return Err(AnalysisError::WindowMismatch);
		}

		for (length, stats) in &other.length_stats {
			if let Some(existing) = self.length_stats.get_mut(length) {
				existing.merge(stats)?;
			} else {
				self.length_stats.insert(*length, stats.clone());
			}
		}
		for (c, n) in &other.char_frequency {
			*self.char_frequency.entry(*c).or_insert(0) += n;
		}
		for (class, n) in &other.class_frequency {
			*self.class_frequency.entry(*class).or_insert(0) += n;
		}

		self.total_words += other.total_words;
		self.unique_words.extend(other.unique_words.iter().cloned());
		self.charset.extend(other.charset.iter().copied());
		self.cooccurrence.merge(&other.cooccurrence);
		self.analyzed |= other.analyzed;
		Ok(())
	}

	/// Snapshot of the current statistics.
	///
	/// # Errors
	/// `NotAnalyzed` if no word was ever fed.
	pub fn result(&self) -> Result<AnalysisResult, AnalysisError> {
		if !self.analyzed {
			return Err(AnalysisError::NotAnalyzed);
		}

		let min_length = self.length_stats.keys().next().copied().unwrap_or(0);
		let max_length = self.length_stats.keys().next_back().copied().unwrap_or(0);
		let discarded_charset = FULL_KEYBOARD.chars().filter(|c| !self.charset.contains(c)).collect();

		Ok(AnalysisResult {
			total_words: self.total_words,
			unique_words: self.unique_words.len() as u64,
			charset: self.charset.clone(),
			discarded_charset,
			length_stats: self.length_stats.clone(),
			char_frequency: self.char_frequency.clone(),
			class_frequency: self.class_frequency.clone(),
			min_length,
			max_length,
			cooccurrence: self.cooccurrence.clone(),
			window: self.config,
		})
	}

	/// Breakdown of `word` against the statistics gathered so far.
	pub fn word_analysis(&self, word: &str) -> WordAnalysis {
		WordAnalysis::new(word, self.length_stats.get(&word.chars().count()))
	}
}
