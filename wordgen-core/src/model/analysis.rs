use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::char_class::{type_pattern, CharacterClass};
use super::cooccurrence::CooccurrenceIndex;
use super::stats::LengthStats;
use crate::analyzer::AnalyzerConfig;

/// Immutable snapshot of one analysis run.
///
/// Built once by the `Analyzer` and then only read. Generators share it
/// through an `Arc`, so any number of them may read it at once.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnalysisResult {
	pub(crate) total_words: u64,
	pub(crate) unique_words: u64,
	pub(crate) charset: BTreeSet<char>,
	/// Reference keyboard keys never observed in the corpus.
	pub(crate) discarded_charset: BTreeSet<char>,
	pub(crate) length_stats: BTreeMap<usize, LengthStats>,
	pub(crate) char_frequency: BTreeMap<char, u64>,
	pub(crate) class_frequency: BTreeMap<CharacterClass, u64>,
	pub(crate) min_length: usize,
	pub(crate) max_length: usize,
	pub(crate) cooccurrence: CooccurrenceIndex,
	/// Length window the corpus was filtered with.
	pub(crate) window: AnalyzerConfig,
}

impl AnalysisResult {
	pub fn total_words(&self) -> u64 {
		self.total_words
	}

	pub fn unique_words(&self) -> u64 {
		self.unique_words
	}

	pub fn charset(&self) -> &BTreeSet<char> {
		&self.charset
	}

	pub fn discarded_charset(&self) -> &BTreeSet<char> {
		&self.discarded_charset
	}

	pub fn length_stats(&self) -> &BTreeMap<usize, LengthStats> {
		&self.length_stats
	}

	pub fn length(&self, length: usize) -> Option<&LengthStats> {
		self.length_stats.get(&length)
	}

	pub fn char_frequency(&self) -> &BTreeMap<char, u64> {
		&self.char_frequency
	}

	pub fn class_frequency(&self) -> &BTreeMap<CharacterClass, u64> {
		&self.class_frequency
	}

	pub fn min_length(&self) -> usize {
		self.min_length
	}

	pub fn max_length(&self) -> usize {
		self.max_length
	}

	pub fn cooccurrence(&self) -> &CooccurrenceIndex {
		&self.cooccurrence
	}

	pub fn window(&self) -> AnalyzerConfig {
		self.window
	}

	/// No word survived length filtering.
	pub fn is_empty(&self) -> bool {
		self.total_words == 0
	}

	/// Share of words for each observed length.
	pub fn length_distribution(&self) -> BTreeMap<usize, f64> {
		let total: u64 = self.length_stats.values().map(LengthStats::count).sum();
		if total == 0 {
			return BTreeMap::new();
		}
		self.length_stats
			.iter()
			.map(|(length, stats)| (*length, stats.count() as f64 / total as f64))
			.collect()
	}

	/// Observed characters belonging to `class`, in character order.
	pub fn charset_by_class(&self, class: CharacterClass) -> Vec<char> {
		self.charset.iter().copied().filter(|c| class.contains(*c)).collect()
	}

	/// Type patterns with their counts, most common first.
	///
	/// With `Some(length)` only that length is considered.
	pub fn patterns(&self, length: Option<usize>) -> Vec<(String, u64)> {
		let mut patterns: Vec<(String, u64)> = self
			.length_stats
			.values()
			.filter(|stats| length.is_none_or(|l| stats.length() == l))
			.flat_map(|stats| stats.patterns().iter().map(|(p, c)| (p.clone(), *c)))
			.collect();
		patterns.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		patterns
	}

	/// How well `word` fits the observed per-position frequencies.
	///
	/// Sum, over each position, of how often the word's character was seen
	/// there in words of the same length. `0` for an unseen length.
	pub fn calculate_weight(&self, word: &str) -> u64 {
		let Some(stats) = self.length_stats.get(&word.chars().count()) else {
			return 0;
		};
		word.chars()
			.zip(stats.positions())
			.map(|(c, position)| position.count_of(c))
			.sum()
	}

	/// Multi-line human readable report.
	pub fn summary(&self) -> String {
		let mut out = String::new();
		let charset: String = self.charset.iter().collect();
		// Writing to a String cannot fail
		let _ = writeln!(out, "Total words analyzed: {}", self.total_words);
		let _ = writeln!(out, "Unique words: {}", self.unique_words);
		let _ = writeln!(out, "Length range: {} - {}", self.min_length, self.max_length);
		let _ = writeln!(out, "Charset size: {}", self.charset.len());
		let _ = writeln!(out, "Charset: {charset}");
		let _ = writeln!(out);
		let _ = writeln!(out, "Length distribution:");
		for (length, share) in self.length_distribution() {
			let count = self.length_stats[&length].count();
			let bar = "#".repeat((share * 50.0) as usize);
			let _ = writeln!(out, "  {length:3}: {bar} ({count} words, {:.1}%)", share * 100.0);
		}
		let _ = writeln!(out);
		let _ = writeln!(out, "Character type frequency:");
		let total: u64 = self.class_frequency.values().sum();
		for class in CharacterClass::ALL {
			let count = self.class_frequency.get(&class).copied().unwrap_or(0);
			let percent = if total > 0 { count as f64 / total as f64 * 100.0 } else { 0.0 };
			let _ = writeln!(out, "  {:8}: {count:6} ({percent:.1}%)", class.name());
		}
		out
	}
}

/// Breakdown of a single word against the current statistics.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WordAnalysis {
	pub word: String,
	pub length: usize,
	pub pattern: String,
	pub classes: Vec<CharacterClass>,
	/// Position → how often the word's character was seen there.
	pub char_weights: BTreeMap<usize, u64>,
}

impl WordAnalysis {
	pub(crate) fn new(word: &str, stats: Option<&LengthStats>) -> Self {
		let classes: Vec<CharacterClass> = word.chars().map(CharacterClass::from_char).collect();
		let char_weights = match stats {
			Some(stats) => word
				.chars()
				.zip(stats.positions())
				.enumerate()
				.map(|(i, (c, position))| (i, position.count_of(c)))
				.collect(),
			None => BTreeMap::new(),
		};
		Self {
			word: word.to_owned(),
			length: classes.len(),
			pattern: type_pattern(word),
			classes,
			char_weights,
		}
	}
}
