use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::char_class::CharacterClass;
use crate::error::AnalysisError;

/// Character statistics for one index of words of one length.
///
/// ## Invariants
/// - Sum of `class_counts` == sum of `char_counts` == `total_chars()`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionStats {
	/// Occurrences of each character at this position.
	char_counts: BTreeMap<char, u64>,
	/// Occurrences of each character class at this position.
	class_counts: BTreeMap<CharacterClass, u64>,
}

impl PositionStats {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `c`.
	pub fn add_char(&mut self, c: char) {
		*self.char_counts.entry(c).or_insert(0) += 1;
		*self.class_counts.entry(CharacterClass::from_char(c)).or_insert(0) += 1;
	}

	pub fn char_counts(&self) -> &BTreeMap<char, u64> {
		&self.char_counts
	}

	pub fn class_counts(&self) -> &BTreeMap<CharacterClass, u64> {
		&self.class_counts
	}

	/// Observed count of `c` at this position (0 if never seen).
	pub fn count_of(&self, c: char) -> u64 {
		self.char_counts.get(&c).copied().unwrap_or(0)
	}

	pub fn total_chars(&self) -> u64 {
		self.char_counts.values().sum()
	}

	/// Number of distinct characters observed.
	pub fn variety(&self) -> usize {
		self.char_counts.len()
	}

	pub fn char_probability(&self, c: char) -> f64 {
		let total = self.total_chars();
		if total == 0 {
			return 0.0;
		}
		self.count_of(c) as f64 / total as f64
	}

	pub fn class_probability(&self, class: CharacterClass) -> f64 {
		let total = self.total_chars();
		if total == 0 {
			return 0.0;
		}
		self.class_counts.get(&class).copied().unwrap_or(0) as f64 / total as f64
	}

	/// Characters seen here that belong to `class`, in character order.
	pub fn chars_of_class(&self, class: CharacterClass) -> Vec<char> {
		self.char_counts.keys().copied().filter(|c| class.contains(*c)).collect()
	}

	/// `(char, count)` pairs, most common first.
	pub fn weighted_chars(&self) -> Vec<(char, u64)> {
		let mut chars: Vec<(char, u64)> = self.char_counts.iter().map(|(c, n)| (*c, *n)).collect();
		chars.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
		chars
	}

	/// Adds the counts of `other` into this position.
	pub fn merge(&mut self, other: &Self) {
		for (c, n) in &other.char_counts {
			*self.char_counts.entry(*c).or_insert(0) += n;
		}
		for (class, n) in &other.class_counts {
			*self.class_counts.entry(*class).or_insert(0) += n;
		}
	}
}

/// Statistics for all words of one length.
///
/// ## Invariants
/// - `positions.len() == length`, created eagerly
/// - Sum of `patterns` == `count`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LengthStats {
	length: usize,
	count: u64,
	positions: Vec<PositionStats>,
	/// Type pattern (e.g. `"Ullnn"`) → occurrences.
	patterns: BTreeMap<String, u64>,
}

impl LengthStats {
	pub fn new(length: usize) -> Self {
		Self {
			length,
			count: 0,
			positions: vec![PositionStats::new(); length],
			patterns: BTreeMap::new(),
		}
	}

	/// Records a word of this length.
	///
	/// # Errors
	/// Returns `LengthMismatch` if the word has a different character count.
	pub fn add_word(&mut self, word: &str) -> Result<(), AnalysisError> {
		let actual = word.chars().count();
		if actual != self.length {
			return Err(AnalysisError::LengthMismatch {
				word: word.to_owned(),
				expected: self.length,
				actual,
			});
		}

		self.count += 1;
		let mut pattern = String::with_capacity(self.length);
		for (position, c) in self.positions.iter_mut().zip(word.chars()) {
			position.add_char(c);
			pattern.push(CharacterClass::from_char(c).symbol());
		}
		*self.patterns.entry(pattern).or_insert(0) += 1;
		Ok(())
	}

	pub fn length(&self) -> usize {
		self.length
	}

	pub fn count(&self) -> u64 {
		self.count
	}

	/// More than one training word has this length.
	pub fn has_variety(&self) -> bool {
		self.count > 1
	}

	pub fn position(&self, index: usize) -> Option<&PositionStats> {
		self.positions.get(index)
	}

	pub fn positions(&self) -> &[PositionStats] {
		&self.positions
	}

	pub fn patterns(&self) -> &BTreeMap<String, u64> {
		&self.patterns
	}

	/// The `n` most common type patterns, most common first.
	pub fn common_patterns(&self, n: usize) -> Vec<(&str, u64)> {
		let mut patterns: Vec<(&str, u64)> = self.patterns.iter().map(|(p, c)| (p.as_str(), *c)).collect();
		patterns.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
		patterns.truncate(n);
		patterns
	}

	/// Adds the statistics of `other` into this one.
	///
	/// # Errors
	/// Returns `LengthMismatch` if the two lengths differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), AnalysisError> {
		if self.length != other.length {
			return Err(AnalysisError::LengthMismatch {
				word: String::new(),
				expected: self.length,
				actual: other.length,
			});
		}

		self.count += other.count;
		for (mine, theirs) in self.positions.iter_mut().zip(&other.positions) {
			mine.merge(theirs);
		}
		for (pattern, n) in &other.patterns {
			*self.patterns.entry(pattern.clone()).or_insert(0) += n;
		}
		Ok(())
	}
}
