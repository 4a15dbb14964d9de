use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::TransitionState;
use crate::error::GenerationError;
use crate::model::AnalysisResult;

/// Marks the beginning of a word in a context.
pub const START: char = '\u{0}';
/// Marks the end of a word as a transition target.
pub const END: char = '\u{1}';

/// Character-level transition table of order `n`.
///
/// # Responsibilities
/// - Learn transitions from words padded with `n` START and one END
/// - Approximate transitions from an analysis when no word list is at hand
/// - Resolve a context, backing off to shorter suffixes
/// - Merge with another table of the same order
///
/// # Invariants
/// - `order >= 1`
/// - Each state is stored under its own context
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable {
	order: usize,
	states: BTreeMap<String, TransitionState>,
}

impl TransitionTable {
	/// # Errors
	/// `InvalidConfig` if `order == 0`.
	pub fn new(order: usize) -> Result<Self, GenerationError> {
		if order == 0 {
			return Err(GenerationError::InvalidConfig("Markov order must be >= 1".to_owned()));
		}
		Ok(Self { order, states: BTreeMap::new() })
	}

	/// Approximates a table from co-occurrence data.
	///
	/// - Each pair of adjacent positions gives a one-character context
	/// - Characters at position 0 follow START, weighted by their count
	/// - Characters at the last position precede END, weighted by their count
	///
	/// Contexts are a single character whatever the order; generation
	/// reaches them by backing off.
	pub fn from_analysis(analysis: &AnalysisResult, order: usize) -> Result<Self, GenerationError> {
		let mut table = Self::new(order)?;

		for (key, seen) in analysis.cooccurrence().iter() {
			if key.to != key.from + 1 {
				continue;
			}
			let context = key.character.to_string();
			for next in seen {
				table.add_transition(&context, *next, 1);
			}
		}

		let start = START.to_string();
		for stats in analysis.length_stats().values() {
			if let Some(first) = stats.positions().first() {
				for (c, count) in first.char_counts() {
					table.add_transition(&start, *c, *count);
				}
			}
			if let Some(last) = stats.positions().last() {
				for (c, count) in last.char_counts() {
					table.add_transition(&c.to_string(), END, *count);
				}
			}
		}

		Ok(table)
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn get(&self, context: &str) -> Option<&TransitionState> {
		self.states.get(context)
	}

	pub fn states(&self) -> impl Iterator<Item = &TransitionState> {
		self.states.values()
	}

	/// Forgets every transition, keeping the order.
	pub fn clear(&mut self) {
		self.states.clear();
	}

	/// Records `count` occurrences of `next` after `context`.
	pub fn add_transition(&mut self, context: &str, next: char, count: u64) {
		self.states
			.entry(context.to_owned())
			.or_insert_with(|| TransitionState::new(context))
			.add_transition(next, count);
	}

	/// Slides an `order`-wide window over `START * order + word + END`.
	pub fn add_word(&mut self, word: &str) {
		let mut padded: Vec<char> = vec![START; self.order];
		padded.extend(word.chars());
		padded.push(END);

		for window in padded.windows(self.order + 1) {
			let context: String = window[..self.order].iter().collect();
			self.add_transition(&context, window[self.order], 1);
		}
	}

	/// State for `context`, or for its longest known suffix.
	///
	/// Leading characters are dropped one at a time; `None` when not even the
	/// last character is a known context.
	pub fn resolve(&self, context: &str) -> Option<&TransitionState> {
		let mut suffix = context;
		while !suffix.is_empty() {
			if let Some(state) = self.states.get(suffix) {
				return Some(state);
			}
			let mut chars = suffix.chars();
			chars.next();
			suffix = chars.as_str();
		}
		None
	}

	/// Adds every transition of `other` into this table.
	///
	/// # Errors
	/// `InvalidConfig` if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), GenerationError> {
		if self.order != other.order {
			return Err(GenerationError::InvalidConfig(format!(
				"cannot merge a table of order {} into one of order {}",
				other.order, self.order
			)));
		}

		for (context, state) in &other.states {
			match self.states.get_mut(context) {
				Some(existing) => existing.merge(state)?,
				None => {
					self.states.insert(context.clone(), state.clone());
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::analyzer::{Analyzer, AnalyzerConfig};

	fn trained(order: usize, words: &[&str]) -> TransitionTable {
		let mut table = TransitionTable::new(order).unwrap();
		for word in words {
			table.add_word(word);
		}
		table
	}

	#[test]
	fn order_zero_is_rejected() {
		assert!(matches!(TransitionTable::new(0), Err(GenerationError::InvalidConfig(_))));
	}

	#[test]
	fn words_are_padded() {
		let table = trained(2, &["ab"]);
		let start: String = [START, START].iter().collect();
		assert_eq!(table.get(&start).unwrap().transitions().get(&'a'), Some(&1));
		assert_eq!(table.get(&format!("{START}a")).unwrap().transitions().get(&'b'), Some(&1));
		assert_eq!(table.get("ab").unwrap().transitions().get(&END), Some(&1));
		assert_eq!(table.len(), 3);
	}

	#[test]
	fn resolve_backs_off_to_suffixes() {
		let table = trained(1, &["test", "text"]);
		assert_eq!(table.resolve("qqt").unwrap().context(), "t");
		assert_eq!(table.resolve("e").unwrap().context(), "e");
		assert!(table.resolve("qz").is_none());
		assert!(table.resolve("").is_none());
	}

	#[test]
	fn analysis_gives_adjacent_and_boundary_transitions() {
		let analysis = Analyzer::new(AnalyzerConfig::default()).unwrap().analyze(["abc", "abd"]).unwrap();
		let table = TransitionTable::from_analysis(&analysis, 2).unwrap();

		assert_eq!(table.get(&START.to_string()).unwrap().transitions().get(&'a'), Some(&2));
		assert_eq!(table.get("a").unwrap().transitions().keys().copied().collect::<Vec<_>>(), vec!['b']);
		let after_b: Vec<char> = table.get("b").unwrap().transitions().keys().copied().collect();
		assert_eq!(after_b, vec!['c', 'd']);
		assert_eq!(table.get("c").unwrap().transitions().get(&END), Some(&1));
		// 'a' at 0 and 'c' at 2 are not adjacent
		assert!(!table.get("a").unwrap().transitions().contains_key(&'c'));
	}

	#[test]
	fn merge_equals_joint_training() {
		let mut left = trained(2, &["pass", "word"]);
		let right = trained(2, &["pass", "admin"]);
		left.merge(&right).unwrap();
		assert_eq!(left, trained(2, &["pass", "word", "pass", "admin"]));
		assert!(left.merge(&trained(3, &["x"])).is_err());
	}
}
