//! Character-level Markov chain generator.
//!
//! - `TransitionState`: counts of the characters following one context
//! - `TransitionTable`: every context of a given order, with back-off
//! - `MarkovGenerator`: walks the table from START until END

use std::sync::Arc;

use log::debug;

use super::base::{Generator, GeneratorConfig, GeneratorCore};
use crate::error::GenerationError;
use crate::model::AnalysisResult;

/// Counts of the characters following one context.
pub mod state;

/// Transition table of a fixed order.
pub mod table;

pub use state::TransitionState;
pub use table::{TransitionTable, END, START};

pub const DEFAULT_ORDER: usize = 2;

/// Length cap used when the analysis has no length at all.
const FALLBACK_LENGTH_CAP: usize = 20;

/// Draws of `generate_one_with_length`.
const LENGTH_ATTEMPTS: usize = 50;

/// Generates strings by following learned character transitions.
///
/// With order 2, `"pa"` often followed by `s` makes `"pas"` likely. The
/// table built at construction is only an approximation from adjacent
/// co-occurrences; `train_on_words` gives the real thing.
pub struct MarkovGenerator {
	core: GeneratorCore,
	table: TransitionTable,
}

impl MarkovGenerator {
	/// # Errors
	/// - `InvalidConfig` if `order == 0`
	/// - `InsufficientData` if the analysis holds no word
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig, order: usize) -> Result<Self, GenerationError> {
		let table = TransitionTable::from_analysis(&analysis, order)?;
		Ok(Self { core: GeneratorCore::with_data(analysis, &config)?, table })
	}

	/// Replaces the table with one trained on `words`.
	///
	/// Entries are trimmed and blank ones ignored.
	pub fn train_on_words<I, S>(&mut self, words: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.table.clear();
		for word in words {
			let word = word.as_ref().trim();
			if !word.is_empty() {
				self.table.add_word(word);
			}
		}
		debug!("Markov table of order {} trained with {} contexts", self.table.order(), self.table.len());
	}

	pub fn order(&self) -> usize {
		self.table.order()
	}

	pub fn transition_table(&self) -> &TransitionTable {
		&self.table
	}

	/// Best of up to 50 draws: the word whose length is closest to `target`.
	///
	/// Stops early on an exact match. `None` only if every draw failed.
	pub fn generate_one_with_length(&mut self, target: usize) -> Option<String> {
		let mut best: Option<(usize, String)> = None;
		for _ in 0..LENGTH_ATTEMPTS {
			let Some(word) = self.generate_one() else {
				continue;
			};
			let diff = word.chars().count().abs_diff(target);
			if best.as_ref().is_none_or(|(best_diff, _)| diff < *best_diff) {
				best = Some((diff, word));
			}
			if diff == 0 {
				break;
			}
		}
		best.map(|(_, word)| word)
	}

	fn length_cap(&self) -> usize {
		match self.core.analysis().length_stats().keys().next_back() {
			Some(longest) => longest * 2,
			None => FALLBACK_LENGTH_CAP,
		}
	}
}

impl Generator for MarkovGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	/// # Algorithm
	/// 1. Start from `order` START sentinels
	/// 2. Draw the next character from the current context, weighted by
	///    count; an unknown context backs off to its longest known suffix,
	///    and to a uniform charset draw if there is none
	/// 3. Stop on END or at twice the longest observed length
	fn generate_one(&mut self) -> Option<String> {
		if self.table.is_empty() {
			return None;
		}

		let order = self.table.order();
		let cap = self.length_cap();
		let mut context: Vec<char> = vec![START; order];
		let mut word = String::new();
		let mut length = 0;

		while length < cap {
			let key: String = context.iter().collect();
			let next = match self.table.resolve(&key) {
				Some(state) => state.predict(self.core.rng())?,
				None => self.core.choose_from_charset()?,
			};
			if next == END {
				break;
			}

			word.push(next);
			length += 1;
			context.remove(0);
			context.push(next);
		}

		if word.is_empty() { None } else { Some(word) }
	}
}
