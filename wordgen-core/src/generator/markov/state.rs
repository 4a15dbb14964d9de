use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::generator::base::weighted_pick;

/// Outgoing transitions of one Markov context.
///
/// A node of the chain: `context` is the window of preceding characters
/// (possibly made of START sentinels) and each transition counts how often
/// a character followed it.
///
/// # Responsibilities
/// - Accumulate transition counts while the table is built
/// - Predict the next character by weighted sampling
/// - Merge with another state of the same context
///
/// # Invariants
/// - All transitions belong to the same `context`
/// - Each transition count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransitionState {
	context: String,
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: BTreeMap<char, u64>,
}

impl TransitionState {
	pub fn new(context: &str) -> Self {
		Self { context: context.to_owned(), transitions: BTreeMap::new() }
	}

	pub fn context(&self) -> &str {
		&self.context
	}

	pub fn transitions(&self) -> &BTreeMap<char, u64> {
		&self.transitions
	}

	/// Records `count` more occurrences of `next` after this context.
	pub fn add_transition(&mut self, next: char, count: u64) {
		if count == 0 {
			return;
		}
		*self.transitions.entry(next).or_insert(0) += count;
	}

	pub fn total(&self) -> u64 {
		self.transitions.values().sum()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Picks the next character with probability proportional to its count.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
		let weights: Vec<(char, u64)> = self.transitions.iter().map(|(c, n)| (*c, *n)).collect();
		weighted_pick(rng, &weights).copied()
	}

	/// Adds the counts of `other` into this state.
	///
	/// # Errors
	/// `InvalidConfig` if the contexts differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), GenerationError> {
		if self.context != other.context {
			return Err(GenerationError::InvalidConfig(format!(
				"cannot merge context {:?} into {:?}",
				other.context, self.context
			)));
		}

		for (next, count) in &other.transitions {
			*self.transitions.entry(*next).or_insert(0) += *count;
		}
		Ok(())
	}
}
