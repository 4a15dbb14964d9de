use std::collections::BTreeSet;
use std::sync::Arc;

use super::base::{Generator, GeneratorConfig, GeneratorCore};
use crate::error::GenerationError;
use crate::model::{AnalysisResult, CooccurrenceIndex, PositionStats};

pub const DEFAULT_SMART_RETRIES: usize = 50;

/// Keeps the `candidates` for index `target` that were seen together with
/// every already placed character.
///
/// A placed character without co-occurrence data for `target` does not
/// filter anything.
pub(crate) fn filter_compatible(
	cooccurrence: &CooccurrenceIndex,
	placed: &[Option<char>],
	target: usize,
	mut candidates: BTreeSet<char>,
) -> BTreeSet<char> {
	for (from, c) in placed.iter().enumerate() {
		let Some(c) = c else { continue };
		if let Some(seen) = cooccurrence.get(*c, from, target) {
			candidates.retain(|candidate| seen.contains(candidate));
		}
		if candidates.is_empty() {
			break;
		}
	}
	candidates
}

/// Weights each candidate by its count at `position`, at least 1.
pub(crate) fn position_weights(position: &PositionStats, candidates: &BTreeSet<char>) -> Vec<(char, u64)> {
	candidates.iter().map(|c| (*c, position.count_of(*c).max(1))).collect()
}

fn all_weights(position: &PositionStats) -> Vec<(char, u64)> {
	position.char_counts().iter().map(|(c, n)| (*c, *n)).collect()
}

/// Uses co-occurrence to keep characters consistent with each other.
///
/// A character placed at one position restricts the others to characters
/// that were seen together with it, at those exact positions, in the corpus.
pub struct SmartGenerator {
	core: GeneratorCore,
	max_retries_per_position: usize,
}

impl SmartGenerator {
	/// # Errors
	/// `InsufficientData` if the analysis holds no word.
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig) -> Result<Self, GenerationError> {
		Ok(Self {
			core: GeneratorCore::with_data(analysis, &config)?,
			max_retries_per_position: DEFAULT_SMART_RETRIES,
		})
	}

	/// Retry budget of `generate_one_strict`, per position.
	pub fn with_max_retries(mut self, max_retries_per_position: usize) -> Self {
		self.max_retries_per_position = max_retries_per_position;
		self
	}

	/// Like `generate_one` but never falls back.
	///
	/// Returns `None` when some position cannot find a compatible character
	/// within `max_retries_per_position * length` consecutive failures.
	pub fn generate_one_strict(&mut self) -> Option<String> {
		let analysis = self.core.shared_analysis();
		let length = self.core.choose_length()?;
		let stats = analysis.length(length)?;

		let mut remaining: Vec<usize> = (0..length).collect();
		let mut placed: Vec<Option<char>> = vec![None; length];

		let start = remaining.remove(self.core.random_index(length));
		placed[start] = Some(self.core.weighted_choice(&all_weights(stats.position(start)?))?);

		let budget = self.max_retries_per_position.saturating_mul(length);
		let mut retries = 0;
		while !remaining.is_empty() && retries < budget {
			let slot = self.core.random_index(remaining.len());
			let target = remaining[slot];
			let position = stats.position(target)?;

			let candidates: BTreeSet<char> = position.char_counts().keys().copied().collect();
			let compatible = filter_compatible(analysis.cooccurrence(), &placed, target, candidates);
			if compatible.is_empty() {
				retries += 1;
				continue;
			}

			placed[target] = self.core.weighted_choice(&position_weights(position, &compatible));
			remaining.remove(slot);
			retries = 0;
		}

		if !remaining.is_empty() {
			return None;
		}
		placed.into_iter().collect()
	}
}

impl Generator for SmartGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	/// # Algorithm
	/// 1. Choose a length from the distribution
	/// 2. Fill a random start position, weighted by frequency
	/// 3. Visit the other positions in random order and keep the characters
	///    seen there that co-occurred with every placed character
	/// 4. Fall back to the position's characters, then to the charset, when
	///    the corpus is too thin for step 3
	fn generate_one(&mut self) -> Option<String> {
		let analysis = self.core.shared_analysis();
		let length = self.core.choose_length()?;
		let stats = analysis.length(length)?;
		let has_variety = stats.has_variety();

		let mut remaining: Vec<usize> = (0..length).collect();
		let mut placed: Vec<Option<char>> = vec![None; length];

		let start = remaining.remove(self.core.random_index(length));
		let start_position = stats.position(start)?;
		placed[start] = if has_variety && start_position.variety() > 1 {
			self.core.weighted_choice(&all_weights(start_position))
		} else {
			self.core.choose_from_charset()
		};

		while !remaining.is_empty() {
			let target = remaining.remove(self.core.random_index(remaining.len()));
			let position = stats.position(target)?;

			let compatible = if has_variety {
				let candidates: BTreeSet<char> = position.char_counts().keys().copied().collect();
				filter_compatible(analysis.cooccurrence(), &placed, target, candidates)
			} else {
				BTreeSet::new()
			};

			placed[target] = if compatible.len() > 1 {
				self.core.weighted_choice(&position_weights(position, &compatible))
			} else if has_variety && position.variety() > 1 {
				self.core.weighted_choice(&all_weights(position))
			} else {
				self.core.choose_from_charset()
			};
		}

		placed.into_iter().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::analyzer::{Analyzer, AnalyzerConfig};

	fn analysis(words: &[&str]) -> Arc<AnalysisResult> {
		Arc::new(Analyzer::new(AnalyzerConfig::default()).unwrap().analyze(words).unwrap())
	}

	#[test]
	fn filter_intersects_placed_characters() {
		let analysis = analysis(&["abc", "abd", "xbc"]);
		let candidates: BTreeSet<char> = ['c', 'd'].into();
		let placed = [Some('x'), None, None];
		let kept = filter_compatible(analysis.cooccurrence(), &placed, 2, candidates.clone());
		assert_eq!(kept, ['c'].into());

		let placed = [None, Some('b'), None];
		let kept = filter_compatible(analysis.cooccurrence(), &placed, 2, candidates.clone());
		assert_eq!(kept, candidates);

		let placed = [Some('q'), None, None];
		assert_eq!(filter_compatible(analysis.cooccurrence(), &placed, 2, candidates.clone()), candidates);
	}

	/// Every 3-letter word over {a, b} and every 3-digit word over {1, 2}.
	const FAMILIES: [&str; 16] = [
		"aaa", "aab", "aba", "abb", "baa", "bab", "bba", "bbb", "111", "112", "121", "122", "211", "212", "221", "222",
	];

	fn same_family(word: &str) -> bool {
		word.chars().all(|c| c.is_ascii_lowercase()) || word.chars().all(|c| c.is_ascii_digit())
	}

	#[test]
	fn respects_cooccurrence_on_disjoint_families() {
		// Letters and digits never share a word, so once the start character
		// is placed every other position stays in its family.
		let mut generator = SmartGenerator::new(analysis(&FAMILIES), GeneratorConfig::seeded(11)).unwrap();
		for _ in 0..200 {
			let word = generator.generate_one().unwrap();
			assert_eq!(word.chars().count(), 3);
			assert!(same_family(&word), "{word}");
		}
	}

	#[test]
	fn strict_output_only_uses_observed_pairs() {
		let analysis = analysis(&FAMILIES);
		let mut generator = SmartGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(3)).unwrap();
		let mut produced = 0;
		for _ in 0..200 {
			let Some(word) = generator.generate_one_strict() else { continue };
			produced += 1;
			for (i, c) in word.chars().enumerate() {
				assert!(analysis.length(3).unwrap().position(i).unwrap().count_of(c) > 0);
			}
			assert!(same_family(&word), "{word}");
		}
		assert_eq!(produced, 200);
	}

	#[test]
	fn strict_reproduces_tight_corpora() {
		let analysis = analysis(&["ab", "cd"]);
		let mut generator = SmartGenerator::new(analysis, GeneratorConfig::seeded(4)).unwrap();
		for _ in 0..50 {
			let word = generator.generate_one_strict().unwrap();
			assert!(word == "ab" || word == "cd", "{word}");
		}
	}

	#[test]
	fn strict_without_budget_gives_up() {
		let mut generator =
			SmartGenerator::new(analysis(&["ab", "cd"]), GeneratorConfig::seeded(4)).unwrap().with_max_retries(0);
		assert_eq!(generator.generate_one_strict(), None);
	}

	#[test]
	fn weight_favours_frequent_positions() {
		let analysis = analysis(&["abc", "abd", "abe", "xyz"]);
		let generator = SmartGenerator::new(analysis, GeneratorConfig::seeded(1)).unwrap();
		assert!(generator.calculate_weight("abc") > generator.calculate_weight("xyz"));
		assert_eq!(generator.calculate_weight("abcdef"), 0);
	}

	#[test]
	fn single_sample_still_generates() {
		let mut generator = SmartGenerator::new(analysis(&["solo"]), GeneratorConfig::seeded(2)).unwrap();
		let word = generator.generate_one().unwrap();
		assert_eq!(word.chars().count(), 4);
	}
}
