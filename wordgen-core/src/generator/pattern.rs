use std::collections::BTreeSet;
use std::sync::Arc;

use super::base::{Generator, GeneratorConfig, GeneratorCore};
use super::smart::{filter_compatible, position_weights};
use crate::error::GenerationError;
use crate::model::{parse_type_pattern, AnalysisResult, CharacterClass, LengthStats, PositionStats};

pub const DEFAULT_PATTERN_RETRIES: usize = 100;

/// Generates strings that follow a type pattern such as `"Ullnn@"`.
///
/// The strictest data-driven generator: every position is constrained to
/// its class, and co-occurrence is used on top of it to keep characters
/// consistent with each other.
pub struct PatternGenerator {
	core: GeneratorCore,
	max_retries_per_position: usize,
}

impl PatternGenerator {
	/// # Errors
	/// `InsufficientData` if the analysis holds no word.
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig) -> Result<Self, GenerationError> {
		Ok(Self {
			core: GeneratorCore::with_data(analysis, &config)?,
			max_retries_per_position: DEFAULT_PATTERN_RETRIES,
		})
	}

	/// Number of consecutive failed placements tolerated before the final
	/// class-only pass.
	pub fn with_max_retries(mut self, max_retries_per_position: usize) -> Self {
		self.max_retries_per_position = max_retries_per_position;
		self
	}

	/// Generates a string whose type pattern is exactly `pattern`.
	///
	/// Returns `None` if `pattern` is empty, holds a symbol other than
	/// `U`, `l`, `n`, `@`, or needs a class the corpus never showed.
	/// A length never observed is filled from the global charset.
	pub fn generate_from_explicit_pattern(&mut self, pattern: &str) -> Option<String> {
		let classes = parse_type_pattern(pattern)?;
		self.generate_from_classes(&classes)
	}

	/// Observed patterns with their counts, most common first.
	pub fn available_patterns(&self, length: Option<usize>) -> Vec<(String, u64)> {
		self.core.analysis().patterns(length)
	}

	fn generate_from_classes(&mut self, classes: &[CharacterClass]) -> Option<String> {
		if classes.is_empty() {
			return None;
		}

		let analysis = self.core.shared_analysis();
		let Some(stats) = analysis.length(classes.len()) else {
			return self.generate_global(classes);
		};
		self.fill(&analysis, stats, classes)
	}

	fn fill(&mut self, analysis: &AnalysisResult, stats: &LengthStats, classes: &[CharacterClass]) -> Option<String> {
		let length = classes.len();
		let has_variety = stats.has_variety();

		let mut remaining: Vec<usize> = (0..length).collect();
		let mut placed: Vec<Option<char>> = vec![None; length];

		let start = remaining.remove(self.core.random_index(length));
		placed[start] = Some(self.char_of_class(stats.position(start)?, classes[start])?);

		let mut retries = 0;
		while !remaining.is_empty() && retries < self.max_retries_per_position {
			let slot = self.core.random_index(remaining.len());
			let target = remaining[slot];
			let class = classes[target];
			let position = stats.position(target)?;

			let compatible = if has_variety {
				let candidates: BTreeSet<char> = position.chars_of_class(class).into_iter().collect();
				filter_compatible(analysis.cooccurrence(), &placed, target, candidates)
			} else {
				BTreeSet::new()
			};

			let c = if compatible.len() > 1 {
				self.core.weighted_choice(&position_weights(position, &compatible))
			} else {
				self.char_of_class(position, class)
			};

			match c {
				Some(c) => {
					placed[target] = Some(c);
					remaining.remove(slot);
					retries = 0;
				}
				None => retries += 1,
			}
		}

		for target in remaining {
			placed[target] = Some(self.char_of_class(stats.position(target)?, classes[target])?);
		}
		placed.into_iter().collect()
	}

	/// Any character of `class` seen at `position`, weighted by count, else
	/// a uniform pick among the global characters of `class`.
	fn char_of_class(&mut self, position: &PositionStats, class: CharacterClass) -> Option<char> {
		let local: BTreeSet<char> = position.chars_of_class(class).into_iter().collect();
		if !local.is_empty() {
			return self.core.weighted_choice(&position_weights(position, &local));
		}
		let global = self.core.analysis().charset_by_class(class);
		self.core.choose(&global)
	}

	/// For lengths with no statistics: one uniform draw per position among
	/// the global characters of its class.
	fn generate_global(&mut self, classes: &[CharacterClass]) -> Option<String> {
		let analysis = self.core.shared_analysis();
		classes
			.iter()
			.map(|class| self.core.choose(&analysis.charset_by_class(*class)))
			.collect()
	}
}

impl Generator for PatternGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	/// # Algorithm
	/// 1. Choose a length from the distribution
	/// 2. Choose one of its type patterns, weighted by frequency
	/// 3. Fill each position with a character of the required class,
	///    preferring characters that co-occurred with those already placed
	fn generate_one(&mut self) -> Option<String> {
		let analysis = self.core.shared_analysis();
		let length = self.core.choose_length()?;
		let stats = analysis.length(length)?;

		let patterns: Vec<(&str, u64)> = stats.patterns().iter().map(|(p, n)| (p.as_str(), *n)).collect();
		let pattern = self.core.weighted_choice(&patterns)?;
		let classes = parse_type_pattern(pattern)?;
		if classes.len() != length {
			return None;
		}
		self.fill(&analysis, stats, &classes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::analyzer::{Analyzer, AnalyzerConfig};
	use crate::model::type_pattern;

	fn analysis(words: &[&str]) -> Arc<AnalysisResult> {
		Arc::new(Analyzer::new(AnalyzerConfig::default()).unwrap().analyze(words).unwrap())
	}

	fn sample() -> Arc<AnalysisResult> {
		analysis(&["Abc1", "Xyz2", "Pqr3", "abc!", "Mno7", "Hij4"])
	}

	#[test]
	fn follows_observed_patterns() {
		let analysis = analysis(&["Abc", "Def", "Ghi", "ABC"]);
		let mut generator = PatternGenerator::new(analysis, GeneratorConfig::seeded(7)).unwrap();
		for _ in 0..100 {
			let word = generator.generate_one().unwrap();
			let pattern = type_pattern(&word);
			assert!(pattern == "Ull" || pattern == "UUU", "{word}");
		}
	}

	#[test]
	fn explicit_pattern_is_honoured() {
		let mut generator = PatternGenerator::new(sample(), GeneratorConfig::seeded(3)).unwrap();
		for pattern in ["Ulln", "llln", "UUUU", "nnnn", "lll@"] {
			for _ in 0..20 {
				let word = generator.generate_from_explicit_pattern(pattern).unwrap();
				assert_eq!(type_pattern(&word), pattern);
			}
		}
	}

	#[test]
	fn unseen_length_uses_global_charset() {
		let analysis = sample();
		let mut generator = PatternGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(9)).unwrap();
		let word = generator.generate_from_explicit_pattern("UUnnll@").unwrap();
		assert_eq!(type_pattern(&word), "UUnnll@");
		assert!(word.chars().all(|c| analysis.charset().contains(&c)));
	}

	#[test]
	fn impossible_or_invalid_patterns_fail() {
		let mut generator = PatternGenerator::new(analysis(&["abc", "def"]), GeneratorConfig::seeded(1)).unwrap();
		assert_eq!(generator.generate_from_explicit_pattern("Ux"), None);
		assert_eq!(generator.generate_from_explicit_pattern(""), None);
		// No digit anywhere in the corpus
		assert_eq!(generator.generate_from_explicit_pattern("nn"), None);
		assert_eq!(generator.generate_from_explicit_pattern("lnl"), None);
	}

	#[test]
	fn lists_available_patterns() {
		let generator = PatternGenerator::new(analysis(&["Abc", "Def", "Ghi", "ABC", "ab"]), GeneratorConfig::default()).unwrap();
		assert_eq!(
			generator.available_patterns(Some(3)),
			vec![("Ull".to_owned(), 3), ("UUU".to_owned(), 1)]
		);
		assert_eq!(generator.available_patterns(None).len(), 3);
		assert!(generator.available_patterns(Some(9)).is_empty());
	}

	#[test]
	fn seeded_runs_repeat() {
		let analysis = sample();
		let mut first = PatternGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(21)).unwrap();
		let mut second = PatternGenerator::new(analysis, GeneratorConfig::seeded(21)).unwrap();
		assert_eq!(first.generate(15, 0), second.generate(15, 0));
	}
}
