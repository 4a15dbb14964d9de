use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::model::AnalysisResult;

/// Settings shared by every generator.
///
/// - `seed`: `Some` for a reproducible run, `None` for an OS-seeded source
/// - `exclude_original`: skip words registered with `set_original_words`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
	pub seed: Option<u64>,
	pub exclude_original: bool,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self { seed: None, exclude_original: true }
	}
}

impl GeneratorConfig {
	pub fn seeded(seed: u64) -> Self {
		Self { seed: Some(seed), ..Self::default() }
	}
}

/// Picks an item proportionally to its weight.
///
/// Draws `r` in `[0, total)` and returns the first item whose cumulative
/// weight exceeds `r`, walking `items` in order. Falls back to a uniform
/// choice when every weight is 0. Returns `None` for an empty slice.
pub fn weighted_pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [(T, u64)]) -> Option<&'a T> {
	if items.is_empty() {
		return None;
	}

	let total: u64 = items.iter().map(|(_, weight)| weight).sum();
	if total == 0 {
		return Some(&items[rng.random_range(0..items.len())].0);
	}

	let r = rng.random_range(0..total);
	let mut cumulative = 0;
	for (item, weight) in items {
		cumulative += weight;
		if r < cumulative {
			return Some(item);
		}
	}

	// Unreachable while r < total
	items.last().map(|(item, _)| item)
}

/// State and sampling primitives shared by all generators.
///
/// # Responsibilities
/// - Hold the shared, read-only `AnalysisResult`
/// - Own the random source; every draw of a generator goes through it
/// - Track original words to avoid and strings already emitted
#[derive(Debug)]
pub struct GeneratorCore {
	analysis: Arc<AnalysisResult>,
	rng: StdRng,
	exclude_original: bool,
	original_words: HashSet<String>,
	generated: HashSet<String>,
}

impl GeneratorCore {
	pub fn new(analysis: Arc<AnalysisResult>, config: &GeneratorConfig) -> Self {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Self {
			analysis,
			rng,
			exclude_original: config.exclude_original,
			original_words: HashSet::new(),
			generated: HashSet::new(),
		}
	}

	/// Same as `new`, but refuses an analysis without any word.
	pub fn with_data(analysis: Arc<AnalysisResult>, config: &GeneratorConfig) -> Result<Self, GenerationError> {
		if analysis.is_empty() || analysis.charset().is_empty() {
			return Err(GenerationError::InsufficientData {
				required: "at least one analyzed word".to_owned(),
			});
		}
		Ok(Self::new(analysis, config))
	}

	pub fn analysis(&self) -> &AnalysisResult {
		&self.analysis
	}

	/// A new handle on the shared analysis, so callers can keep reading it
	/// while drawing from the random source.
	pub fn shared_analysis(&self) -> Arc<AnalysisResult> {
		Arc::clone(&self.analysis)
	}

	pub fn rng(&mut self) -> &mut StdRng {
		&mut self.rng
	}

	/// Uniform index in `0..len`. `len` must be non-zero.
	pub fn random_index(&mut self, len: usize) -> usize {
		self.rng.random_range(0..len)
	}

	/// Uniform value in `[0, 1)`.
	pub fn random_unit(&mut self) -> f64 {
		self.rng.random::<f64>()
	}

	/// Uniform choice. `None` for an empty slice.
	pub fn choose<T: Clone>(&mut self, items: &[T]) -> Option<T> {
		if items.is_empty() {
			return None;
		}
		Some(items[self.random_index(items.len())].clone())
	}

	/// Frequency-weighted choice, see `weighted_pick`.
	pub fn weighted_choice<T: Clone>(&mut self, items: &[(T, u64)]) -> Option<T> {
		weighted_pick(&mut self.rng, items).cloned()
	}

	/// Word length weighted by how many words of each length were seen.
	pub fn choose_length(&mut self) -> Option<usize> {
		let weights: Vec<(usize, u64)> = self
			.analysis
			.length_stats()
			.iter()
			.map(|(length, stats)| (*length, stats.count()))
			.collect();
		self.weighted_choice(&weights)
	}

	/// Uniform draw over the whole observed charset.
	pub fn choose_from_charset(&mut self) -> Option<char> {
		let charset: Vec<char> = self.analysis.charset().iter().copied().collect();
		self.choose(&charset)
	}

	pub fn exclude_original(&self) -> bool {
		self.exclude_original
	}

	pub fn set_original_words(&mut self, words: HashSet<String>) {
		self.original_words = words;
	}

	/// Original word (when excluded) or already emitted.
	pub fn is_duplicate(&self, word: &str) -> bool {
		(self.exclude_original && self.original_words.contains(word)) || self.generated.contains(word)
	}

	/// Marks `word` as emitted.
	pub fn record(&mut self, word: &str) {
		self.generated.insert(word.to_owned());
	}

	pub fn generated_count(&self) -> usize {
		self.generated.len()
	}
}

/// Common interface of all generators.
///
/// Implementors only provide `generate_one` and access to their
/// `GeneratorCore`; batch generation and duplicate handling are shared.
pub trait Generator {
	fn core(&self) -> &GeneratorCore;

	fn core_mut(&mut self) -> &mut GeneratorCore;

	/// Produces one candidate, or `None` if this attempt failed.
	fn generate_one(&mut self) -> Option<String>;

	/// Registers the original corpus so it is not reproduced.
	fn set_original_words(&mut self, words: HashSet<String>) {
		self.core_mut().set_original_words(words);
	}

	fn is_duplicate(&self, word: &str) -> bool {
		self.core().is_duplicate(word)
	}

	/// Generates up to `count` distinct strings.
	///
	/// # Behavior
	/// - `max_attempts == 0` means `count * 100`
	/// - Failed attempts and duplicates are discarded
	/// - Stops once `count` strings are collected or the budget is spent;
	///   returning fewer than `count` strings is not an error
	fn generate(&mut self, count: usize, max_attempts: usize) -> Vec<String> {
		let max_attempts = if max_attempts == 0 { count.saturating_mul(100) } else { max_attempts };

		let mut results = Vec::with_capacity(count);
		let mut attempts = 0;
		while results.len() < count && attempts < max_attempts {
			attempts += 1;
			let Some(word) = self.generate_one() else {
				continue;
			};
			if self.is_duplicate(&word) {
				continue;
			}
			self.core_mut().record(&word);
			results.push(word);
		}

		if results.len() < count {
			debug!("Generated {}/{} strings after {} attempts", results.len(), count, attempts);
		}
		results
	}

	/// Lazy variant of `generate`.
	///
	/// Each of the `count` slots gets its own budget of `max_attempts_per`
	/// attempts; a slot that runs out is skipped.
	fn generate_iter(&mut self, count: usize, max_attempts_per: usize) -> GenerateIter<'_, Self>
	where
		Self: Sized,
	{
		GenerateIter { generator: self, remaining: count, max_attempts_per }
	}

	/// See `AnalysisResult::calculate_weight`.
	fn calculate_weight(&self, word: &str) -> u64 {
		self.core().analysis().calculate_weight(word)
	}
}

/// Iterator returned by `Generator::generate_iter`.
pub struct GenerateIter<'a, G: Generator> {
	generator: &'a mut G,
	remaining: usize,
	max_attempts_per: usize,
}

impl<G: Generator> Iterator for GenerateIter<'_, G> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		while self.remaining > 0 {
			self.remaining -= 1;
			for _ in 0..self.max_attempts_per {
				let Some(word) = self.generator.generate_one() else {
					continue;
				};
				if !self.generator.is_duplicate(&word) {
					self.generator.core_mut().record(&word);
					return Some(word);
				}
			}
		}
		None
	}
}
