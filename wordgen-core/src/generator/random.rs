use std::sync::Arc;

use super::base::{Generator, GeneratorConfig, GeneratorCore};
use crate::error::GenerationError;
use crate::model::AnalysisResult;

/// Samples each position independently.
///
/// Fastest and least strict generator. It only guarantees that:
/// - Lengths follow the observed distribution
/// - Characters come from those seen at each position (or the charset)
pub struct RandomGenerator {
	core: GeneratorCore,
	use_position_charset: bool,
}

impl RandomGenerator {
	/// # Errors
	/// `InsufficientData` if the analysis holds no word.
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig) -> Result<Self, GenerationError> {
		Ok(Self {
			core: GeneratorCore::with_data(analysis, &config)?,
			use_position_charset: true,
		})
	}

	/// When disabled, every position draws from the global charset.
	pub fn with_position_charset(mut self, enabled: bool) -> Self {
		self.use_position_charset = enabled;
		self
	}

	/// Like `generate_one`, but more frequent characters at each position are
	/// more likely to be drawn.
	pub fn generate_one_weighted(&mut self) -> Option<String> {
		let analysis = self.core.shared_analysis();
		let length = self.core.choose_length()?;
		let stats = analysis.length(length)?;

		let mut word = String::with_capacity(length);
		for position in stats.positions() {
			let weights: Vec<(char, u64)> = position.char_counts().iter().map(|(c, n)| (*c, *n)).collect();
			let c = match self.core.weighted_choice(&weights) {
				Some(c) => c,
				None => self.core.choose_from_charset()?,
			};
			word.push(c);
		}
		Some(word)
	}
}

impl Generator for RandomGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	/// Picks a length, then each character uniformly among those seen at its
	/// position.
	///
	/// A position seen with a single character, or a length seen only once,
	/// draws from the whole charset instead so it does not always reproduce
	/// the same character.
	fn generate_one(&mut self) -> Option<String> {
		let analysis = self.core.shared_analysis();
		let length = self.core.choose_length()?;
		let stats = analysis.length(length)?;
		let has_variety = stats.has_variety();

		let mut word = String::with_capacity(length);
		for position in stats.positions() {
			let c = if self.use_position_charset && has_variety && position.variety() > 1 {
				let seen: Vec<char> = position.char_counts().keys().copied().collect();
				self.core.choose(&seen)?
			} else {
				self.core.choose_from_charset()?
			};
			word.push(c);
		}
		Some(word)
	}
}
