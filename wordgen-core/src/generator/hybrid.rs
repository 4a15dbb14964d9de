use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use super::base::{Generator, GeneratorConfig, GeneratorCore};
use super::pattern::PatternGenerator;
use super::random::RandomGenerator;
use super::smart::SmartGenerator;
use crate::error::GenerationError;
use crate::model::AnalysisResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MemberKind {
	Smart,
	Pattern,
	Random,
}

/// Ready-made member mixes.
///
/// - `Balanced`: Smart 0.5, Pattern 0.3, Random 0.2
/// - `Strict`: Pattern 0.7, Smart 0.3
/// - `Creative`: Random 0.5, Smart 0.3, Pattern 0.2
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HybridPreset {
	#[default]
	Balanced,
	Strict,
	Creative,
}

impl HybridPreset {
	fn members(self) -> &'static [(MemberKind, f64)] {
		match self {
			Self::Balanced => &[(MemberKind::Smart, 0.5), (MemberKind::Pattern, 0.3), (MemberKind::Random, 0.2)],
			Self::Strict => &[(MemberKind::Pattern, 0.7), (MemberKind::Smart, 0.3)],
			Self::Creative => &[(MemberKind::Random, 0.5), (MemberKind::Smart, 0.3), (MemberKind::Pattern, 0.2)],
		}
	}
}

impl FromStr for HybridPreset {
	type Err = GenerationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"balanced" => Ok(Self::Balanced),
			"strict" => Ok(Self::Strict),
			"creative" => Ok(Self::Creative),
			other => Err(GenerationError::InvalidConfig(format!("unknown hybrid preset '{other}'"))),
		}
	}
}

impl fmt::Display for HybridPreset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Balanced => "balanced",
			Self::Strict => "strict",
			Self::Creative => "creative",
		};
		f.write_str(name)
	}
}

/// Combines several generators with user adjustable intensities.
///
/// # Responsibilities
/// - Own the member generators
/// - Keep intensities and their normalized weights in sync
/// - Delegate each draw to one member, or blend one candidate of each
///
/// # Invariants
/// - `intensities`, `weights` and `members` have the same length
/// - `weights` sums to 1.0, or is uniform if all intensities are 0
pub struct HybridGenerator {
	core: GeneratorCore,
	members: Vec<Box<dyn Generator + Send>>,
	intensities: Vec<f64>,
	weights: Vec<f64>,
}

impl HybridGenerator {
	/// A hybrid without members. `config` drives member selection.
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig) -> Self {
		Self {
			core: GeneratorCore::new(analysis, &config),
			members: Vec::new(),
			intensities: Vec::new(),
			weights: Vec::new(),
		}
	}

	/// Builds the members of `preset` on `analysis`.
	///
	/// Member `i` is seeded with `seed + i + 1` when `config` has a seed.
	///
	/// # Errors
	/// `InsufficientData` if the analysis holds no word.
	pub fn preset(
		analysis: Arc<AnalysisResult>,
		config: GeneratorConfig,
		preset: HybridPreset,
	) -> Result<Self, GenerationError> {
		let mut hybrid = Self::new(Arc::clone(&analysis), config.clone());
		for (index, (kind, intensity)) in preset.members().iter().enumerate() {
			let member_config = GeneratorConfig {
				seed: config.seed.map(|seed| seed.wrapping_add(index as u64 + 1)),
				exclude_original: config.exclude_original,
			};
			let analysis = Arc::clone(&analysis);
			let member: Box<dyn Generator + Send> = match kind {
				MemberKind::Smart => Box::new(SmartGenerator::new(analysis, member_config)?),
				MemberKind::Pattern => Box::new(PatternGenerator::new(analysis, member_config)?),
				MemberKind::Random => Box::new(RandomGenerator::new(analysis, member_config)?),
			};
			hybrid.add(member, *intensity)?;
		}
		debug!("Hybrid preset {preset} built with {} members", hybrid.len());
		Ok(hybrid)
	}

	/// Adds a member.
	///
	/// # Errors
	/// `InvalidConfig` if `intensity` is negative or not finite.
	pub fn add(&mut self, generator: Box<dyn Generator + Send>, intensity: f64) -> Result<(), GenerationError> {
		check_intensity(intensity)?;
		self.members.push(generator);
		self.intensities.push(intensity);
		self.normalize();
		Ok(())
	}

	/// Builder form of `add`.
	pub fn with(mut self, generator: Box<dyn Generator + Send>, intensity: f64) -> Result<Self, GenerationError> {
		self.add(generator, intensity)?;
		Ok(self)
	}

	/// Changes the intensity of member `index`.
	///
	/// # Errors
	/// `InvalidConfig` if there is no such member or the intensity is
	/// negative or not finite.
	pub fn set_intensity(&mut self, index: usize, intensity: f64) -> Result<(), GenerationError> {
		check_intensity(intensity)?;
		let Some(slot) = self.intensities.get_mut(index) else {
			return Err(GenerationError::InvalidConfig(format!("no hybrid member at index {index}")));
		};
		*slot = intensity;
		self.normalize();
		Ok(())
	}

	/// Normalized selection weights, in member order.
	pub fn weights(&self) -> &[f64] {
		&self.weights
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// Draws one candidate from every member and mixes them.
	///
	/// # Behavior
	/// - Fewer than two members: same as `generate_one`
	/// - Members returning `None` are ignored; no candidate at all gives `None`
	/// - A single candidate is returned as-is
	/// - Otherwise each position up to the shortest candidate takes its
	///   character from a random candidate
	pub fn generate_blended(&mut self) -> Option<String> {
		if self.members.len() < 2 {
			return self.generate_one();
		}

		let candidates: Vec<Vec<char>> = self
			.members
			.iter_mut()
			.filter_map(|member| member.generate_one())
			.map(|word| word.chars().collect())
			.collect();

		let shortest = candidates.iter().map(Vec::len).min()?;
		if candidates.len() == 1 {
			return candidates.into_iter().next().map(|chars| chars.into_iter().collect());
		}
		if shortest == 0 {
			return self.core.choose(&candidates).map(|chars| chars.into_iter().collect());
		}

		let mut blended = String::with_capacity(shortest);
		for position in 0..shortest {
			let source = self.core.random_index(candidates.len());
			blended.push(candidates[source][position]);
		}
		Some(blended)
	}

	/// Uniform when every intensity is 0.
	fn normalize(&mut self) {
		let sum: f64 = self.intensities.iter().sum();
		self.weights = if sum > 0.0 {
			self.intensities.iter().map(|intensity| intensity / sum).collect()
		} else {
			let uniform = 1.0 / self.intensities.len().max(1) as f64;
			vec![uniform; self.intensities.len()]
		};
	}

	/// Index of the member whose cumulative bracket holds a `[0, 1)` draw.
	fn select(&mut self) -> Option<usize> {
		if self.members.is_empty() {
			return None;
		}

		let r = self.core.random_unit();
		let mut cumulative = 0.0;
		for (index, weight) in self.weights.iter().enumerate() {
			cumulative += weight;
			if r < cumulative {
				return Some(index);
			}
		}
		// Rounding left the draw past the last bracket
		Some(self.members.len() - 1)
	}
}

fn check_intensity(intensity: f64) -> Result<(), GenerationError> {
	if !intensity.is_finite() || intensity < 0.0 {
		return Err(GenerationError::InvalidConfig(format!(
			"intensity must be a finite value >= 0, got {intensity}"
		)));
	}
	Ok(())
}

impl Generator for HybridGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	fn generate_one(&mut self) -> Option<String> {
		let index = self.select()?;
		self.members[index].generate_one()
	}

	/// Also registers the words with every member.
	fn set_original_words(&mut self, words: HashSet<String>) {
		for member in &mut self.members {
			member.set_original_words(words.clone());
		}
		self.core.set_original_words(words);
	}
}
