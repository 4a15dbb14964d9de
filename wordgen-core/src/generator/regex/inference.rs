use std::collections::BTreeMap;
use std::sync::Arc;

use super::RegexPlan;
use crate::error::Result;
use crate::generator::base::{Generator, GeneratorConfig, GeneratorCore};
use crate::model::{parse_type_pattern, AnalysisResult, CharacterClass, LengthStats};

const LITERAL_SPECIALS: &str = "\\.^$*+?{}[]|()";
const CLASS_SPECIALS: &str = "\\.^$*+?{}[]|()-";

/// Learns regexes from the corpus, then generates from them.
///
/// The reverse of `RegexGenerator`: for each observed length, every type
/// pattern becomes a regex built from the characters seen at each position.
/// `"Ab1"` and `"Cd2"` give `[AC][bd][12]`.
pub struct RegexInferenceGenerator {
	core: GeneratorCore,
	/// Length → regexes, most common type pattern first.
	inferred: BTreeMap<usize, Vec<String>>,
	/// Length → compiled regex of its most common type pattern.
	plans: BTreeMap<usize, RegexPlan>,
}

impl RegexInferenceGenerator {
	/// # Errors
	/// - `InsufficientData` if the analysis holds no word
	/// - `InvalidPattern` if an inferred regex does not compile
	pub fn new(analysis: Arc<AnalysisResult>, config: GeneratorConfig) -> Result<Self> {
		let core = GeneratorCore::with_data(Arc::clone(&analysis), &config)?;

		let mut inferred = BTreeMap::new();
		let mut plans = BTreeMap::new();
		for (length, stats) in analysis.length_stats() {
			let regexes: Vec<String> = stats
				.common_patterns(usize::MAX)
				.into_iter()
				.filter_map(|(pattern, _)| pattern_to_regex(pattern, stats))
				.collect();
			if let Some(first) = regexes.first() {
				plans.insert(*length, RegexPlan::compile(first)?);
			}
			inferred.insert(*length, regexes);
		}

		Ok(Self { core, inferred, plans })
	}

	/// Regexes inferred for `length`, or for every length with `None`.
	pub fn inferred_regexes(&self, length: Option<usize>) -> Vec<&str> {
		match length {
			Some(length) => self
				.inferred
				.get(&length)
				.map(|regexes| regexes.iter().map(String::as_str).collect())
				.unwrap_or_default(),
			None => self.inferred.values().flatten().map(String::as_str).collect(),
		}
	}
}

impl Generator for RegexInferenceGenerator {
	fn core(&self) -> &GeneratorCore {
		&self.core
	}

	fn core_mut(&mut self) -> &mut GeneratorCore {
		&mut self.core
	}

	/// Weighted length, then its most common regex with the learned charset.
	fn generate_one(&mut self) -> Option<String> {
		let length = self.core.choose_length()?;
		let plan = self.plans.get(&length)?;
		let analysis = self.core.shared_analysis();
		plan.render(self.core.rng(), Some(analysis.charset()))
	}
}

/// Regex for one type pattern of `stats`.
///
/// Per position: a lone observed character of the class is a literal,
/// several form a bracket class, none falls back to the generic class.
fn pattern_to_regex(pattern: &str, stats: &LengthStats) -> Option<String> {
	let classes = parse_type_pattern(pattern)?;
	let mut regex = String::new();

	for (index, class) in classes.into_iter().enumerate() {
		let chars = stats.position(index).map(|p| p.chars_of_class(class)).unwrap_or_default();
		match chars.as_slice() {
			[] => regex.push_str(generic_class(class)),
			[c] => push_escaped(&mut regex, *c, LITERAL_SPECIALS),
			many => {
				regex.push('[');
				for c in many {
					push_escaped(&mut regex, *c, CLASS_SPECIALS);
				}
				regex.push(']');
			}
		}
	}
	Some(regex)
}

fn push_escaped(regex: &mut String, c: char, specials: &str) {
	if specials.contains(c) {
		regex.push('\\');
	}
	regex.push(c);
}

fn generic_class(class: CharacterClass) -> &'static str {
	match class {
		CharacterClass::Upper => "[A-Z]",
		CharacterClass::Lower => "[a-z]",
		CharacterClass::Digit => "\\d",
		CharacterClass::Symbol => "[^a-zA-Z0-9]",
	}
}
