use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use wordgen_core::analyzer::{Analyzer, AnalyzerConfig};
use wordgen_core::generator::{Generator, GeneratorConfig, PatternGenerator, RandomGenerator, RegexGenerator};
use wordgen_core::model::{type_pattern, AnalysisResult, CharacterClass};

const ATOMS: &[&str] = &["x", "[a-c]", "\\d", "[^a-z]", "(ab|c)", "\\w", ".", "[A-F0-9]", "\\-"];
const QUANTIFIERS: &[&str] = &["", "?", "*", "+", "{2}", "{1,3}", "{0,}"];

fn analyze(config: AnalyzerConfig, words: &[String]) -> AnalysisResult {
	Analyzer::new(config).unwrap().analyze(words).unwrap()
}

fn sample_corpus() -> Arc<AnalysisResult> {
	let words = ["Ab1!", "cD2?", "Pass12!", "xy", "Q9#z", "word", "TEST", "a1b2"];
	Arc::new(Analyzer::new(AnalyzerConfig::default()).unwrap().analyze(words).unwrap())
}

fn regex_pattern() -> impl Strategy<Value = String> {
	prop::collection::vec((prop::sample::select(ATOMS), prop::sample::select(QUANTIFIERS)), 1..6)
		.prop_map(|parts| parts.into_iter().map(|(atom, quantifier)| format!("{atom}{quantifier}")).collect())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn totals_count_retained_entries(words in prop::collection::vec("[ a-zA-Z0-9!]{0,8}", 0..40)) {
		let config = AnalyzerConfig::new(2, 6).unwrap();
		let result = analyze(config, &words);

		let retained: Vec<&str> = words
			.iter()
			.map(|w| w.trim())
			.filter(|w| !w.is_empty() && config.accepts(w.chars().count()))
			.collect();
		let unique: BTreeSet<&str> = retained.iter().copied().collect();

		prop_assert_eq!(result.total_words(), retained.len() as u64);
		prop_assert_eq!(result.unique_words(), unique.len() as u64);
		let per_length: u64 = result.length_stats().values().map(|s| s.count()).sum();
		prop_assert_eq!(per_length, result.total_words());
	}

	#[test]
	fn type_pattern_has_one_symbol_per_char(word in "\\PC{0,16}") {
		let pattern = type_pattern(&word);
		prop_assert_eq!(pattern.chars().count(), word.chars().count());
		for (c, symbol) in word.chars().zip(pattern.chars()) {
			prop_assert!("Uln@".contains(symbol));
			prop_assert_eq!(CharacterClass::from_char(c).symbol(), symbol);
		}
	}

	#[test]
	fn cooccurrence_matches_the_corpus(words in prop::collection::vec("[a-d1-2]{1,5}", 1..20)) {
		let result = analyze(AnalyzerConfig::default(), &words);
		let index = result.cooccurrence();

		for word in &words {
			let chars: Vec<char> = word.chars().collect();
			for (i, c) in chars.iter().enumerate() {
				for (j, other) in chars.iter().enumerate() {
					if i != j {
						prop_assert!(index.get(*c, i, j).is_some_and(|seen| seen.contains(other)));
					}
				}
			}
		}

		// Nothing recorded without a witness word
		for (key, seen) in index.iter() {
			for other in seen {
				let witnessed = words.iter().any(|w| {
					let chars: Vec<char> = w.chars().collect();
					chars.get(key.from) == Some(&key.character) && chars.get(key.to) == Some(other)
				});
				prop_assert!(witnessed);
			}
		}
	}

	#[test]
	fn seeded_random_generators_agree(seed in any::<u64>()) {
		let analysis = sample_corpus();
		let mut first = RandomGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(seed)).unwrap();
		let mut second = RandomGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(seed)).unwrap();

		let words = first.generate(10, 0);
		prop_assert_eq!(&words, &second.generate(10, 0));
		for word in &words {
			prop_assert!(analysis.length_stats().contains_key(&word.chars().count()));
			prop_assert!(word.chars().all(|c| analysis.charset().contains(&c)));
		}
	}

	#[test]
	fn regex_output_matches_its_pattern(pattern in regex_pattern(), seed in any::<u64>()) {
		let empty = Arc::new(Analyzer::new(AnalyzerConfig::default()).unwrap().analyze(Vec::<String>::new()).unwrap());
		let mut generator = RegexGenerator::new(empty, GeneratorConfig::seeded(seed), &pattern).unwrap();
		let reference = regex::Regex::new(&format!("^(?:{pattern})$")).unwrap();

		for _ in 0..5 {
			let word = generator.generate_one();
			prop_assert!(word.is_some(), "{}", pattern);
			let word = word.unwrap();
			prop_assert!(reference.is_match(&word), "{} produced {:?}", pattern, word);
		}
	}

	#[test]
	fn explicit_patterns_are_followed(pattern in "[Uln@]{1,8}", seed in any::<u64>()) {
		let mut generator = PatternGenerator::new(sample_corpus(), GeneratorConfig::seeded(seed)).unwrap();
		if let Some(word) = generator.generate_from_explicit_pattern(&pattern) {
			prop_assert_eq!(type_pattern(&word), pattern);
		}
	}
}
