use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

use wordgen_core::analyzer::{Analyzer, AnalyzerConfig};
use wordgen_core::generator::{
	Generator, GeneratorConfig, HybridGenerator, HybridPreset, MarkovGenerator, PatternGenerator, RegexGenerator,
	RegexInferenceGenerator, SmartGenerator,
};
use wordgen_core::io;
use wordgen_core::model::{type_pattern, AnalysisResult};

const CORPUS: &[&str] = &[
	"Pass123!", "Word456?", "Test789!", "Admin01#", "hello12", "world34", "secret99", "qwerty1", "Summer24!", "Winter23?",
];

fn analyze(words: &[&str]) -> Arc<AnalysisResult> {
	Arc::new(Analyzer::new(AnalyzerConfig::default()).unwrap().analyze(words).unwrap())
}

fn originals(words: &[&str]) -> HashSet<String> {
	words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn cooccurrence_example() {
	let analysis = analyze(&["abc", "abd", "aec"]);
	let at_1: Vec<char> = analysis.cooccurrence().get('a', 0, 1).unwrap().iter().copied().collect();
	let at_2: Vec<char> = analysis.cooccurrence().get('a', 0, 2).unwrap().iter().copied().collect();
	assert_eq!(at_1, vec!['b', 'e']);
	assert_eq!(at_2, vec!['c', 'd']);
}

#[test]
fn pattern_example() {
	let analysis = analyze(&["Abc", "Def", "Ghi", "ABC"]);
	assert_eq!(analysis.patterns(Some(3)), vec![("Ull".to_string(), 3), ("UUU".to_string(), 1)]);
}

#[test]
fn markov_example() {
	let words = ["test", "test", "text"];
	let mut generator = MarkovGenerator::new(analyze(&words), GeneratorConfig::seeded(11), 1).unwrap();
	generator.train_on_words(words);
	let produced = generator.generate(20, 2_000);
	assert!(!produced.is_empty());
	assert!(produced.iter().all(|w| !w.contains("tz")));
}

#[test]
fn regex_example() {
	let reference = regex::Regex::new("^(user|admin)[0-9]{3}$").unwrap();
	let mut generator =
		RegexGenerator::new(analyze(&["user001", "admin002"]), GeneratorConfig::seeded(12), "(user|admin)[0-9]{3}")
			.unwrap();
	let words: Vec<String> = generator.generate_iter(25, 10).collect();
	assert_eq!(words.len(), 25);
	assert!(words.iter().all(|w| reference.is_match(w)));
}

#[test]
fn smart_and_pattern_generators_stay_in_the_corpus_shape() {
	let analysis = analyze(CORPUS);

	let mut smart = SmartGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(13)).unwrap();
	for word in smart.generate(30, 0) {
		assert!(analysis.length_stats().contains_key(&word.chars().count()), "{word}");
		assert!(word.chars().all(|c| analysis.charset().contains(&c)), "{word}");
	}

	let mut pattern = PatternGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(14)).unwrap();
	let observed: Vec<String> = analysis.patterns(None).into_iter().map(|(p, _)| p).collect();
	for word in pattern.generate(30, 0) {
		assert!(observed.contains(&type_pattern(&word)), "{word}");
	}
}

#[test]
fn inferred_regexes_accept_the_corpus() {
	let analysis = analyze(CORPUS);
	let generator = RegexInferenceGenerator::new(Arc::clone(&analysis), GeneratorConfig::seeded(15)).unwrap();
	for word in CORPUS {
		let length = word.chars().count();
		let accepted = generator.inferred_regexes(Some(length)).iter().any(|pattern| {
			regex::Regex::new(&format!("^(?:{pattern})$")).unwrap().is_match(word)
		});
		assert!(accepted, "{word}");
	}
}

#[test]
fn hybrid_preset_skips_originals() {
	let analysis = analyze(CORPUS);
	let config = GeneratorConfig { seed: Some(16), exclude_original: true };
	let mut hybrid = HybridGenerator::preset(analysis, config, "creative".parse::<HybridPreset>().unwrap()).unwrap();
	hybrid.set_original_words(originals(CORPUS));

	let words = hybrid.generate(40, 0);
	assert!(!words.is_empty());
	let unique: HashSet<&String> = words.iter().collect();
	assert_eq!(unique.len(), words.len());
	assert!(words.iter().all(|w| !CORPUS.contains(&w.as_str())));
}

#[test]
fn empty_corpus_is_refused_by_data_generators() {
	let empty = analyze(&[]);
	assert!(SmartGenerator::new(Arc::clone(&empty), GeneratorConfig::default()).is_err());
	assert!(PatternGenerator::new(Arc::clone(&empty), GeneratorConfig::default()).is_err());
	assert!(MarkovGenerator::new(Arc::clone(&empty), GeneratorConfig::default(), 2).is_err());
	assert!(HybridGenerator::preset(empty, GeneratorConfig::default(), HybridPreset::Balanced).is_err());
}

#[test]
fn analysis_cache_is_written_then_reused() {
	let dir = tempfile::tempdir().unwrap();
	let wordlist = dir.path().join("words.txt");
	fs::write(&wordlist, CORPUS.join("\n")).unwrap();

	let fresh = io::load_or_analyze(&wordlist, AnalyzerConfig::default()).unwrap();
	let cache = dir.path().join("words.bin");
	assert!(cache.exists());
	assert_eq!(fresh.total_words(), CORPUS.len() as u64);

	// The cache wins over the wordlist until it is deleted
	fs::write(&wordlist, "other\nlist\n").unwrap();
	let cached = io::load_or_analyze(&wordlist, AnalyzerConfig::default()).unwrap();
	assert_eq!(cached, fresh);

	let copy = dir.path().join("copy.bin");
	io::save_analysis(&fresh, &copy).unwrap();
	assert_eq!(io::load_analysis(&copy).unwrap(), fresh);
}

#[test]
fn corrupt_cache_is_an_error() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("broken.bin");
	fs::write(&path, [0xff, 0xff, 0xff]).unwrap();
	assert!(matches!(io::load_analysis(&path), Err(wordgen_core::Error::Serialization(_))));
	assert!(matches!(io::load_analysis(dir.path().join("missing.bin")), Err(wordgen_core::Error::Io(_))));
}

#[test]
fn directory_analysis_merges_every_file() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("a.txt"), "abc\nabd\n").unwrap();
	fs::write(dir.path().join("b.txt"), "Xy1\nabc\n").unwrap();
	fs::write(dir.path().join("ignored.csv"), "zzz\n").unwrap();

	let folder = dir.path().to_string_lossy().to_string();
	let (per_file, merged) = io::analyze_directory(&folder, "txt", AnalyzerConfig::default()).unwrap();
	assert_eq!(per_file.keys().cloned().collect::<Vec<_>>(), vec!["a".to_string(), "b".to_string()]);
	assert_eq!(merged.total_words(), 4);
	assert_eq!(merged.unique_words(), 3);
	assert_eq!(merged, *analyze(&["abc", "abd", "Xy1", "abc"]));
}

#[test]
fn analysis_exports_to_json() {
	let analysis = analyze(&["ab1", "cd2", "ab1"]);
	let value = serde_json::to_value(&*analysis).unwrap();
	assert_eq!(value["total_words"], 3);
	assert_eq!(value["unique_words"], 2);
	assert_eq!(value["min_length"], 3);
	assert_eq!(value["charset"], serde_json::json!(["1", "2", "a", "b", "c", "d"]));
	assert!(value["cooccurrence"].as_array().is_some_and(|entries| !entries.is_empty()));
}
