use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use wordgen_core::analyzer::{Analyzer, AnalyzerConfig};
use wordgen_core::generator::markov::DEFAULT_ORDER;
use wordgen_core::generator::{
	Generator, GeneratorConfig, HybridGenerator, HybridPreset, MarkovGenerator, PatternGenerator, RandomGenerator,
	RegexGenerator, RegexInferenceGenerator, SmartGenerator,
};
use wordgen_core::io;
use wordgen_core::model::AnalysisResult;

const BUILTIN_CORPUS: &[&str] = &[
	"Password1!", "Summer2024", "Welcome123", "Dragon99", "monkey12", "letmein!", "Admin2023#", "qwerty123", "Football7",
	"Shadow42?", "sunshine1", "Master2022", "trustno1", "Baseball8!", "iloveyou2", "Princess5",
];

/// Analysis of every `.txt` file in `./data`, or of the built-in corpus.
fn load_corpus() -> Result<(AnalysisResult, HashSet<String>), Box<dyn std::error::Error>> {
	let config = AnalyzerConfig::new(4, 32)?;

	if Path::new("./data").is_dir() {
		let (per_file, merged) = io::analyze_directory("./data", "txt", config)?;
		if !merged.is_empty() {
			for (name, analysis) in &per_file {
				info!("{name}: {} words", analysis.total_words());
			}
			let mut originals = HashSet::new();
			for file in io::list_files("./data", "txt")? {
				originals.extend(io::read_file(Path::new("./data").join(file))?.into_iter().map(|w| w.trim().to_owned()));
			}
			return Ok((merged, originals));
		}
		warn!("./data holds no usable wordlist, using the built-in corpus");
	}

	let analysis = Analyzer::new(config)?.analyze(BUILTIN_CORPUS)?;
	Ok((analysis, BUILTIN_CORPUS.iter().map(|w| w.to_string()).collect()))
}

fn show(name: &str, words: &[String]) {
	println!("{name}:");
	for word in words {
		println!("  {word}");
	}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	let (analysis, originals) = load_corpus()?;
	println!("{}", analysis.summary());
	let analysis = Arc::new(analysis);

	// Fixed seed: every run prints the same words
	let config = GeneratorConfig::seeded(42);

	let mut random = RandomGenerator::new(Arc::clone(&analysis), config.clone())?;
	random.set_original_words(originals.clone());
	show("Random", &random.generate(5, 0));

	let mut smart = SmartGenerator::new(Arc::clone(&analysis), config.clone())?;
	smart.set_original_words(originals.clone());
	show("Smart", &smart.generate(5, 0));

	let mut pattern = PatternGenerator::new(Arc::clone(&analysis), config.clone())?;
	for (type_pattern, count) in pattern.available_patterns(None).into_iter().take(3) {
		println!("Pattern {type_pattern} seen {count} times");
	}
	if let Some(word) = pattern.generate_from_explicit_pattern("Ulllnn@") {
		println!("Explicit pattern Ulllnn@: {word}");
	}
	show("Pattern", &pattern.generate(5, 0));

	let mut markov = MarkovGenerator::new(Arc::clone(&analysis), config.clone(), DEFAULT_ORDER)?;
	markov.train_on_words(&originals);
	markov.set_original_words(originals.clone());
	show("Markov", &markov.generate(5, 0));
	if let Some(word) = markov.generate_one_with_length(8) {
		println!("Markov, about 8 characters: {word}");
	}

	let mut regex = RegexGenerator::new(Arc::clone(&analysis), config.clone(), "[A-Z][a-z]{4,6}(19|20)[0-9]{2}[!?#]")?;
	show("Regex", &regex.generate(5, 0));

	// Patterns outside the supported grammar are refused up front
	match RegexGenerator::new(Arc::clone(&analysis), config.clone(), "(?=x)abc") {
		Ok(_) => println!("Should not happen"),
		Err(err) => println!("{err}"),
	}

	let mut inference = RegexInferenceGenerator::new(Arc::clone(&analysis), config.clone())?;
	for regex in inference.inferred_regexes(None).into_iter().take(3) {
		println!("Inferred: {regex}");
	}
	show("Inferred regex", &inference.generate(5, 0));

	let mut hybrid = HybridGenerator::preset(Arc::clone(&analysis), config, "balanced".parse::<HybridPreset>()?)?;
	hybrid.set_original_words(originals);
	// Intensities are normalized, only their ratios matter
	hybrid.set_intensity(2, 0.0)?;
	if hybrid.set_intensity(0, -1.0).is_err() {
		println!("Intensity -1.0 is invalid, must be a finite value >= 0");
	}
	println!("Hybrid weights: {:?}", hybrid.weights());
	show("Hybrid", &hybrid.generate(5, 0));
	if let Some(word) = hybrid.generate_blended() {
		println!("Blended: {word}");
	}

	Ok(())
}
