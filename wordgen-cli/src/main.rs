mod settings;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use wordgen_core::ContinuationEngine;
use wordgen_core::io::{read_corpus_dir, read_first_line};
use wordgen_core::model::embedding::{Embedder, NullEmbedder, VectorTable};
use wordgen_core::model::generation_input::{GenerationInput, StartSeed};

use settings::Settings;

/// wordgen: train a word n-gram model and continue text with it.
#[derive(Parser, Debug)]
#[command(name = "wordgen")]
#[command(about = "wordgen: train a word n-gram model and continue text with it")]
struct Cli {
	/// TOML settings file; command-line flags take precedence
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Train a model from a directory of texts, or the first stdin line.
	Train {
		/// Directory of training texts (read recursively). If not set, stdin is used.
		#[arg(long)]
		input_dir: Option<PathBuf>,

		/// File for saving the model
		#[arg(long, default_value = "model.bin")]
		model: PathBuf,

		/// Maximum n-gram context order
		#[arg(long)]
		ngram: Option<usize>,

		/// Minimum n-gram context order
		#[arg(long)]
		min_ngram: Option<usize>,

		/// Candidates drawn per generation step
		#[arg(long)]
		samples: Option<usize>,

		/// Keep only words strictly longer than this
		#[arg(long)]
		min_word_length: Option<usize>,

		/// Do not strip Latin letters
		#[arg(long)]
		keep_latin: bool,
	},

	/// Continue a prefix (or a random start) and print the text.
	Generate {
		/// File for loading the model
		#[arg(long, default_value = "model.bin")]
		model: PathBuf,

		/// First words of the sentence
		#[arg(long, num_args = 1..)]
		prefix: Vec<String>,

		/// Number of words of the result
		#[arg(long)]
		length: Option<usize>,

		/// Candidates drawn per step (defaults to the trained value)
		#[arg(long)]
		samples: Option<usize>,

		/// Word vectors in word2vec/GloVe text format, enables theme steering
		#[arg(long)]
		embeddings: Option<PathBuf>,

		/// Random seed
		#[arg(long)]
		seed: Option<u64>,
	},
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_writer(io::stderr)
		.init();

	let cli = Cli::parse();
	let settings = Settings::load(cli.config.as_deref())?;

	match cli.command {
		Commands::Train {
			input_dir,
			model,
			ngram,
			min_ngram,
			samples,
			min_word_length,
			keep_latin,
		} => {
			let mut config = settings.model;
			if let Some(ngram) = ngram {
				config.max_ngram = ngram;
			}
			if let Some(min_ngram) = min_ngram {
				config.min_ngram = min_ngram;
			}
			if let Some(samples) = samples {
				config.nsamples = samples;
			}
			if let Some(min_word_length) = min_word_length {
				config.tokenizer.min_word_length = min_word_length;
			}
			if keep_latin {
				config.tokenizer.strip_latin = false;
			}
			train(input_dir.as_deref(), &model, config)
		}
		Commands::Generate {
			model,
			prefix,
			length,
			samples,
			embeddings,
			seed,
		} => {
			let generation = settings.generation;
			let mut input = GenerationInput::new(
				StartSeed::from_words(Some(prefix)),
				length.unwrap_or(generation.length),
			);
			input.nsamples = samples.or(generation.samples);
			generate(&model, &input, embeddings.as_deref(), seed.unwrap_or(generation.seed))
		}
	}
}

fn train(input_dir: Option<&Path>, model_path: &Path, config: wordgen_core::ModelConfig) -> Result<()> {
	let mut engine = ContinuationEngine::new(config).context("invalid model configuration")?;

	let documents = match input_dir {
		Some(dir) => read_corpus_dir(dir)
			.with_context(|| format!("failed to read corpus directory {}", dir.display()))?,
		None => read_first_line(io::stdin().lock()).context("failed to read stdin")?,
	};
	info!("Read {} documents", documents.len());

	engine.fit_documents(&documents);
	engine
		.save(model_path)
		.with_context(|| format!("failed to save model to {}", model_path.display()))?;
	Ok(())
}

fn generate(model_path: &Path, input: &GenerationInput, embeddings: Option<&Path>, seed: u64) -> Result<()> {
	let engine = ContinuationEngine::load(model_path)
		.with_context(|| format!("failed to load model from {}", model_path.display()))?;

	let embedder: Box<dyn Embedder> = match embeddings {
		Some(path) => {
			let file = File::open(path)
				.with_context(|| format!("failed to open embeddings {}", path.display()))?;
			let table = VectorTable::from_reader(BufReader::new(file))
				.with_context(|| format!("failed to read embeddings {}", path.display()))?;
			info!("Loaded {} word vectors of dimension {}", table.len(), table.dimension());
			Box::new(table)
		}
		None => Box::new(NullEmbedder),
	};

	let mut rng = StdRng::seed_from_u64(seed);
	let text = engine
		.continue_text(input, embedder.as_ref(), &mut rng)
		.context("generation failed")?;

	info!("Resulting sentence: {}", text);
	println!("{}", text);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_train_arguments() {
		let cli = Cli::try_parse_from([
			"wordgen", "train", "--input-dir", "test_data", "--ngram", "4", "--min-ngram=1",
		])
		.unwrap();
		match cli.command {
			Commands::Train { input_dir, ngram, min_ngram, model, keep_latin, .. } => {
				assert_eq!(input_dir, Some(PathBuf::from("test_data")));
				assert_eq!(ngram, Some(4));
				assert_eq!(min_ngram, Some(1));
				assert_eq!(model, PathBuf::from("model.bin"));
				assert!(!keep_latin);
			}
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn test_parse_generate_arguments() {
		let cli = Cli::try_parse_from([
			"wordgen", "generate", "--prefix", "один", "два", "--length", "100", "--config", "w.toml",
		])
		.unwrap();
		assert_eq!(cli.config, Some(PathBuf::from("w.toml")));
		match cli.command {
			Commands::Generate { prefix, length, seed, .. } => {
				assert_eq!(prefix, vec!["один", "два"]);
				assert_eq!(length, Some(100));
				assert_eq!(seed, None);
			}
			other => panic!("unexpected {:?}", other),
		}
	}

	#[test]
	fn test_train_then_generate() {
		let dir = tempfile::tempdir().unwrap();
		let corpus = dir.path().join("corpus");
		std::fs::create_dir(&corpus).unwrap();
		std::fs::write(corpus.join("text"), "один два три два. два три три три три четыре").unwrap();
		let model = dir.path().join("model.bin");

		let config = wordgen_core::ModelConfig::with_orders(1, 2).unwrap();
		train(Some(corpus.as_path()), &model, config).unwrap();
		assert!(model.exists());

		let input = GenerationInput::custom(["один"], 10);
		generate(&model, &input, None, 42).unwrap();
	}
}
