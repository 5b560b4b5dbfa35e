use std::mem;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use super::embedding::{Embedder, ThemeVector};
use super::generation_input::{GenerationInput, StartSeed};
use super::ngram_model::NGramModel;
use super::tokenizer::Tokenizer;
use super::vocabulary::{Code, Vocabulary};

/// Trains an n-gram model over a corpus and continues text with it.
///
/// # Responsibilities
/// - Tokenize documents, grow the vocabulary and count training pairs
/// - Generate continuations word by word, re-ranking sampled candidates
///   by their angle to the sentence theme vector
/// - Format generated sentences
///
/// Generation only borrows the engine immutably: the trained vocabulary and
/// count tables never change while text is being produced.
#[derive(Debug, Clone)]
pub struct ContinuationEngine {
	config: ModelConfig,
	tokenizer: Tokenizer,
	vocabulary: Vocabulary,
	model: NGramModel,
}

impl ContinuationEngine {
	/// Creates an untrained engine.
	///
	/// # Errors
	/// Returns `InvalidConfig` if `config` violates its bounds.
	pub fn new(config: ModelConfig) -> Result<Self> {
		Self::from_parts(config, Vocabulary::new(), NGramModel::new())
	}

	pub(crate) fn from_parts(config: ModelConfig, vocabulary: Vocabulary, model: NGramModel) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			tokenizer: Tokenizer::new(config.tokenizer.clone()),
			config,
			vocabulary,
			model,
		})
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn tokenizer(&self) -> &Tokenizer {
		&self.tokenizer
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn model(&self) -> &NGramModel {
		&self.model
	}

	/// Trains on every document in order. Returns the number of fitted pairs.
	///
	/// Documents never erase earlier counts; only the vocabulary and the
	/// count tables are shared between them.
	pub fn fit_documents<I, S>(&mut self, documents: I) -> usize
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut documents_count = 0;
		let mut pairs_count = 0;
		for text in documents {
			pairs_count += self.fit_text(text.as_ref());
			documents_count += 1;
		}
		info!(
			"Trained on {} documents: {} pairs, {} words, {} contexts",
			documents_count,
			pairs_count,
			self.vocabulary.len(),
			self.model.context_count()
		);
		pairs_count
	}

	/// Trains on a single document. Returns the number of fitted pairs.
	pub fn fit_text(&mut self, text: &str) -> usize {
		let document = self.tokenizer.document(text);
		document.observe_into(&mut self.vocabulary);
		let pairs = document.pairs(self.config.min_ngram, self.config.max_ngram);
		self.model.fit(&pairs, &self.vocabulary);
		debug!(
			"Document with {} sentences, {} words: {} pairs",
			document.sentences().len(),
			document.word_count(),
			pairs.len()
		);
		pairs.len()
	}

	/// Tokens of a random trained context.
	fn cold_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Code>> {
		self.model
			.random_context(rng)
			.map(|key| key.as_slice().to_vec())
			.ok_or(Error::EmptyModel)
	}

	fn resolve_seed<R: Rng + ?Sized>(&self, start_seed: &StartSeed, rng: &mut R) -> Result<Vec<Code>> {
		match start_seed {
			StartSeed::Custom(words) => {
				let text = words.join(" ");
				info!("Input sentence for generation: {}", text);
				let tokens = self.tokenizer.document(&text).tokens(&self.vocabulary);
				if !tokens.is_empty() {
					return Ok(tokens);
				}
				warn!("No word of '{}' survived normalization, starting at random", text);
				self.resolve_seed(&StartSeed::Random, rng)
			}
			StartSeed::Random => {
				let tokens = self.cold_start(rng)?;
				info!(
					"Random sentence for generation: {}",
					self.vocabulary.decode_many(&tokens).join(" ")
				);
				Ok(tokens)
			}
		}
	}

	fn accumulate(&self, theme: &mut ThemeVector, tokens: &[Code], embedder: &dyn Embedder) {
		for token in tokens {
			if let Some(vector) = embedder.embed(self.vocabulary.decode(*token)) {
				theme.add(&vector);
			}
		}
	}

	/// Generates at least `input.word_count` words, as sentences of codes.
	///
	/// Each step samples `nsamples` candidates for the last `max_ngram`
	/// tokens of the current sentence and keeps the one whose embedding is
	/// closest in angle to the sentence theme. When no trained context
	/// matches, the sentence ends and a new one starts from a random
	/// context, which may overshoot the target.
	///
	/// A seed already reaching the target is truncated and returned alone.
	///
	/// # Errors
	/// - `InvalidInput` if `word_count` or `nsamples` is zero
	/// - `EmptyModel` if a random context is needed and the model is empty
	pub fn generate<R: Rng + ?Sized>(
		&self,
		input: &GenerationInput,
		embedder: &dyn Embedder,
		rng: &mut R,
	) -> Result<Vec<Vec<Code>>> {
		let word_count = input.word_count;
		if word_count == 0 {
			return Err(Error::InvalidInput("word count must be >= 1".to_owned()));
		}
		let nsamples = input.nsamples.unwrap_or(self.config.nsamples);
		if nsamples == 0 {
			return Err(Error::InvalidInput("nsamples must be >= 1".to_owned()));
		}

		let mut sentence = self.resolve_seed(&input.start_seed, rng)?;
		info!("Target length: {}", word_count);

		if sentence.len() >= word_count {
			sentence.truncate(word_count);
			return Ok(vec![sentence]);
		}
		debug!("Starting with {:?}, {} words to generate", sentence, word_count - sentence.len());

		let mut theme = ThemeVector::new(embedder.dimension());
		self.accumulate(&mut theme, &sentence, embedder);

		let mut sentences = Vec::new();
		let mut produced = sentence.len();
		while produced < word_count {
			let context = &sentence[sentence.len().saturating_sub(self.config.max_ngram)..];
			let candidates = match self.model.sample(context, nsamples, rng) {
				Ok(candidates) => candidates,
				Err(Error::NoTrainingData { context }) => {
					debug!("No data for {:?}, starting a new sentence", context);
					let start = self.cold_start(rng)?;
					let finished = mem::replace(&mut sentence, start);
					if !finished.is_empty() {
						sentences.push(finished);
					}
					theme.reset();
					self.accumulate(&mut theme, &sentence, embedder);
					produced += sentence.len();
					continue;
				}
				Err(e) => return Err(e),
			};

			let embeddings: Vec<Option<Vec<f32>>> = candidates
				.iter()
				.map(|code| embedder.embed(self.vocabulary.decode(*code)))
				.collect();
			let Some(index) = theme.closest(&embeddings) else {
				return Err(Error::NoTrainingData { context: context.to_vec() });
			};
			let chosen = candidates[index];
			if let Some(vector) = &embeddings[index] {
				theme.add(vector);
			}
			debug!(
				"Generated token {} for {:?} ({}) among {} candidates",
				produced + 1,
				context,
				self.vocabulary.decode(chosen),
				candidates.len()
			);
			sentence.push(chosen);
			produced += 1;
		}
		sentences.push(sentence);

		Ok(sentences)
	}

	/// Generates and formats a continuation.
	pub fn continue_text<R: Rng + ?Sized>(
		&self,
		input: &GenerationInput,
		embedder: &dyn Embedder,
		rng: &mut R,
	) -> Result<String> {
		let sentences = self.generate(input, embedder, rng)?;
		Ok(self.format_sentences(&sentences))
	}

	/// One line per sentence: decoded words joined by spaces, first letter
	/// capitalized, terminated by a period.
	pub fn format_sentences(&self, sentences: &[Vec<Code>]) -> String {
		sentences
			.iter()
			.filter(|tokens| !tokens.is_empty())
			.map(|tokens| self.pretty_sentence(tokens))
			.collect::<Vec<_>>()
			.join("\n")
	}

	fn pretty_sentence(&self, tokens: &[Code]) -> String {
		let sentence = self.vocabulary.decode_many(tokens).join(" ");
		format!("{}.", capitalize(&sentence))
	}
}

fn capitalize(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
