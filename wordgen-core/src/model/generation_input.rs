/// Strategy used to select the starting words of a continuation.
///
/// # Variants
/// - `Random`: start from a randomly chosen trained context (cold start).
/// - `Custom(words)`: continue the given words. They go through the same
///   normalization as the training text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartSeed {
	Random,
	Custom(Vec<String>),
}

impl StartSeed {
	/// `Custom` for a non-empty word list, `Random` otherwise.
	pub fn from_words(words: Option<Vec<String>>) -> Self {
		match words {
			Some(words) if !words.is_empty() => StartSeed::Custom(words),
			_ => StartSeed::Random,
		}
	}
}

/// Input parameters for one continuation request.
///
/// # Invariants
/// - `word_count >= 1` (checked when generating)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationInput {
	/// Starting words.
	pub start_seed: StartSeed,

	/// Minimum number of words of the result, seed included.
	pub word_count: usize,

	/// Candidates drawn per step; `None` uses the model configuration.
	pub nsamples: Option<usize>,
}

impl GenerationInput {
	pub fn new(start_seed: StartSeed, word_count: usize) -> Self {
		Self { start_seed, word_count, nsamples: None }
	}

	/// Continue `words` up to `word_count` words.
	pub fn custom<S: Into<String>>(words: impl IntoIterator<Item = S>, word_count: usize) -> Self {
		Self::new(StartSeed::Custom(words.into_iter().map(Into::into).collect()), word_count)
	}

	/// Generate `word_count` words from a random start.
	pub fn random(word_count: usize) -> Self {
		Self::new(StartSeed::Random, word_count)
	}

	pub fn with_nsamples(mut self, nsamples: usize) -> Self {
		self.nsamples = Some(nsamples);
		self
	}
}
