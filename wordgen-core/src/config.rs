use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::context::MAX_ORDER;

/// Text normalization policy applied before segmentation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TokenizerConfig {
	/// A word is kept only if it has strictly more characters than this.
	pub min_word_length: usize,

	/// Replace Latin letters with spaces (the corpus script is non-Latin).
	pub strip_latin: bool,
}

impl Default for TokenizerConfig {
	fn default() -> Self {
		Self { min_word_length: 0, strip_latin: true }
	}
}

/// Parameters fixed at training time and persisted with the model.
///
/// # Invariants
/// - `1 <= min_ngram <= max_ngram <= MAX_ORDER`
/// - `nsamples >= 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
	/// Shortest context order used for training pairs.
	pub min_ngram: usize,

	/// Longest context order; also the generation context window.
	pub max_ngram: usize,

	/// Candidates drawn per generation step for theme re-ranking.
	pub nsamples: usize,

	pub tokenizer: TokenizerConfig,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			min_ngram: 1,
			max_ngram: 2,
			nsamples: 5,
			tokenizer: TokenizerConfig::default(),
		}
	}
}

impl ModelConfig {
	/// Creates a configuration with the given order bounds and defaults
	/// for everything else.
	pub fn with_orders(min_ngram: usize, max_ngram: usize) -> Result<Self> {
		let config = Self { min_ngram, max_ngram, ..Self::default() };
		config.validate()?;
		Ok(config)
	}

	/// Checks the configuration invariants.
	///
	/// # Errors
	/// Returns `InvalidConfig` describing the first violated bound.
	pub fn validate(&self) -> Result<()> {
		if self.min_ngram < 1 {
			return Err(Error::InvalidConfig("min_ngram must be >= 1".to_owned()));
		}
		if self.min_ngram > self.max_ngram {
			return Err(Error::InvalidConfig(format!(
				"min_ngram ({}) must not exceed max_ngram ({})",
				self.min_ngram, self.max_ngram
			)));
		}
		if self.max_ngram > MAX_ORDER {
			return Err(Error::InvalidConfig(format!(
				"max_ngram must be <= {}, got {}",
				MAX_ORDER, self.max_ngram
			)));
		}
		if self.nsamples < 1 {
			return Err(Error::InvalidConfig("nsamples must be >= 1".to_owned()));
		}
		Ok(())
	}
}
