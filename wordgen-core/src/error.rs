//! Error types for training, sampling and persistence

use crate::model::vocabulary::Code;

/// Errors that can occur while building, sampling or loading a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("model was not trained on context {context:?}")]
	NoTrainingData { context: Vec<Code> },

	#[error("model has no training data")]
	EmptyModel,

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error("malformed model file: {0}")]
	Malformed(String),

	#[error("incompatible model file version {found}, expected {expected}")]
	IncompatibleVersion { found: u32, expected: u32 },

	#[error("embedding table line {line}: {message}")]
	Embeddings { line: usize, message: String },

	#[error("model codec error: {0}")]
	Codec(#[from] postcard::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
