//! Binary model file format.
//!
//! A model file is a postcard-encoded `Header` immediately followed by a
//! postcard-encoded `Body`. The header is decoded first so files written by
//! another format version are reported as such instead of failing to parse.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::model::context::ContextKey;
use crate::model::engine::ContinuationEngine;
use crate::model::ngram_model::NGramModel;
use crate::model::vocabulary::{Code, Vocabulary};

/// File signature.
pub const MAGIC: [u8; 4] = *b"WGEN";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug)]
struct Header {
	magic: [u8; 4],
	version: u32,
}

#[derive(Serialize, Deserialize, Debug)]
struct Body {
	config: ModelConfig,
	/// Vocabulary words in code order.
	words: Vec<String>,
	tables: Vec<Table>,
}

/// Count table of one order: `(context codes, [(next code, count)])`.
#[derive(Serialize, Deserialize, Debug)]
struct Table {
	order: usize,
	entries: Vec<(Vec<Code>, Vec<(Code, u64)>)>,
}

impl ContinuationEngine {
	/// Serializes the trained model (configuration, vocabulary, count tables).
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let header = Header { magic: MAGIC, version: FORMAT_VERSION };
		let body = Body {
			config: self.config().clone(),
			words: self.vocabulary().words().to_vec(),
			tables: self
				.model()
				.tables()
				.map(|table| Table {
					order: table.order(),
					entries: table
						.states()
						.map(|(key, state)| {
							let transitions = state.transitions().iter().map(|(c, n)| (*c, *n)).collect();
							(key.as_slice().to_vec(), transitions)
						})
						.collect(),
				})
				.collect(),
		};

		let mut bytes = postcard::to_stdvec(&header)?;
		bytes.extend(postcard::to_stdvec(&body)?);
		Ok(bytes)
	}

	/// Rebuilds an engine from `to_bytes` output.
	///
	/// # Errors
	/// - `Malformed` for a wrong signature, trailing bytes or violated
	///   invariants (duplicate words, keys not matching their order, codes
	///   outside the vocabulary, zero counts)
	/// - `IncompatibleVersion` for another format version
	/// - `Codec` if the bytes cannot be decoded
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let (header, rest): (Header, &[u8]) = postcard::take_from_bytes(bytes)
			.map_err(|_| Error::Malformed("missing header".to_owned()))?;
		if header.magic != MAGIC {
			return Err(Error::Malformed("not a model file".to_owned()));
		}
		if header.version != FORMAT_VERSION {
			return Err(Error::IncompatibleVersion { found: header.version, expected: FORMAT_VERSION });
		}

		let (body, rest): (Body, &[u8]) = postcard::take_from_bytes(rest)?;
		if !rest.is_empty() {
			return Err(Error::Malformed(format!("{} trailing bytes", rest.len())));
		}

		body.config.validate().map_err(|e| Error::Malformed(e.to_string()))?;
		let vocabulary = Vocabulary::from_words(body.words)?;
		let model = build_model(body.tables, &body.config, &vocabulary)?;
		Self::from_parts(body.config, vocabulary, model)
	}

	/// Writes the model to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = self.to_bytes()?;
		std::fs::write(&path, &bytes)?;
		info!("Saved model ({} bytes) to {}", bytes.len(), path.as_ref().display());
		Ok(())
	}

	/// Reads a model written by `save`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(&path)?;
		let engine = Self::from_bytes(&bytes)?;
		info!(
			"Loaded model from {}: {} words, {} contexts",
			path.as_ref().display(),
			engine.vocabulary().len(),
			engine.model().context_count()
		);
		Ok(engine)
	}
}

fn build_model(tables: Vec<Table>, config: &ModelConfig, vocabulary: &Vocabulary) -> Result<NGramModel> {
	let in_vocabulary = |code: Code| usize::try_from(code).is_ok_and(|index| index < vocabulary.len());

	let mut model = NGramModel::new();
	for table in tables {
		if table.order < config.min_ngram || table.order > config.max_ngram {
			return Err(Error::Malformed(format!("unexpected table order {}", table.order)));
		}
		for (codes, transitions) in table.entries {
			if codes.len() != table.order {
				return Err(Error::Malformed(format!(
					"context of length {} in table of order {}",
					codes.len(),
					table.order
				)));
			}
			if !codes.iter().all(|code| in_vocabulary(*code)) {
				return Err(Error::Malformed(format!("context {:?} outside the vocabulary", codes)));
			}
			if transitions.is_empty() {
				return Err(Error::Malformed(format!("context {:?} has no transitions", codes)));
			}
			let key = ContextKey::new(&codes)
				.ok_or_else(|| Error::Malformed(format!("context {:?} is too long", codes)))?;
			for (target, count) in transitions {
				if !in_vocabulary(target) || count == 0 {
					return Err(Error::Malformed(format!("invalid transition {} x{} for {:?}", target, count, codes)));
				}
				model.add_occurrences(key, target, count);
			}
		}
	}
	Ok(model)
}
