//! Settings file
//!
//! Optional TOML file layered under the command-line flags. Missing keys
//! fall back to the built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wordgen_core::ModelConfig;

/// Settings for both subcommands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Training parameters, persisted with the model
	pub model: ModelConfig,
	/// Generation parameters
	pub generation: GenerationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
	/// Number of words of the result
	pub length: usize,
	/// Random seed
	pub seed: u64,
	/// Candidates per step (model value when unset)
	pub samples: Option<usize>,
}

impl Default for GenerationSettings {
	fn default() -> Self {
		Self { length: 5, seed: 42, samples: None }
	}
}

impl Settings {
	/// Loads `path` if given, defaults otherwise.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(Self::default());
		};
		debug!("Loading settings from {:?}", path);
		let content = fs::read_to_string(path)
			.with_context(|| format!("failed to read settings file {}", path.display()))?;
		Self::parse(&content).with_context(|| format!("invalid settings file {}", path.display()))
	}

	pub fn parse(content: &str) -> Result<Self> {
		let settings: Settings = toml::from_str(content)?;
		Ok(settings)
	}
}
