//! Word-level n-gram text continuation library.
//!
//! This crate provides a word n-gram generation system including:
//! - A bidirectional word/code vocabulary
//! - A sentence tokenizer emitting training pairs at several context orders
//! - A multi-order count model with backoff sampling
//! - A continuation engine steering word choice with embedding "themes"
//! - Versioned model persistence and corpus readers

/// Core vocabulary, tokenizer, n-gram and generation logic.
pub mod model;

/// Model configuration (context orders, sample width, tokenizer policy).
pub mod config;

/// Error taxonomy shared by every fallible operation.
pub mod error;

/// Binary model file format.
pub mod persist;

/// Corpus sources (directories, line streams).
pub mod io;

pub use config::ModelConfig;
pub use error::{Error, Result};
pub use model::engine::ContinuationEngine;
