//! Top-level module for the word n-gram continuation system.
//!
//! This module provides:
//! - The word/code mapping (`Vocabulary`)
//! - Text normalization and training pair extraction (`Tokenizer`)
//! - Multi-order count tables with backoff sampling (`NGramModel`)
//! - Embedding capability and theme vectors (`Embedder`, `ThemeVector`)
//! - Generation parameters (`GenerationInput`)
//! - Training and generation orchestration (`ContinuationEngine`)

/// Bidirectional word/code mapping with an unknown sentinel.
pub mod vocabulary;

/// Normalization, sentence segmentation and training pairs.
pub mod tokenizer;

/// Fixed-capacity context keys.
pub mod context;

/// Transitions out of a single context and weighted draws (not exposed publicly).
pub(crate) mod state;

/// Count table of a single context order (not exposed publicly).
pub(crate) mod order_table;

/// Multi-order n-gram model with backoff sampling.
pub mod ngram_model;

/// Word vectors and theme vectors.
pub mod embedding;

/// Generation parameters.
pub mod generation_input;

/// Training and continuation orchestration.
pub mod engine;
