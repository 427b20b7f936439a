//! Empathetic comment generation.
//!
//! This module provides:
//! * [`CommentGenerator`] — async trait implemented by all backends.
//! * [`ApiCommentGenerator`] — OpenAI-compatible REST API backend.
//! * [`FallbackGenerator`] — wraps any backend; answers from the band's
//!   fixed comment pool on failure.
//! * [`PromptBuilder`] — builds the analysis prompt with its strict JSON
//!   envelope.
//! * [`CommentError`] — error variants for comment operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_journal::comment::{ApiCommentGenerator, CommentGenerator, FallbackGenerator};
//! use voice_journal::config::CommentConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CommentConfig::default();
//!
//!     // Build a generator that never fails (falls back to the band pools).
//!     let generator = FallbackGenerator::new(ApiCommentGenerator::from_config(&config));
//!
//!     let comment = generator
//!         .generate("今日は楽しかった", "喜び", 90)
//!         .await
//!         .unwrap();
//!     println!("{comment}");
//! }
//! ```

pub mod fallback;
pub mod generator;
pub mod prompt;

pub use fallback::FallbackGenerator;
pub use generator::{ApiCommentGenerator, CommentError, CommentGenerator};
pub use prompt::PromptBuilder;
