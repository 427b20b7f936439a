//! Emotion analysis — keyword classification, score bands, display buckets.

pub mod band;
pub mod classifier;

pub use band::{fallback_comment, DisplayCategory, EmotionBand};
pub use classifier::{Classification, EmotionClassifier};
