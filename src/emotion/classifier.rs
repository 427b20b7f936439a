//! Keyword-based emotion classification.
//!
//! [`EmotionClassifier::classify`] maps a transcript to a mood score, an
//! emotion label and a display bucket.  Keyword matching is deterministic;
//! the score is drawn uniformly at random from the matched set's band so
//! identical transcripts do not always render identically.  Callers that
//! need reproducibility inject a fixed seed via
//! [`EmotionClassifier::with_seed`].
//!
//! The keyword sets are evaluated in a fixed priority order (joy → anger →
//! sadness → neutral default); a transcript containing words from several
//! sets resolves to the first match.

use std::ops::RangeInclusive;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::band::DisplayCategory;

// ---------------------------------------------------------------------------
// Keyword sets
// ---------------------------------------------------------------------------

/// Joy / positive terms → score drawn from 76–100.
const JOY_KEYWORDS: &[&str] = &[
    "楽しい",
    "楽しかった",
    "嬉しい",
    "うれしい",
    "幸せ",
    "最高",
    "笑った",
    "遊びたい",
    "ありがとう",
    "時間を忘れる",
];

/// Anger / frustration terms → score drawn from 1–15.
const ANGER_KEYWORDS: &[&str] = &[
    "怒り",
    "ムカつく",
    "不満",
    "やめてほしい",
    "いい加減にしてほしい",
    "好きにすれば",
    "嫌い",
    "大変",
];

/// Sadness / fatigue terms → score drawn from 21–35.
const SADNESS_KEYWORDS: &[&str] = &[
    "悲しい",
    "辛い",
    "さみしい",
    "寂しい",
    "どうして",
    "無理",
    "何もしたくない",
    "わからない",
    "ごめんなさい",
    "もういいんだ",
    "疲れた",
];

// ---------------------------------------------------------------------------
// Score draw bands
// ---------------------------------------------------------------------------

const JOY_BAND: RangeInclusive<u8> = 76..=100;
const ANGER_BAND: RangeInclusive<u8> = 1..=15;
const SADNESS_BAND: RangeInclusive<u8> = 21..=35;
const NEUTRAL_BAND: RangeInclusive<u8> = 51..=75;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The result of classifying one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Mood score in 1–100 (higher = more positive).
    pub score: u8,
    /// One-word emotion label.
    pub label: &'static str,
    /// Display bucket, resolved through the independent score→category
    /// table — not through the keyword match.
    pub category: DisplayCategory,
}

// ---------------------------------------------------------------------------
// EmotionClassifier
// ---------------------------------------------------------------------------

/// Transcript → (score, label, category).
///
/// # Example
///
/// ```rust
/// use voice_journal::emotion::{DisplayCategory, EmotionClassifier};
///
/// let classifier = EmotionClassifier::with_seed(7);
/// let c = classifier.classify("今日は楽しかった");
/// assert!((76..=100).contains(&c.score));
/// assert_eq!(c.label, "喜び");
/// assert_eq!(c.category, DisplayCategory::Joy);
/// ```
pub struct EmotionClassifier {
    rng: Mutex<StdRng>,
}

impl EmotionClassifier {
    /// Create a classifier seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a classifier with a fixed seed for reproducible scores.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Classify `transcript`.
    ///
    /// Matching is case-normalised substring containment.  The score is a
    /// fresh uniform draw from the matched band on every call; the band and
    /// label themselves are deterministic for a given transcript.
    pub fn classify(&self, transcript: &str) -> Classification {
        let text = transcript.to_lowercase();

        let (band, label) = if contains_any(&text, JOY_KEYWORDS) {
            (JOY_BAND, "喜び")
        } else if contains_any(&text, ANGER_KEYWORDS) {
            (ANGER_BAND, "怒り")
        } else if contains_any(&text, SADNESS_KEYWORDS) {
            (SADNESS_BAND, "悲しみ")
        } else {
            (NEUTRAL_BAND, "普通")
        };

        let score = self.rng.lock().unwrap().gen_range(band);

        Classification {
            score,
            label,
            category: DisplayCategory::for_score(score),
        }
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
