//! Fallback generator — wraps any [`CommentGenerator`] and recovers locally.
//!
//! When the underlying call fails for any reason (`Request`, `Timeout`,
//! `Parse`, `EmptyResponse`, `Disabled`) [`FallbackGenerator`] silently
//! answers from the fixed comment pool of the [`EmotionBand`] matching the
//! record's score.  This guarantees the pipeline always produces a comment,
//! never blocks past the client timeout, and never surfaces raw service
//! errors to the end user.
//!
//! [`EmotionBand`]: crate::emotion::EmotionBand

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::emotion::fallback_comment;

use super::generator::{CommentError, CommentGenerator};

// ---------------------------------------------------------------------------
// FallbackGenerator
// ---------------------------------------------------------------------------

/// A transparent wrapper around any [`CommentGenerator`] that never returns
/// an error — on failure it picks a canned comment for the score's band.
///
/// # Example
/// ```rust
/// use voice_journal::comment::{ApiCommentGenerator, FallbackGenerator};
/// use voice_journal::config::CommentConfig;
///
/// let inner = ApiCommentGenerator::from_config(&CommentConfig::default());
/// let generator = FallbackGenerator::new(inner);
/// // `generator` now implements CommentGenerator and is safe to use even
/// // when the service is unreachable.
/// ```
pub struct FallbackGenerator<G: CommentGenerator> {
    inner: G,
    rng: Mutex<StdRng>,
}

impl<G: CommentGenerator> FallbackGenerator<G> {
    /// Wrap `inner` with fallback behaviour.
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Wrap `inner` with a fixed seed for reproducible fallback picks.
    pub fn with_seed(inner: G, seed: u64) -> Self {
        Self {
            inner,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Return a reference to the wrapped generator.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: CommentGenerator + Send + Sync> CommentGenerator for FallbackGenerator<G> {
    /// Attempt remote generation; answer from the band pool if any error
    /// occurs.
    ///
    /// This implementation **never** returns `Err(_)`.
    async fn generate(
        &self,
        transcript: &str,
        emotion: &str,
        score: u8,
    ) -> Result<String, CommentError> {
        match self.inner.generate(transcript, emotion, score).await {
            Ok(comment) => Ok(comment),
            Err(err) => {
                log::warn!("comment generation failed ({err}), using fallback pool");
                let mut rng = self.rng.lock().unwrap();
                Ok(fallback_comment(score, &mut *rng).to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionBand;
    use async_trait::async_trait;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Always succeeds with a fixed comment.
    struct AlwaysOk(String);

    #[async_trait]
    impl CommentGenerator for AlwaysOk {
        async fn generate(&self, _t: &str, _e: &str, _s: u8) -> Result<String, CommentError> {
            Ok(self.0.clone())
        }
    }

    /// Always returns the given error kind.
    struct AlwaysFails(ErrorKind);

    enum ErrorKind {
        Request,
        Timeout,
        Parse,
        Empty,
        Disabled,
    }

    #[async_trait]
    impl CommentGenerator for AlwaysFails {
        async fn generate(&self, _t: &str, _e: &str, _s: u8) -> Result<String, CommentError> {
            let err = match self.0 {
                ErrorKind::Request => CommentError::Request("connection refused".into()),
                ErrorKind::Timeout => CommentError::Timeout,
                ErrorKind::Parse => CommentError::Parse("bad json".into()),
                ErrorKind::Empty => CommentError::EmptyResponse,
                ErrorKind::Disabled => CommentError::Disabled,
            };
            Err(err)
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn passes_through_success() {
        let generator = FallbackGenerator::new(AlwaysOk("素敵な一日でしたね。".into()));
        let result = generator.generate("t", "喜び", 90).await.unwrap();
        assert_eq!(result, "素敵な一日でしたね。");
    }

    #[tokio::test]
    async fn falls_back_on_request_error() {
        let generator = FallbackGenerator::new(AlwaysFails(ErrorKind::Request));
        let result = generator.generate("t", "喜び", 90).await.unwrap();
        assert!(EmotionBand::Joy.comment_pool().contains(&result.as_str()));
    }

    #[tokio::test]
    async fn falls_back_on_timeout() {
        let generator = FallbackGenerator::new(AlwaysFails(ErrorKind::Timeout));
        let result = generator.generate("t", "悲しみ", 30).await.unwrap();
        assert!(EmotionBand::Sadness.comment_pool().contains(&result.as_str()));
    }

    #[tokio::test]
    async fn falls_back_on_parse_error() {
        let generator = FallbackGenerator::new(AlwaysFails(ErrorKind::Parse));
        let result = generator.generate("t", "怒り", 10).await.unwrap();
        assert!(EmotionBand::Anger.comment_pool().contains(&result.as_str()));
    }

    #[tokio::test]
    async fn falls_back_on_empty_response() {
        let generator = FallbackGenerator::new(AlwaysFails(ErrorKind::Empty));
        let result = generator.generate("t", "普通", 60).await.unwrap();
        assert!(EmotionBand::Neutral.comment_pool().contains(&result.as_str()));
    }

    #[tokio::test]
    async fn falls_back_when_disabled() {
        let generator = FallbackGenerator::new(AlwaysFails(ErrorKind::Disabled));
        let result = generator.generate("t", "普通", 60).await.unwrap();
        assert!(EmotionBand::Neutral.comment_pool().contains(&result.as_str()));
    }

    #[tokio::test]
    async fn never_returns_err() {
        let generator = FallbackGenerator::new(AlwaysFails(ErrorKind::Timeout));
        assert!(generator.generate("t", "普通", 60).await.is_ok());
    }

    /// Repeated fallback picks for the same score always come from the same
    /// fixed pool (the pick itself may vary).
    #[tokio::test]
    async fn fallback_picks_stay_inside_band_pool() {
        let generator = FallbackGenerator::with_seed(AlwaysFails(ErrorKind::Timeout), 5);
        for _ in 0..20 {
            let result = generator.generate("t", "喜び", 88).await.unwrap();
            assert!(EmotionBand::Joy.comment_pool().contains(&result.as_str()));
        }
    }

    /// FallbackGenerator<G> must itself be a valid CommentGenerator
    /// (object-safe).
    #[test]
    fn fallback_is_object_safe() {
        let inner = AlwaysOk("ok".into());
        let _: Box<dyn CommentGenerator> = Box::new(FallbackGenerator::new(inner));
    }
}
