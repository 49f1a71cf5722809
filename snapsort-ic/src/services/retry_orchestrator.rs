//! Retry-and-validate orchestration
//!
//! **Algorithm:**
//! 1. Call the classifier
//! 2. Validate the returned record
//! 3. On success, return the result with the attempt count
//! 4. On a classifier or validation failure:
//!    a. If attempts < max_retries: log WARN, wait `delay`, retry
//!    b. Otherwise: log ERROR, return [`RetryExhausted`] carrying the last error
//!
//! The delay is a tokio timer, so a slow classification never blocks the
//! worker thread other requests run on. No delay follows the final attempt.

use snapsort_common::config::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};
use snapsort_common::ClassificationResult;
use std::time::Duration;
use thiserror::Error;

use crate::models::UploadedImage;
use crate::services::classification_validator::{validate_classification, ValidationError};
use crate::services::classifier_client::{ClassifierError, ImageClassifier};

/// Attempt bound and fixed inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, never less than 1
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// `max_retries` of 0 is raised to 1: at least one attempt always runs
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, Duration::from_millis(DEFAULT_RETRY_DELAY_MS))
    }
}

/// Why a single attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("{0}")]
    Classifier(#[from] ClassifierError),

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Every attempt failed
#[derive(Debug, Error)]
#[error("{last_error} (retries exhausted after {attempts} attempts)")]
pub struct RetryExhausted {
    pub attempts: u32,
    #[source]
    pub last_error: AttemptError,
}

/// Validated result and the 1-based attempt that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationOutcome {
    pub result: ClassificationResult,
    pub attempts: u32,
}

async fn attempt<C>(
    classifier: &C,
    image: &UploadedImage,
) -> Result<ClassificationResult, AttemptError>
where
    C: ImageClassifier + ?Sized,
{
    let record = classifier.classify(image).await?;
    Ok(validate_classification(&record)?)
}

/// Classify `image`, retrying classifier and validation failures per `policy`
pub async fn classify_with_retry<C>(
    classifier: &C,
    image: &UploadedImage,
    policy: RetryPolicy,
) -> Result<ClassificationOutcome, RetryExhausted>
where
    C: ImageClassifier + ?Sized,
{
    let mut attempts = 0u32;

    loop {
        if attempts > 0 {
            tracing::debug!(
                source = classifier.source_id(),
                attempt = attempts + 1,
                max_retries = policy.max_retries,
                "Retrying classification"
            );
        }

        let error = match attempt(classifier, image).await {
            Ok(result) => {
                let attempts = attempts + 1;
                tracing::info!(
                    class_name = %result.class_name,
                    attempts,
                    "Classification succeeded"
                );
                return Ok(ClassificationOutcome { result, attempts });
            }
            Err(error) => error,
        };

        attempts += 1;

        if attempts >= policy.max_retries {
            tracing::error!(
                source = classifier.source_id(),
                attempts,
                error = %error,
                "Classification failed: retries exhausted"
            );
            return Err(RetryExhausted {
                attempts,
                last_error: error,
            });
        }

        tracing::warn!(
            source = classifier.source_id(),
            attempt = attempts,
            max_retries = policy.max_retries,
            delay_ms = policy.delay.as_millis() as u64,
            error = %error,
            "Classification attempt failed, will retry after delay"
        );

        tokio::time::sleep(policy.delay).await;
    }
}
