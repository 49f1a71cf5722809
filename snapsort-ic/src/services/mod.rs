//! Service modules for image classification
//!
//! Leaf to root: encoder → response extractor → validator → classifier client
//! → retry orchestrator.

pub mod classification_validator;
pub mod classifier_client;
pub mod image_encoder;
pub mod response_extractor;
pub mod retry_orchestrator;

pub use classification_validator::{validate_classification, ValidationError};
pub use classifier_client::{
    ClassifierConfig, ClassifierError, ImageClassifier, OpenAiClassifier, CLASSIFICATION_PROMPT,
};
pub use image_encoder::{encode_image, to_data_uri};
pub use response_extractor::{extract_json, ExtractionStage, MalformedResponse};
pub use retry_orchestrator::{
    classify_with_retry, AttemptError, ClassificationOutcome, RetryExhausted, RetryPolicy,
};
