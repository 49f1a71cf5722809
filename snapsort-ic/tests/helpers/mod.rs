//! Test Helper Utilities
//!
//! Shared utilities for testing snapsort-ic

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use serde_json::Value;
use snapsort_ic::models::UploadedImage;
use snapsort_ic::services::{ClassifierError, ImageClassifier};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub const BOUNDARY: &str = "snapsort-test-boundary";

/// Minimal PNG signature + IHDR length, enough for magic-byte sniffing
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// Scripted classifier replies, one per call
pub type Reply = Result<Value, ClassifierError>;

/// Classifier double that plays back a script and counts calls
///
/// Once the script runs out, `fallback` is produced on every further call.
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Reply>>,
    fallback: Box<dyn Fn() -> Reply + Send + Sync>,
    calls: AtomicU32,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<Reply>, fallback: impl Fn() -> Reply + Send + Sync + 'static) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Box::new(fallback),
            calls: AtomicU32::new(0),
        }
    }

    /// Always replies with `{"className": label}`
    pub fn always_label(label: &'static str) -> Self {
        Self::new(Vec::new(), move || Ok(serde_json::json!({ "className": label })))
    }

    /// Always fails with a transport error
    pub fn always_failing() -> Self {
        Self::new(Vec::new(), transport_failure)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn transport_failure() -> Reply {
    Err(ClassifierError::NetworkError("connection refused".to_string()))
}

#[async_trait]
impl ImageClassifier for ScriptedClassifier {
    fn source_id(&self) -> &'static str {
        "scripted"
    }

    async fn classify(&self, _image: &UploadedImage) -> Result<Value, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| (self.fallback)())
    }
}

pub fn test_image() -> UploadedImage {
    UploadedImage::new(PNG_BYTES, "image/png")
}

/// One-part multipart body
pub fn multipart_body(
    field_name: &str,
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match file_name {
        Some(file_name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field_name}\"\r\n").as_bytes(),
        ),
    }
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Multipart body with a single `file` part holding a PNG
pub fn png_upload_body() -> Vec<u8> {
    multipart_body("file", Some("screenshot.png"), Some("image/png"), PNG_BYTES)
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    use http_body_util::BodyExt;

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
