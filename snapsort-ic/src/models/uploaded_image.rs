//! Uploaded image
//!
//! Raw bytes plus the media type they will be labelled with in the data URI.
//! Owned by a single request.

use axum::body::Bytes;

use crate::error::UploadError;

/// Media type assumed when neither the client nor the magic bytes tell us
pub const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

const OCTET_STREAM: &str = "application/octet-stream";

/// Image received from a client
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    /// MIME type, e.g. "image/png"
    pub media_type: String,
    /// Client-supplied file name, if any
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
            file_name: None,
        }
    }

    /// Build from a multipart file part
    ///
    /// **Media type resolution:**
    /// 1. Declared `image/*` type is trusted
    /// 2. Otherwise the type sniffed from the magic bytes
    /// 3. Otherwise `image/jpeg`, unless the client declared a non-image type
    ///
    /// Empty files and files recognised as something other than an image are rejected.
    pub fn from_upload(
        bytes: Bytes,
        declared_type: Option<&str>,
        file_name: Option<String>,
    ) -> Result<Self, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }

        let sniffed = infer::get(&bytes);
        if let Some(kind) = &sniffed {
            if kind.matcher_type() != infer::MatcherType::Image {
                return Err(UploadError::NotAnImage(kind.mime_type().to_string()));
            }
        }

        let declared = declared_type
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty() && t != OCTET_STREAM);

        let media_type = match (declared, sniffed) {
            (Some(declared), _) if declared.starts_with("image/") => declared,
            (_, Some(kind)) => kind.mime_type().to_string(),
            (Some(declared), None) => return Err(UploadError::NotAnImage(declared)),
            (None, None) => FALLBACK_MEDIA_TYPE.to_string(),
        };

        Ok(Self {
            bytes,
            media_type,
            file_name,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const PDF_HEADER: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";

    #[test]
    fn test_declared_image_type_is_kept() {
        let image =
            UploadedImage::from_upload(Bytes::from_static(PNG_HEADER), Some("image/png"), None)
                .unwrap();
        assert_eq!(image.media_type, "image/png");
    }

    #[test]
    fn test_octet_stream_is_sniffed() {
        let image = UploadedImage::from_upload(
            Bytes::from_static(PNG_HEADER),
            Some("application/octet-stream"),
            Some("shot.png".to_string()),
        )
        .unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.file_name.as_deref(), Some("shot.png"));
    }

    #[test]
    fn test_unknown_bytes_fall_back_to_jpeg() {
        let image = UploadedImage::from_upload(Bytes::from_static(b"opaque"), None, None).unwrap();
        assert_eq!(image.media_type, FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn test_empty_upload_rejected() {
        let err = UploadedImage::from_upload(Bytes::new(), Some("image/png"), None).unwrap_err();
        assert!(matches!(err, UploadError::EmptyFile));
    }

    #[test]
    fn test_sniffed_non_image_rejected() {
        let err =
            UploadedImage::from_upload(Bytes::from_static(PDF_HEADER), Some("image/png"), None)
                .unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage(ref mime) if mime == "application/pdf"));
    }

    #[test]
    fn test_declared_non_image_rejected() {
        let err = UploadedImage::from_upload(
            Bytes::from_static(b"plain words"),
            Some("text/plain"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, UploadError::NotAnImage(ref mime) if mime == "text/plain"));
    }
}
