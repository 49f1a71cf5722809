//! Image encoding for request payloads

use base64::{engine::general_purpose, Engine};

/// Standard (padded) base64 encoding of raw image bytes
pub fn encode_image(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// `data:<media_type>;base64,<payload>` URI for embedding in a chat message
pub fn to_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, encode_image(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_vector() {
        assert_eq!(encode_image(b"hello"), "aGVsbG8=");
        assert_eq!(encode_image(b""), "");
    }

    #[test]
    fn test_encoding_is_lossless() {
        let bytes: Vec<u8> = (0..=255).collect();
        let decoded = general_purpose::STANDARD.decode(encode_image(&bytes)).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(to_data_uri("image/png", b"hello"), "data:image/png;base64,aGVsbG8=");
    }
}
