//! `data:` URI encoding of embedded images

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, thiserror::Error)]
pub enum DataUriError {
    #[error("Not a data URI")]
    MissingScheme,

    #[error("Data URI has no payload separator")]
    MissingPayload,

    #[error("Only base64 data URIs are supported")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encode `bytes` as `data:<mime>;base64,<payload>`, guessing the MIME type from the file name
pub fn encode(file_name: &str, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes))
}

/// A decoded data URI
#[derive(Debug, PartialEq)]
pub struct DecodedDataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode a base64 data URI back into its MIME type and bytes
pub fn decode(uri: &str) -> Result<DecodedDataUri, DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;

    Ok(DecodedDataUri {
        mime: mime.to_string(),
        bytes: STANDARD.decode(payload.trim())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_guesses_mime_from_name() {
        assert_eq!(encode("tower.png", b"abc"), "data:image/png;base64,YWJj");
        assert!(encode("tower.JPG", b"abc").starts_with("data:image/jpeg;base64,"));
        assert!(encode("notes", b"abc").starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_decode_recovers_bytes() {
        let decoded = decode("data:image/png;base64,YWJj").unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, b"abc");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(matches!(decode("image.png"), Err(DataUriError::MissingScheme)));
        assert!(matches!(decode("data:image/png;base64"), Err(DataUriError::MissingPayload)));
        assert!(matches!(decode("data:text/plain,hello"), Err(DataUriError::NotBase64)));
        assert!(matches!(decode("data:image/png;base64,@@@"), Err(DataUriError::Base64(_))));
    }
}
