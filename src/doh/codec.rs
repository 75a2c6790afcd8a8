//! Base64url helpers for the `dns` query parameter (RFC 8484 §4.1).

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, Engine};

/// Decoder accepting both padded and unpadded input.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes with the URL-safe alphabet and no `=` padding.
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode base64url text, with or without trailing padding.
pub fn base64url_decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_LENIENT.decode(text)
}
