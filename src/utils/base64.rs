use base64::{engine::general_purpose, Engine as _};

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Encodes raw bytes to Base64 format.
pub fn base64_encode_bytes(input: &[u8]) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Decodes a Base64 string to raw bytes.
///
/// Accepts both the standard and URL-safe alphabets, with or without padding.
/// Returns `None` if the input is not valid Base64 in any of them.
pub fn base64_decode_bytes(input: &str) -> Option<Vec<u8>> {
    let trimmed = input.trim();
    let unpadded = trimmed.trim_end_matches('=');
    general_purpose::STANDARD
        .decode(trimmed)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(unpadded))
        .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(unpadded))
        .ok()
}

/// Decodes a Base64 string to its original form.
///
/// # Returns
/// The decoded string, or an empty string if the input is invalid.
pub fn base64_decode(input: &str) -> String {
    match base64_decode_bytes(input) {
        Some(decoded) => String::from_utf8_lossy(&decoded).to_string(),
        None => String::new(),
    }
}

/// Converts a Base64 string to URL-safe Base64 format by replacing specific characters.
pub fn url_safe_base64_apply(input: &str) -> String {
    input
        .replace('+', "-")
        .replace('/', "_")
        .replace('=', "") // Remove padding
}

/// Encodes a string to URL-safe Base64 format.
pub fn url_safe_base64_encode(input: &str) -> String {
    url_safe_base64_apply(&base64_encode(input))
}
