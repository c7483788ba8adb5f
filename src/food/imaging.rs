use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("image payload is empty")]
    Empty,
    #[error("invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image unreadable: {0}")]
    Unreadable(#[from] image::ImageError),
}

/// Decode an uploaded image sent either as bare base64 or as a data URI.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let encoded = match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    };
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = STANDARD.decode(encoded)?;
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(bytes)
}

/// Parse raw bytes into pixels. Fails on empty or corrupt data.
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(image::load_from_memory(bytes)?)
}
