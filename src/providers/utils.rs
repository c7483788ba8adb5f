use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use std::time::Duration;

/// Base64 body of an image, as the multimodal APIs expect it.
pub fn encode_image(image: &[u8]) -> String {
    STANDARD.encode(image)
}

/// `data:` URI for OpenAI-style `image_url` content parts.
pub fn image_data_uri(image: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", encode_image(image))
}

pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}
