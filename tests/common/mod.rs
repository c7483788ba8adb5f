#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use kenshoku::food::api::{OpenFoodFactsClient, UsdaClient};
use kenshoku::food::barcode::{BarcodeDecoder, RxingDecoder};
use kenshoku::food::config::FoodConfig;
use kenshoku::food::imaging::DecodeError;
use kenshoku::food::vision::FoodIdentifier;
use kenshoku::providers::traits::{CompletionProvider, CompletionRequest};
use kenshoku::ResolutionPipeline;
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::Arc;

/// A small white PNG with nothing on it.
pub fn blank_image() -> Vec<u8> {
    let img = ImageBuffer::from_pixel(48, 48, Rgb([250u8, 250, 250]));
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Decoder that "reads" the same symbol from any image.
pub struct FixedDecoder(pub &'static str);

impl BarcodeDecoder for FixedDecoder {
    fn decode(&self, _image: &[u8]) -> Result<Option<String>, DecodeError> {
        Ok(Some(self.0.to_string()))
    }
}

/// Provider that answers from a closure and records every request.
pub struct ScriptedProvider {
    script: Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: impl Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(text.to_string()))
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(anyhow!("model unavailable")))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().push(request.clone());
        (self.script)(request)
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok("scripted".to_string())
    }
}

pub fn pipeline(
    base_url: &str,
    decoder: Arc<dyn BarcodeDecoder>,
    provider: Arc<dyn CompletionProvider>,
) -> ResolutionPipeline {
    let config = FoodConfig::with_base_url(base_url);
    ResolutionPipeline::new(
        decoder,
        OpenFoodFactsClient::new(&config).unwrap(),
        FoodIdentifier::new(provider),
        UsdaClient::new(&config).unwrap(),
    )
}

pub fn rxing() -> Arc<dyn BarcodeDecoder> {
    Arc::new(RxingDecoder)
}
