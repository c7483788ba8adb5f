//! Resolution pipeline: turns one image into one nutrition record.
//!
//! The caller picks the strategy. Barcode mode decodes a symbol and looks
//! the product up; food mode asks the vision model for a name and searches
//! the nutrition database, degrading to a fallback record when that search
//! comes up empty. Every failure is a [`FailureReason`], never a panic or
//! an escaped error.

use crate::food::api::{LookupError, OpenFoodFactsClient, UsdaClient};
use crate::food::barcode::{BarcodeDecoder, RxingDecoder};
use crate::food::config::FoodConfig;
use crate::food::imaging::{load_image, DecodeError};
use crate::food::record::NutritionRecord;
use crate::food::vision::FoodIdentifier;
use crate::providers::traits::CompletionProvider;
use log::{error, info, warn};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Barcode,
    Food,
}

impl FromStr for ScanMode {
    type Err = FailureReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "barcode" => Ok(ScanMode::Barcode),
            "food" => Ok(ScanMode::Food),
            other => Err(FailureReason::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NoBarcode,
    NoProduct(String),
    NoFoodIdentified,
    InvalidMode(String),
    DecodeError,
}

impl FailureReason {
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::NoBarcode => "NO_BARCODE",
            FailureReason::NoProduct(_) => "NO_PRODUCT",
            FailureReason::NoFoodIdentified => "NO_FOOD_IDENTIFIED",
            FailureReason::InvalidMode(_) => "INVALID_MODE",
            FailureReason::DecodeError => "DECODE_ERROR",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoBarcode => write!(
                f,
                "No barcode found in the image. Try switching to 'Food Photo' mode for fresh foods."
            ),
            FailureReason::NoProduct(barcode) => {
                write!(f, "No product found for barcode {}", barcode)
            }
            FailureReason::NoFoodIdentified => write!(
                f,
                "Could not identify the food item. Please ensure the food is clearly visible and well-lit."
            ),
            FailureReason::InvalidMode(mode) => {
                write!(f, "Invalid mode: {}. Expected 'barcode' or 'food'.", mode)
            }
            FailureReason::DecodeError => write!(f, "Failed to decode image data"),
        }
    }
}

impl From<DecodeError> for FailureReason {
    fn from(e: DecodeError) -> Self {
        warn!("Image could not be decoded: {}", e);
        FailureReason::DecodeError
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(NutritionRecord),
    Failed(FailureReason),
}

impl Resolution {
    pub fn record(&self) -> Option<&NutritionRecord> {
        match self {
            Resolution::Resolved(record) => Some(record),
            Resolution::Failed(_) => None,
        }
    }
}

impl From<Result<NutritionRecord, FailureReason>> for Resolution {
    fn from(result: Result<NutritionRecord, FailureReason>) -> Self {
        match result {
            Ok(record) => Resolution::Resolved(record),
            Err(reason) => Resolution::Failed(reason),
        }
    }
}

/// Holds the collaborators for both strategies. Stateless per call: no
/// retries and no caching.
#[derive(Clone)]
pub struct ResolutionPipeline {
    decoder: Arc<dyn BarcodeDecoder>,
    products: OpenFoodFactsClient,
    identifier: FoodIdentifier,
    foods: UsdaClient,
}

impl ResolutionPipeline {
    pub fn new(
        decoder: Arc<dyn BarcodeDecoder>,
        products: OpenFoodFactsClient,
        identifier: FoodIdentifier,
        foods: UsdaClient,
    ) -> Self {
        Self {
            decoder,
            products,
            identifier,
            foods,
        }
    }

    /// Standard wiring: rxing for barcodes, the given model for vision.
    pub fn from_config(
        config: &FoodConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, LookupError> {
        Ok(Self::new(
            Arc::new(RxingDecoder),
            OpenFoodFactsClient::new(config)?,
            FoodIdentifier::new(provider),
            UsdaClient::new(config)?,
        ))
    }

    pub async fn resolve(&self, mode: &str, image: &[u8]) -> Resolution {
        let mode = match mode.parse::<ScanMode>() {
            Ok(mode) => mode,
            Err(reason) => {
                warn!("Rejected scan: {}", reason);
                return Resolution::Failed(reason);
            }
        };
        info!("Processing scan in {:?} mode", mode);

        let result = match mode {
            ScanMode::Barcode => self.resolve_barcode(image).await,
            ScanMode::Food => self.resolve_food(image).await,
        };
        if let Err(reason) = &result {
            info!("Scan failed with {}", reason.code());
        }
        result.into()
    }

    async fn resolve_barcode(&self, image: &[u8]) -> Result<NutritionRecord, FailureReason> {
        let decoder = Arc::clone(&self.decoder);
        let bytes = image.to_vec();
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| {
                error!("Barcode decoder task failed: {}", e);
                FailureReason::DecodeError
            })??;

        let barcode = decoded.ok_or(FailureReason::NoBarcode)?;
        self.products
            .lookup(&barcode)
            .await
            .ok_or(FailureReason::NoProduct(barcode))
    }

    async fn resolve_food(&self, image: &[u8]) -> Result<NutritionRecord, FailureReason> {
        load_image(image)?;

        let guess = self
            .identifier
            .identify(image)
            .await
            .ok_or(FailureReason::NoFoodIdentified)?;
        info!("Identified food item: {} ({})", guess.name, guess.quantity);

        Ok(self.foods.lookup(&guess).await)
    }
}
