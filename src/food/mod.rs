pub mod analysis;
pub mod api;
pub mod barcode;
pub mod config;
pub mod imaging;
pub mod pipeline;
pub mod record;
pub mod vision;

pub use pipeline::{FailureReason, Resolution, ResolutionPipeline, ScanMode};
pub use record::{Dietary, FoodGuess, NutritionRecord};
