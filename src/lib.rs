pub mod api;
pub mod commands;
pub mod config;
pub mod food;
pub mod llm;
pub mod profile;
pub mod providers;
pub mod session;

// Re-export commonly used items
pub use food::{Dietary, FailureReason, FoodGuess, NutritionRecord, Resolution, ResolutionPipeline};
pub use llm::{SectionGateway, Sections};
pub use profile::UserProfile;
