use std::env;
use std::time::Duration;

pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";
pub const DEFAULT_OPENFOODFACTS_BASE_URL: &str = "https://world.openfoodfacts.org";

#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub usda_api_key: String,
    pub usda_base_url: String,
    pub openfoodfacts_base_url: String,
    pub request_timeout: Duration,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            usda_api_key: "DEMO_KEY".to_string(),
            usda_base_url: DEFAULT_USDA_BASE_URL.to_string(),
            openfoodfacts_base_url: DEFAULT_OPENFOODFACTS_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl FoodConfig {
    /// Both databases work without a private key, so nothing here is required.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let request_timeout = env::var("FOOD_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            usda_api_key: env::var("USDA_API_KEY").unwrap_or(defaults.usda_api_key),
            usda_base_url: env::var("USDA_BASE_URL").unwrap_or(defaults.usda_base_url),
            openfoodfacts_base_url: env::var("OPENFOODFACTS_BASE_URL")
                .unwrap_or(defaults.openfoodfacts_base_url),
            request_timeout,
        }
    }

    /// Point both clients at one host, used by tests against a mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            usda_base_url: base_url.to_string(),
            openfoodfacts_base_url: base_url.to_string(),
            ..Self::default()
        }
    }
}
