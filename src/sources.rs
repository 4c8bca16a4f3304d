use crate::errors::{AppError, Result};
use crate::models::{DataSource, ProductRecord, RawNutriments};
use async_trait::async_trait;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Remote product-data port. Implementations return `Ok(None)` for a
/// structured "not found" response; `Err` is reserved for network and
/// parsing failures.
#[async_trait]
pub trait ProductSource: Send + Sync {
    fn source(&self) -> DataSource;
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>>;
}

#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: u8,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize, Default)]
struct OffProduct {
    product_name: Option<String>,
    brands: Option<String>,
    ingredients_text: Option<String>,
    #[serde(default)]
    ingredients: Vec<OffIngredient>,
    nutriments: Option<RawNutriments>,
    #[serde(default)]
    allergens_tags: Vec<String>,
    #[serde(default)]
    additives_tags: Vec<String>,
    nutriscore_grade: Option<String>,
    ecoscore_grade: Option<String>,
    image_url: Option<String>,
    last_modified_t: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OffIngredient {
    text: Option<String>,
}

impl From<OffProduct> for ProductRecord {
    fn from(product: OffProduct) -> Self {
        ProductRecord {
            product_name: product.product_name,
            brand: product.brands,
            ingredients_text: product.ingredients_text,
            ingredients: product
                .ingredients
                .into_iter()
                .filter_map(|i| i.text)
                .filter(|t| !t.is_empty())
                .collect(),
            nutriments: product.nutriments,
            allergens_tags: product.allergens_tags,
            additives_tags: product.additives_tags,
            nutriscore_grade: product.nutriscore_grade,
            ecoscore_grade: product.ecoscore_grade,
            image_url: product.image_url,
            last_modified_t: product.last_modified_t,
        }
    }
}

/// Primary source: the Open Food Facts public REST API.
pub struct OpenFoodFactsSource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Reads `OFF_BASE_URL` and `FETCH_TIMEOUT_SECS` from the environment,
    /// falling back to the public API and a 10 second timeout.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let base_url = env::var("OFF_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|_| AppError::Config(format!("Invalid FETCH_TIMEOUT_SECS: {}", raw)))
            })
            .transpose()?
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        info!(base_url = %base_url, timeout_secs, "Configured Open Food Facts source");
        Self::new(base_url, Duration::from_secs(timeout_secs))
    }
}

#[async_trait]
impl ProductSource for OpenFoodFactsSource {
    fn source(&self) -> DataSource {
        DataSource::Primary
    }

    #[instrument(skip(self), fields(code = %barcode))]
    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);
        debug!("Fetching product data from {}", url);
        let response = self.client.get(&url).send().await?;
        let payload = response.json::<OffResponse>().await?;

        // "Not found" is signalled by the status flag in the body, not by
        // an HTTP error code.
        if payload.status != 1 {
            info!(code = %barcode, "Product not present in primary source");
            return Ok(None);
        }
        match payload.product {
            Some(product) => {
                debug!(code = %barcode, "Product record fetched from primary source");
                Ok(Some(product.into()))
            }
            None => {
                warn!(code = %barcode, "Found status without a product body, treating as miss");
                Ok(None)
            }
        }
    }
}

/// Fallback source consulted after a primary miss. An explicit extension
/// point for a future community-contributed database; today it always
/// misses.
#[derive(Default)]
pub struct CommunitySource;

#[async_trait]
impl ProductSource for CommunitySource {
    fn source(&self) -> DataSource {
        DataSource::Community
    }

    async fn fetch(&self, barcode: &str) -> Result<Option<ProductRecord>> {
        debug!(code = %barcode, "Community source has no data yet");
        Ok(None)
    }
}
