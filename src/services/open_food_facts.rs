use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::services::{BarcodeLookup, ScannedProduct, ServiceError};

static BARCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8,14}$").expect("barcode pattern is valid"));

/// Barcode lookups against the Open Food Facts product database.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    product_name: Option<String>,
    ingredients_text: Option<String>,
}

impl ProductResponse {
    /// The product, if the database knows it and it has both a name and an
    /// ingredient list.
    fn into_product(self) -> Option<ScannedProduct> {
        if self.status != 1 {
            return None;
        }
        let product = self.product?;
        let name = product.product_name.filter(|s| !s.trim().is_empty())?;
        let ingredients_text = product.ingredients_text.filter(|s| !s.trim().is_empty())?;
        Some(ScannedProduct {
            name,
            ingredients_text,
        })
    }
}

/// Whether `code` looks like an EAN/UPC barcode (8 to 14 digits).
#[must_use]
pub fn is_valid_barcode(code: &str) -> bool {
    BARCODE.is_match(code)
}

impl OpenFoodFactsClient {
    /// Create a client for the database at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{barcode}.json", self.base_url)
    }
}

impl BarcodeLookup for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Result<Option<ScannedProduct>, ServiceError> {
        let barcode = barcode.trim();
        if !is_valid_barcode(barcode) {
            return Err(ServiceError::Malformed(format!(
                "'{barcode}' is not a valid barcode (expected 8 to 14 digits)"
            )));
        }

        let response = self
            .client
            .get(self.product_url(barcode))
            .send()
            .await
            .inspect_err(|e| tracing::error!("Product lookup failed: {e}"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Barcode {barcode} is not in the product database");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Product database error: {status} - {body}");
            return Err(ServiceError::Status { status, body });
        }

        let response: ProductResponse = response.json().await?;
        Ok(response.into_product())
    }
}
