//! The external services the session depends on.
//!
//! Each service is a trait so that the session can be driven by the real HTTP
//! clients in production and by fakes in tests. All of them may fail; how a
//! failure is handled is up to the caller (see [`crate::Session`]).

use std::future::Future;

mod assistant;
pub use assistant::Assistant;

mod gemini;
pub use gemini::GeminiClient;

mod open_food_facts;
pub use open_food_facts::{OpenFoodFactsClient, is_valid_barcode};

/// Errors returned by external services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The request could not be sent, or the response could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with an error status.
    #[error("service returned {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body, for diagnostics.
        body: String,
    },
    /// The service answered, but not in the expected shape.
    #[error("unexpected response: {0}")]
    Malformed(String),
    /// The service is not configured (e.g. no API key, or offline mode).
    #[error("service unavailable: {0}")]
    Unconfigured(&'static str),
}

/// A product returned by a barcode lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedProduct {
    /// The product's display name.
    pub name: String,
    /// The product's ingredient list, as printed on the packaging.
    pub ingredients_text: String,
}

/// Extracts discrete ingredients from free text.
pub trait IngredientParser: Send + Sync {
    /// Parse a raw ingredient list into individual ingredients.
    fn parse(&self, raw: &str) -> impl Future<Output = Result<Vec<String>, ServiceError>> + Send;
}

/// Describes an ingredient or compound in prose.
pub trait IngredientDescriber: Send + Sync {
    /// Produce a short markdown description of the named ingredient.
    fn describe(&self, name: &str) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

/// Resolves product barcodes.
pub trait BarcodeLookup: Send + Sync {
    /// Look up a product by barcode.
    ///
    /// `Ok(None)` means the product is not known to the database, which is not
    /// an error.
    fn lookup(
        &self,
        barcode: &str,
    ) -> impl Future<Output = Result<Option<ScannedProduct>, ServiceError>> + Send;
}
