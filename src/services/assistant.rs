use crate::{
    domain::Config,
    services::{GeminiClient, IngredientDescriber, IngredientParser, ServiceError},
};

/// The language-model backed services, or their offline stand-in.
///
/// Offline, every call fails with [`ServiceError::Unconfigured`]: ingredient
/// lists then go through the comma-splitting fallback and descriptions are
/// reported as unavailable.
#[derive(Debug, Clone)]
pub enum Assistant {
    /// Calls the Gemini API.
    Gemini(GeminiClient),
    /// No language model is available.
    Offline(&'static str),
}

impl Assistant {
    /// Build the assistant described by the configuration.
    ///
    /// Falls back to [`Assistant::Offline`] when offline mode is enabled, when
    /// the API key is missing, or when the HTTP client cannot be built.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.offline {
            return Self::Offline("offline mode is enabled");
        }
        let Some(api_key) = config.api_key() else {
            tracing::debug!("{} is not set, running offline", config.api_key_env());
            return Self::Offline("no API key configured");
        };
        match GeminiClient::new(
            api_key,
            config.model().to_string(),
            config.request_timeout(),
        ) {
            Ok(client) => Self::Gemini(client),
            Err(e) => {
                tracing::warn!("Failed to create language model client: {e}");
                Self::Offline("language model client could not be created")
            }
        }
    }

    /// Whether the assistant can reach a language model.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Gemini(_))
    }
}

impl IngredientParser for Assistant {
    async fn parse(&self, raw: &str) -> Result<Vec<String>, ServiceError> {
        match self {
            Self::Gemini(client) => client.parse(raw).await,
            Self::Offline(reason) => Err(ServiceError::Unconfigured(*reason)),
        }
    }
}

impl IngredientDescriber for Assistant {
    async fn describe(&self, name: &str) -> Result<String, ServiceError> {
        match self {
            Self::Gemini(client) => client.describe(name).await,
            Self::Offline(reason) => Err(ServiceError::Unconfigured(*reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_config_never_builds_a_client() {
        let mut config = Config::default();
        config.offline = true;

        assert!(!Assistant::from_config(&config).is_online());
    }

    #[tokio::test]
    async fn offline_calls_fail_as_unconfigured() {
        let assistant = Assistant::Offline("test");

        assert!(matches!(
            assistant.parse("soy, salt").await,
            Err(ServiceError::Unconfigured("test"))
        ));
        assert!(matches!(
            assistant.describe("soy").await,
            Err(ServiceError::Unconfigured("test"))
        ));
    }
}
