use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::services::{IngredientDescriber, IngredientParser, ServiceError};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the Gemini `generateContent` API.
///
/// Used both to split ingredient lists into individual ingredients and to
/// describe a single ingredient.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

impl GenerateRequest {
    fn text(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: None,
        }
    }

    fn json(prompt: String, response_schema: serde_json::Value) -> Self {
        Self {
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            }),
            ..Self::text(prompt)
        }
    }
}

impl GenerateResponse {
    /// The text of the first part of the first candidate.
    fn into_text(self) -> Result<String, ServiceError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ServiceError::Malformed("no content in model response".to_string()))
    }
}

impl GeminiClient {
    /// Create a client for the given model.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            client,
        })
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ServiceError> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .inspect_err(|e| tracing::error!("Gemini API request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {status} - {body}");
            return Err(ServiceError::Status { status, body });
        }

        let response: GenerateResponse = response
            .json()
            .await
            .inspect_err(|e| tracing::error!("Failed to decode Gemini response: {e}"))?;

        response.into_text()
    }
}

fn parse_prompt(raw: &str) -> String {
    format!(
        "You are an ingredient parsing expert. Given the following text from a product's \
         ingredient list, extract and return a JSON array of individual ingredients. Normalize \
         them by converting to lowercase, trimming whitespace, and simplifying compound \
         ingredients (e.g., 'spicy mayo (soybean oil, egg yolk)' becomes 'spicy mayo', 'soybean \
         oil', 'egg yolk'). Ignore quantities, percentages, and descriptors like \"(organic)\". \
         Input: \"{raw}\""
    )
}

fn describe_prompt(name: &str) -> String {
    format!(
        "Provide a concise, easy-to-understand summary for a potential allergen: **{name}**.\n\
         - Start with a brief explanation of what it is.\n\
         - List common product types it is found in.\n\
         - Mention any common alternative names.\n\
         Format the response as simple markdown, using bullet points."
    )
}

fn ingredient_list_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    })
}

/// Decode the model's JSON answer into a list of ingredients.
fn decode_ingredients(text: &str) -> Result<Vec<String>, ServiceError> {
    serde_json::from_str::<Vec<String>>(text.trim())
        .map_err(|e| ServiceError::Malformed(format!("expected a JSON array of strings: {e}")))
}

impl IngredientParser for GeminiClient {
    async fn parse(&self, raw: &str) -> Result<Vec<String>, ServiceError> {
        let request = GenerateRequest::json(parse_prompt(raw), ingredient_list_schema());
        let text = self.generate(request).await?;
        decode_ingredients(&text)
    }
}

impl IngredientDescriber for GeminiClient {
    async fn describe(&self, name: &str) -> Result<String, ServiceError> {
        self.generate(GenerateRequest::text(describe_prompt(name)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_request_uses_camel_case_fields() {
        let request = GenerateRequest::json("prompt".into(), ingredient_list_schema());

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "ARRAY");
    }

    #[test]
    fn text_request_omits_generation_config() {
        let value = serde_json::to_value(GenerateRequest::text("prompt".into())).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn response_text_is_first_part_of_first_candidate() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[\"soy\"]"},{"text":"ignored"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(response.into_text().unwrap(), r#"["soy"]"#);
    }

    #[test]
    fn empty_response_is_malformed() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn decodes_ingredient_array() {
        let ingredients = decode_ingredients(" [\"soy sauce\", \"wheat\"]\n").unwrap();
        assert_eq!(ingredients, ["soy sauce", "wheat"]);
    }

    #[test]
    fn non_array_answer_is_malformed() {
        assert!(matches!(
            decode_ingredients(r#"{"ingredients": []}"#),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn prompts_mention_their_subject() {
        assert!(parse_prompt("Soy, Salt").contains("Input: \"Soy, Salt\""));
        assert!(describe_prompt("soy lecithin").contains("**soy lecithin**"));
    }
}
