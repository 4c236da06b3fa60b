//! Best-effort generative-AI food assistance.
//!
//! Four narrow operations sit behind the `NutritionAi` trait: food
//! recognition from a photo, calorie lookup from free text, the
//! conversational assistant, and photo editing. Every call degrades to a
//! safe default on failure; nothing here ever surfaces an error into the
//! recording flow.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model for food recognition and calorie search.
const TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Model for the conversational assistant.
const CHAT_MODEL: &str = "gemini-3-pro-preview";

/// Model for image editing.
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const ANALYZE_PROMPT: &str = "Identify the food in this image and estimate its calories in a \
                              typical portion size. Return JSON with 'name' and 'calories' \
                              (number).";

const CHAT_PERSONA: &str = "You are a friendly nutrition coach. Keep replies under 100 words, \
                            prefer short sentences and lists, avoid clinical jargon, focus on a \
                            healthy relationship with food rather than calorie anxiety, and give \
                            concrete, actionable suggestions when asked about meals.";

/// Reply shown when the assistant is unreachable.
const CHAT_FALLBACK: &str = "Remember to drink enough water and be kind to yourself today. Every \
                             small healthy choice counts!";

/// A recognized food item with estimated calories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodScan {
    pub name: String,
    pub calories: f64,
}

/// A calorie lookup result for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSearchHit {
    pub name: String,
    pub calories: f64,
    pub unit: String,
}

/// Which side of the conversation a turn belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the assistant conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

/// Reply text from the assistant.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub text: String,
}

/// Best-effort food assistance. `None` (or the fallback reply for chat)
/// signals failure; no method propagates an error to the caller.
#[async_trait]
pub trait NutritionAi: Send + Sync {
    /// Identifies the food in a photo and estimates its calories.
    async fn analyze_image(&self, image: &[u8]) -> Option<FoodScan>;

    /// Looks up average calories for a free-text food query.
    async fn search_food(&self, query: &str) -> Option<FoodSearchHit>;

    /// Continues the assistant conversation. The caller owns the history,
    /// one conversation per login session.
    async fn chat(&self, history: &[ChatTurn], message: &str) -> ChatReply;

    /// Applies an edit instruction to a photo, returning the new image
    /// bytes.
    async fn edit_image(&self, image: &[u8], instruction: &str) -> Option<Vec<u8>>;
}

/// Gemini-backed implementation of [`NutritionAi`].
///
/// A missing API key is not a startup error: calls short-circuit to their
/// safe defaults instead.
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, api_key }
    }

    fn key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| anyhow!("no API key configured"))
    }

    async fn generate(&self, model: &str, body: Value) -> Result<Value> {
        let url = format!(
            "{GEMINI_BASE_URL}/models/{model}:generateContent?key={}",
            self.key()?
        );

        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            anyhow::bail!("generateContent failed with {status}: {error}");
        }

        Ok(response.json().await?)
    }

    /// Text of the first candidate part carrying any.
    fn first_text(response: &Value) -> Option<String> {
        response["candidates"][0]["content"]["parts"]
            .as_array()?
            .iter()
            .find_map(|part| part["text"].as_str())
            .map(str::to_string)
    }

    /// Decoded bytes of the first candidate part carrying inline image data.
    fn first_inline_image(response: &Value) -> Option<Vec<u8>> {
        response["candidates"][0]["content"]["parts"]
            .as_array()?
            .iter()
            .find_map(|part| part["inlineData"]["data"].as_str())
            .and_then(|data| BASE64.decode(data).ok())
    }

    async fn try_analyze_image(&self, image: &[u8]) -> Result<FoodScan> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "image/jpeg", "data": BASE64.encode(image) } },
                    { "text": ANALYZE_PROMPT },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "calories": { "type": "NUMBER" }
                    },
                    "required": ["name", "calories"]
                }
            }
        });

        let response = self.generate(TEXT_MODEL, body).await?;
        let text = Self::first_text(&response).ok_or_else(|| anyhow!("empty response"))?;
        serde_json::from_str(&text).context("unparseable recognition result")
    }

    async fn try_search_food(&self, query: &str) -> Result<FoodSearchHit> {
        let body = json!({
            "contents": [{
                "parts": [{
                    "text": format!(
                        "Search for the average calorie content of: {query}. Return the result \
                         in JSON with 'name', 'calories' (number per serving), and 'unit'."
                    )
                }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "calories": { "type": "NUMBER" },
                        "unit": { "type": "STRING" }
                    },
                    "required": ["name", "calories", "unit"]
                }
            }
        });

        let response = self.generate(TEXT_MODEL, body).await?;
        let text = Self::first_text(&response).ok_or_else(|| anyhow!("empty response"))?;
        serde_json::from_str(&text).context("unparseable search result")
    }

    async fn try_chat(&self, history: &[ChatTurn], message: &str) -> Result<String> {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    },
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": message }] }));

        let body = json!({
            "contents": contents,
            "systemInstruction": { "parts": [{ "text": CHAT_PERSONA }] },
            "generationConfig": { "temperature": 0.7 }
        });

        let response = self.generate(CHAT_MODEL, body).await?;
        Self::first_text(&response).ok_or_else(|| anyhow!("assistant returned no text"))
    }

    async fn try_edit_image(&self, image: &[u8], instruction: &str) -> Result<Vec<u8>> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "image/jpeg", "data": BASE64.encode(image) } },
                    { "text": instruction },
                ]
            }]
        });

        let response = self.generate(IMAGE_MODEL, body).await?;
        Self::first_inline_image(&response).ok_or_else(|| anyhow!("no image in response"))
    }
}

#[async_trait]
impl NutritionAi for GeminiClient {
    async fn analyze_image(&self, image: &[u8]) -> Option<FoodScan> {
        match self.try_analyze_image(image).await {
            Ok(scan) => Some(scan),
            Err(e) => {
                warn!("Food image analysis failed: {e:#}");
                None
            }
        }
    }

    async fn search_food(&self, query: &str) -> Option<FoodSearchHit> {
        match self.try_search_food(query).await {
            Ok(hit) => Some(hit),
            Err(e) => {
                warn!("Calorie search failed: {e:#}");
                None
            }
        }
    }

    async fn chat(&self, history: &[ChatTurn], message: &str) -> ChatReply {
        match self.try_chat(history, message).await {
            Ok(text) => ChatReply { text },
            Err(e) => {
                warn!("Assistant chat failed: {e:#}");
                ChatReply {
                    text: CHAT_FALLBACK.to_string(),
                }
            }
        }
    }

    async fn edit_image(&self, image: &[u8], instruction: &str) -> Option<Vec<u8>> {
        match self.try_edit_image(image, instruction).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Image edit failed: {e:#}");
                None
            }
        }
    }
}

/// Deterministic stand-in for tests: fixed responses, no network.
#[cfg(test)]
pub struct CannedAi {
    pub scan: Option<FoodScan>,
    pub hit: Option<FoodSearchHit>,
    pub reply: String,
}

#[cfg(test)]
impl Default for CannedAi {
    fn default() -> Self {
        Self {
            scan: Some(FoodScan {
                name: "Oatmeal bowl".to_string(),
                calories: 310.0,
            }),
            hit: Some(FoodSearchHit {
                name: "Oatmeal bowl".to_string(),
                calories: 310.0,
                unit: "bowl".to_string(),
            }),
            reply: "Sounds like a balanced choice.".to_string(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl NutritionAi for CannedAi {
    async fn analyze_image(&self, _image: &[u8]) -> Option<FoodScan> {
        self.scan.clone()
    }

    async fn search_food(&self, _query: &str) -> Option<FoodSearchHit> {
        self.hit.clone()
    }

    async fn chat(&self, _history: &[ChatTurn], _message: &str) -> ChatReply {
        ChatReply {
            text: self.reply.clone(),
        }
    }

    async fn edit_image(&self, image: &[u8], _instruction: &str) -> Option<Vec<u8>> {
        Some(image.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_extracts_candidate_part() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "{\"name\":\"Apple\",\"calories\":95}" }]
                }
            }]
        });

        let text = GeminiClient::first_text(&response).unwrap();
        let scan: FoodScan = serde_json::from_str(&text).unwrap();
        assert_eq!(scan.name, "Apple");
        assert_eq!(scan.calories, 95.0);
    }

    #[test]
    fn test_first_text_handles_missing_candidates() {
        assert!(GeminiClient::first_text(&json!({})).is_none());
        assert!(GeminiClient::first_text(&json!({ "candidates": [] })).is_none());
    }

    #[test]
    fn test_first_inline_image_decodes_base64() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": BASE64.encode(b"png-bytes") } }
                    ]
                }
            }]
        });

        assert_eq!(
            GeminiClient::first_inline_image(&response).as_deref(),
            Some(b"png-bytes".as_slice())
        );
    }

    #[test]
    fn test_first_inline_image_none_without_image_part() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "no image" }] } }]
        });
        assert!(GeminiClient::first_inline_image(&response).is_none());
    }

    #[tokio::test]
    async fn test_gemini_without_key_degrades_to_defaults() {
        let client = GeminiClient::new(None);
        assert!(client.analyze_image(b"jpeg").await.is_none());
        assert!(client.search_food("latte").await.is_none());
        assert_eq!(client.chat(&[], "hello").await.text, CHAT_FALLBACK);
        assert!(client.edit_image(b"jpeg", "brighter").await.is_none());
    }

    #[tokio::test]
    async fn test_canned_ai_is_deterministic() {
        let ai = CannedAi::default();
        let scan = ai.analyze_image(b"jpeg").await.unwrap();
        assert_eq!(scan.name, "Oatmeal bowl");

        let reply = ai.chat(&[], "what should I eat?").await;
        assert_eq!(reply.text, "Sounds like a balanced choice.");

        let edited = ai.edit_image(b"jpeg", "crop").await.unwrap();
        assert_eq!(edited, b"jpeg");
    }

    #[tokio::test]
    async fn test_canned_ai_can_simulate_recognition_failure() {
        let ai = CannedAi {
            scan: None,
            hit: None,
            ..CannedAi::default()
        };
        assert!(ai.analyze_image(b"jpeg").await.is_none());
        assert!(ai.search_food("mystery dish").await.is_none());
    }
}
