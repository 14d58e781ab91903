use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;
use serde::{Deserialize, Serialize};

use crate::assistant::{AssistantError, NutritionAssistant};

const FOOD_ANALYSIS_SYSTEM_PROMPT: &str = "You are an AI nutritionist. \
If the image contains food, analyze it and respond ONLY with JSON in this format: \
{\"Calories\": 0, \"Protein\": 0, \"Fat\": 0, \"Carbohydrates\": 0, \"Healthiness\": \"Healthy\" or \"Unhealthy\"}. \
Return exact numbers only. Do not use ranges. Do not add units (g, kg, kcal).";

const FOOD_ANALYSIS_USER_PROMPT: &str = "Analyze this image and tell me if it contains food. \
If it does, give its nutrition facts and whether it looks healthy or unhealthy.";

const CHAT_SYSTEM_PROMPT: &str = "You are an AI nutritionist helping a user of a nutrition tracking app. \
Answer briefly and practically.";

pub struct OpenRouterAssistantConfig {
    /// Base url of an OpenAI compatible API, e.g. https://openrouter.ai/api/v1
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_retries: u32,
    pub timeout: Duration,
}

/// Chat completions client for OpenRouter or any other OpenAI compatible endpoint
pub struct OpenRouterAssistant {
    completions_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: ClientWithMiddleware,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Message {
    fn system(text: &str) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.to_string()),
        }
    }

    fn user(text: &str) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.to_string()),
        }
    }

    fn user_with_image(text: &str, image: &[u8], mime_type: &str) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: text.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", mime_type, STANDARD.encode(image)),
                    },
                },
            ]),
        }
    }
}

impl OpenRouterAssistant {
    pub fn new(config: OpenRouterAssistantConfig) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            completions_url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            model: config.model,
            timeout: config.timeout,
            client,
        })
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, AssistantError> {
        tracing::debug!("Sending completion request to model {}", self.model);
        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::UnexpectedStatus { status, body });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AssistantError::EmptyReply)
    }
}

#[async_trait::async_trait]
impl NutritionAssistant for OpenRouterAssistant {
    async fn analyze_food_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, AssistantError> {
        tracing::info!(
            "Analyzing food image of {} bytes ({})",
            image.len(),
            mime_type
        );
        self.complete(vec![
            Message::system(FOOD_ANALYSIS_SYSTEM_PROMPT),
            Message::user_with_image(FOOD_ANALYSIS_USER_PROMPT, image, mime_type),
        ])
        .await
    }

    async fn chat(&self, message: &str) -> Result<String, AssistantError> {
        self.complete(vec![
            Message::system(CHAT_SYSTEM_PROMPT),
            Message::user(message),
        ])
        .await
    }
}
