pub use open_router_assistant::{OpenRouterAssistant, OpenRouterAssistantConfig};

mod open_router_assistant;

#[derive(thiserror::Error, Debug)]
pub enum AssistantError {
    #[error("Request to model API failed {0}")]
    RequestFailure(#[from] reqwest_middleware::Error),

    #[error("Model API responded with status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode model API response {0}")]
    DecodingFailure(#[from] reqwest::Error),

    #[error("Model API returned no reply")]
    EmptyReply,
}

/// Hosted language model the service relays food images and chat messages to
#[async_trait::async_trait]
pub trait NutritionAssistant: Send + Sync {
    /// Asks the model for the nutrition facts of the food in the image,
    /// returns the reply text as is
    async fn analyze_food_image(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, AssistantError>;

    async fn chat(&self, message: &str) -> Result<String, AssistantError>;
}
