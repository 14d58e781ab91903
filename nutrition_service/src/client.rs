use anyhow::{bail, Context};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    CalculateNutritionRequest, ChatRequest, ChatResponse, CheckFoodResponse, ErrorResponse,
    GetAllNutritionResponse, NutritionRecord, NutritionRecordDetails, NutritionRecordId,
    NutritionTargetsResponse, SaveNutritionResponse,
};

pub struct NutritionServiceClient {
    url: String,
    client: ClientWithMiddleware,
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<ErrorResponse>()
        .await
        .map(|error| error.error)
        .unwrap_or_else(|_| status.to_string())
}

impl NutritionServiceClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/calculate-nutrition endpoint
    pub async fn calculate_nutrition(
        &self,
        request: &CalculateNutritionRequest,
    ) -> anyhow::Result<NutritionTargetsResponse> {
        let response = self
            .client
            .post(format!("{}/api/calculate-nutrition", self.url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to calculate nutrition {}", error_message(response).await)
        }
        Ok(response.json().await?)
    }

    /// Calls POST /api/nutrition endpoint
    /// Returns the stored record with its id
    pub async fn save_nutrition(
        &self,
        details: &NutritionRecordDetails,
    ) -> anyhow::Result<NutritionRecord> {
        let response = self
            .client
            .post(format!("{}/api/nutrition", self.url))
            .json(details)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to save nutrition {}", error_message(response).await)
        }
        let saved: SaveNutritionResponse = response.json().await?;
        Ok(saved.data)
    }

    /// Calls GET /api/nutrition/{record_id} endpoint
    /// Returns None if the record is not in the repository
    pub async fn get_nutrition(
        &self,
        record_id: NutritionRecordId,
    ) -> anyhow::Result<Option<NutritionRecord>> {
        let response = self
            .client
            .get(format!("{}/api/nutrition/{}", self.url, record_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get nutrition {}", error_message(response).await)
        }
    }

    /// Calls GET /api/nutrition endpoint, optionally only for one user
    pub async fn list_nutrition(
        &self,
        user_id: Option<&str>,
    ) -> anyhow::Result<Vec<NutritionRecord>> {
        let mut request = self.client.get(format!("{}/api/nutrition", self.url));
        if let Some(user_id) = user_id {
            request = request.query(&[("userId", user_id)]);
        }
        let response = request.send().await?;

        if response.status().is_success() {
            let all: GetAllNutritionResponse = response.json().await?;
            Ok(all.records)
        } else {
            bail!("Failed to list nutrition {}", error_message(response).await)
        }
    }

    /// Calls POST /api/check-food endpoint with the image as request body
    pub async fn check_food(
        &self,
        image: Vec<u8>,
        mime_type: &str,
    ) -> anyhow::Result<CheckFoodResponse> {
        let response = self
            .client
            .post(format!("{}/api/check-food", self.url))
            .header(CONTENT_TYPE, mime_type)
            .body(image)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to check food {}", error_message(response).await)
        }
        Ok(response.json().await?)
    }

    /// Calls POST /api/chat endpoint, returns the reply
    pub async fn chat(&self, message: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to chat {}", error_message(response).await)
        }
        let reply: ChatResponse = response.json().await?;
        Ok(reply.reply)
    }
}
