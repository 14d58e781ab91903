use std::sync::Arc;

use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::web::{Bytes, Data};
use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    CalculateNutritionRequest, ChatRequest, ChatResponse, CheckFoodResponse, ErrorResponse,
    FoodAnalysis, GetAllNutritionResponse, NutritionRecordDetails, NutritionRecordId,
    NutritionRecordsQuery, NutritionTargetsResponse, SaveNutritionResponse,
};
use crate::assistant::NutritionAssistant;
use crate::nutrition_repository::{unix_now, NutritionRepository, NutritionRepositoryError};

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn calculate_nutrition(
    request: web::Json<CalculateNutritionRequest>,
) -> Result<HttpResponse, Error> {
    let resolved = match request.resolve_profile() {
        Ok(resolved) => resolved,
        Err(err) => return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string()))),
    };
    if !resolved.defaulted.is_empty() {
        tracing::warn!(
            "Calculating nutrition with defaults for {:?}",
            resolved.defaulted
        );
    }

    Ok(match nutrition_targets::compute(&resolved.profile) {
        Ok(targets) => {
            HttpResponse::Ok().json(NutritionTargetsResponse::new(targets, resolved.defaulted))
        }
        Err(err) => HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())),
    })
}

#[api_v2_operation]
pub async fn save_nutrition(
    nutrition_repository: Data<Arc<dyn NutritionRepository>>,
    details: web::Json<NutritionRecordDetails>,
) -> Result<HttpResponse, Error> {
    let mut details = details.into_inner();
    if let Err(err) = details.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())));
    }
    details.date.get_or_insert_with(unix_now);

    Ok(match nutrition_repository.add_record(details).await {
        Ok(record) => HttpResponse::Ok()
            .append_header((LOCATION, format!("/api/nutrition/{}", record.record_id)))
            .json(SaveNutritionResponse {
                message: "Nutrition plan saved successfully".to_string(),
                data: record,
            }),
        Err(err) => {
            tracing::error!("Save nutrition failed {}", err);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Error saving nutrition plan"))
        }
    })
}

#[api_v2_operation]
pub async fn get_all_nutrition(
    nutrition_repository: Data<Arc<dyn NutritionRepository>>,
    query: web::Query<NutritionRecordsQuery>,
) -> Result<HttpResponse, Error> {
    let records = match &query.user_id {
        Some(user_id) => nutrition_repository.list_records_for_user(user_id).await,
        None => nutrition_repository.list_records().await,
    };

    Ok(match records {
        Ok(records) => HttpResponse::Ok().json(GetAllNutritionResponse { records }),
        Err(err) => {
            tracing::error!("Get all nutrition failed {}", err);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to fetch nutrition data"))
        }
    })
}

#[api_v2_operation]
pub async fn get_nutrition(
    nutrition_repository: Data<Arc<dyn NutritionRepository>>,
    record_id: web::Path<NutritionRecordId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match nutrition_repository.get_record(record_id.into_inner()).await {
            Ok(record) => HttpResponse::Ok().json(record),
            Err(NutritionRepositoryError::NotFound(_)) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Get nutrition failed {}", err);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("Failed to fetch nutrition data"))
            }
        },
    )
}

/// Accepts a raw image body, the content type must be an image type
#[api_v2_operation]
pub async fn check_food(
    assistant: Data<Arc<dyn NutritionAssistant>>,
    request: HttpRequest,
    image: Bytes,
) -> Result<HttpResponse, Error> {
    if image.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("No image uploaded")));
    }
    let mime_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| value.starts_with("image/"));
    let Some(mime_type) = mime_type else {
        return Ok(
            HttpResponse::BadRequest().json(ErrorResponse::new("Uploaded file is not an image"))
        );
    };

    Ok(match assistant.analyze_food_image(&image, mime_type).await {
        Ok(result) => {
            let analysis = FoodAnalysis::from_model_reply(&result);
            if analysis.is_none() {
                tracing::warn!("Model reply for food image is not nutrition JSON");
            }
            HttpResponse::Ok().json(CheckFoodResponse { result, analysis })
        }
        Err(err) => {
            tracing::error!("Food image analysis failed {}", err);
            HttpResponse::BadGateway().json(ErrorResponse::new("Error analyzing image"))
        }
    })
}

#[api_v2_operation]
pub async fn chat(
    assistant: Data<Arc<dyn NutritionAssistant>>,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse, Error> {
    let message = request.message.trim();
    if message.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("Message is empty")));
    }

    Ok(match assistant.chat(message).await {
        Ok(reply) => HttpResponse::Ok().json(ChatResponse { reply }),
        Err(err) => {
            tracing::error!("Chat completion failed {}", err);
            HttpResponse::BadGateway().json(ErrorResponse::new("Error getting a reply"))
        }
    })
}
