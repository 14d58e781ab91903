use actix_web::error::InternalError;
use actix_web::web::{JsonConfig, PayloadConfig};
use actix_web::HttpResponse;
use paperclip::actix::web;

use crate::api::ErrorResponse;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(
                    web::resource("/calculate-nutrition")
                        .route(web::post().to(handlers::calculate_nutrition)),
                )
                .service(
                    web::scope("/nutrition")
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::get_all_nutrition))
                                .route(web::post().to(handlers::save_nutrition)),
                        )
                        .service(
                            web::resource("/{record_id}")
                                .route(web::get().to(handlers::get_nutrition)),
                        ),
                )
                .service(web::resource("/check-food").route(web::post().to(handlers::check_food)))
                .service(web::resource("/chat").route(web::post().to(handlers::chat))),
        );
}

/// Size limit of raw request bodies, larger uploads are answered with 413
pub fn payload_config(max_image_bytes: usize) -> PayloadConfig {
    PayloadConfig::new(max_image_bytes)
}

/// Answers JSON bodies that cannot be deserialized with 400 and an `{error}` body
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _request| {
        let message = format!("Invalid request body: {}", err);
        InternalError::from_response(err, HttpResponse::BadRequest().json(ErrorResponse::new(message)))
            .into()
    })
}
