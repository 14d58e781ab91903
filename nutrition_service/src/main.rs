use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use nutrition_service::app_config::{config_app, json_config, payload_config};
use nutrition_service::assistant::{NutritionAssistant, OpenRouterAssistant};
use nutrition_service::nutrition_repository::{
    InMemoryNutritionRepository, NutritionRepository, PostgresNutritionRepository,
};
use nutrition_service::settings::Settings;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "nutrition_service";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let settings = Settings::load().expect("Failed to load settings");
    if settings.openrouter_api_key.is_empty() {
        tracing::warn!("OPENROUTER_API_KEY is not set, food image and chat requests will fail");
    }

    let nutrition_repository: Arc<dyn NutritionRepository> = if settings.use_in_memory_db {
        tracing::info!("Using in memory nutrition repository");
        Arc::new(InMemoryNutritionRepository::default())
    } else {
        Arc::new(
            PostgresNutritionRepository::init(settings.postgres_config())
                .await
                .expect("Failed to init postgres"),
        )
    };
    let assistant: Arc<dyn NutritionAssistant> = Arc::new(
        OpenRouterAssistant::new(settings.assistant_config())
            .expect("Failed to create model API client"),
    );

    let max_image_bytes = settings.max_image_bytes;
    tracing::info!("Starting HTTP server at http://0.0.0.0:{}", settings.port);

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(nutrition_repository.clone()))
            .app_data(web::Data::new(assistant.clone()))
            .app_data(payload_config(max_image_bytes))
            .app_data(json_config())
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await
}
