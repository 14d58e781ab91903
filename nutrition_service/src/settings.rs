use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::assistant::OpenRouterAssistantConfig;
use crate::nutrition_repository::PostgresNutritionRepositoryConfig;

const CONFIG_FILE_NAME: &str = "nutrition_service";

/// Service settings.
///
/// Read from defaults, then an optional `nutrition_service.{toml,yaml,json}`
/// file in the working directory, then environment variables named after the
/// fields in upper case (`PORT`, `USE_IN_MEMORY_DB`, `OPENROUTER_API_KEY`, ...).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub use_in_memory_db: bool,
    pub db_host: String,
    pub db_username: String,
    pub db_password: String,
    pub openrouter_base_url: String,
    pub openrouter_api_key: String,
    pub model_name: String,
    pub assistant_max_retries: u32,
    pub assistant_timeout_seconds: u64,
    /// Largest accepted food image upload
    pub max_image_bytes: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_environment(Environment::default().try_parsing(true))
    }

    fn load_with_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("port", 5000_i64)?
            .set_default("use_in_memory_db", false)?
            .set_default("db_host", "127.0.0.1")?
            .set_default("db_username", "postgres")?
            .set_default("db_password", "postgres")?
            .set_default("openrouter_base_url", "https://openrouter.ai/api/v1")?
            .set_default("openrouter_api_key", "")?
            .set_default("model_name", "openai/gpt-4o-mini")?
            .set_default("assistant_max_retries", 2_i64)?
            .set_default("assistant_timeout_seconds", 60_i64)?
            .set_default("max_image_bytes", 10_i64 * 1024 * 1024)?
            .add_source(File::with_name(CONFIG_FILE_NAME).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn postgres_config(&self) -> PostgresNutritionRepositoryConfig {
        PostgresNutritionRepositoryConfig {
            hostname: self.db_host.clone(),
            username: self.db_username.clone(),
            password: self.db_password.clone(),
        }
    }

    pub fn assistant_config(&self) -> OpenRouterAssistantConfig {
        OpenRouterAssistantConfig {
            base_url: self.openrouter_base_url.clone(),
            api_key: self.openrouter_api_key.clone(),
            model: self.model_name.clone(),
            max_retries: self.assistant_max_retries,
            timeout: Duration::from_secs(self.assistant_timeout_seconds),
        }
    }
}
