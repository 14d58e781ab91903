pub use in_memory_nutrition_repository::InMemoryNutritionRepository;
pub use postgres_nutrition_repository::{
    PostgresNutritionRepository, PostgresNutritionRepositoryConfig,
};

use crate::api::{NutritionRecord, NutritionRecordDetails, NutritionRecordId};

mod in_memory_nutrition_repository;
mod postgres_nutrition_repository;

#[derive(thiserror::Error, Debug)]
pub enum NutritionRepositoryError {
    #[error("Nutrition record {0} not found")]
    NotFound(NutritionRecordId),

    #[error("Failed to deserialize nutrition record: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait NutritionRepository: Send + Sync {
    /// Stores the record, returns it with the assigned id and creation time
    async fn add_record(
        &self,
        details: NutritionRecordDetails,
    ) -> Result<NutritionRecord, NutritionRepositoryError>;
    async fn get_record(
        &self,
        record_id: NutritionRecordId,
    ) -> Result<NutritionRecord, NutritionRepositoryError>;
    /// Lists all records ordered by id
    async fn list_records(&self) -> Result<Vec<NutritionRecord>, NutritionRepositoryError>;
    /// Lists records saved with the given user id, ordered by id
    async fn list_records_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<NutritionRecord>, NutritionRepositoryError>;
}

/// Current unix time in seconds
pub(crate) fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
