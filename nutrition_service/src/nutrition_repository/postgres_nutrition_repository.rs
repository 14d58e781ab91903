use anyhow::Context;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::{NutritionRecord, NutritionRecordDetails, NutritionRecordId};
use crate::nutrition_repository::{unix_now, NutritionRepository, NutritionRepositoryError};

pub struct PostgresNutritionRepository {
    client: Client,
}

pub struct PostgresNutritionRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresNutritionRepository {
    pub async fn init(config: PostgresNutritionRepositoryConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!(
            "Connecting to postgres at {} as {}",
            config.hostname,
            config.username
        );
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS nutrition_records (
            id              SERIAL PRIMARY KEY,
            created_at      BIGINT NOT NULL,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self { client })
    }
}

fn record_from_row(row: &Row) -> Result<NutritionRecord, NutritionRepositoryError> {
    let details: serde_json::Value = row.try_get(2)?;
    Ok(NutritionRecord {
        record_id: row.try_get(0)?,
        created_at: row.try_get(1)?,
        details: serde_json::from_value(details)?,
    })
}

#[async_trait::async_trait]
impl NutritionRepository for PostgresNutritionRepository {
    async fn add_record(
        &self,
        details: NutritionRecordDetails,
    ) -> Result<NutritionRecord, NutritionRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("INSERT INTO nutrition_records (created_at, params) VALUES ($1, $2) RETURNING id")
            .await?;

        let created_at = unix_now();
        let params = serde_json::to_value(&details)?;
        let rows = self.client.query(&stmt, &[&created_at, &params]).await?;

        let record_id: NutritionRecordId = rows
            .first()
            .ok_or_else(|| NutritionRepositoryError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(NutritionRecord {
            record_id,
            details,
            created_at,
        })
    }

    async fn get_record(
        &self,
        record_id: NutritionRecordId,
    ) -> Result<NutritionRecord, NutritionRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, created_at, params FROM nutrition_records WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&record_id]).await?;

        record_from_row(
            rows.first()
                .ok_or(NutritionRepositoryError::NotFound(record_id))?,
        )
    }

    async fn list_records(&self) -> Result<Vec<NutritionRecord>, NutritionRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, created_at, params FROM nutrition_records ORDER BY id")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn list_records_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<NutritionRecord>, NutritionRepositoryError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT id, created_at, params FROM nutrition_records WHERE params->>'userId' = ($1) ORDER BY id",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&user_id]).await?;
        rows.iter().map(record_from_row).collect()
    }
}
