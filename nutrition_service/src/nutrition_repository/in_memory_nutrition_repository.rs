use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{NutritionRecord, NutritionRecordDetails, NutritionRecordId};
use crate::nutrition_repository::{unix_now, NutritionRepository, NutritionRepositoryError};

pub struct InMemoryNutritionRepository {
    record_sequence_generator: AtomicI32,
    records: parking_lot::RwLock<BTreeMap<NutritionRecordId, NutritionRecord>>,
}

impl Default for InMemoryNutritionRepository {
    fn default() -> Self {
        Self {
            // same first id as a postgres SERIAL column
            record_sequence_generator: AtomicI32::new(1),
            records: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl NutritionRepository for InMemoryNutritionRepository {
    async fn add_record(
        &self,
        details: NutritionRecordDetails,
    ) -> Result<NutritionRecord, NutritionRepositoryError> {
        let record_id = self
            .record_sequence_generator
            .fetch_add(1, Ordering::Relaxed);
        let record = NutritionRecord {
            record_id,
            details,
            created_at: unix_now(),
        };
        self.records.write().insert(record_id, record.clone());
        Ok(record)
    }

    async fn get_record(
        &self,
        record_id: NutritionRecordId,
    ) -> Result<NutritionRecord, NutritionRepositoryError> {
        self.records
            .read()
            .get(&record_id)
            .cloned()
            .ok_or(NutritionRepositoryError::NotFound(record_id))
    }

    async fn list_records(&self) -> Result<Vec<NutritionRecord>, NutritionRepositoryError> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn list_records_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<NutritionRecord>, NutritionRepositoryError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|record| record.details.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod in_memory_nutrition_repository_tests {
    use crate::api::NutritionRecordDetails;
    use crate::nutrition_repository::{
        InMemoryNutritionRepository, NutritionRepository, NutritionRepositoryError,
    };

    fn record_details() -> NutritionRecordDetails {
        NutritionRecordDetails {
            gender: "Male".to_string(),
            age: 25.0,
            height: 180.0,
            weight: 80.0,
            trains_per_week: 3,
            activity: "Normal".to_string(),
            goal: "Maintain".to_string(),
            calories: 2798.0,
            protein: 210.0,
            fat: 93.0,
            carbs: 280.0,
            note: "".to_string(),
            date: Some(1_700_000_000),
            user_id: None,
        }
    }

    #[tokio::test]
    /// Tests if add_record and get_record work correctly
    async fn test_add_record_and_get_it() {
        let repo = InMemoryNutritionRepository::default();

        let not_existing_record_id = 20000;
        let record_not_found = repo.get_record(not_existing_record_id).await;
        assert!(matches!(
            record_not_found,
            Err(NutritionRepositoryError::NotFound(..))
        ));

        let added = repo
            .add_record(record_details())
            .await
            .expect("Failed to add record");
        assert_eq!(added.details, record_details());

        let record = repo
            .get_record(added.record_id)
            .await
            .expect("Failed to get record");
        assert_eq!(record, added);
    }

    #[tokio::test]
    /// Tests if list_records and list_records_for_user work correctly
    async fn test_add_records_and_list_them() {
        let repo = InMemoryNutritionRepository::default();

        let list = repo.list_records().await.expect("Failed to list records");
        assert_eq!(list, vec![]);

        let first = repo
            .add_record(NutritionRecordDetails {
                user_id: Some("user1".to_string()),
                ..record_details()
            })
            .await
            .expect("Failed to add record");
        let second = repo
            .add_record(NutritionRecordDetails {
                goal: "Gain".to_string(),
                calories: 3098.0,
                ..record_details()
            })
            .await
            .expect("Failed to add record");
        let third = repo
            .add_record(NutritionRecordDetails {
                user_id: Some("user1".to_string()),
                note: "after holidays".to_string(),
                ..record_details()
            })
            .await
            .expect("Failed to add record");

        assert!(first.record_id < second.record_id && second.record_id < third.record_id);

        let list = repo.list_records().await.expect("Failed to list records");
        assert_eq!(list, vec![first.clone(), second, third.clone()]);

        let user_list = repo
            .list_records_for_user("user1")
            .await
            .expect("Failed to list records");
        assert_eq!(user_list, vec![first, third]);

        let other_user_list = repo
            .list_records_for_user("user2")
            .await
            .expect("Failed to list records");
        assert_eq!(other_user_list, vec![]);
    }
}
