use rand::thread_rng;

use nutrition_service::client::NutritionServiceClient;

use crate::{generate_profile_request, record_for, service_url};

#[tokio::test]
/// Calculates and saves lots of random profiles,
/// checks every result against the local calculation
async fn calculate_and_save_lots_of_profiles() {
    const NO_OF_PROFILES: usize = 200;
    const NO_OF_USERS: usize = 10;

    let mut rng = thread_rng();
    let client = NutritionServiceClient::new(&service_url()).expect("Failed to create client");

    let run_id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let users = (0..NO_OF_USERS)
        .map(|user_no| format!("load-test-{}-{}", run_id, user_no))
        .collect::<Vec<_>>();

    for profile_no in 0..NO_OF_PROFILES {
        let request = generate_profile_request(&mut rng);
        let targets = client
            .calculate_nutrition(&request)
            .await
            .expect("Failed to calculate");

        let resolved = request.resolve_profile().expect("Generated invalid profile");
        let expected = nutrition_targets::compute(&resolved.profile).expect("Failed to compute");
        assert_eq!(
            (targets.calories, targets.protein, targets.fat, targets.carbs),
            (expected.calories, expected.protein, expected.fat, expected.carbs)
        );

        let user_id = users[profile_no % NO_OF_USERS].clone();
        let saved = client
            .save_nutrition(&record_for(
                &request,
                targets.calories,
                targets.protein,
                targets.fat,
                targets.carbs,
                Some(user_id),
            ))
            .await
            .expect("Failed to save nutrition");
        println!("Saved record {}", saved.record_id);
    }

    for user_id in users {
        let records = client
            .list_nutrition(Some(&user_id))
            .await
            .expect("Failed to list nutrition");
        assert_eq!(records.len(), NO_OF_PROFILES / NO_OF_USERS);
    }
}
