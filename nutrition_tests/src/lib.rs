//! Tests that drive a running nutrition service over HTTP.
//!
//! Start the service (e.g. with `USE_IN_MEMORY_DB=true`) and run
//! `cargo test -p nutrition_tests --features system_tests`.
//! `NUTRITION_SERVICE_URL` overrides the default address.

use rand::seq::SliceRandom;
use rand::Rng;

use nutrition_service::api::{CalculateNutritionRequest, NutritionRecordDetails};


#[cfg(all(test, feature = "load_tests"))]
mod load_test;

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

const ACTIVITY_LABELS: [&str; 8] = [
    "Sedentary",
    "Poco activo",
    "Normal",
    "Activo",
    "Muy activo",
    "LightlyActive",
    "Active",
    "VeryActive",
];
const GOAL_LABELS: [&str; 3] = ["Gain", "Lose", "Maintain"];
const GENDER_LABELS: [&str; 2] = ["Male", "Female"];

pub fn service_url() -> String {
    std::env::var("NUTRITION_SERVICE_URL").unwrap_or(DEFAULT_SERVICE_URL.to_string())
}

fn pick(rng: &mut impl Rng, labels: &[&str]) -> String {
    labels
        .choose(rng)
        .map(|label| label.to_string())
        .unwrap_or_default()
}

/// Random but plausible adult profile
pub fn generate_profile_request(rng: &mut impl Rng) -> CalculateNutritionRequest {
    CalculateNutritionRequest {
        gender: Some(pick(rng, &GENDER_LABELS)),
        age: f64::from(rng.gen_range(18..80_u32)),
        height: f64::from(rng.gen_range(150..200_u32)),
        weight: f64::from(rng.gen_range(45..130_u32)),
        trains_per_week: rng.gen_range(0..7),
        activity: Some(pick(rng, &ACTIVITY_LABELS)),
        goal: Some(pick(rng, &GOAL_LABELS)),
    }
}

/// Record as the frontend saves it after showing the calculated targets
pub fn record_for(
    request: &CalculateNutritionRequest,
    calories: u32,
    protein: u32,
    fat: u32,
    carbs: u32,
    user_id: Option<String>,
) -> NutritionRecordDetails {
    NutritionRecordDetails {
        gender: request.gender.clone().unwrap_or("Male".to_string()),
        age: request.age,
        height: request.height,
        weight: request.weight,
        trains_per_week: request.trains_per_week,
        activity: request.activity.clone().unwrap_or("Normal".to_string()),
        goal: request.goal.clone().unwrap_or("Maintain".to_string()),
        calories: f64::from(calories),
        protein: f64::from(protein),
        fat: f64::from(fat),
        carbs: f64::from(carbs),
        note: "".to_string(),
        date: None,
        user_id,
    }
}
