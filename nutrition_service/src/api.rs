use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

use nutrition_targets::{
    ActivityLevel, Gender, Goal, InvalidProfile, NutritionTargets, Profile, UnknownLabel,
};

pub type NutritionRecordId = i32;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Body of the calculate nutrition request.
/// Labels are free text, unknown or missing labels fall back to defaults which are reported in the response
pub struct CalculateNutritionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: f64,
    /// Centimeters
    #[serde(default)]
    pub height: f64,
    /// Kilograms
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub trains_per_week: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Profile resolved from a request, together with the names of the fields that fell back to defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub profile: Profile,
    pub defaulted: Vec<String>,
}

impl CalculateNutritionRequest {
    /// Resolves labels and biometrics into a [`Profile`].
    /// Unknown gender counts as female, unknown activity as sedentary and unknown goal as maintain
    pub fn resolve_profile(&self) -> Result<ResolvedProfile, InvalidProfile> {
        let mut defaulted = vec![];
        let gender = resolve_label(&self.gender, "gender", Gender::Female, &mut defaulted);
        let activity_level = resolve_label(
            &self.activity,
            "activity",
            ActivityLevel::default(),
            &mut defaulted,
        );
        let goal = resolve_label(&self.goal, "goal", Goal::default(), &mut defaulted);

        let profile = Profile {
            gender,
            age: Profile::age_from_number(self.age)?,
            height: self.height,
            weight: self.weight,
            trains_per_week: self.trains_per_week,
            activity_level,
            goal,
        };
        profile.validate()?;

        Ok(ResolvedProfile { profile, defaulted })
    }
}

fn resolve_label<T>(
    label: &Option<String>,
    field: &str,
    fallback: T,
    defaulted: &mut Vec<String>,
) -> T
where
    T: std::str::FromStr,
{
    match label.as_deref().map(|label| label.parse::<T>()) {
        Some(Ok(value)) => value,
        _ => {
            defaulted.push(field.to_string());
            fallback
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Daily calorie target in kcal and macros in grams
pub struct NutritionTargetsResponse {
    pub calories: u32,
    pub protein: u32,
    pub fat: u32,
    pub carbs: u32,
    /// Request fields that were missing or not recognized and were replaced by defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted: Vec<String>,
}

impl NutritionTargetsResponse {
    pub fn new(targets: NutritionTargets, defaulted: Vec<String>) -> Self {
        Self {
            calories: targets.calories,
            protein: targets.protein,
            fat: targets.fat,
            carbs: targets.carbs,
            defaulted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

fn default_gender() -> String {
    "Male".to_string()
}

fn default_activity() -> String {
    "Normal".to_string()
}

fn default_goal() -> String {
    "Maintain".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Nutrition plan saved by the user, the profile it was computed for and the resulting targets
pub struct NutritionRecordDetails {
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub trains_per_week: u32,
    #[serde(default = "default_activity")]
    pub activity: String,
    #[serde(default = "default_goal")]
    pub goal: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub note: String,
    /// Unix timestamp in seconds, the save time when not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordValidationError {
    #[error("Missing required fields (age/height/weight/calories)")]
    MissingRequiredFields,

    #[error("Field {field} must be a non-negative number, got {value}")]
    InvalidMacro { field: &'static str, value: f64 },

    #[error("Gender must be Male or Female: {0}")]
    InvalidGender(#[from] UnknownLabel),
}

impl NutritionRecordDetails {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        let required = [self.age, self.height, self.weight, self.calories];
        if required.iter().any(|value| !value.is_finite() || *value <= 0.0) {
            return Err(RecordValidationError::MissingRequiredFields);
        }

        for (field, value) in [
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RecordValidationError::InvalidMacro { field, value });
            }
        }

        self.gender.parse::<Gender>()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRecord {
    pub record_id: NutritionRecordId,
    pub details: NutritionRecordDetails,
    /// Unix timestamp in seconds
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct SaveNutritionResponse {
    pub message: String,
    pub data: NutritionRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct GetAllNutritionResponse {
    pub records: Vec<NutritionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRecordsQuery {
    /// Only return records of this user
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Nutrition facts the model was asked to return for a food image
pub struct FoodAnalysis {
    #[serde(rename = "Calories")]
    pub calories: f64,
    #[serde(rename = "Protein")]
    pub protein: f64,
    #[serde(rename = "Fat")]
    pub fat: f64,
    #[serde(rename = "Carbohydrates")]
    pub carbohydrates: f64,
    /// "Healthy" or "Unhealthy"
    #[serde(rename = "Healthiness", default)]
    pub healthiness: String,
}

impl FoodAnalysis {
    /// Extracts the JSON object from a model reply.
    /// Models tend to wrap it in a markdown code fence or add a sentence around it,
    /// so everything outside the outermost braces is ignored
    pub fn from_model_reply(reply: &str) -> Option<Self> {
        let start = reply.find('{')?;
        let end = reply.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str(&reply[start..=end]).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct CheckFoodResponse {
    /// Reply of the model as is
    pub result: String,
    /// Parsed reply, absent when the model did not answer with the requested JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FoodAnalysis>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ChatResponse {
    pub reply: String,
}

#[cfg(test)]
mod api_tests {
    use nutrition_targets::{ActivityLevel, Gender, Goal, InvalidProfile};

    use super::*;

    fn request() -> CalculateNutritionRequest {
        CalculateNutritionRequest {
            gender: Some("Male".to_string()),
            age: 25.0,
            height: 180.0,
            weight: 80.0,
            trains_per_week: 2,
            activity: Some("Normal".to_string()),
            goal: Some("Maintain".to_string()),
        }
    }

    fn record_details() -> NutritionRecordDetails {
        serde_json::from_str(
            r#"{"age": 25, "height": 180, "weight": 80, "calories": 2798, "protein": 210, "fat": 93, "carbs": 280}"#,
        )
        .expect("Failed to deserialize record")
    }

    #[test]
    fn test_resolve_profile_with_known_labels() {
        let resolved = request().resolve_profile().expect("Failed to resolve");
        assert!(resolved.defaulted.is_empty());
        assert_eq!(resolved.profile.gender, Gender::Male);
        assert_eq!(resolved.profile.age, 25);
        assert_eq!(resolved.profile.activity_level, ActivityLevel::Normal);
        assert_eq!(resolved.profile.goal, Goal::Maintain);
        assert_eq!(resolved.profile.trains_per_week, 2);
    }

    #[test]
    fn test_resolve_profile_reports_fallbacks() {
        let resolved = CalculateNutritionRequest {
            gender: None,
            activity: Some("Extreme".to_string()),
            goal: Some("Bulk".to_string()),
            ..request()
        }
        .resolve_profile()
        .expect("Failed to resolve");

        assert_eq!(resolved.defaulted, vec!["gender", "activity", "goal"]);
        assert_eq!(resolved.profile.gender, Gender::Female);
        assert_eq!(resolved.profile.activity_level, ActivityLevel::Sedentary);
        assert_eq!(resolved.profile.goal, Goal::Maintain);
    }

    #[test]
    fn test_resolve_profile_rejects_bad_biometrics() {
        let missing: CalculateNutritionRequest =
            serde_json::from_str(r#"{"gender": "Male", "height": 180, "weight": 80}"#).unwrap();
        assert_eq!(missing.resolve_profile(), Err(InvalidProfile::Age(0.0)));

        let negative_weight = CalculateNutritionRequest {
            weight: -5.0,
            ..request()
        };
        assert_eq!(
            negative_weight.resolve_profile(),
            Err(InvalidProfile::Weight(-5.0))
        );

        let fractional_age = CalculateNutritionRequest {
            age: 30.5,
            ..request()
        };
        assert_eq!(
            fractional_age.resolve_profile(),
            Err(InvalidProfile::Age(30.5))
        );
    }

    #[test]
    fn test_record_defaults_and_validation() {
        let details = record_details();
        assert_eq!(details.gender, "Male");
        assert_eq!(details.activity, "Normal");
        assert_eq!(details.goal, "Maintain");
        assert_eq!(details.note, "");
        assert_eq!(details.date, None);
        assert_eq!(details.user_id, None);
        assert_eq!(details.validate(), Ok(()));

        let no_calories = NutritionRecordDetails {
            calories: 0.0,
            ..record_details()
        };
        assert_eq!(
            no_calories.validate(),
            Err(RecordValidationError::MissingRequiredFields)
        );

        let negative_fat = NutritionRecordDetails {
            fat: -1.0,
            ..record_details()
        };
        assert!(matches!(
            negative_fat.validate(),
            Err(RecordValidationError::InvalidMacro { field: "fat", .. })
        ));

        let unknown_gender = NutritionRecordDetails {
            gender: "Robot".to_string(),
            ..record_details()
        };
        assert!(matches!(
            unknown_gender.validate(),
            Err(RecordValidationError::InvalidGender(..))
        ));
    }

    #[test]
    fn test_food_analysis_from_fenced_reply() {
        let reply = "```json\n{\n  \"Calories\": 520,\n  \"Protein\": 32,\n  \"Fat\": 18.5,\n  \"Carbohydrates\": 55,\n  \"Healthiness\": \"Healthy\"\n}\n```";
        assert_eq!(
            FoodAnalysis::from_model_reply(reply),
            Some(FoodAnalysis {
                calories: 520.0,
                protein: 32.0,
                fat: 18.5,
                carbohydrates: 55.0,
                healthiness: "Healthy".to_string(),
            })
        );
    }

    #[test]
    fn test_food_analysis_from_non_json_reply() {
        assert_eq!(
            FoodAnalysis::from_model_reply("There is no food in this picture."),
            None
        );
        assert_eq!(FoodAnalysis::from_model_reply("} oops {"), None);
        assert_eq!(
            FoodAnalysis::from_model_reply(r#"{"Calories": "about 500"}"#),
            None
        );
    }
}
