use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidProfile {
    #[error("Age must be a positive whole number of years, got {0}")]
    Age(f64),

    #[error("Height must be a positive number of centimeters, got {0}")]
    Height(f64),

    #[error("Weight must be a positive number of kilograms, got {0}")]
    Weight(f64),

    #[error("Profile yields {0} kcal/day, which is out of the representable range")]
    EnergyOutOfRange(f64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} label '{label}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Gender {
    Male,
    Female,
}

/// Self reported activity level, scales BMR to total daily energy expenditure.
///
/// Unrecognized labels are not accepted by [`FromStr`]; callers that want the
/// lenient behavior use [`ActivityLevel::default`] (sedentary) explicitly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    LightlyActive,
    Normal,
    Active,
    VeryActive,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Goal {
    Gain,
    Lose,
    #[default]
    Maintain,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::Normal => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl Goal {
    /// Caloric surplus or deficit in kcal/day
    pub fn calorie_offset(self) -> f64 {
        match self {
            Goal::Gain => 300.0,
            Goal::Lose => -300.0,
            Goal::Maintain => 0.0,
        }
    }
}

/// Lowercases and drops spaces, dashes and underscores so that
/// "Poco activo", "lightly_active" and "LightlyActive" compare equal
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Gender {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(UnknownLabel::new("gender", s)),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "sedentary" | "sedentario" => Ok(ActivityLevel::Sedentary),
            "lightlyactive" | "pocoactivo" => Ok(ActivityLevel::LightlyActive),
            "normal" => Ok(ActivityLevel::Normal),
            "active" | "activo" => Ok(ActivityLevel::Active),
            "veryactive" | "muyactivo" => Ok(ActivityLevel::VeryActive),
            _ => Err(UnknownLabel::new("activity level", s)),
        }
    }
}

impl FromStr for Goal {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "gain" => Ok(Goal::Gain),
            "lose" => Ok(Goal::Lose),
            "maintain" => Ok(Goal::Maintain),
            _ => Err(UnknownLabel::new("goal", s)),
        }
    }
}

macro_rules! impl_label_conversions {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = UnknownLabel;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Debug::fmt(self, f)
                }
            }
        )*
    };
}

impl_label_conversions!(Gender, ActivityLevel, Goal);

/// Biometric profile of a person, input of [`crate::compute`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub gender: Gender,
    /// Years
    pub age: u32,
    /// Centimeters
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    /// Not used by the formula, kept so that callers can store the full profile
    #[serde(default)]
    pub trains_per_week: u32,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
}

impl Profile {
    pub fn validate(&self) -> Result<(), InvalidProfile> {
        if self.age == 0 {
            return Err(InvalidProfile::Age(0.0));
        }
        if !is_positive_finite(self.height) {
            return Err(InvalidProfile::Height(self.height));
        }
        if !is_positive_finite(self.weight) {
            return Err(InvalidProfile::Weight(self.weight));
        }
        Ok(())
    }

    /// Converts an age given as an arbitrary number (as it arrives in JSON)
    /// into whole years, rejecting anything that is not a positive integer
    pub fn age_from_number(age: f64) -> Result<u32, InvalidProfile> {
        if !is_positive_finite(age) || age.fract() != 0.0 || age > f64::from(u32::MAX) {
            return Err(InvalidProfile::Age(age));
        }
        Ok(age as u32)
    }
}

fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod profile_tests {
    use super::*;

    #[test]
    fn test_activity_labels_accept_english_and_spanish() {
        let cases = [
            ("Sedentary", ActivityLevel::Sedentary),
            ("sedentario", ActivityLevel::Sedentary),
            ("LightlyActive", ActivityLevel::LightlyActive),
            ("Lightly active", ActivityLevel::LightlyActive),
            ("Poco activo", ActivityLevel::LightlyActive),
            ("Normal", ActivityLevel::Normal),
            ("Active", ActivityLevel::Active),
            ("Activo", ActivityLevel::Active),
            ("very_active", ActivityLevel::VeryActive),
            ("Muy activo", ActivityLevel::VeryActive),
        ];
        for (label, expected) in cases {
            assert_eq!(label.parse::<ActivityLevel>(), Ok(expected), "{}", label);
        }
    }

    #[test]
    fn test_unknown_labels_are_reported() {
        let err = "Couch potato".parse::<ActivityLevel>().unwrap_err();
        assert_eq!(err.label, "Couch potato");
        assert_eq!(err.kind, "activity level");

        assert!("Bulk".parse::<Goal>().is_err());
        assert!("".parse::<Gender>().is_err());
    }

    #[test]
    fn test_defaults_are_the_documented_fallbacks() {
        assert_eq!(ActivityLevel::default(), ActivityLevel::Sedentary);
        assert_eq!(ActivityLevel::default().multiplier(), 1.2);
        assert_eq!(Goal::default(), Goal::Maintain);
        assert_eq!(Goal::default().calorie_offset(), 0.0);
    }

    #[test]
    fn test_profile_deserializes_from_labels() {
        let profile: Profile = serde_json::from_str(
            r#"{
                "gender": "Female",
                "age": 30,
                "height": 165,
                "weight": 60,
                "activityLevel": "Activo",
                "goal": "Lose"
            }"#,
        )
        .expect("Failed to deserialize profile");

        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.activity_level, ActivityLevel::Active);
        assert_eq!(profile.goal, Goal::Lose);
        assert_eq!(profile.trains_per_week, 0);

        let unknown_goal = serde_json::from_str::<Profile>(
            r#"{"gender":"Male","age":30,"height":165,"weight":60,"activityLevel":"Normal","goal":"Bulk"}"#,
        );
        assert!(unknown_goal.is_err());
    }

    #[test]
    fn test_age_from_number() {
        assert_eq!(Profile::age_from_number(25.0), Ok(25));
        assert_eq!(Profile::age_from_number(0.0), Err(InvalidProfile::Age(0.0)));
        assert_eq!(Profile::age_from_number(-3.0), Err(InvalidProfile::Age(-3.0)));
        assert_eq!(Profile::age_from_number(25.5), Err(InvalidProfile::Age(25.5)));
        assert!(Profile::age_from_number(f64::NAN).is_err());
        assert!(Profile::age_from_number(f64::INFINITY).is_err());
    }
}
