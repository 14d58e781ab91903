use serde::{Deserialize, Serialize};

use crate::profile::{Gender, InvalidProfile, Profile};

const PROTEIN_SHARE: f64 = 0.30;
const FAT_SHARE: f64 = 0.30;
const CARBS_SHARE: f64 = 0.40;

const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
const FAT_KCAL_PER_GRAM: f64 = 9.0;
const CARBS_KCAL_PER_GRAM: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Daily targets, calories in kcal and macros in grams
pub struct NutritionTargets {
    pub calories: u32,
    pub protein: u32,
    pub fat: u32,
    pub carbs: u32,
}

/// Basal metabolic rate in kcal/day (Harris-Benedict as revised by Mifflin-St Jeor)
pub fn basal_metabolic_rate(gender: Gender, age: u32, height: f64, weight: f64) -> f64 {
    let base = 10.0 * weight + 6.25 * height - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Goal adjusted daily energy in kcal, before any rounding.
/// Never negative.
pub fn daily_energy(profile: &Profile) -> Result<f64, InvalidProfile> {
    profile.validate()?;
    let bmr = basal_metabolic_rate(profile.gender, profile.age, profile.height, profile.weight);
    let calories = bmr * profile.activity_level.multiplier() + profile.goal.calorie_offset();
    Ok(calories.max(0.0))
}

/// Computes calorie and macro targets for the profile.
///
/// Macros are derived from the unrounded calorie figure and rounded one by one,
/// the calorie figure itself is rounded separately, so the macro energy can
/// differ slightly from `calories`.
/// Fails with `InvalidProfile::EnergyOutOfRange` when the calorie figure does not fit in `u32`.
pub fn compute(profile: &Profile) -> Result<NutritionTargets, InvalidProfile> {
    let calories = daily_energy(profile)?;
    // every macro is a fraction of the calorie figure, so checking it covers them all
    if calories.round() > f64::from(u32::MAX) {
        return Err(InvalidProfile::EnergyOutOfRange(calories));
    }

    Ok(NutritionTargets {
        calories: round_kcal(calories),
        protein: round_kcal(PROTEIN_SHARE * calories / PROTEIN_KCAL_PER_GRAM),
        fat: round_kcal(FAT_SHARE * calories / FAT_KCAL_PER_GRAM),
        carbs: round_kcal(CARBS_SHARE * calories / CARBS_KCAL_PER_GRAM),
    })
}

// f64::round rounds half away from zero, the input is already within 0..=u32::MAX
fn round_kcal(value: f64) -> u32 {
    value.round() as u32
}
