//! Daily calorie and macro targets from a biometric profile.
//!
//! The calculation is a pure function: [`compute`] validates a [`Profile`] and
//! returns [`NutritionTargets`] or [`InvalidProfile`]. Nothing here performs I/O.

pub use calculator::{basal_metabolic_rate, compute, daily_energy, NutritionTargets};
pub use profile::{ActivityLevel, Gender, Goal, InvalidProfile, Profile, UnknownLabel};

mod calculator;
mod profile;
