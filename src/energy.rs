//! Energy-balance formulas: BMR, TDEE and the daily calorie goal.

use crate::domain::{ActivityLevel, Gender, GoalType, UserProfile};

/// Calorie deficit applied to TDEE under a weight-loss goal.
const LOSE_OFFSET_KCAL: i32 = 500;

/// Calorie surplus applied to TDEE under a weight-gain goal.
const GAIN_OFFSET_KCAL: i32 = 300;

/// Calculates Basal Metabolic Rate using the Mifflin-St Jeor equation.
///
/// Formula (weight in kg, height in cm, age in years):
/// - female: `10×w + 6.25×h − 5×a − 161`
/// - male:   `10×w + 6.25×h − 5×a + 5`
///
/// The result is unrounded. Inputs are not validated here; the profile store
/// accepts whatever the caller supplies.
///
/// # Arguments
/// * `profile` - Body profile with weight, height, age and gender
///
/// # Returns
/// BMR in kcal/day
pub fn calculate_bmr(profile: &UserProfile) -> f64 {
    let base = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Female => base - 161.0,
        Gender::Male => base + 5.0,
    }
}

/// Returns the TDEE multiplier for an activity level.
///
/// The match is exhaustive on purpose: adding an activity level without a
/// multiplier is a compile-time failure, not a silent NaN.
pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
    }
}

/// Calculates Total Daily Energy Expenditure.
///
/// The unrounded BMR is scaled by the activity multiplier, then rounded once,
/// half away from zero.
pub fn calculate_tdee(profile: &UserProfile) -> i32 {
    (calculate_bmr(profile) * activity_multiplier(profile.activity_level)).round() as i32
}

/// Calculates the daily calorie goal from TDEE and the weight goal.
///
/// Lose subtracts 500 kcal, gain adds 300 kcal, maintain leaves TDEE
/// unchanged. The result is not clamped to a minimum safe intake, so a small
/// enough profile with a lose goal can yield an unrealistically low budget.
pub fn calculate_daily_goal(profile: &UserProfile) -> i32 {
    let tdee = calculate_tdee(profile);
    match profile.goal {
        GoalType::Lose => tdee - LOSE_OFFSET_KCAL,
        GoalType::Gain => tdee + GAIN_OFFSET_KCAL,
        GoalType::Maintain => tdee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The reference profile: 165cm, 55kg, 26y, female, lightly active.
    fn reference_profile() -> UserProfile {
        UserProfile::default()
    }

    #[test]
    fn test_bmr_female() {
        // 10*55 + 6.25*165 - 5*26 - 161 = 550 + 1031.25 - 130 - 161 = 1290.25
        let bmr = calculate_bmr(&reference_profile());
        assert_eq!(bmr, 1290.25);
    }

    #[test]
    fn test_bmr_male() {
        let profile = UserProfile {
            gender: Gender::Male,
            ..reference_profile()
        };
        // Same terms with +5 instead of -161: 1456.25
        assert_eq!(calculate_bmr(&profile), 1456.25);
    }

    #[test]
    fn test_bmr_matches_formula_for_arbitrary_profile() {
        let profile = UserProfile {
            height_cm: 182.0,
            weight_kg: 77.3,
            age: 41,
            gender: Gender::Male,
            ..reference_profile()
        };
        let expected = 10.0 * 77.3 + 6.25 * 182.0 - 5.0 * 41.0 + 5.0;
        assert_eq!(calculate_bmr(&profile), expected);
    }

    #[test]
    fn test_activity_multiplier_table() {
        assert_eq!(activity_multiplier(ActivityLevel::Sedentary), 1.2);
        assert_eq!(activity_multiplier(ActivityLevel::Light), 1.375);
        assert_eq!(activity_multiplier(ActivityLevel::Moderate), 1.55);
        assert_eq!(activity_multiplier(ActivityLevel::Active), 1.725);
    }

    #[test]
    fn test_tdee_rounds_once_after_scaling() {
        // BMR 1290.25 * 1.375 = 1774.09375 -> 1774
        assert_eq!(calculate_tdee(&reference_profile()), 1774);

        for level in [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
        ] {
            let profile = UserProfile {
                activity_level: level,
                ..reference_profile()
            };
            let expected = (calculate_bmr(&profile) * activity_multiplier(level)).round() as i32;
            assert_eq!(calculate_tdee(&profile), expected);
        }
    }

    #[test]
    fn test_daily_goal_maintain_equals_tdee() {
        let profile = reference_profile();
        assert_eq!(calculate_daily_goal(&profile), calculate_tdee(&profile));
        assert_eq!(calculate_daily_goal(&profile), 1774);
    }

    #[test]
    fn test_daily_goal_lose_subtracts_deficit() {
        let profile = UserProfile {
            goal: GoalType::Lose,
            ..reference_profile()
        };
        assert_eq!(calculate_daily_goal(&profile), 1774 - 500);
    }

    #[test]
    fn test_daily_goal_gain_adds_surplus() {
        let profile = UserProfile {
            goal: GoalType::Gain,
            ..reference_profile()
        };
        assert_eq!(calculate_daily_goal(&profile), 1774 + 300);
    }

    #[test]
    fn test_target_weight_does_not_affect_goal() {
        let profile = UserProfile {
            goal: GoalType::Lose,
            target_weight_kg: Some(48.0),
            ..reference_profile()
        };
        let without_target = UserProfile {
            target_weight_kg: None,
            ..profile.clone()
        };
        assert_eq!(
            calculate_daily_goal(&profile),
            calculate_daily_goal(&without_target)
        );
    }
}
