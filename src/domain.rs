//! Domain types for the diet log.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Biological sex used by the BMR equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Returns the display name for the gender.
    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

/// Weekly activity level, scaling BMR up to TDEE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl ActivityLevel {
    /// Returns the display name for the activity level.
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Lightly active",
            ActivityLevel::Moderate => "Moderately active",
            ActivityLevel::Active => "Very active",
        }
    }
}

/// Weight-change goal driving the daily calorie budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Maintain,
    Lose,
    Gain,
}

impl GoalType {
    /// Returns the display name for the goal.
    pub fn display_name(&self) -> &'static str {
        match self {
            GoalType::Maintain => "Maintain weight",
            GoalType::Lose => "Lose weight",
            GoalType::Gain => "Gain weight",
        }
    }
}

/// Meal category a food record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Returns all meal type variants.
    pub fn all() -> &'static [MealType] {
        &[
            MealType::Breakfast,
            MealType::Lunch,
            MealType::Dinner,
            MealType::Snack,
        ]
    }

    /// Returns the display name for the meal type.
    pub fn display_name(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

/// Navigation tabs of the dashboard frontend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Home,
    History,
    Profile,
}

/// The body profile the energy model consumes.
///
/// Fields are replaced wholesale on edit; no range validation is performed,
/// so the caller is responsible for supplying sensible values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal: GoalType,
    /// Advisory display data for lose/gain goals. Never feeds the
    /// calorie-goal computation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            height_cm: 165.0,
            weight_kg: 55.0,
            age: 26,
            gender: Gender::Female,
            activity_level: ActivityLevel::Light,
            goal: GoalType::Maintain,
            target_weight_kg: None,
        }
    }
}

/// A single logged food-intake event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub id: String,
    pub name: String,
    pub calories: u32,
    pub meal_type: MealType,
    pub quantity: String,
    pub timestamp: DateTime<Utc>,
}

impl FoodRecord {
    /// The local calendar day this record was logged on.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }
}

/// User-supplied fields of a new record; id and timestamp are assigned by
/// the record store.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordInput {
    pub name: String,
    pub calories: u32,
    pub meal_type: MealType,
    #[serde(default)]
    pub quantity: String,
}

/// Login state. A user is logged in exactly when a non-empty username is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub username: Option<String>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.username.as_deref().is_some_and(|name| !name.is_empty())
    }
}

/// A predefined catalog entry for one-tap logging.
#[derive(Debug, Clone, Serialize)]
pub struct QuickFood {
    pub name: &'static str,
    pub calories: u32,
    pub unit: &'static str,
    pub meal_type: MealType,
}

/// Static quick-pick catalog. Reference data only, not part of the record
/// model.
pub const QUICK_FOODS: &[QuickFood] = &[
    QuickFood {
        name: "Latte",
        calories: 120,
        unit: "cup",
        meal_type: MealType::Snack,
    },
    QuickFood {
        name: "Americano",
        calories: 5,
        unit: "cup",
        meal_type: MealType::Snack,
    },
    QuickFood {
        name: "Bubble tea",
        calories: 450,
        unit: "cup",
        meal_type: MealType::Snack,
    },
    QuickFood {
        name: "Chicken salad",
        calories: 320,
        unit: "bowl",
        meal_type: MealType::Lunch,
    },
    QuickFood {
        name: "Sandwich",
        calories: 280,
        unit: "piece",
        meal_type: MealType::Breakfast,
    },
    QuickFood {
        name: "Mixed nuts",
        calories: 160,
        unit: "30 g",
        meal_type: MealType::Snack,
    },
    QuickFood {
        name: "Apple",
        calories: 95,
        unit: "piece",
        meal_type: MealType::Snack,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.height_cm, 165.0);
        assert_eq!(profile.weight_kg, 55.0);
        assert_eq!(profile.age, 26);
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.activity_level, ActivityLevel::Light);
        assert_eq!(profile.goal, GoalType::Maintain);
        assert!(profile.target_weight_kg.is_none());
    }

    #[test]
    fn test_profile_serde_round_trip() {
        let profile = UserProfile {
            height_cm: 172.5,
            weight_kg: 68.2,
            age: 31,
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
            goal: GoalType::Lose,
            target_weight_kg: Some(63.0),
        };

        let json = serde_json::to_string(&profile).unwrap();
        let restored: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, profile);
    }

    #[test]
    fn test_profile_target_weight_optional_in_json() {
        // Profiles written before the target weight existed still load.
        let json = r#"{
            "height_cm": 165.0,
            "weight_kg": 55.0,
            "age": 26,
            "gender": "female",
            "activity_level": "light",
            "goal": "maintain"
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.target_weight_kg.is_none());
    }

    #[test]
    fn test_enum_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_string(&ActivityLevel::Sedentary).unwrap(),
            "\"sedentary\""
        );
        assert_eq!(serde_json::to_string(&GoalType::Lose).unwrap(), "\"lose\"");
        assert_eq!(
            serde_json::to_string(&MealType::Breakfast).unwrap(),
            "\"breakfast\""
        );
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
    }

    #[test]
    fn test_session_login_state() {
        assert!(!Session::default().is_logged_in());
        assert!(
            !Session {
                username: Some(String::new())
            }
            .is_logged_in()
        );
        assert!(
            Session {
                username: Some("anna".to_string())
            }
            .is_logged_in()
        );
    }

    #[test]
    fn test_quick_foods_catalog() {
        assert_eq!(QUICK_FOODS.len(), 7);
        assert!(QUICK_FOODS.iter().all(|f| !f.name.is_empty()));
    }
}
