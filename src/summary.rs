//! Daily intake aggregation and progress figures for the dashboard.
//!
//! Pure reductions over the record log; nothing here is persisted. The
//! dashboard recomputes everything from the profile and records on each read
//! so the derived figures can never go stale.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{FoodRecord, UserProfile};
use crate::energy::{calculate_bmr, calculate_daily_goal, calculate_tdee};

/// One day's derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Calories logged on this day.
    pub intake: u32,
    pub bmr: f64,
    pub tdee: i32,
    pub daily_goal: i32,
    /// Calories left in the budget; negative when over budget.
    pub remaining: i32,
    /// Intake as a share of the goal, clamped to [0, 100].
    pub percentage: f64,
}

impl DailySummary {
    /// Builds the summary for one local calendar day.
    pub fn for_day(profile: &UserProfile, records: &[FoodRecord], day: NaiveDate) -> Self {
        let intake = intake_for_day(records, day);
        let daily_goal = calculate_daily_goal(profile);

        Self {
            date: day,
            intake,
            bmr: calculate_bmr(profile),
            tdee: calculate_tdee(profile),
            daily_goal,
            remaining: remaining(daily_goal, intake),
            percentage: progress_percentage(intake, daily_goal),
        }
    }
}

/// Sums calories over records logged on `day` (local time).
///
/// Records outside the day boundary do not count, so the dashboard's "today"
/// figure resets at local midnight.
pub fn intake_for_day(records: &[FoodRecord], day: NaiveDate) -> u32 {
    records
        .iter()
        .filter(|r| r.local_date() == day)
        .map(|r| r.calories)
        .sum()
}

/// Intake as a percentage of the goal, clamped to [0, 100].
///
/// A non-positive goal has no meaningful completion ratio and yields 0.
pub fn progress_percentage(intake: u32, goal: i32) -> f64 {
    if goal <= 0 {
        return 0.0;
    }
    (f64::from(intake) / f64::from(goal) * 100.0).min(100.0)
}

/// Calories left in the day's budget; negative when over budget.
pub fn remaining(goal: i32, intake: u32) -> i32 {
    goal - intake as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GoalType, MealType};
    use chrono::{Duration, Utc};

    /// Helper to create a record logged `days_ago` days before now.
    fn record_days_ago(days_ago: i64, calories: u32) -> FoodRecord {
        FoodRecord {
            id: format!("test-{days_ago}-{calories}"),
            name: "Test meal".to_string(),
            calories,
            meal_type: MealType::Lunch,
            quantity: "1 serving".to_string(),
            timestamp: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_intake_empty_log_is_zero() {
        let today = record_days_ago(0, 0).local_date();
        assert_eq!(intake_for_day(&[], today), 0);
    }

    #[test]
    fn test_intake_sums_only_the_given_day() {
        let records = vec![
            record_days_ago(0, 300),
            record_days_ago(0, 450),
            record_days_ago(1, 800),
            record_days_ago(2, 650),
        ];
        let today = records[0].local_date();
        let yesterday = records[2].local_date();

        assert_eq!(intake_for_day(&records, today), 750);
        assert_eq!(intake_for_day(&records, yesterday), 800);
    }

    #[test]
    fn test_percentage_clamped_at_100() {
        assert_eq!(progress_percentage(5000, 1774), 100.0);
        assert_eq!(progress_percentage(1774, 1774), 100.0);
    }

    #[test]
    fn test_percentage_zero_goal_guarded() {
        assert_eq!(progress_percentage(300, 0), 0.0);
        assert_eq!(progress_percentage(300, -200), 0.0);
    }

    #[test]
    fn test_percentage_partial_intake() {
        // 300 of 1274 kcal is about 23.55%
        let pct = progress_percentage(300, 1274);
        assert!((pct - 23.547).abs() < 0.01, "pct = {pct}");
    }

    #[test]
    fn test_remaining_can_go_negative() {
        assert_eq!(remaining(1274, 300), 974);
        assert_eq!(remaining(1274, 1500), -226);
    }

    #[test]
    fn test_summary_for_lose_goal_scenario() {
        // Reference profile with a lose goal: daily goal 1774 - 500 = 1274.
        let profile = UserProfile {
            goal: GoalType::Lose,
            ..UserProfile::default()
        };
        let records = vec![record_days_ago(0, 300)];
        let day = records[0].local_date();

        let summary = DailySummary::for_day(&profile, &records, day);
        assert_eq!(summary.bmr, 1290.25);
        assert_eq!(summary.tdee, 1774);
        assert_eq!(summary.daily_goal, 1274);
        assert_eq!(summary.intake, 300);
        assert_eq!(summary.remaining, 974);
        assert!((summary.percentage - 23.547).abs() < 0.01);
    }

    #[test]
    fn test_summary_ignores_other_days() {
        let profile = UserProfile::default();
        let records = vec![record_days_ago(1, 999)];
        let today = record_days_ago(0, 0).local_date();

        let summary = DailySummary::for_day(&profile, &records, today);
        assert_eq!(summary.intake, 0);
        assert_eq!(summary.remaining, summary.daily_goal);
        assert_eq!(summary.percentage, 0.0);
    }
}
