//! Daily calorie target from physiology (Mifflin-St Jeor).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[serde(alias = "Loss")]
    Loss,
    #[serde(alias = "Gain")]
    Gain,
    #[serde(alias = "Maintain")]
    Maintain,
}

/// Sedentary, lightly, moderately, very and extra active.
pub const ACTIVITY_FACTORS: [f64; 5] = [1.2, 1.375, 1.55, 1.725, 1.9];
pub const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;
pub const MIN_DAILY_TARGET: i32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physiology {
    pub age: i32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: f64,
    pub goal: Goal,
}

impl Physiology {
    pub fn validate(&self) -> Result<(), String> {
        if !(13..=120).contains(&self.age) {
            return Err("age must be between 13 and 120".into());
        }
        if !(100.0..=250.0).contains(&self.height_cm) {
            return Err("height must be between 100 and 250 cm".into());
        }
        if !(30.0..=300.0).contains(&self.weight_kg) {
            return Err("weight must be between 30 and 300 kg".into());
        }
        if !ACTIVITY_FACTORS
            .iter()
            .any(|f| (f - self.activity_level).abs() < 1e-9)
        {
            return Err(format!("activity must be one of {ACTIVITY_FACTORS:?}"));
        }
        Ok(())
    }

    pub fn bmr(&self) -> f64 {
        let base = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * f64::from(self.age);
        match self.gender {
            Gender::Male => base + 5.0,
            Gender::Female => base - 161.0,
        }
    }

    pub fn daily_calorie_target(&self) -> i32 {
        let maintenance = self.bmr() * self.activity_level;
        let adjusted = match self.goal {
            Goal::Loss => maintenance - GOAL_ADJUSTMENT_KCAL,
            Goal::Gain => maintenance + GOAL_ADJUSTMENT_KCAL,
            Goal::Maintain => maintenance,
        };
        (adjusted.round() as i32).max(MIN_DAILY_TARGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn male() -> Physiology {
        Physiology {
            age: 30,
            gender: Gender::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity_level: 1.55,
            goal: Goal::Maintain,
        }
    }

    #[test]
    fn maintenance_target_for_moderately_active_male() {
        let p = male();
        assert_eq!(p.bmr(), 1780.0);
        assert_eq!(p.daily_calorie_target(), 2759);
    }

    #[test]
    fn goal_shifts_target_by_five_hundred() {
        assert_eq!(Physiology { goal: Goal::Loss, ..male() }.daily_calorie_target(), 2259);
        assert_eq!(Physiology { goal: Goal::Gain, ..male() }.daily_calorie_target(), 3259);
    }

    #[test]
    fn target_never_drops_below_floor() {
        let p = Physiology {
            age: 25,
            gender: Gender::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity_level: 1.2,
            goal: Goal::Loss,
        };
        assert_eq!(p.bmr(), 1345.25);
        assert_eq!(p.daily_calorie_target(), MIN_DAILY_TARGET);
    }

    #[test]
    fn rejects_unknown_activity_factor() {
        let p = Physiology { activity_level: 1.3, ..male() };
        assert!(p.validate().is_err());
        assert!(male().validate().is_ok());
    }

    #[test]
    fn goal_accepts_capitalized_names() {
        let g: Goal = serde_json::from_str("\"Loss\"").unwrap();
        assert_eq!(g, Goal::Loss);
        assert_eq!(serde_json::to_string(&Goal::Maintain).unwrap(), "\"maintain\"");
    }
}
