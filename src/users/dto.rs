use serde::{Deserialize, Serialize};

use super::calories::{Gender, Goal, Physiology};
use super::repo_types::User;

/// Profile fields collected at registration and on every profile edit.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    #[serde(alias = "height")]
    pub height_cm: f64,
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    #[serde(alias = "activity")]
    pub activity_level: f64,
    #[serde(default)]
    pub diet: Option<String>,
    pub goal: Goal,
}

impl ProfileInput {
    pub fn physiology(&self) -> Physiology {
        Physiology {
            age: self.age,
            gender: self.gender,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            activity_level: self.activity_level,
            goal: self.goal,
        }
    }

    /// Trimmed name and a diet tag with blanks collapsed to `None`.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err("name is required".into());
        }
        self.diet = self
            .diet
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty());
        self.physiology().validate()?;
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub consumed_today: f64,
    pub remaining_today: f64,
}

impl ProfileResponse {
    pub fn new(user: User, consumed_today: f64) -> Self {
        let remaining_today = f64::from(user.calorie_target) - consumed_today;
        Self {
            user,
            consumed_today,
            remaining_today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProfileInput {
        serde_json::from_value(serde_json::json!({
            "name": "  Ada ",
            "age": 30,
            "gender": "Male",
            "height": 180,
            "weight": 80,
            "activity": 1.55,
            "diet": "  ",
            "goal": "maintain"
        }))
        .unwrap()
    }

    #[test]
    fn accepts_short_field_aliases_and_normalizes() {
        let p = input().normalized().unwrap();
        assert_eq!(p.name, "Ada");
        assert_eq!(p.height_cm, 180.0);
        assert_eq!(p.diet, None);
        assert_eq!(p.physiology().daily_calorie_target(), 2759);
    }

    #[test]
    fn rejects_blank_name_and_bad_physiology() {
        let mut p = input();
        p.name = " ".into();
        assert!(p.normalized().is_err());

        let mut p = input();
        p.age = 5;
        assert!(p.normalized().is_err());
    }
}
