use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::domain::{SlotType, Weekday};
use crate::provider::DayNutrients;

/// Per-day nutrient snapshot taken at generation time.
pub type NutrientMap = BTreeMap<Weekday, DayNutrients>;

/// Displayed content of a slot; the part regeneration overwrites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotContent {
    pub title: String,
    pub calories: f64,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub ready_in: Option<i32>,
    pub servings: Option<i32>,
}

/// Slot produced by the assembler, not yet tied to a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSlot {
    pub day_of_week: Weekday,
    pub slot_type: SlotType,
    #[serde(flatten)]
    pub content: SlotContent,
}

/// Stored slot of a user's plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSlot {
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: Weekday,
    pub slot_type: SlotType,
    #[serde(flatten)]
    pub content: SlotContent,
}

#[cfg(test)]
impl MealSlot {
    pub fn from_new(plan_id: Uuid, user_id: Uuid, slot: &NewSlot) -> Self {
        Self {
            plan_id,
            user_id,
            day_of_week: slot.day_of_week,
            slot_type: slot.slot_type,
            content: slot.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_nutrients: NutrientMap,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_nutrients: Json<NutrientMap>,
    pub generated_at: OffsetDateTime,
}

impl From<MealPlanRow> for MealPlan {
    fn from(r: MealPlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            daily_nutrients: r.daily_nutrients.0,
            generated_at: r.generated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct MealSlotRow {
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: Weekday,
    pub meal_type: String,
    pub title: String,
    pub calories: f64,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub ready_in: Option<i32>,
    pub servings: Option<i32>,
}

impl TryFrom<MealSlotRow> for MealSlot {
    type Error = anyhow::Error;

    fn try_from(r: MealSlotRow) -> Result<Self, Self::Error> {
        let slot_type = r
            .meal_type
            .parse::<SlotType>()
            .map_err(|e| anyhow::anyhow!("stored slot of plan {}: {e}", r.plan_id))?;
        Ok(Self {
            plan_id: r.plan_id,
            user_id: r.user_id,
            day_of_week: r.day_of_week,
            slot_type,
            content: SlotContent {
                title: r.title,
                calories: r.calories,
                source_url: r.source_url,
                image_url: r.image_url,
                ready_in: r.ready_in,
                servings: r.servings,
            },
        })
    }
}
