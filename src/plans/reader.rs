use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::domain::{SlotType, Weekday};
use super::repo_types::{MealPlan, MealSlot, NutrientMap};

/// Slots of one day grouped for display. Snacks share one bucket but each
/// keeps its exact `slot_type`.
#[derive(Debug, Default, Serialize)]
pub struct DayView {
    pub breakfast: Vec<MealSlot>,
    pub lunch: Vec<MealSlot>,
    pub dinner: Vec<MealSlot>,
    pub snack: Vec<MealSlot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<MealSlot>,
}

#[derive(Debug, Serialize)]
pub struct PlanView {
    pub plan_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub daily_nutrients: NutrientMap,
    pub days: BTreeMap<Weekday, DayView>,
}

pub fn group_slots(mut slots: Vec<MealSlot>) -> BTreeMap<Weekday, DayView> {
    slots.sort_by_cached_key(|s| (s.day_of_week, s.slot_type.priority(), s.slot_type.to_string()));
    let mut days: BTreeMap<Weekday, DayView> = BTreeMap::new();
    for slot in slots {
        let day = days.entry(slot.day_of_week).or_default();
        let bucket = match slot.slot_type {
            SlotType::Breakfast => &mut day.breakfast,
            SlotType::Lunch => &mut day.lunch,
            SlotType::Dinner => &mut day.dinner,
            SlotType::Snack(_) => &mut day.snack,
            SlotType::Overflow(_) => &mut day.other,
        };
        bucket.push(slot);
    }
    days
}

pub fn plan_view(plan: MealPlan, slots: Vec<MealSlot>) -> PlanView {
    PlanView {
        plan_id: plan.id,
        generated_at: plan.generated_at,
        daily_nutrients: plan.daily_nutrients,
        days: group_slots(slots),
    }
}
