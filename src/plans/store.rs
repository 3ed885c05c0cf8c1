use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::domain::{SlotType, Weekday};
use super::repo_types::{
    MealPlan, MealPlanRow, MealSlot, MealSlotRow, NewSlot, NutrientMap, SlotContent,
};

/// Persistence of the single active plan per user.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Atomically swap the user's plan for a new one holding `slots`.
    async fn replace_plan(
        &self,
        user_id: Uuid,
        nutrients: &NutrientMap,
        slots: &[NewSlot],
    ) -> anyhow::Result<MealPlan>;

    async fn latest_plan(&self, user_id: Uuid) -> anyhow::Result<Option<MealPlan>>;

    /// Slots ordered by day, then breakfast, lunch, dinner, snacks, others.
    async fn slots(&self, plan_id: Uuid, user_id: Uuid) -> anyhow::Result<Vec<MealSlot>>;

    /// Overwrite the content of an existing slot. `None` if no row matched.
    async fn upsert_slot(
        &self,
        user_id: Uuid,
        day: Weekday,
        slot_type: SlotType,
        content: &SlotContent,
    ) -> anyhow::Result<Option<MealSlot>>;
}

#[derive(Clone)]
pub struct PgPlanStore {
    db: PgPool,
}

impl PgPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const SLOT_COLUMNS: &str = "plan_id, user_id, day_of_week, meal_type, title, calories, \
                            source_url, image_url, ready_in, servings";

#[async_trait]
impl PlanStore for PgPlanStore {
    #[instrument(skip(self, nutrients, slots), fields(slots = slots.len()))]
    async fn replace_plan(
        &self,
        user_id: Uuid,
        nutrients: &NutrientMap,
        slots: &[NewSlot],
    ) -> anyhow::Result<MealPlan> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        // Serializes concurrent generations for the same user.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .context("lock user plan")?;

        let removed = sqlx::query("DELETE FROM meal_plans WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete previous plan")?
            .rows_affected();

        let plan: MealPlan = sqlx::query_as::<_, MealPlanRow>(
            r#"
            INSERT INTO meal_plans (user_id, daily_nutrients)
            VALUES ($1, $2)
            RETURNING id, user_id, daily_nutrients, generated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(nutrients))
        .fetch_one(&mut *tx)
        .await
        .context("insert plan")?
        .into();

        for slot in slots {
            sqlx::query(
                r#"
                INSERT INTO meal_plan_meals
                    (plan_id, user_id, day_of_week, meal_type, title, calories,
                     source_url, image_url, ready_in, servings)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(plan.id)
            .bind(user_id)
            .bind(slot.day_of_week)
            .bind(slot.slot_type.to_string())
            .bind(&slot.content.title)
            .bind(slot.content.calories)
            .bind(&slot.content.source_url)
            .bind(&slot.content.image_url)
            .bind(slot.content.ready_in)
            .bind(slot.content.servings)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert slot {} {}", slot.day_of_week, slot.slot_type))?;
        }

        tx.commit().await.context("commit tx")?;
        debug!(plan_id = %plan.id, removed, "plan replaced");
        Ok(plan)
    }

    async fn latest_plan(&self, user_id: Uuid) -> anyhow::Result<Option<MealPlan>> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT id, user_id, daily_nutrients, generated_at
              FROM meal_plans
             WHERE user_id = $1
             ORDER BY generated_at DESC
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("latest plan")?;
        Ok(row.map(MealPlan::from))
    }

    async fn slots(&self, plan_id: Uuid, user_id: Uuid) -> anyhow::Result<Vec<MealSlot>> {
        let sql = format!(
            r#"
            SELECT {SLOT_COLUMNS}
              FROM meal_plan_meals
             WHERE plan_id = $1 AND user_id = $2
             ORDER BY CASE day_of_week
                        WHEN 'monday' THEN 1
                        WHEN 'tuesday' THEN 2
                        WHEN 'wednesday' THEN 3
                        WHEN 'thursday' THEN 4
                        WHEN 'friday' THEN 5
                        WHEN 'saturday' THEN 6
                        WHEN 'sunday' THEN 7
                      END,
                      CASE
                        WHEN meal_type = 'breakfast' THEN 1
                        WHEN meal_type = 'lunch' THEN 2
                        WHEN meal_type = 'dinner' THEN 3
                        WHEN meal_type LIKE 'snack%' THEN 4
                        ELSE 5
                      END,
                      meal_type
            "#
        );
        let rows = sqlx::query_as::<_, MealSlotRow>(&sql)
            .bind(plan_id)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list plan slots")?;
        rows.into_iter().map(MealSlot::try_from).collect()
    }

    #[instrument(skip(self, content))]
    async fn upsert_slot(
        &self,
        user_id: Uuid,
        day: Weekday,
        slot_type: SlotType,
        content: &SlotContent,
    ) -> anyhow::Result<Option<MealSlot>> {
        let sql = format!(
            r#"
            UPDATE meal_plan_meals
               SET title = $1, calories = $2, source_url = $3, image_url = $4,
                   ready_in = $5, servings = $6
             WHERE user_id = $7 AND day_of_week = $8 AND meal_type = $9
            RETURNING {SLOT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, MealSlotRow>(&sql)
            .bind(&content.title)
            .bind(content.calories)
            .bind(&content.source_url)
            .bind(&content.image_url)
            .bind(content.ready_in)
            .bind(content.servings)
            .bind(user_id)
            .bind(day)
            .bind(slot_type.to_string())
            .fetch_optional(&self.db)
            .await
            .context("update plan slot")?;
        row.map(MealSlot::try_from).transpose()
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    /// In-process store with the same replace/update semantics as Postgres.
    #[derive(Default)]
    pub struct MemoryPlanStore {
        plans: Mutex<HashMap<Uuid, (MealPlan, Vec<MealSlot>)>>,
        pub fail_replace: AtomicBool,
    }

    impl MemoryPlanStore {
        pub fn plan_count(&self) -> usize {
            self.plans.lock().unwrap().len()
        }

        pub fn all_slots(&self, user_id: Uuid) -> Vec<MealSlot> {
            self.plans
                .lock()
                .unwrap()
                .get(&user_id)
                .map(|(_, s)| s.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl PlanStore for MemoryPlanStore {
        async fn replace_plan(
            &self,
            user_id: Uuid,
            nutrients: &NutrientMap,
            slots: &[NewSlot],
        ) -> anyhow::Result<MealPlan> {
            if self.fail_replace.load(Ordering::SeqCst) {
                anyhow::bail!("insert slot: connection closed");
            }
            let plan = MealPlan {
                id: Uuid::new_v4(),
                user_id,
                daily_nutrients: nutrients.clone(),
                generated_at: OffsetDateTime::now_utc(),
            };
            let mut seen = std::collections::HashSet::new();
            let mut rows = Vec::with_capacity(slots.len());
            for s in slots {
                anyhow::ensure!(
                    seen.insert((s.day_of_week, s.slot_type)),
                    "duplicate slot {} {}",
                    s.day_of_week,
                    s.slot_type
                );
                rows.push(MealSlot::from_new(plan.id, user_id, s));
            }
            self.plans.lock().unwrap().insert(user_id, (plan.clone(), rows));
            Ok(plan)
        }

        async fn latest_plan(&self, user_id: Uuid) -> anyhow::Result<Option<MealPlan>> {
            Ok(self.plans.lock().unwrap().get(&user_id).map(|(p, _)| p.clone()))
        }

        async fn slots(&self, plan_id: Uuid, user_id: Uuid) -> anyhow::Result<Vec<MealSlot>> {
            let mut slots: Vec<MealSlot> = self
                .all_slots(user_id)
                .into_iter()
                .filter(|s| s.plan_id == plan_id)
                .collect();
            slots.sort_by_key(|s| (s.day_of_week, s.slot_type.priority(), s.slot_type.to_string()));
            Ok(slots)
        }

        async fn upsert_slot(
            &self,
            user_id: Uuid,
            day: Weekday,
            slot_type: SlotType,
            content: &SlotContent,
        ) -> anyhow::Result<Option<MealSlot>> {
            let mut plans = self.plans.lock().unwrap();
            let Some((_, slots)) = plans.get_mut(&user_id) else {
                return Ok(None);
            };
            Ok(slots
                .iter_mut()
                .find(|s| s.day_of_week == day && s.slot_type == slot_type)
                .map(|s| {
                    s.content = content.clone();
                    s.clone()
                }))
        }
    }
}
