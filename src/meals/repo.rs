use sqlx::PgPool;
use time::{Duration, OffsetDateTime, Time};
use uuid::Uuid;

use super::repo_types::LoggedMeal;

/// Start and end of the current UTC day.
pub fn today_utc() -> (OffsetDateTime, OffsetDateTime) {
    let start = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
    (start, start + Duration::days(1))
}

impl LoggedMeal {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        description: &str,
        calories: f64,
    ) -> anyhow::Result<LoggedMeal> {
        let meal = sqlx::query_as::<_, LoggedMeal>(
            r#"
            INSERT INTO logged_meals (user_id, description, calories)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, description, calories, eaten_at
            "#,
        )
        .bind(user_id)
        .bind(description)
        .bind(calories)
        .fetch_one(db)
        .await?;
        Ok(meal)
    }

    pub async fn list_today(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<LoggedMeal>> {
        let (start, end) = today_utc();
        let rows = sqlx::query_as::<_, LoggedMeal>(
            r#"
            SELECT id, user_id, description, calories, eaten_at
            FROM logged_meals
            WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3
            ORDER BY eaten_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn consumed_today(db: &PgPool, user_id: Uuid) -> anyhow::Result<f64> {
        let (start, end) = today_utc();
        let total: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT SUM(calories)
            FROM logged_meals
            WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(db)
        .await?;
        Ok(total.unwrap_or(0.0))
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<LoggedMeal>> {
        let rows = sqlx::query_as::<_, LoggedMeal>(
            r#"
            SELECT id, user_id, description, calories, eaten_at
            FROM logged_meals
            WHERE user_id = $1
            ORDER BY eaten_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        description: &str,
        calories: f64,
    ) -> anyhow::Result<Option<LoggedMeal>> {
        let meal = sqlx::query_as::<_, LoggedMeal>(
            r#"
            UPDATE logged_meals
            SET description = $3, calories = $4
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, description, calories, eaten_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(description)
        .bind(calories)
        .fetch_optional(db)
        .await?;
        Ok(meal)
    }

    /// Returns whether a row was removed.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM logged_meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
