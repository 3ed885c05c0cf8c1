use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::ProfileInput;
use super::repo_types::User;

const USER_COLUMNS: &str = "id, email, password_hash, name, age, gender, height_cm, weight_kg, \
                            activity_level, diet, goal, calorie_target, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        profile: &ProfileInput,
        calorie_target: i32,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, age, gender, height_cm, weight_kg,
                               activity_level, diet, goal, calorie_target)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(&profile.name)
        .bind(profile.age)
        .bind(profile.gender)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.activity_level)
        .bind(&profile.diet)
        .bind(profile.goal)
        .bind(calorie_target)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        profile: &ProfileInput,
        calorie_target: i32,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, age = $3, gender = $4, height_cm = $5, weight_kg = $6,
                activity_level = $7, diet = $8, goal = $9, calorie_target = $10
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&profile.name)
        .bind(profile.age)
        .bind(profile.gender)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(profile.activity_level)
        .bind(&profile.diet)
        .bind(profile.goal)
        .bind(calorie_target)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}

/// What plan generation needs to know about a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub calorie_target: i32,
    pub diet: Option<String>,
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn preferences(&self, user_id: Uuid) -> anyhow::Result<Option<Preferences>>;
}

pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn preferences(&self, user_id: Uuid) -> anyhow::Result<Option<Preferences>> {
        let row: Option<(i32, Option<String>)> =
            sqlx::query_as("SELECT calorie_target, diet FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(|(calorie_target, diet)| Preferences {
            calorie_target,
            diet,
        }))
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryProfileStore {
        users: Mutex<HashMap<Uuid, Preferences>>,
    }

    impl MemoryProfileStore {
        pub fn insert(&self, user_id: Uuid, prefs: Preferences) {
            self.users.lock().unwrap().insert(user_id, prefs);
        }
    }

    #[async_trait]
    impl ProfileStore for MemoryProfileStore {
        async fn preferences(&self, user_id: Uuid) -> anyhow::Result<Option<Preferences>> {
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }
    }
}
