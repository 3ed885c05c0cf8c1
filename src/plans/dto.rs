use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Body of `POST /plans`; omitted fields come from the user's profile.
#[derive(Debug, Default, Deserialize)]
pub struct GeneratePlanRequest {
    #[serde(default, alias = "calories")]
    pub target_calories: Option<i32>,
    #[serde(default)]
    pub diet: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratePlanResponse {
    pub plan_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

/// Body of `POST /plans/current/regenerate`.
#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default, alias = "dayOfWeek")]
    pub day: Option<String>,
    #[serde(default, alias = "mealType")]
    pub slot_type: Option<String>,
}
