use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::instrument;

use super::dto::{GeneratePlanRequest, GeneratePlanResponse, RegenerateRequest};
use super::reader::PlanView;
use super::regenerator::regenerate_slot;
use super::repo_types::MealSlot;
use super::services::{current_plan, generate_plan};
use crate::{
    auth::services::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/current", get(get_current_plan))
        .route("/plans/current/regenerate", post(regenerate))
}

#[instrument(skip(state, body))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GeneratePlanRequest>,
) -> AppResult<(StatusCode, Json<GeneratePlanResponse>)> {
    let mut rng = StdRng::from_entropy();
    let plan = generate_plan(&state, user_id, body, &mut rng).await?;
    Ok((
        StatusCode::CREATED,
        Json(GeneratePlanResponse {
            plan_id: plan.id,
            generated_at: plan.generated_at,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_current_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PlanView>> {
    Ok(Json(current_plan(&state, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn regenerate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<RegenerateRequest>,
) -> AppResult<Json<MealSlot>> {
    let (Some(day), Some(slot_type)) = (body.day, body.slot_type) else {
        return Err(AppError::validation("day and slot_type are required"));
    };
    let mut rng = StdRng::from_entropy();
    let slot = regenerate_slot(&state, user_id, &day, &slot_type, &mut rng).await?;
    Ok(Json(slot))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::extract::FromRef;
    use axum::http::{header, Request};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::auth::services::JwtKeys;
    use crate::plans::store::memory::MemoryPlanStore;
    use crate::provider::fake::FakeProvider;
    use crate::users::repo::memory::MemoryProfileStore;
    use crate::users::repo::Preferences;

    use super::*;

    fn app_for(user_id: Uuid, provider: FakeProvider) -> (Router, String) {
        let profiles = Arc::new(MemoryProfileStore::default());
        profiles.insert(user_id, Preferences { calorie_target: 2400, diet: Some("vegetarian".into()) });
        let state = AppState::fake_parts(
            Arc::new(provider),
            Arc::new(MemoryPlanStore::default()),
            profiles,
        );
        let token = JwtKeys::from_ref(&state).sign_access(user_id).unwrap();
        (plan_routes().with_state(state), token)
    }

    fn request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), 1_048_576).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn generate_read_and_regenerate_over_http() {
        let user_id = Uuid::new_v4();
        let (app, token) = app_for(user_id, FakeProvider::default());

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                "/plans",
                &token,
                serde_json::json!({"target_calories": 2000, "diet": "vegetarian"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = body_json(res).await;
        let plan_id = created["plan_id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/plans/current")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let view = body_json(res).await;
        assert_eq!(view["plan_id"], plan_id.as_str());
        assert_eq!(view["days"]["monday"]["snack"].as_array().unwrap().len(), 3);
        assert_eq!(view["days"]["monday"]["snack"][1]["slot_type"], "snack2");

        let res = app
            .oneshot(request(
                "POST",
                "/plans/current/regenerate",
                &token,
                serde_json::json!({"dayOfWeek": "monday", "mealType": "Lunch"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let slot = body_json(res).await;
        assert_eq!(slot["slot_type"], "lunch");
        assert_eq!(slot["title"], "Fresh recipe 9001");
    }

    #[tokio::test]
    async fn missing_plan_is_404() {
        let (app, token) = app_for(Uuid::new_v4(), FakeProvider::default());
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/plans/current")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn regenerate_without_fields_is_400() {
        let (app, token) = app_for(Uuid::new_v4(), FakeProvider::default());
        let res = app
            .oneshot(request(
                "POST",
                "/plans/current/regenerate",
                &token,
                serde_json::json!({"day": "monday"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_outage_is_502() {
        let provider = FakeProvider { fail_weekly: true, ..Default::default() };
        let (app, token) = app_for(Uuid::new_v4(), provider);
        let res = app
            .oneshot(request("POST", "/plans", &token, serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn requests_without_token_are_401() {
        let (app, _) = app_for(Uuid::new_v4(), FakeProvider::default());
        let res = app
            .oneshot(Request::builder().uri("/plans/current").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
