pub mod assembler;
pub mod domain;
mod dto;
pub mod handlers;
pub mod reader;
pub mod regenerator;
pub mod repo_types;
pub mod services;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::plan_routes())
}
