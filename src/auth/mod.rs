use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod extractors;
mod gravatar;
pub mod handlers;
pub mod jwt;
mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::user_routes())
        .merge(handlers::auth_routes())
}
