use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignUpRequest, SignUpResponse, TokenResponse},
        extractors::AuthUser,
        services::{authenticate, current_user, normalize_email, register},
    },
    error::AppResult,
    state::AppState,
    validation::{AppJson, Validator},
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/user", post(sign_up))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth", post(login).get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> AppResult<Json<SignUpResponse>> {
    Validator::new()
        .required("name", &payload.name, "Name is required")
        .email("email", &normalize_email(&payload.email), "Please include a valid email")
        .min_len(
            "password",
            &payload.password,
            6,
            "Password must have a minimum of 6 characters",
        )
        .finish()?;

    let (user, profile) = register(&state, &payload.name, &payload.email, &payload.password).await?;
    let token = state.jwt.sign(user.id)?;
    Ok(Json(SignUpResponse { token, profile }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    Validator::new()
        .email("email", &normalize_email(&payload.email), "Please include a valid email")
        .required("password", &payload.password, "Password is required")
        .finish()?;

    let user_id = authenticate(&state, &payload.email, &payload.password).await?;
    let token = state.jwt.sign(user_id)?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = current_user(&state, user_id).await?;
    Ok(Json(user.into()))
}
