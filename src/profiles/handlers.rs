use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    profiles::{
        dto::{
            AllProfilesResponse, EducationRequest, ExperienceRequest, MessageResponse,
            ProfileEnvelope, ProfileRequest,
        },
        repo_types::Profile,
        services,
    },
    state::AppState,
    validation::{parse_id, AppJson},
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(list_profiles).post(upsert_profile).delete(delete_profile),
        )
        .route("/profile/self", get(get_own_profile))
        .route("/profile/:user_id", get(get_profile_by_user))
        .route("/profile/experience", put(add_experience))
        .route("/profile/experience/:exp_id", delete(remove_experience))
        .route("/profile/education", put(add_education))
        .route("/profile/education/:edu_id", delete(remove_education))
        .route("/profile/github/:username", get(github_repos))
}

#[instrument(skip(state))]
pub async fn get_own_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileEnvelope>> {
    let profile = services::get_profile(&state, user_id).await?;
    Ok(Json(ProfileEnvelope { profile }))
}

#[instrument(skip(state))]
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ProfileEnvelope>> {
    let user_id = parse_id(&user_id, "Profile doesn't exist")?;
    let profile = services::get_profile(&state, user_id).await?;
    Ok(Json(ProfileEnvelope { profile }))
}

#[instrument(skip(state))]
pub async fn list_profiles(State(state): State<AppState>) -> AppResult<Json<AllProfilesResponse>> {
    let all_profiles = services::list_profiles(&state).await?;
    Ok(Json(AllProfilesResponse { all_profiles }))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ProfileRequest>,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::update_profile(&state, user_id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<MessageResponse>> {
    services::delete_account(&state, user_id).await?;
    Ok(Json(MessageResponse {
        msg: "User deleted",
    }))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ExperienceRequest>,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::add_experience(&state, user_id, payload).await?))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::remove_experience(&state, user_id, &exp_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<EducationRequest>,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::add_education(&state, user_id, payload).await?))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> AppResult<Json<Profile>> {
    Ok(Json(services::remove_education(&state, user_id, &edu_id).await?))
}

#[instrument(skip(state))]
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    Ok(Json(services::github_repos(&state, &username).await?))
}
