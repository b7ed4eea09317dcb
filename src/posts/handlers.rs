use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    posts::{
        dto::{
            AddedCommentResponse, AddedPostResponse, AllPostsResponse, DeletedCommentResponse,
            DeletedPostResponse, LikesResponse, PostEnvelope, TextRequest,
        },
        services::{self, POST_MISSING},
    },
    state::AppState,
    validation::{parse_id, AppJson},
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post", post(create_post).get(list_posts))
        .route("/post/:pst_id", get(get_post).delete(delete_post))
        .route("/post/:pst_id/like", put(like_post))
        .route("/post/:pst_id/unlike", put(unlike_post))
        .route("/post/:pst_id/comment", post(add_comment))
        .route("/post/:pst_id/comment/:cmt_id", delete(delete_comment))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<TextRequest>,
) -> AppResult<Json<AddedPostResponse>> {
    let added_post = services::create_post(&state, user_id, &payload.text).await?;
    Ok(Json(AddedPostResponse { added_post }))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> AppResult<Json<AllPostsResponse>> {
    let all_post = services::list_posts(&state).await?;
    Ok(Json(AllPostsResponse { all_post }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(pst_id): Path<String>,
) -> AppResult<Json<PostEnvelope>> {
    let post = services::get_post(&state, parse_id(&pst_id, POST_MISSING)?).await?;
    Ok(Json(PostEnvelope { post }))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(pst_id): Path<String>,
) -> AppResult<Json<DeletedPostResponse>> {
    let deleted_post =
        services::delete_post(&state, parse_id(&pst_id, POST_MISSING)?, user_id).await?;
    Ok(Json(DeletedPostResponse {
        deleted_post,
        msg: "Post deleted",
    }))
}

#[instrument(skip(state))]
pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(pst_id): Path<String>,
) -> AppResult<Json<LikesResponse>> {
    let likes = services::like_post(&state, parse_id(&pst_id, POST_MISSING)?, user_id).await?;
    Ok(Json(LikesResponse { likes, msg: None }))
}

#[instrument(skip(state))]
pub async fn unlike_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(pst_id): Path<String>,
) -> AppResult<Json<LikesResponse>> {
    let likes =
        services::unlike_post(&state, parse_id(&pst_id, POST_MISSING)?, user_id).await?;
    Ok(Json(LikesResponse {
        likes,
        msg: Some("post unliked"),
    }))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(pst_id): Path<String>,
    AppJson(payload): AppJson<TextRequest>,
) -> AppResult<Json<AddedCommentResponse>> {
    let post_id = parse_id(&pst_id, POST_MISSING)?;
    let added_comment = services::add_comment(&state, post_id, user_id, &payload.text).await?;
    Ok(Json(AddedCommentResponse {
        added_comment,
        msg: "Comment added",
    }))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((pst_id, cmt_id)): Path<(String, String)>,
) -> AppResult<Json<DeletedCommentResponse>> {
    let post_id = parse_id(&pst_id, POST_MISSING)?;
    let comment_id = parse_id(&cmt_id, "Comment not found")?;
    let deleted_comment = services::delete_comment(&state, post_id, comment_id, user_id).await?;
    Ok(Json(DeletedCommentResponse {
        deleted_comment,
        msg: "Comment deleted",
    }))
}
