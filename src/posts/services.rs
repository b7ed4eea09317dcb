use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    posts::repo_types::{Comment, Like, Post},
    state::AppState,
    validation::Validator,
};

pub const POST_MISSING: &str = "Post not found";
const COMMENT_MISSING: &str = "Comment not found";

fn require_text(text: &str) -> AppResult<()> {
    Validator::new()
        .required("text", text, "Text is required")
        .finish()
}

/// Name and avatar are copied from the author as they are right now.
pub async fn create_post(state: &AppState, user_id: Uuid, text: &str) -> AppResult<Post> {
    require_text(text)?;
    let author = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    let post = state
        .posts
        .insert(Post {
            id: Uuid::new_v4(),
            user: author.id,
            text: text.trim().to_string(),
            name: author.name,
            avatar: author.avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            date: OffsetDateTime::now_utc(),
        })
        .await?;
    info!(post_id = %post.id, %user_id, "post created");
    Ok(post)
}

pub async fn list_posts(state: &AppState) -> AppResult<Vec<Post>> {
    Ok(state.posts.list().await?)
}

pub async fn get_post(state: &AppState, post_id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find(post_id)
        .await?
        .ok_or(AppError::NotFound(POST_MISSING))
}

pub async fn delete_post(state: &AppState, post_id: Uuid, requester: Uuid) -> AppResult<Post> {
    let post = get_post(state, post_id).await?;
    if post.user != requester {
        warn!(%post_id, %requester, "delete of someone else's post");
        return Err(AppError::Forbidden);
    }
    if !state.posts.delete_owned(post_id, requester).await? {
        return Err(AppError::NotFound(POST_MISSING));
    }
    info!(%post_id, "post deleted");
    Ok(post)
}

pub async fn like_post(state: &AppState, post_id: Uuid, user_id: Uuid) -> AppResult<Vec<Like>> {
    if let Some(likes) = state.posts.push_like(post_id, user_id).await? {
        return Ok(likes);
    }
    // The guard only refuses a missing post or an existing like.
    get_post(state, post_id).await?;
    Err(AppError::AlreadyLiked)
}

pub async fn unlike_post(state: &AppState, post_id: Uuid, user_id: Uuid) -> AppResult<Vec<Like>> {
    if let Some(likes) = state.posts.pull_like(post_id, user_id).await? {
        return Ok(likes);
    }
    get_post(state, post_id).await?;
    Err(AppError::NotYetLiked)
}

/// The commenter's avatar is copied at write time.
pub async fn add_comment(
    state: &AppState,
    post_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> AppResult<Post> {
    require_text(text)?;
    let author = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    let comment = Comment {
        id: Uuid::new_v4(),
        user: author.id,
        text: text.trim().to_string(),
        avatar: author.avatar,
        date: OffsetDateTime::now_utc(),
    };
    let comment_id = comment.id;
    let post = state
        .posts
        .push_comment(post_id, comment)
        .await?
        .ok_or(AppError::NotFound(POST_MISSING))?;
    info!(%post_id, %comment_id, "comment added");
    Ok(post)
}

pub async fn delete_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
    requester: Uuid,
) -> AppResult<Comment> {
    let post = get_post(state, post_id).await?;
    let comment = post
        .comment(comment_id)
        .cloned()
        .ok_or(AppError::NotFound(COMMENT_MISSING))?;
    if comment.user != requester {
        warn!(%post_id, %comment_id, %requester, "delete of someone else's comment");
        return Err(AppError::Forbidden);
    }
    if !state
        .posts
        .pull_comment(post_id, comment_id, requester)
        .await?
    {
        return Err(AppError::NotFound(COMMENT_MISSING));
    }
    info!(%post_id, %comment_id, "comment deleted");
    Ok(comment)
}
