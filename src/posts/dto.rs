use serde::{Deserialize, Serialize};

use crate::posts::repo_types::{Comment, Like, Post};

/// Body of both `POST /post` and `POST /post/:id/comment`.
#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedPostResponse {
    pub added_post: Post,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllPostsResponse {
    pub all_post: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostEnvelope {
    pub post: Post,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPostResponse {
    pub deleted_post: Post,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub likes: Vec<Like>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedCommentResponse {
    pub added_comment: Post,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCommentResponse {
    pub deleted_comment: Comment,
    pub msg: &'static str,
}
