use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

/// Comment with the author's avatar as it was when the comment was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub avatar: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Post aggregate. `likes` and `comments` are newest first; `name` and
/// `avatar` are copied from the author at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Post {
    pub fn liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|l| l.user == user_id)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

#[derive(Debug, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Json<Vec<Like>>,
    pub comments: Json<Vec<Comment>>,
    pub date: OffsetDateTime,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Self {
            id: r.id,
            user: r.user_id,
            text: r.text,
            name: r.name,
            avatar: r.avatar,
            likes: r.likes.0,
            comments: r.comments.0,
            date: r.date,
        }
    }
}
