use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::posts::repo_types::{Comment, Like, Post, PostRow};

/// Post store. Guarded mutations return `None`/`false` when their
/// precondition does not hold; callers re-read to find out why.
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn insert(&self, post: Post) -> anyhow::Result<Post>;
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Post>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Post>>;
    /// Deletes only if `owner` wrote the post.
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;
    /// Prepends a like unless `user` already liked the post.
    async fn push_like(&self, id: Uuid, user: Uuid) -> anyhow::Result<Option<Vec<Like>>>;
    /// Removes `user`'s like if there is one.
    async fn pull_like(&self, id: Uuid, user: Uuid) -> anyhow::Result<Option<Vec<Like>>>;
    async fn push_comment(&self, id: Uuid, comment: Comment) -> anyhow::Result<Option<Post>>;
    /// Removes the comment only if `author` wrote it.
    async fn pull_comment(&self, id: Uuid, comment_id: Uuid, author: Uuid)
        -> anyhow::Result<bool>;
}

const POST_COLUMNS: &str = "id, user_id, text, name, avatar, likes, comments, date";

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn insert(&self, post: Post) -> anyhow::Result<Post> {
        let sql = format!(
            "INSERT INTO posts ({POST_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.id)
            .bind(post.user)
            .bind(&post.text)
            .bind(&post.name)
            .bind(&post.avatar)
            .bind(Json(&post.likes))
            .bind(Json(&post.comments))
            .bind(post.date)
            .fetch_one(&self.db)
            .await
            .context("insert post")?;
        Ok(row.into())
    }

    async fn list(&self) -> anyhow::Result<Vec<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY date DESC");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list posts")?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find post")?;
        Ok(row.map(Post::from))
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM posts WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete post")?;
        Ok(res.rows_affected() > 0)
    }

    async fn push_like(&self, id: Uuid, user: Uuid) -> anyhow::Result<Option<Vec<Like>>> {
        let likes = sqlx::query_scalar::<_, Json<Vec<Like>>>(
            r#"
            UPDATE posts
               SET likes = jsonb_build_array(jsonb_build_object('user', $2::text)) || likes
             WHERE id = $1
               AND NOT likes @> jsonb_build_array(jsonb_build_object('user', $2::text))
            RETURNING likes
            "#,
        )
        .bind(id)
        .bind(user.to_string())
        .fetch_optional(&self.db)
        .await
        .context("push like")?;
        Ok(likes.map(|l| l.0))
    }

    async fn pull_like(&self, id: Uuid, user: Uuid) -> anyhow::Result<Option<Vec<Like>>> {
        let likes = sqlx::query_scalar::<_, Json<Vec<Like>>>(
            r#"
            UPDATE posts
               SET likes = COALESCE((
                       SELECT jsonb_agg(l ORDER BY ord)
                         FROM jsonb_array_elements(likes) WITH ORDINALITY AS t(l, ord)
                        WHERE l->>'user' <> $2
                   ), '[]'::jsonb)
             WHERE id = $1
               AND likes @> jsonb_build_array(jsonb_build_object('user', $2::text))
            RETURNING likes
            "#,
        )
        .bind(id)
        .bind(user.to_string())
        .fetch_optional(&self.db)
        .await
        .context("pull like")?;
        Ok(likes.map(|l| l.0))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> anyhow::Result<Option<Post>> {
        let sql = format!(
            "UPDATE posts SET comments = jsonb_build_array($2::jsonb) || comments \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(Json(&comment))
            .fetch_optional(&self.db)
            .await
            .context("push comment")?;
        Ok(row.map(Post::from))
    }

    async fn pull_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        author: Uuid,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE posts
               SET comments = COALESCE((
                       SELECT jsonb_agg(c ORDER BY ord)
                         FROM jsonb_array_elements(comments) WITH ORDINALITY AS t(c, ord)
                        WHERE c->>'id' <> $2
                   ), '[]'::jsonb)
             WHERE id = $1
               AND comments @> jsonb_build_array(
                       jsonb_build_object('id', $2::text, 'user', $3::text))
            "#,
        )
        .bind(id)
        .bind(comment_id.to_string())
        .bind(author.to_string())
        .execute(&self.db)
        .await
        .context("pull comment")?;
        Ok(res.rows_affected() > 0)
    }
}
