use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo_types::{Education, Experience, Profile, ProfileRow, ProfileUpdate};

/// Profile store. Every list mutation is a single atomic operation;
/// `Ok(None)` means the user has no profile.
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn create_empty(&self, user_id: Uuid) -> anyhow::Result<Profile>;
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn list(&self) -> anyhow::Result<Vec<Profile>>;
    async fn update(&self, user_id: Uuid, update: &ProfileUpdate)
        -> anyhow::Result<Option<Profile>>;
    async fn push_experience(&self, user_id: Uuid, entry: Experience)
        -> anyhow::Result<Option<Profile>>;
    async fn pull_experience(&self, user_id: Uuid, entry_id: Uuid)
        -> anyhow::Result<Option<Profile>>;
    async fn push_education(&self, user_id: Uuid, entry: Education)
        -> anyhow::Result<Option<Profile>>;
    async fn pull_education(&self, user_id: Uuid, entry_id: Uuid)
        -> anyhow::Result<Option<Profile>>;
    async fn delete_by_user(&self, user_id: Uuid) -> anyhow::Result<bool>;
}

const PROFILE_COLUMNS: &str = r#"
    p.id, p.user_id, u.name AS user_name, u.avatar AS user_avatar,
    p.company, p.website, p.location, p.status, p.skills, p.bio,
    p.githubusername, p.social, p.experience, p.education, p.date
"#;

#[derive(Debug, Clone, Copy)]
enum EntryList {
    Experience,
    Education,
}

impl EntryList {
    fn column(self) -> &'static str {
        match self {
            EntryList::Experience => "experience",
            EntryList::Education => "education",
        }
    }
}

#[derive(Clone)]
pub struct PgProfileRepo {
    db: PgPool,
}

impl PgProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Runs a data-modifying statement over `profiles` (exposed as `p`)
    /// and reads back the joined row.
    fn joined(update_cte: &str) -> String {
        format!(
            "WITH p AS ({update_cte} RETURNING *) \
             SELECT {PROFILE_COLUMNS} FROM p JOIN users u ON u.id = p.user_id"
        )
    }

    async fn push_entry<T: Serialize + Send + Sync>(
        &self,
        user_id: Uuid,
        list: EntryList,
        entry: &T,
    ) -> anyhow::Result<Option<Profile>> {
        let col = list.column();
        let sql = Self::joined(&format!(
            "UPDATE profiles SET {col} = jsonb_build_array($2::jsonb) || {col} WHERE user_id = $1"
        ));
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(Json(entry))
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("push {col} entry"))?;
        Ok(row.map(Profile::from))
    }

    async fn pull_entry(
        &self,
        user_id: Uuid,
        list: EntryList,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        let col = list.column();
        let sql = Self::joined(&format!(
            "UPDATE profiles SET {col} = COALESCE(( \
                 SELECT jsonb_agg(e ORDER BY ord) \
                 FROM jsonb_array_elements({col}) WITH ORDINALITY AS t(e, ord) \
                 WHERE e->>'id' <> $2 \
             ), '[]'::jsonb) \
             WHERE user_id = $1"
        ));
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(entry_id.to_string())
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("pull {col} entry"))?;
        Ok(row.map(Profile::from))
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    async fn create_empty(&self, user_id: Uuid) -> anyhow::Result<Profile> {
        let sql = Self::joined(
            "INSERT INTO profiles (id, user_id, date) VALUES ($1, $2, $3)",
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(&self.db)
            .await
            .context("create profile")?;
        Ok(row.into())
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p JOIN users u ON u.id = p.user_id \
             WHERE p.user_id = $1"
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("find profile by user")?;
        Ok(row.map(Profile::from))
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles p JOIN users u ON u.id = p.user_id \
             ORDER BY p.date DESC"
        );
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list profiles")?;
        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn update(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<Profile>> {
        let sql = Self::joined(
            r#"
            UPDATE profiles SET
                company = COALESCE($2, company),
                website = COALESCE($3, website),
                location = COALESCE($4, location),
                status = COALESCE($5, status),
                skills = COALESCE($6, skills),
                bio = COALESCE($7, bio),
                githubusername = COALESCE($8, githubusername),
                social = $9
            WHERE user_id = $1
            "#,
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(&update.company)
            .bind(&update.website)
            .bind(&update.location)
            .bind(&update.status)
            .bind(&update.skills)
            .bind(&update.bio)
            .bind(&update.githubusername)
            .bind(Json(&update.social))
            .fetch_optional(&self.db)
            .await
            .context("update profile")?;
        Ok(row.map(Profile::from))
    }

    async fn push_experience(
        &self,
        user_id: Uuid,
        entry: Experience,
    ) -> anyhow::Result<Option<Profile>> {
        self.push_entry(user_id, EntryList::Experience, &entry).await
    }

    async fn pull_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        self.pull_entry(user_id, EntryList::Experience, entry_id).await
    }

    async fn push_education(
        &self,
        user_id: Uuid,
        entry: Education,
    ) -> anyhow::Result<Option<Profile>> {
        self.push_entry(user_id, EntryList::Education, &entry).await
    }

    async fn pull_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        self.pull_entry(user_id, EntryList::Education, entry_id).await
    }

    async fn delete_by_user(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM profiles WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete profile")?;
        Ok(res.rows_affected() > 0)
    }
}
