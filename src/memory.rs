//! In-process store with the same guarded-mutation semantics as the
//! Postgres repos. Each mutation runs under one write lock.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    posts::{
        repo::PostRepo,
        repo_types::{Comment, Like, Post},
    },
    profiles::{
        repo::ProfileRepo,
        repo_types::{Education, Experience, Profile, ProfileOwner, ProfileUpdate},
    },
};

#[derive(Default)]
struct Documents {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>, // keyed by owner id
    posts: Vec<Post>,                 // newest insert first
}

#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_profile<F>(&self, user_id: Uuid, f: F) -> anyhow::Result<Option<Profile>>
    where
        F: FnOnce(&mut Profile) + Send,
    {
        let mut docs = self.docs.write().await;
        Ok(docs.profiles.get_mut(&user_id).map(|p| {
            f(p);
            p.clone()
        }))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn insert(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut docs = self.docs.write().await;
        if docs.users.values().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let user = user.into_user();
        docs.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let docs = self.docs.read().await;
        Ok(docs.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.docs.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.docs.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn create_empty(&self, user_id: Uuid) -> anyhow::Result<Profile> {
        let mut docs = self.docs.write().await;
        anyhow::ensure!(
            !docs.profiles.contains_key(&user_id),
            "profile already exists for {user_id}"
        );
        let owner = docs
            .users
            .get(&user_id)
            .map(|u| ProfileOwner {
                id: u.id,
                name: u.name.clone(),
                avatar: u.avatar.clone(),
            })
            .with_context(|| format!("no user {user_id}"))?;
        let profile = Profile::empty(owner);
        docs.profiles.insert(user_id, profile.clone());
        Ok(profile)
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        Ok(self.docs.read().await.profiles.get(&user_id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let docs = self.docs.read().await;
        let mut all: Vec<Profile> = docs.profiles.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }

    async fn update(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> anyhow::Result<Option<Profile>> {
        self.with_profile(user_id, |p| p.apply(update)).await
    }

    async fn push_experience(
        &self,
        user_id: Uuid,
        entry: Experience,
    ) -> anyhow::Result<Option<Profile>> {
        self.with_profile(user_id, |p| p.experience.insert(0, entry))
            .await
    }

    async fn pull_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        self.with_profile(user_id, |p| p.experience.retain(|e| e.id != entry_id))
            .await
    }

    async fn push_education(
        &self,
        user_id: Uuid,
        entry: Education,
    ) -> anyhow::Result<Option<Profile>> {
        self.with_profile(user_id, |p| p.education.insert(0, entry))
            .await
    }

    async fn pull_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> anyhow::Result<Option<Profile>> {
        self.with_profile(user_id, |p| p.education.retain(|e| e.id != entry_id))
            .await
    }

    async fn delete_by_user(&self, user_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.docs.write().await.profiles.remove(&user_id).is_some())
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn insert(&self, post: Post) -> anyhow::Result<Post> {
        self.docs.write().await.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn list(&self) -> anyhow::Result<Vec<Post>> {
        let mut posts = self.docs.read().await.posts.clone();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        let docs = self.docs.read().await;
        Ok(docs.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let mut docs = self.docs.write().await;
        let before = docs.posts.len();
        docs.posts.retain(|p| !(p.id == id && p.user == owner));
        Ok(docs.posts.len() < before)
    }

    async fn push_like(&self, id: Uuid, user: Uuid) -> anyhow::Result<Option<Vec<Like>>> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if post.liked_by(user) {
            return Ok(None);
        }
        post.likes.insert(0, Like { user });
        Ok(Some(post.likes.clone()))
    }

    async fn pull_like(&self, id: Uuid, user: Uuid) -> anyhow::Result<Option<Vec<Like>>> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if !post.liked_by(user) {
            return Ok(None);
        }
        post.likes.retain(|l| l.user != user);
        Ok(Some(post.likes.clone()))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> anyhow::Result<Option<Post>> {
        let mut docs = self.docs.write().await;
        Ok(docs.posts.iter_mut().find(|p| p.id == id).map(|post| {
            post.comments.insert(0, comment);
            post.clone()
        }))
    }

    async fn pull_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
        author: Uuid,
    ) -> anyhow::Result<bool> {
        let mut docs = self.docs.write().await;
        let Some(post) = docs.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        let before = post.comments.len();
        post.comments
            .retain(|c| !(c.id == comment_id && c.user == author));
        Ok(post.comments.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn concurrent_likes_from_one_user_land_once() {
        let store = Arc::new(MemoryStore::new());
        let post_id = Uuid::new_v4();
        let user = Uuid::new_v4();
        PostRepo::insert(
            store.as_ref(),
            Post {
                id: post_id,
                user,
                text: "hello".into(),
                name: "Ann".into(),
                avatar: String::new(),
                likes: Vec::new(),
                comments: Vec::new(),
                date: time::OffsetDateTime::now_utc(),
            },
        )
        .await
        .unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.push_like(post_id, user).await.unwrap() })
            })
            .collect();
        let mut accepted = 0;
        for t in tasks {
            if t.await.unwrap().is_some() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(store.find(post_id).await.unwrap().unwrap().likes.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_insert_is_refused() {
        let store = MemoryStore::new();
        let new_user = || NewUser {
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "h".into(),
            avatar: "v".into(),
        };
        assert!(UserRepo::insert(&store, new_user()).await.unwrap().is_some());
        assert!(UserRepo::insert(&store, new_user()).await.unwrap().is_none());
    }
}
