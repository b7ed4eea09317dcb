use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Owner fields embedded into profile reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileOwner {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

/// Fixed set of social links; unknown platforms are not accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "iso_date")]
    pub from: Date,
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub degree: String,
    pub school: String,
    pub fieldofstudy: String,
    #[serde(with = "iso_date")]
    pub from: Date,
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Profile aggregate. `experience` and `education` are newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user: ProfileOwner,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub social: Social,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Profile {
    pub fn empty(owner: ProfileOwner) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: owner,
            company: None,
            website: None,
            location: None,
            status: None,
            skills: Vec::new(),
            bio: None,
            githubusername: None,
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            date: OffsetDateTime::now_utc(),
        }
    }

    /// `None` fields are left as they are; `social` is replaced as a whole.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        fn set(slot: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        set(&mut self.company, &update.company);
        set(&mut self.website, &update.website);
        set(&mut self.location, &update.location);
        set(&mut self.status, &update.status);
        set(&mut self.bio, &update.bio);
        set(&mut self.githubusername, &update.githubusername);
        if let Some(skills) = &update.skills {
            self.skills.clone_from(skills);
        }
        self.social = update.social.clone();
    }
}

/// Allow-listed profile fields a user may set.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub skills: Option<Vec<String>>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub social: Social,
}

/// Flat row as selected from `profiles JOIN users`.
#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub social: Json<Social>,
    pub experience: Json<Vec<Experience>>,
    pub education: Json<Vec<Education>>,
    pub date: OffsetDateTime,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            user: ProfileOwner {
                id: r.user_id,
                name: r.user_name,
                avatar: r.user_avatar,
            },
            company: r.company,
            website: r.website,
            location: r.location,
            status: r.status,
            skills: r.skills,
            bio: r.bio,
            githubusername: r.githubusername,
            social: r.social.0,
            experience: r.experience.0,
            education: r.education.0,
            date: r.date,
        }
    }
}
