use serde::{Deserialize, Serialize};

use crate::profiles::repo_types::Profile;

/// Body of `POST /profile`. `skills` arrives comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub skills: Option<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    pub location: Option<String>,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EducationRequest {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub fieldofstudy: String,
    #[serde(default)]
    pub from: String,
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileEnvelope {
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllProfilesResponse {
    pub all_profiles: Vec<Profile>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}
