use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    profiles::{
        dto::{EducationRequest, ExperienceRequest, ProfileRequest},
        repo_types::{Education, Experience, Profile, ProfileUpdate, Social},
    },
    state::AppState,
    validation::Validator,
};

const PROFILE_MISSING: &str = "Profile not found";

/// Comma separated input to a trimmed, de-duplicated list in first-seen order.
pub fn normalize_skills(raw: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for skill in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !skills.iter().any(|s| s == skill) {
            skills.push(skill.to_string());
        }
    }
    skills
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(r: ProfileRequest) -> Self {
        Self {
            company: r.company,
            website: r.website,
            location: r.location,
            status: r.status,
            skills: r.skills.as_deref().map(normalize_skills),
            bio: r.bio,
            githubusername: r.githubusername,
            social: Social {
                youtube: non_blank(r.youtube),
                twitter: non_blank(r.twitter),
                facebook: non_blank(r.facebook),
                linkedin: non_blank(r.linkedin),
                instagram: non_blank(r.instagram),
            },
        }
    }
}

pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    state
        .profiles
        .find_by_user(user_id)
        .await?
        .ok_or(AppError::NotFound("Profile doesn't exist"))
}

pub async fn list_profiles(state: &AppState) -> AppResult<Vec<Profile>> {
    Ok(state.profiles.list().await?)
}

/// Only updates an existing profile; profiles are created at sign-up.
pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    request: ProfileRequest,
) -> AppResult<Profile> {
    let update = ProfileUpdate::from(request);
    let profile = state
        .profiles
        .update(user_id, &update)
        .await?
        .ok_or(AppError::NotFound(PROFILE_MISSING))?;
    info!(%user_id, "profile updated");
    Ok(profile)
}

pub async fn add_experience(
    state: &AppState,
    user_id: Uuid,
    request: ExperienceRequest,
) -> AppResult<Profile> {
    let mut v = Validator::new();
    v.required("title", &request.title, "Title is required")
        .required("company", &request.company, "Company is required")
        .required("from", &request.from, "From date is required");
    let from = v.date("from", Some(request.from.as_str()), "From date is invalid");
    let to = v.date("to", request.to.as_deref(), "To date is invalid");
    v.finish()?;

    let entry = Experience {
        id: Uuid::new_v4(),
        title: request.title.trim().to_string(),
        company: request.company.trim().to_string(),
        location: non_blank(request.location),
        from: from.ok_or_else(|| anyhow::anyhow!("validated from date missing"))?,
        to,
        current: request.current,
        description: non_blank(request.description),
    };
    let entry_id = entry.id;
    let profile = state
        .profiles
        .push_experience(user_id, entry)
        .await?
        .ok_or(AppError::NotFound(PROFILE_MISSING))?;
    info!(%user_id, %entry_id, "experience added");
    Ok(profile)
}

/// Unknown or malformed entry ids leave the list untouched.
pub async fn remove_experience(
    state: &AppState,
    user_id: Uuid,
    raw_entry_id: &str,
) -> AppResult<Profile> {
    let profile = match Uuid::parse_str(raw_entry_id) {
        Ok(entry_id) => state.profiles.pull_experience(user_id, entry_id).await?,
        Err(_) => state.profiles.find_by_user(user_id).await?,
    };
    profile.ok_or(AppError::NotFound(PROFILE_MISSING))
}

pub async fn add_education(
    state: &AppState,
    user_id: Uuid,
    request: EducationRequest,
) -> AppResult<Profile> {
    let mut v = Validator::new();
    v.required("degree", &request.degree, "Degree is required")
        .required("school", &request.school, "School is required")
        .required("fieldofstudy", &request.fieldofstudy, "Field of study is required")
        .required("from", &request.from, "From date is required");
    let from = v.date("from", Some(request.from.as_str()), "From date is invalid");
    let to = v.date("to", request.to.as_deref(), "To date is invalid");
    v.finish()?;

    let entry = Education {
        id: Uuid::new_v4(),
        degree: request.degree.trim().to_string(),
        school: request.school.trim().to_string(),
        fieldofstudy: request.fieldofstudy.trim().to_string(),
        from: from.ok_or_else(|| anyhow::anyhow!("validated from date missing"))?,
        to,
        current: request.current,
        description: non_blank(request.description),
    };
    let entry_id = entry.id;
    let profile = state
        .profiles
        .push_education(user_id, entry)
        .await?
        .ok_or(AppError::NotFound(PROFILE_MISSING))?;
    info!(%user_id, %entry_id, "education added");
    Ok(profile)
}

/// Unknown or malformed entry ids leave the list untouched.
pub async fn remove_education(
    state: &AppState,
    user_id: Uuid,
    raw_entry_id: &str,
) -> AppResult<Profile> {
    let profile = match Uuid::parse_str(raw_entry_id) {
        Ok(entry_id) => state.profiles.pull_education(user_id, entry_id).await?,
        Err(_) => state.profiles.find_by_user(user_id).await?,
    };
    profile.ok_or(AppError::NotFound(PROFILE_MISSING))
}

/// Removes the profile, then the user it belongs to.
pub async fn delete_account(state: &AppState, user_id: Uuid) -> AppResult<()> {
    if !state.profiles.delete_by_user(user_id).await? {
        warn!(%user_id, "delete requested without a profile");
        return Err(AppError::NotFound(PROFILE_MISSING));
    }
    state.users.delete(user_id).await?;
    info!(%user_id, "user and profile deleted");
    Ok(())
}

pub async fn github_repos(state: &AppState, username: &str) -> AppResult<serde_json::Value> {
    state
        .github
        .recent_repos(username)
        .await?
        .ok_or(AppError::NotFound("Github profile not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::create_user;

    async fn user_with_profile(state: &AppState) -> Uuid {
        let user = create_user(state, "Ann", "ann@x.com", "secret1").await.unwrap();
        state.profiles.create_empty(user.id).await.unwrap();
        user.id
    }

    fn experience(title: &str, from: &str) -> ExperienceRequest {
        ExperienceRequest {
            title: title.into(),
            company: "Acme".into(),
            from: from.into(),
            ..Default::default()
        }
    }

    #[test]
    fn skills_are_trimmed_ordered_and_unique() {
        assert_eq!(
            normalize_skills(" rust, go ,rust,, sql "),
            vec!["rust".to_string(), "go".into(), "sql".into()]
        );
        assert!(normalize_skills(" , ").is_empty());
    }

    #[tokio::test]
    async fn update_requires_an_existing_profile() {
        let state = AppState::fake();
        let err = update_profile(&state, Uuid::new_v4(), ProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Profile not found")));
    }

    #[tokio::test]
    async fn update_sets_supplied_fields_only() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;

        update_profile(
            &state,
            user_id,
            ProfileRequest {
                company: Some("Acme".into()),
                skills: Some("rust, sql".into()),
                twitter: Some("https://twitter.com/ann".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let profile = update_profile(
            &state,
            user_id,
            ProfileRequest {
                bio: Some("hi".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert_eq!(profile.skills, ["rust", "sql"]);
        assert_eq!(profile.bio.as_deref(), Some("hi"));
        assert_eq!(profile.social, Social::default());
        assert_eq!(profile.user.name, "Ann");
    }

    #[tokio::test]
    async fn experience_is_newest_first_and_removal_restores_the_list() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;

        add_experience(&state, user_id, experience("Junior", "2015-01-01"))
            .await
            .unwrap();
        let before = add_experience(&state, user_id, experience("Senior", "2018-06-01"))
            .await
            .unwrap()
            .experience;
        assert_eq!(before[0].title, "Senior");

        let added = add_experience(&state, user_id, experience("Lead", "2021-02-01"))
            .await
            .unwrap();
        assert_eq!(added.experience.len(), 3);
        let lead_id = added.experience[0].id;

        let after = remove_experience(&state, user_id, &lead_id.to_string())
            .await
            .unwrap();
        assert_eq!(after.experience, before);
    }

    #[tokio::test]
    async fn removing_unknown_entry_is_a_noop() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;
        let profile = add_experience(&state, user_id, experience("Dev", "2020-01-01"))
            .await
            .unwrap();

        let same = remove_experience(&state, user_id, &Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert_eq!(same.experience, profile.experience);
        let same = remove_experience(&state, user_id, "garbage").await.unwrap();
        assert_eq!(same.experience, profile.experience);
    }

    #[tokio::test]
    async fn experience_validation_lists_missing_fields() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;
        let err = add_experience(&state, user_id, ExperienceRequest::default())
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let params: Vec<_> = errors.iter().filter_map(|e| e.param.as_deref()).collect();
        assert_eq!(params, ["title", "company", "from"]);
    }

    #[tokio::test]
    async fn experience_without_profile_is_not_found() {
        let state = AppState::fake();
        let err = add_experience(&state, Uuid::new_v4(), experience("Dev", "2020-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    fn education(degree: &str, from: &str) -> EducationRequest {
        EducationRequest {
            degree: degree.into(),
            school: "MIT".into(),
            fieldofstudy: "CS".into(),
            from: from.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn education_add_and_remove() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;
        let request = EducationRequest {
            to: Some("2014-06-01".into()),
            ..education("BSc", "2010-09-01")
        };
        let profile = add_education(&state, user_id, request).await.unwrap();
        assert_eq!(profile.education.len(), 1);
        let id = profile.education[0].id;

        let profile = remove_education(&state, user_id, &id.to_string()).await.unwrap();
        assert!(profile.education.is_empty());
    }

    #[tokio::test]
    async fn education_validation_lists_missing_fields() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;
        let err = add_education(&state, user_id, EducationRequest::default())
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let params: Vec<_> = errors.iter().filter_map(|e| e.param.as_deref()).collect();
        assert_eq!(params, ["degree", "school", "fieldofstudy", "from"]);
    }

    #[tokio::test]
    async fn education_without_profile_is_not_found() {
        let state = AppState::fake();
        let err = add_education(&state, Uuid::new_v4(), education("BSc", "2010-09-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Profile not found")));
    }

    #[tokio::test]
    async fn removing_unknown_education_is_a_noop() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;
        add_education(&state, user_id, education("BSc", "2010-09-01"))
            .await
            .unwrap();
        let profile = add_education(&state, user_id, education("MSc", "2014-09-01"))
            .await
            .unwrap();
        assert_eq!(profile.education[0].degree, "MSc");

        let same = remove_education(&state, user_id, &Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert_eq!(same.education, profile.education);
        let same = remove_education(&state, user_id, "garbage").await.unwrap();
        assert_eq!(same.education, profile.education);
    }

    #[tokio::test]
    async fn delete_account_cascades_and_requires_profile() {
        let state = AppState::fake();
        let user_id = user_with_profile(&state).await;

        delete_account(&state, user_id).await.unwrap();
        assert!(state.users.find_by_id(user_id).await.unwrap().is_none());
        assert!(state.profiles.find_by_user(user_id).await.unwrap().is_none());

        let err = delete_account(&state, user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_github_user_is_not_found() {
        let state = AppState::fake();
        assert!(github_repos(&state, "octocat").await.is_ok());
        let err = github_repos(&state, "missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Github profile not found")));
    }
}
