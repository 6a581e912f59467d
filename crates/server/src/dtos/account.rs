use chrono::{DateTime, NaiveDate, Utc};
use database::{
    entities::{badge_award, profile, user},
    services::{account::AccountService, badge::BadgeService},
};
use models::filters::gravatar_url;
use serde::Serialize;
use utoipa::ToSchema;

/// What other users get to see of an account
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        let full_name = format!("{} {}", user.first_name, user.last_name)
            .trim()
            .to_owned();

        Self {
            id: user.id,
            username: user.username.clone(),
            full_name,
            avatar_url: gravatar_url(&user.email),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub award_points: i32,
    pub location: String,
    pub birthdate: Option<NaiveDate>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(profile: profile::Model) -> Self {
        Self {
            award_points: profile.award_points,
            location: profile.location,
            birthdate: profile.birthdate,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_student: bool,
    pub is_teacher: bool,
    pub date_joined: DateTime<Utc>,
    pub avatar_url: String,
    pub permissions: Vec<String>,
    pub profile: Option<ProfileResponse>,
}

impl AccountResponse {
    pub fn new(user: user::Model, profile: Option<profile::Model>) -> Self {
        let mut permissions: Vec<String> = AccountService::permissions(&user).into_iter().collect();
        permissions.sort();

        Self {
            avatar_url: gravatar_url(&user.email),
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_student: user.is_student,
            is_teacher: user.is_teacher,
            date_joined: user.date_joined,
            permissions,
            profile: profile.map(ProfileResponse::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BadgeResponse {
    pub id: i32,
    pub user_id: i32,
    pub slug: String,
    pub level: i32,
    pub awarded_at: DateTime<Utc>,
    /// `"{username} : {points} points - level {level}"`
    pub description: String,
}

impl BadgeResponse {
    pub fn new(badge: badge_award::Model, user: &user::Model, profile: &profile::Model) -> Self {
        let description = BadgeService::describe(&badge, user, profile);
        Self {
            id: badge.id,
            user_id: badge.user_id,
            slug: badge.slug,
            level: badge.level,
            awarded_at: badge.awarded_at,
            description,
        }
    }
}
