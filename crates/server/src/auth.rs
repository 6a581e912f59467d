//! The requesting user, as asserted by the fronting proxy

use crate::{error::ApiError, state::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use database::{entities::user, services::account::AccountService};
use log::debug;
use models::filters::check_perms_list;
use sea_orm::EntityTrait;
use std::collections::HashSet;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

pub struct CurrentUser {
    pub user: user::Model,
    pub permissions: HashSet<String>,
}

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.user.id
    }

    /// Passes when the user holds any of `perms`
    pub fn require(&self, perms: &[&str]) -> Result<(), ApiError> {
        if check_perms_list(&self.permissions, perms) {
            Ok(())
        } else {
            debug!("User {} lacks any of {perms:?}", self.user.id);
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i32>().ok())
            .ok_or(ApiError::Unauthorized)?;

        let user = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .filter(|user| user.is_active)
            .ok_or(ApiError::Unauthorized)?;

        let permissions = AccountService::permissions(&user);
        Ok(Self { user, permissions })
    }
}
