use crate::{
    auth::CurrentUser,
    dtos::account::{AccountResponse, BadgeResponse, ProfileResponse},
    error::ApiError,
    forms::{
        Form,
        account::{BadgeForm, ProfileEditForm, SignUpForm, UserEditForm},
    },
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use database::services::{
    account::{AccountService, TEACHER_PERMISSIONS},
    badge::BadgeService,
};

/// Register an account
#[utoipa::path(
    post,
    path = "/accounts",
    request_body = SignUpForm,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 422, description = "Invalid input or username taken")
    ),
    tag = "Accounts"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(form): Json<SignUpForm>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account = form.validate()?;
    let (user, profile) =
        AccountService::create_account(&state.db, account, state.account_policy()).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::new(user, Some(profile))),
    ))
}

/// The current user's account and profile
#[utoipa::path(
    get,
    path = "/accounts/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "No authenticated user")
    ),
    tag = "Accounts"
)]
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<AccountResponse>, ApiError> {
    let (user, profile) = AccountService::get(&state.db, user.id())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(AccountResponse::new(user, profile)))
}

/// Edit the current user's names
#[utoipa::path(
    put,
    path = "/accounts/me",
    request_body = UserEditForm,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 401, description = "No authenticated user"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Accounts"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<UserEditForm>,
) -> Result<Json<AccountResponse>, ApiError> {
    let changes = form.validate()?;
    let (user, profile) = AccountService::save_user(&state.db, user.id(), changes).await?;

    Ok(Json(AccountResponse::new(user, Some(profile))))
}

/// Edit the current user's profile
#[utoipa::path(
    put,
    path = "/accounts/me/profile",
    request_body = ProfileEditForm,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "No authenticated user"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Accounts"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<ProfileEditForm>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let (location, birthdate) = form.validate()?;
    let profile = AccountService::update_profile(&state.db, user.id(), location, birthdate).await?;

    Ok(Json(ProfileResponse::from(profile)))
}

/// Badges earned by the current user, most recent first
#[utoipa::path(
    get,
    path = "/accounts/me/badges",
    responses(
        (status = 200, description = "Earned badges", body = Vec<BadgeResponse>),
        (status = 401, description = "No authenticated user")
    ),
    tag = "Accounts"
)]
pub async fn my_badges(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<BadgeResponse>>, ApiError> {
    let profile = AccountService::ensure_profile(&state.db, user.id()).await?;
    let badges = BadgeService::list_for_user(&state.db, user.id()).await?;

    Ok(Json(
        badges
            .into_iter()
            .map(|badge| BadgeResponse::new(badge, &user.user, &profile))
            .collect(),
    ))
}

/// Award a badge to a user
#[utoipa::path(
    post,
    path = "/badges",
    request_body = BadgeForm,
    responses(
        (status = 201, description = "Badge awarded", body = BadgeResponse),
        (status = 403, description = "Only teachers award badges"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Accounts"
)]
pub async fn award_badge(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<BadgeForm>,
) -> Result<(StatusCode, Json<BadgeResponse>), ApiError> {
    user.require(&TEACHER_PERMISSIONS)?;
    let (user_id, slug, level) = form.validate()?;

    let (recipient, _) = AccountService::get(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let profile = AccountService::ensure_profile(&state.db, recipient.id).await?;
    let badge = BadgeService::award(&state.db, recipient.id, slug, level).await?;

    Ok((
        StatusCode::CREATED,
        Json(BadgeResponse::new(badge, &recipient, &profile)),
    ))
}
