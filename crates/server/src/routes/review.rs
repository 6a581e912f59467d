use crate::{
    auth::CurrentUser,
    dtos::course::{ReviewListResponse, ReviewResponse},
    error::ApiError,
    forms::{Form, account::ReviewForm},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::{course::CourseService, review::ReviewService};

/// Reviews of a course, newest first, with the average rating
#[utoipa::path(
    get,
    path = "/courses/{id}/reviews",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Reviews of the course", body = ReviewListResponse),
        (status = 404, description = "Course not found")
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let course = CourseService::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("course"))?;

    let reviews = ReviewService::list_for_course(&state.db, course.id).await?;
    let average_rating = CourseService::average_rating(&state.db, course.id).await?;

    Ok(Json(ReviewListResponse {
        average_rating,
        reviews: reviews
            .into_iter()
            .map(|(review, user)| ReviewResponse::new(review, user.as_ref()))
            .collect(),
    }))
}

/// Review a course as the current user
#[utoipa::path(
    post,
    path = "/courses/{id}/reviews",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = ReviewForm,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    user.require(&["courses.add_review"])?;
    let (rating, comment) = form.validate()?;

    let review = ReviewService::create(&state.db, id, user.id(), rating, comment).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse::new(review, Some(&user.user))),
    ))
}
