use crate::{
    auth::CurrentUser,
    dtos::course::SubjectResponse,
    error::ApiError,
    forms::{Form, FormErrors, course::SubjectForm},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use database::services::subject::SubjectService;
use models::slug::base_slug;

/// List subjects with the number of courses in each
#[utoipa::path(
    get,
    path = "/subjects",
    responses(
        (status = 200, description = "Subjects ordered by title", body = Vec<SubjectResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, ApiError> {
    let subjects = SubjectService::list_with_counts(&state.db).await?;

    Ok(Json(
        subjects
            .into_iter()
            .map(|(subject, total)| SubjectResponse::new(subject, total))
            .collect(),
    ))
}

/// Create a subject
#[utoipa::path(
    post,
    path = "/subjects",
    request_body = SubjectForm,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 401, description = "No authenticated user"),
        (status = 403, description = "Missing permission"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Courses"
)]
pub async fn create_subject(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<SubjectForm>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    user.require(&["courses.add_course"])?;
    let (title, slug) = form.validate()?;

    let slug = slug.unwrap_or_else(|| base_slug(&title));
    if SubjectService::get_by_slug(&state.db, &slug).await?.is_some() {
        return Err(FormErrors::single("slug", "Subject with this Slug already exists.").into());
    }

    let subject = SubjectService::create(&state.db, title, Some(slug)).await?;
    Ok((StatusCode::CREATED, Json(SubjectResponse::new(subject, 0))))
}
