use crate::{
    auth::CurrentUser,
    dtos::{
        common::PaginationMeta,
        course::{CourseDetailResponse, CourseQueryParams, CourseResponse, PaginatedCoursesResponse},
    },
    error::ApiError,
    forms::{Form, FormErrors, course::CourseCreateForm},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
};
use database::{
    entities::{course, subject},
    services::course::{CourseService, NewCourse},
};
use models::filters::{QueryParams, page_url};
use sea_orm::EntityTrait;

/// The course if it exists and belongs to `user`
///
/// Courses of other teachers are reported as missing.
pub(crate) async fn owned_course(
    state: &AppState,
    user: &CurrentUser,
    course_id: i32,
) -> Result<course::Model, ApiError> {
    CourseService::get(&state.db, course_id)
        .await?
        .filter(|course| course.owner_id == user.id())
        .ok_or(ApiError::NotFound("course"))
}

async fn ensure_subject(state: &AppState, subject_id: i32) -> Result<(), ApiError> {
    if subject::Entity::find_by_id(subject_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(FormErrors::single(
            "subject",
            "Select a valid choice. That choice is not one of the available choices.",
        )
        .into());
    }
    Ok(())
}

/// Get paginated list of courses
#[utoipa::path(
    get,
    path = "/courses",
    params(CourseQueryParams),
    responses(
        (status = 200, description = "List of courses retrieved successfully", body = PaginatedCoursesResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn get_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseQueryParams>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<PaginatedCoursesResponse>, ApiError> {
    let page = params.page.max(1);
    let per_page = params.per_page.max(1);

    let (courses, total_items) =
        CourseService::list(&state.db, params.subject.as_deref(), page, per_page).await?;

    let course_responses = courses
        .into_iter()
        .map(|(course, subject)| CourseResponse::new(course, subject.as_ref()))
        .collect();

    // Page links keep every other parameter of the request
    let query = QueryParams::parse(raw_query.as_deref().unwrap_or_default());
    let total_pages = total_items.div_ceil(per_page);
    let has_next = page < total_pages;
    let has_prev = page > 1;

    let pagination = PaginationMeta {
        page,
        per_page,
        total_pages,
        total_items,
        has_next,
        has_prev,
        next: has_next.then(|| page_url(&query, page + 1)),
        prev: has_prev.then(|| page_url(&query, page - 1)),
    };

    Ok(Json(PaginatedCoursesResponse {
        courses: course_responses,
        pagination,
    }))
}

/// Get a course with its modules by slug
#[utoipa::path(
    get,
    path = "/course/{slug}/",
    params(
        ("slug" = String, Path, description = "Course slug")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseDetailResponse),
        (status = 404, description = "Course not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Courses"
)]
pub async fn get_course_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let detail = CourseService::get_detail(&state.db, &slug)
        .await?
        .ok_or(ApiError::NotFound("course"))?;

    Ok(Json(CourseDetailResponse::from(detail)))
}

/// Create a course owned by the current user
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseCreateForm,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 401, description = "No authenticated user"),
        (status = 403, description = "Missing permission"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<CourseCreateForm>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    user.require(&["courses.add_course"])?;
    let changes = form.validate()?;
    ensure_subject(&state, changes.subject_id).await?;

    let course = CourseService::create(
        &state.db,
        NewCourse {
            owner_id: user.id(),
            subject_id: changes.subject_id,
            title: changes.title,
            overview: changes.overview,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// Edit one of the current user's courses
#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = CourseCreateForm,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(form): Json<CourseCreateForm>,
) -> Result<Json<CourseResponse>, ApiError> {
    user.require(&["courses.change_course"])?;
    owned_course(&state, &user, id).await?;

    let changes = form.validate()?;
    ensure_subject(&state, changes.subject_id).await?;

    let course = CourseService::update(&state.db, id, changes)
        .await?
        .ok_or(ApiError::NotFound("course"))?;

    Ok(Json(CourseResponse::from(course)))
}

/// Delete one of the current user's courses
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    user.require(&["courses.delete_course"])?;
    owned_course(&state, &user, id).await?;

    CourseService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Courses created by the current user
#[utoipa::path(
    get,
    path = "/courses/mine",
    responses(
        (status = 200, description = "Courses owned by the user", body = Vec<CourseResponse>),
        (status = 403, description = "Missing permission")
    ),
    tag = "Courses"
)]
pub async fn my_courses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    user.require(&[
        "courses.add_course",
        "courses.change_course",
        "courses.delete_course",
    ])?;

    let courses = CourseService::list_by_owner(&state.db, user.id()).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Enroll the current user in a course
#[utoipa::path(
    post,
    path = "/courses/{id}/enroll",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 204, description = "User enrolled"),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn enroll(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    CourseService::enroll_student(&state.db, id, user.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Courses the current user is enrolled in
#[utoipa::path(
    get,
    path = "/courses/joined",
    responses(
        (status = 200, description = "Courses joined by the user", body = Vec<CourseResponse>),
        (status = 401, description = "No authenticated user")
    ),
    tag = "Courses"
)]
pub async fn joined_courses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = CourseService::list_joined(&state.db, user.id()).await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}
