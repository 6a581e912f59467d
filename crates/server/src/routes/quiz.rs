use crate::{
    auth::CurrentUser,
    dtos::quiz::{
        AnswerResponse, InterestsRequest, QuestionResponse, QuizDetailResponse, QuizProgressResponse,
        QuizResponse, TagResponse, TakenQuizResponse,
    },
    error::ApiError,
    forms::{
        Form,
        quiz::{AnswerForm, QuestionForm, QuizForm, TagForm, TakeQuizForm},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::{
    entities::quiz,
    services::{account::TEACHER_PERMISSIONS, quiz::QuizService},
};

const TAKE_QUIZ: &str = "students.take_quiz";

/// The quiz if it belongs to `user`
async fn owned_quiz(
    state: &AppState,
    user: &CurrentUser,
    quiz_id: i32,
) -> Result<quiz::Model, ApiError> {
    QuizService::get(&state.db, quiz_id)
        .await?
        .filter(|quiz| quiz.owner_id == user.id())
        .ok_or(ApiError::NotFound("quiz"))
}

/// List quiz tags
#[utoipa::path(
    get,
    path = "/tags",
    responses(
        (status = 200, description = "Tags ordered by name", body = Vec<TagResponse>)
    ),
    tag = "Quizzes"
)]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = QuizService::list_tags(&state.db).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Create a quiz tag
#[utoipa::path(
    post,
    path = "/tags",
    request_body = TagForm,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 403, description = "Only teachers create tags"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Quizzes"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<TagForm>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    user.require(&TEACHER_PERMISSIONS)?;
    let (name, color) = form.validate()?;

    let tag = QuizService::create_tag(&state.db, name, color).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

/// Create a quiz owned by the current user
#[utoipa::path(
    post,
    path = "/quizzes",
    request_body = QuizForm,
    responses(
        (status = 201, description = "Quiz created", body = QuizDetailResponse),
        (status = 403, description = "Only teachers create quizzes"),
        (status = 422, description = "Invalid input or unknown tag")
    ),
    tag = "Quizzes"
)]
pub async fn create_quiz(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<QuizForm>,
) -> Result<(StatusCode, Json<QuizDetailResponse>), ApiError> {
    user.require(&TEACHER_PERMISSIONS)?;
    let (name, tag_id) = form.validate()?;

    let quiz = QuizService::create_quiz(&state.db, user.id(), name, tag_id).await?;
    let detail = QuizService::get_quiz(&state.db, quiz.id)
        .await?
        .ok_or(ApiError::NotFound("quiz"))?;

    Ok((StatusCode::CREATED, Json(QuizDetailResponse::from(detail))))
}

/// Add a question to one of the current user's quizzes
#[utoipa::path(
    post,
    path = "/quizzes/{id}/questions",
    params(
        ("id" = i32, Path, description = "Quiz ID")
    ),
    request_body = QuestionForm,
    responses(
        (status = 201, description = "Question added", body = QuestionResponse),
        (status = 404, description = "Quiz not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Quizzes"
)]
pub async fn add_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(form): Json<QuestionForm>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let quiz = owned_quiz(&state, &user, id).await?;
    let text = form.validate()?;

    let question = QuizService::add_question(&state.db, quiz.id, text).await?;
    Ok((
        StatusCode::CREATED,
        Json(QuestionResponse::new(question, Vec::new())),
    ))
}

/// Add an answer to a question of one of the current user's quizzes
#[utoipa::path(
    post,
    path = "/questions/{id}/answers",
    params(
        ("id" = i32, Path, description = "Question ID")
    ),
    request_body = AnswerForm,
    responses(
        (status = 201, description = "Answer added", body = AnswerResponse),
        (status = 404, description = "Question not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Quizzes"
)]
pub async fn add_answer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(form): Json<AnswerForm>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    let (question, _) = QuizService::get_question(&state.db, id)
        .await?
        .filter(|(_, quiz)| quiz.owner_id == user.id())
        .ok_or(ApiError::NotFound("question"))?;
    let (text, is_correct) = form.validate()?;

    let answer = QuizService::add_answer(&state.db, question.id, text, is_correct).await?;
    Ok((StatusCode::CREATED, Json(AnswerResponse::from(answer))))
}

/// Tags the current student is interested in
#[utoipa::path(
    get,
    path = "/students/me/interests",
    responses(
        (status = 200, description = "Interests", body = Vec<TagResponse>),
        (status = 403, description = "Not a student")
    ),
    tag = "Students"
)]
pub async fn get_interests(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    user.require(&[TAKE_QUIZ])?;
    let tags = QuizService::interests(&state.db, user.id()).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Replace the current student's interests
#[utoipa::path(
    put,
    path = "/students/me/interests",
    request_body = InterestsRequest,
    responses(
        (status = 200, description = "Interests saved", body = Vec<TagResponse>),
        (status = 403, description = "Not a student"),
        (status = 422, description = "Unknown tag")
    ),
    tag = "Students"
)]
pub async fn set_interests(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<InterestsRequest>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    user.require(&[TAKE_QUIZ])?;
    let tags = QuizService::set_interests(&state.db, user.id(), &request.tags).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Quizzes matching the student's interests that are still open to them
#[utoipa::path(
    get,
    path = "/students/me/quizzes",
    responses(
        (status = 200, description = "Available quizzes", body = Vec<QuizResponse>),
        (status = 403, description = "Not a student")
    ),
    tag = "Students"
)]
pub async fn available_quizzes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<QuizResponse>>, ApiError> {
    user.require(&[TAKE_QUIZ])?;
    let quizzes = QuizService::available_quizzes(&state.db, user.id()).await?;

    Ok(Json(
        quizzes
            .into_iter()
            .map(|(quiz, tag)| QuizResponse::new(quiz, tag))
            .collect(),
    ))
}

/// The next question the student has not answered yet
#[utoipa::path(
    get,
    path = "/students/me/quizzes/{id}/next",
    params(
        ("id" = i32, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Next question", body = QuestionResponse),
        (status = 403, description = "Not a student"),
        (status = 404, description = "Quiz not found or every question answered")
    ),
    tag = "Students"
)]
pub async fn next_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<QuestionResponse>, ApiError> {
    user.require(&[TAKE_QUIZ])?;
    QuizService::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("quiz"))?;

    let (question, answers) = QuizService::next_question(&state.db, user.id(), id)
        .await?
        .ok_or(ApiError::NotFound("question"))?;

    Ok(Json(QuestionResponse::new(question, answers)))
}

/// Answer the current question of a quiz
#[utoipa::path(
    post,
    path = "/students/me/quizzes/{id}/answers",
    params(
        ("id" = i32, Path, description = "Quiz ID")
    ),
    request_body = TakeQuizForm,
    responses(
        (status = 200, description = "Progress after the answer", body = QuizProgressResponse),
        (status = 403, description = "Not a student"),
        (status = 404, description = "Quiz not found"),
        (status = 422, description = "Answer not valid for this quiz, or quiz already taken")
    ),
    tag = "Students"
)]
pub async fn submit_answer(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(form): Json<TakeQuizForm>,
) -> Result<Json<QuizProgressResponse>, ApiError> {
    user.require(&[TAKE_QUIZ])?;
    let answer_id = form.validate()?;

    let progress = QuizService::submit_answer(&state.db, user.id(), id, answer_id).await?;
    Ok(Json(QuizProgressResponse::from(progress)))
}

/// Quizzes the student has completed, newest first
#[utoipa::path(
    get,
    path = "/students/me/taken",
    responses(
        (status = 200, description = "Taken quizzes", body = Vec<TakenQuizResponse>),
        (status = 403, description = "Not a student")
    ),
    tag = "Students"
)]
pub async fn taken_quizzes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TakenQuizResponse>>, ApiError> {
    user.require(&[TAKE_QUIZ])?;
    let taken = QuizService::taken_quizzes(&state.db, user.id()).await?;

    Ok(Json(
        taken
            .into_iter()
            .map(|(taken, quiz)| TakenQuizResponse::new(taken, quiz))
            .collect(),
    ))
}
