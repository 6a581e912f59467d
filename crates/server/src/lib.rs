pub mod auth;
pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod forms;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod utils;

use crate::{
    doc::ApiDoc,
    routes::{account, content, course, forms as form_routes, health, module, quiz, review, subject},
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{compression::CompressionLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Every route of the service, behind the course subdomain redirect
pub fn app(state: AppState) -> Router {
    let media_prefix = format!("/{}", state.config.media_url.trim_matches('/'));
    let media = ServeDir::new(state.media.root());

    let router = Router::new()
        .route("/health", get(health::health))
        .route("/subjects", get(subject::list_subjects).post(subject::create_subject))
        .route("/courses", get(course::get_courses).post(course::create_course))
        .route("/courses/mine", get(course::my_courses))
        .route("/courses/joined", get(course::joined_courses))
        .route(
            "/courses/{id}",
            put(course::update_course).delete(course::delete_course),
        )
        .route("/courses/{id}/enroll", post(course::enroll))
        .route(
            "/courses/{id}/reviews",
            get(review::list_reviews).post(review::create_review),
        )
        .route(
            "/courses/{id}/modules/formset",
            get(module::get_formset).post(module::save_formset),
        )
        .route("/courses/{id}/modules/order", post(module::order_modules))
        .route("/course/{slug}/", get(course::get_course_detail))
        .route("/modules/{id}/contents", get(module::module_contents))
        .route("/modules/{id}/contents/order", post(content::order_contents))
        .route("/modules/{id}/contents/{kind}", post(content::create_content))
        .route(
            "/contents/{id}",
            put(content::update_content).delete(content::delete_content),
        )
        .route("/accounts", post(account::sign_up))
        .route("/accounts/me", get(account::me).put(account::update_me))
        .route("/accounts/me/profile", put(account::update_profile))
        .route("/accounts/me/badges", get(account::my_badges))
        .route("/badges", post(account::award_badge))
        .route("/tags", get(quiz::list_tags).post(quiz::create_tag))
        .route("/quizzes", post(quiz::create_quiz))
        .route("/quizzes/{id}/questions", post(quiz::add_question))
        .route("/questions/{id}/answers", post(quiz::add_answer))
        .route(
            "/students/me/interests",
            get(quiz::get_interests).put(quiz::set_interests),
        )
        .route("/students/me/quizzes", get(quiz::available_quizzes))
        .route("/students/me/quizzes/{id}/next", get(quiz::next_question))
        .route("/students/me/quizzes/{id}/answers", post(quiz::submit_answer))
        .route("/students/me/taken", get(quiz::taken_quizzes))
        .route("/forms", get(form_routes::list_forms))
        .route("/forms/{name}", get(form_routes::get_form))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Uploads are served from MEDIA_URL; a bare "/" prefix makes them the fallback
    let router = if media_prefix == "/" {
        router.fallback_service(media)
    } else {
        router.nest_service(&media_prefix, media)
    };

    router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::subdomain::redirect_course_subdomain,
        ))
        .layer(CompressionLayer::new())
        .with_state(state)
}
