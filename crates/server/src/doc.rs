use crate::{
    auth::USER_ID_HEADER,
    dtos::{account, common, content, course, quiz},
    forms,
    routes::{
        account as account_routes, content as content_routes, course as course_routes,
        forms as form_routes, health, module, quiz as quiz_routes, review, subject,
    },
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "user_id",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                USER_ID_HEADER,
                "Id of the user authenticated by the fronting proxy",
            ))),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        subject::list_subjects,
        subject::create_subject,
        course_routes::get_courses,
        course_routes::get_course_detail,
        course_routes::create_course,
        course_routes::update_course,
        course_routes::delete_course,
        course_routes::my_courses,
        course_routes::enroll,
        course_routes::joined_courses,
        module::get_formset,
        module::save_formset,
        module::order_modules,
        module::module_contents,
        content_routes::create_content,
        content_routes::update_content,
        content_routes::delete_content,
        content_routes::order_contents,
        review::list_reviews,
        review::create_review,
        account_routes::sign_up,
        account_routes::me,
        account_routes::update_me,
        account_routes::update_profile,
        account_routes::my_badges,
        account_routes::award_badge,
        quiz_routes::list_tags,
        quiz_routes::create_tag,
        quiz_routes::create_quiz,
        quiz_routes::add_question,
        quiz_routes::add_answer,
        quiz_routes::get_interests,
        quiz_routes::set_interests,
        quiz_routes::available_quizzes,
        quiz_routes::next_question,
        quiz_routes::submit_answer,
        quiz_routes::taken_quizzes,
        form_routes::list_forms,
        form_routes::get_form
    ),
    components(schemas(
        common::PaginationMeta,
        common::OrderRequest,
        common::OrderResponse,
        course::SubjectResponse,
        course::CourseResponse,
        course::PaginatedCoursesResponse,
        course::CourseQueryParams,
        course::ModuleResponse,
        course::CourseDetailResponse,
        course::ReviewResponse,
        course::ReviewListResponse,
        course::ModuleFormSetResponse,
        course::ModuleContentsResponse,
        content::ItemUpload,
        content::ItemResponse,
        content::ContentResponse,
        account::UserSummary,
        account::ProfileResponse,
        account::AccountResponse,
        account::BadgeResponse,
        quiz::TagResponse,
        quiz::QuizResponse,
        quiz::AnswerOption,
        quiz::QuestionResponse,
        quiz::AnswerResponse,
        quiz::QuizDetailResponse,
        quiz::QuizProgressResponse,
        quiz::TakenQuizResponse,
        quiz::InterestsRequest,
        forms::Widget,
        forms::FieldSpec,
        forms::FormDescriptor,
        forms::course::SubjectForm,
        forms::course::CourseCreateForm,
        forms::course::ModuleForm,
        forms::course::ModuleRow,
        forms::course::ModuleFormSet,
        forms::account::SignUpForm,
        forms::account::UserEditForm,
        forms::account::ProfileEditForm,
        forms::account::ReviewForm,
        forms::account::BadgeForm,
        forms::quiz::TagForm,
        forms::quiz::QuizForm,
        forms::quiz::QuestionForm,
        forms::quiz::AnswerForm,
        forms::quiz::TakeQuizForm
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Courses", description = "Subjects, courses and enrollment"),
        (name = "Modules", description = "Modules of a course"),
        (name = "Contents", description = "Text, file, image and video items of a module"),
        (name = "Reviews", description = "Course reviews"),
        (name = "Accounts", description = "Accounts, profiles and badges"),
        (name = "Quizzes", description = "Quiz authoring"),
        (name = "Students", description = "Quiz taking"),
        (name = "Forms", description = "Form descriptors"),
    ),
    info(
        title = "Educa API",
        version = "1.0.0",
        description = "E-learning platform API",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/course/{slug}/"));
        assert!(doc.paths.paths.contains_key("/modules/{id}/contents/{kind}"));
        assert!(doc.paths.paths.contains_key("/students/me/quizzes/{id}/answers"));
    }
}
