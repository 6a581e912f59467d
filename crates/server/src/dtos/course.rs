use crate::{
    dtos::{account::UserSummary, common::PaginationMeta, content::ContentResponse},
    forms::{FieldSpec, course::ModuleRow},
};
use chrono::{DateTime, Utc};
use database::{
    entities::{course, module, review, subject, user},
    services::course::CourseDetail,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub total_courses: i64,
}

impl SubjectResponse {
    pub fn new(subject: subject::Model, total_courses: i64) -> Self {
        Self {
            id: subject.id,
            title: subject.title,
            slug: subject.slug,
            total_courses,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub owner_id: i32,
    pub subject_id: i32,
    pub subject: Option<String>,
    pub title: String,
    pub slug: String,
    pub overview: String,
    pub created: DateTime<Utc>,
}

impl CourseResponse {
    pub fn new(course: course::Model, subject: Option<&subject::Model>) -> Self {
        Self {
            id: course.id,
            owner_id: course.owner_id,
            subject_id: course.subject_id,
            subject: subject.map(|s| s.title.clone()),
            title: course.title,
            slug: course.slug,
            overview: course.overview,
            created: course.created,
        }
    }
}

impl From<course::Model> for CourseResponse {
    fn from(course: course::Model) -> Self {
        Self::new(course, None)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub courses: Vec<CourseResponse>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CourseQueryParams {
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u64,

    /// Subject slug
    pub subject: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleResponse {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub order: i32,
    pub label: String,
}

impl From<module::Model> for ModuleResponse {
    fn from(module: module::Model) -> Self {
        let label = module.label();
        Self {
            id: module.id,
            course_id: module.course_id,
            title: module.title,
            description: module.description,
            content: module.content,
            order: module.order,
            label,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetailResponse {
    pub course: CourseResponse,
    pub owner: Option<UserSummary>,
    pub modules: Vec<ModuleResponse>,
    pub student_count: u64,
    pub average_rating: Option<f64>,
}

impl From<CourseDetail> for CourseDetailResponse {
    fn from(detail: CourseDetail) -> Self {
        Self {
            course: CourseResponse::new(detail.course, detail.subject.as_ref()),
            owner: detail.owner.as_ref().map(UserSummary::from),
            modules: detail.modules.into_iter().map(ModuleResponse::from).collect(),
            student_count: detail.student_count,
            average_rating: detail.average_rating,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub course_id: i32,
    pub user: Option<UserSummary>,
    pub pub_date: DateTime<Utc>,
    pub comment: String,
    pub rating: i32,
}

impl ReviewResponse {
    pub fn new(review: review::Model, user: Option<&user::Model>) -> Self {
        Self {
            id: review.id,
            course_id: review.course_id,
            user: user.map(UserSummary::from),
            pub_date: review.pub_date,
            comment: review.comment,
            rating: review.rating,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub average_rating: Option<f64>,
    pub reviews: Vec<ReviewResponse>,
}

/// Initial state of the inline module formset of a course
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleFormSetResponse {
    pub fields: Vec<FieldSpec>,
    pub rows: Vec<ModuleRow>,
    /// Number of blank rows at the end of `rows`
    pub extra: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleContentsResponse {
    pub module: ModuleResponse,
    pub contents: Vec<ContentResponse>,
}
