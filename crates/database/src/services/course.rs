use crate::{
    entities::{course, course_student, module, review, subject, user},
    error::ServiceError,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use models::{
    rating,
    slug::{base_slug, slug_month, unique_slug},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use std::collections::HashSet;

/// Fields supplied when creating a course; the slug is derived from the title
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub owner_id: i32,
    pub subject_id: i32,
    pub title: String,
    pub overview: String,
}

#[derive(Debug, Clone)]
pub struct CourseChanges {
    pub subject_id: i32,
    pub title: String,
    pub overview: String,
}

/// A course with what its detail page shows
#[derive(Debug, Clone)]
pub struct CourseDetail {
    pub course: course::Model,
    pub subject: Option<subject::Model>,
    pub owner: Option<user::Model>,
    pub modules: Vec<module::Model>,
    pub student_count: u64,
    pub average_rating: Option<f64>,
}

pub struct CourseService;

impl CourseService {
    /// Creates a course, stamping it with the current time
    pub async fn create(db: &DatabaseConnection, new_course: NewCourse) -> Result<course::Model, DbErr> {
        Self::create_at(db, new_course, Utc::now()).await
    }

    /// Creates a course as if it were created at `created`
    ///
    /// The slug is prepared inside the same transaction as the insert: the
    /// first free `title`, `title-2`, ... among courses of the same month.
    pub async fn create_at(
        db: &DatabaseConnection,
        new_course: NewCourse,
        created: DateTime<Utc>,
    ) -> Result<course::Model, DbErr> {
        let txn = db.begin().await?;

        let month = slug_month(&created);
        let slug = Self::prepare_slug(&txn, &new_course.title, &month).await?;

        let model = course::ActiveModel {
            owner_id: Set(new_course.owner_id),
            subject_id: Set(new_course.subject_id),
            title: Set(new_course.title),
            slug: Set(slug),
            slug_month: Set(month),
            overview: Set(new_course.overview),
            created: Set(created),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!("Created course {} with slug {}", model.id, model.slug);

        Ok(model)
    }

    /// First slug candidate for `title` not yet used by a course of `month`
    async fn prepare_slug<C: ConnectionTrait>(
        conn: &C,
        title: &str,
        month: &str,
    ) -> Result<String, DbErr> {
        let base = base_slug(title);

        let taken: HashSet<String> = course::Entity::find()
            .select_only()
            .column(course::Column::Slug)
            .filter(course::Column::SlugMonth.eq(month))
            .filter(
                Condition::any()
                    .add(course::Column::Slug.eq(base.as_str()))
                    .add(course::Column::Slug.starts_with(format!("{base}-"))),
            )
            .into_tuple::<String>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        Ok(unique_slug(&base, &taken))
    }

    /// Updates the editable fields; the slug stays as it was generated
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        changes: CourseChanges,
    ) -> Result<Option<course::Model>, DbErr> {
        let Some(existing) = course::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let mut active: course::ActiveModel = existing.into();
        active.subject_id = Set(changes.subject_id);
        active.title = Set(changes.title);
        active.overview = Set(changes.overview);

        let updated = active.update(db).await?;
        info!("Updated course {}", updated.id);
        Ok(Some(updated))
    }

    /// Deletes a course; modules, contents, reviews and enrollments go with it
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let result = course::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected > 0 {
            info!("Deleted course {id}");
        }
        Ok(result.rows_affected > 0)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<course::Model>, DbErr> {
        course::Entity::find_by_id(id).one(db).await
    }

    /// Looks a course up by slug
    ///
    /// Slugs are only unique within a month, so the most recent course wins.
    pub async fn get_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<course::Model>, DbErr> {
        debug!("Looking up course by slug {slug}");
        course::Entity::find()
            .filter(course::Column::Slug.eq(slug))
            .order_by_desc(course::Column::Created)
            .order_by_desc(course::Column::Id)
            .one(db)
            .await
    }

    /// The course with its subject, owner, ordered modules and review summary
    pub async fn get_detail(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<CourseDetail>, DbErr> {
        let Some(course) = Self::get_by_slug(db, slug).await? else {
            return Ok(None);
        };

        let subject = subject::Entity::find_by_id(course.subject_id).one(db).await?;
        let owner = user::Entity::find_by_id(course.owner_id).one(db).await?;
        let modules = module::Entity::find()
            .filter(module::Column::CourseId.eq(course.id))
            .order_by_asc(module::Column::Order)
            .all(db)
            .await?;
        let student_count = course_student::Entity::find()
            .filter(course_student::Column::CourseId.eq(course.id))
            .count(db)
            .await?;
        let average_rating = Self::average_rating(db, course.id).await?;

        Ok(Some(CourseDetail {
            course,
            subject,
            owner,
            modules,
            student_count,
            average_rating,
        }))
    }

    /// Newest courses first, optionally restricted to one subject
    pub async fn list(
        db: &DatabaseConnection,
        subject_slug: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<(course::Model, Option<subject::Model>)>, u64), DbErr> {
        let mut query = course::Entity::find()
            .find_also_related(subject::Entity)
            .order_by_desc(course::Column::Created)
            .order_by_desc(course::Column::Id);

        if let Some(slug) = subject_slug {
            query = query.filter(subject::Column::Slug.eq(slug));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total_items = paginator.num_items().await?;
        let courses = paginator.fetch_page(page.saturating_sub(1)).await?; // SeaORM uses 0-based pages

        Ok((courses, total_items))
    }

    pub async fn list_by_owner(
        db: &DatabaseConnection,
        owner_id: i32,
    ) -> Result<Vec<course::Model>, DbErr> {
        course::Entity::find()
            .filter(course::Column::OwnerId.eq(owner_id))
            .order_by_desc(course::Column::Created)
            .all(db)
            .await
    }

    /// Adds a student to a course; enrolling twice is a no-op
    pub async fn enroll_student(
        db: &DatabaseConnection,
        course_id: i32,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        if course::Entity::find_by_id(course_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound("course"));
        }

        let existing = course_student::Entity::find_by_id((course_id, user_id))
            .one(db)
            .await?;
        if existing.is_none() {
            course_student::ActiveModel {
                course_id: Set(course_id),
                user_id: Set(user_id),
            }
            .insert(db)
            .await?;
            info!("Enrolled user {user_id} in course {course_id}");
        }

        Ok(())
    }

    /// Courses the user is enrolled in
    pub async fn list_joined(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<course::Model>, DbErr> {
        course::Entity::find()
            .inner_join(course_student::Entity)
            .filter(course_student::Column::UserId.eq(user_id))
            .order_by_desc(course::Column::Created)
            .all(db)
            .await
    }

    pub async fn is_enrolled(
        db: &DatabaseConnection,
        course_id: i32,
        user_id: i32,
    ) -> Result<bool, DbErr> {
        let found = course_student::Entity::find_by_id((course_id, user_id))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Mean rating of the course's reviews, `None` without reviews
    pub async fn average_rating(
        db: &DatabaseConnection,
        course_id: i32,
    ) -> Result<Option<f64>, DbErr> {
        let ratings: Vec<i32> = review::Entity::find()
            .select_only()
            .column(review::Column::Rating)
            .filter(review::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(db)
            .await?;

        Ok(rating::average(&ratings))
    }
}
