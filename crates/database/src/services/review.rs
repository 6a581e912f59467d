use crate::{
    entities::{course, review, user},
    error::ServiceError,
};
use chrono::Utc;
use log::info;
use models::rating::Rating;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

pub struct ReviewService;

impl ReviewService {
    /// Records a review; the rating type only admits 1 through 5
    pub async fn create(
        db: &DatabaseConnection,
        course_id: i32,
        user_id: i32,
        rating: Rating,
        comment: String,
    ) -> Result<review::Model, ServiceError> {
        if course::Entity::find_by_id(course_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound("course"));
        }

        let model = review::ActiveModel {
            course_id: Set(course_id),
            user_id: Set(user_id),
            pub_date: Set(Utc::now()),
            comment: Set(comment),
            rating: Set(rating.value()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(
            "User {user_id} rated course {course_id} with {}",
            model.rating
        );
        Ok(model)
    }

    /// Reviews of a course with their authors, newest first
    pub async fn list_for_course(
        db: &DatabaseConnection,
        course_id: i32,
    ) -> Result<Vec<(review::Model, Option<user::Model>)>, DbErr> {
        review::Entity::find()
            .filter(review::Column::CourseId.eq(course_id))
            .find_also_related(user::Entity)
            .order_by_desc(review::Column::PubDate)
            .order_by_desc(review::Column::Id)
            .all(db)
            .await
    }
}
