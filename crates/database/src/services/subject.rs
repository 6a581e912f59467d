use crate::entities::{course, subject};
use log::info;
use models::slug::base_slug;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

pub struct SubjectService;

impl SubjectService {
    /// Creates a subject; the slug defaults to the slugified title
    pub async fn create(
        db: &DatabaseConnection,
        title: String,
        slug: Option<String>,
    ) -> Result<subject::Model, DbErr> {
        let slug = slug.unwrap_or_else(|| base_slug(&title));

        let model = subject::ActiveModel {
            title: Set(title),
            slug: Set(slug),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!("Created subject {} ({})", model.title, model.slug);
        Ok(model)
    }

    /// All subjects ordered by title, each with the number of courses it has
    pub async fn list_with_counts(
        db: &DatabaseConnection,
    ) -> Result<Vec<(subject::Model, i64)>, DbErr> {
        let subjects = subject::Entity::find()
            .order_by_asc(subject::Column::Title)
            .all(db)
            .await?;

        let counts: HashMap<i32, i64> = course::Entity::find()
            .select_only()
            .column(course::Column::SubjectId)
            .column_as(course::Column::Id.count(), "total")
            .group_by(course::Column::SubjectId)
            .into_tuple::<(i32, i64)>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        Ok(subjects
            .into_iter()
            .map(|subject| {
                let total = counts.get(&subject.id).copied().unwrap_or(0);
                (subject, total)
            })
            .collect())
    }

    pub async fn get_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<subject::Model>, DbErr> {
        subject::Entity::find()
            .filter(subject::Column::Slug.eq(slug))
            .one(db)
            .await
    }
}
