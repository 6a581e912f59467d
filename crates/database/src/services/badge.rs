use crate::entities::{badge_award, profile, user};
use chrono::Utc;
use log::info;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

pub struct BadgeService;

impl BadgeService {
    pub async fn award(
        db: &DatabaseConnection,
        user_id: i32,
        slug: String,
        level: i32,
    ) -> Result<badge_award::Model, DbErr> {
        let model = badge_award::ActiveModel {
            user_id: Set(user_id),
            awarded_at: Set(Utc::now()),
            slug: Set(slug),
            level: Set(level),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(
            "Awarded badge {} level {} to user {user_id}",
            model.slug, model.level
        );
        Ok(model)
    }

    /// Badges earned by a user, most recent first
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<badge_award::Model>, DbErr> {
        badge_award::Entity::find()
            .filter(badge_award::Column::UserId.eq(user_id))
            .order_by_desc(badge_award::Column::AwardedAt)
            .order_by_desc(badge_award::Column::Id)
            .all(db)
            .await
    }

    /// `"{username} : {points} points - level {level}"`
    pub fn describe(
        badge: &badge_award::Model,
        user: &user::Model,
        profile: &profile::Model,
    ) -> String {
        format!(
            "{} : {} points - level {}",
            user.username, profile.award_points, badge.level
        )
    }
}
