use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quiz-taking extension of a user; shares the user's id
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::taken_quiz::Entity")]
    TakenQuizzes,
    #[sea_orm(has_many = "super::student_answer::Entity")]
    QuizAnswers,
    #[sea_orm(has_many = "super::student_interest::Entity")]
    Interests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::taken_quiz::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TakenQuizzes.def()
    }
}

impl Related<super::student_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizAnswers.def()
    }
}

// Many-to-many relationship with tags of interest
impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_interest::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::student_interest::Relation::Student.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
