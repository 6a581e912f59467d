use models::filters::FieldLabels;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account with role flags; authentication itself happens upstream
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_student: bool,
    pub is_teacher: bool,
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    #[sea_orm(has_one = "super::student::Entity")]
    Student,
    #[sea_orm(has_many = "super::course::Entity")]
    CoursesCreated,
    #[sea_orm(has_many = "super::badge_award::Entity")]
    BadgesEarned,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoursesCreated.def()
    }
}

impl Related<super::badge_award::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BadgesEarned.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl FieldLabels for Model {
    fn field_label(field: &str) -> Option<&'static str> {
        match field {
            "username" => Some("Username"),
            "email" => Some("Email address"),
            "first_name" => Some("First name"),
            "last_name" => Some("Last name"),
            "is_student" => Some("Student"),
            "is_teacher" => Some("Teacher"),
            _ => None,
        }
    }
}
