use models::{filters::FieldLabels, render::tag_badge};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// `#rrggbb`
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quiz::Entity")]
    Quizzes,
    #[sea_orm(has_many = "super::student_interest::Entity")]
    StudentInterests,
}

impl Related<super::quiz::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quizzes.def()
    }
}

impl Related<super::student_interest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentInterests.def()
    }
}

// Many-to-many relationship with interested students
impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_interest::Relation::Student.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::student_interest::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn html_badge(&self) -> String {
        tag_badge(&self.name, &self.color)
    }
}

impl FieldLabels for Model {
    fn field_label(field: &str) -> Option<&'static str> {
        match field {
            "name" => Some("Name"),
            "color" => Some("Color"),
            _ => None,
        }
    }
}
