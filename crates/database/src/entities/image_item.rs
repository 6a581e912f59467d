use models::filters::FieldLabels;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Uploaded image content item
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub created: DateTimeUtc,
    pub updated: DateTimeUtc,
    /// Upload path relative to the media root, under `images/`
    pub file: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl FieldLabels for Model {
    fn field_label(field: &str) -> Option<&'static str> {
        match field {
            "owner" => Some("Teacher"),
            "title" => Some("Title"),
            "created" => Some("Created"),
            "updated" => Some("Updated"),
            "file" => Some("Image"),
            _ => None,
        }
    }
}
