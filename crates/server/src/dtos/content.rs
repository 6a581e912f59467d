use database::{entities::content, services::content::ContentItem};
use models::{
    content::ContentKind,
    render::{Render, RenderContext},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    /// Kind-specific fields, tagged by `kind`
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Rendered HTML fragment
    pub html: String,
}

impl ItemResponse {
    pub fn new(item: &ContentItem, ctx: &RenderContext) -> Self {
        Self {
            id: item.id(),
            owner_id: item.owner_id(),
            title: item.title().to_owned(),
            payload: serde_json::to_value(item.payload()).unwrap_or_default(),
            html: item.render(ctx),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentResponse {
    pub id: i32,
    pub module_id: i32,
    #[schema(value_type = String, example = "text")]
    pub kind: ContentKind,
    pub object_id: i32,
    pub order: i32,
    /// `None` when the referenced item no longer exists
    pub item: Option<ItemResponse>,
}

impl ContentResponse {
    pub fn new(slot: content::Model, item: Option<&ContentItem>, ctx: &RenderContext) -> Self {
        Self {
            id: slot.id,
            module_id: slot.module_id,
            kind: slot.kind,
            object_id: slot.object_id,
            order: slot.order,
            item: item.map(|item| ItemResponse::new(item, ctx)),
        }
    }
}

/// Multipart fields of an item form; which payload field applies depends on the kind
#[derive(Debug, ToSchema)]
pub struct ItemUpload {
    pub title: String,
    /// Text items
    pub content: Option<String>,
    /// Video items
    pub url: Option<String>,
    /// File and image items
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
}
