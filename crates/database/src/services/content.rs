use crate::{
    entities::{content, file_item, image_item, text_item, video_item},
    error::ServiceError,
    services::ordering::OrderScope,
};
use chrono::Utc;
use log::info;
use models::{
    content::{ContentKind, ItemPayload},
    render::{Render, RenderContext, render_file, render_image, render_text, render_video},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashMap;

/// The item a content slot points at, one variant per allowed kind
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(text_item::Model),
    File(file_item::Model),
    Image(image_item::Model),
    Video(video_item::Model),
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::Text,
            Self::File(_) => ContentKind::File,
            Self::Image(_) => ContentKind::Image,
            Self::Video(_) => ContentKind::Video,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Self::Text(item) => item.id,
            Self::File(item) => item.id,
            Self::Image(item) => item.id,
            Self::Video(item) => item.id,
        }
    }

    pub fn owner_id(&self) -> i32 {
        match self {
            Self::Text(item) => item.owner_id,
            Self::File(item) => item.owner_id,
            Self::Image(item) => item.owner_id,
            Self::Video(item) => item.owner_id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Text(item) => &item.title,
            Self::File(item) => &item.title,
            Self::Image(item) => &item.title,
            Self::Video(item) => &item.title,
        }
    }

    pub fn payload(&self) -> ItemPayload {
        match self {
            Self::Text(item) => ItemPayload::Text {
                content: item.content.clone(),
            },
            Self::File(item) => ItemPayload::File {
                file: item.file.clone(),
            },
            Self::Image(item) => ItemPayload::Image {
                file: item.file.clone(),
            },
            Self::Video(item) => ItemPayload::Video {
                url: item.url.clone(),
            },
        }
    }
}

impl Render for text_item::Model {
    fn render(&self, _ctx: &RenderContext) -> String {
        render_text(&self.content)
    }
}

impl Render for file_item::Model {
    fn render(&self, ctx: &RenderContext) -> String {
        render_file(ctx, &self.file)
    }
}

impl Render for image_item::Model {
    fn render(&self, ctx: &RenderContext) -> String {
        render_image(ctx, &self.file, &self.title)
    }
}

impl Render for video_item::Model {
    fn render(&self, _ctx: &RenderContext) -> String {
        render_video(&self.url)
    }
}

impl Render for ContentItem {
    fn render(&self, ctx: &RenderContext) -> String {
        match self {
            Self::Text(item) => item.render(ctx),
            Self::File(item) => item.render(ctx),
            Self::Image(item) => item.render(ctx),
            Self::Video(item) => item.render(ctx),
        }
    }
}

/// A new item together with the module slot it goes into
#[derive(Debug, Clone)]
pub struct NewItem {
    pub owner_id: i32,
    pub title: String,
    pub payload: ItemPayload,
    /// Explicit position; computed from the module's contents when absent
    pub order: Option<i32>,
}

/// Changes to an existing item; `payload: None` keeps the stored payload
#[derive(Debug, Clone)]
pub struct ItemChanges {
    pub title: String,
    pub payload: Option<ItemPayload>,
}

pub struct ContentService;

impl ContentService {
    /// Creates the item and its content slot in one transaction
    pub async fn create(
        db: &DatabaseConnection,
        module_id: i32,
        new_item: NewItem,
    ) -> Result<(content::Model, ContentItem), DbErr> {
        let txn = db.begin().await?;

        let kind = new_item.payload.kind();
        let item = Self::insert_item(&txn, &new_item).await?;

        let order = match new_item.order {
            Some(order) => order,
            None => {
                OrderScope::next::<content::Entity, _>(
                    &txn,
                    content::Column::ModuleId,
                    module_id,
                    content::Column::Order,
                )
                .await?
            }
        };

        let slot = content::ActiveModel {
            module_id: Set(module_id),
            kind: Set(kind),
            object_id: Set(item.id()),
            order: Set(order),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            "Added {kind} item {} to module {module_id} at position {order}",
            item.id()
        );

        Ok((slot, item))
    }

    async fn insert_item<C: ConnectionTrait>(
        conn: &C,
        new_item: &NewItem,
    ) -> Result<ContentItem, DbErr> {
        let now = Utc::now();
        let owner_id = new_item.owner_id;
        let title = new_item.title.clone();

        let item = match &new_item.payload {
            ItemPayload::Text { content } => ContentItem::Text(
                text_item::ActiveModel {
                    owner_id: Set(owner_id),
                    title: Set(title),
                    created: Set(now),
                    updated: Set(now),
                    content: Set(content.clone()),
                    ..Default::default()
                }
                .insert(conn)
                .await?,
            ),
            ItemPayload::File { file } => ContentItem::File(
                file_item::ActiveModel {
                    owner_id: Set(owner_id),
                    title: Set(title),
                    created: Set(now),
                    updated: Set(now),
                    file: Set(file.clone()),
                    ..Default::default()
                }
                .insert(conn)
                .await?,
            ),
            ItemPayload::Image { file } => ContentItem::Image(
                image_item::ActiveModel {
                    owner_id: Set(owner_id),
                    title: Set(title),
                    created: Set(now),
                    updated: Set(now),
                    file: Set(file.clone()),
                    ..Default::default()
                }
                .insert(conn)
                .await?,
            ),
            ItemPayload::Video { url } => ContentItem::Video(
                video_item::ActiveModel {
                    owner_id: Set(owner_id),
                    title: Set(title),
                    created: Set(now),
                    updated: Set(now),
                    url: Set(url.clone()),
                    ..Default::default()
                }
                .insert(conn)
                .await?,
            ),
        };

        Ok(item)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<content::Model>, DbErr> {
        content::Entity::find_by_id(id).one(db).await
    }

    /// Loads the item a slot points at; `None` if the referenced row is gone
    pub async fn resolve<C: ConnectionTrait>(
        conn: &C,
        slot: &content::Model,
    ) -> Result<Option<ContentItem>, DbErr> {
        let id = slot.object_id;
        let item = match slot.kind {
            ContentKind::Text => text_item::Entity::find_by_id(id)
                .one(conn)
                .await?
                .map(ContentItem::Text),
            ContentKind::File => file_item::Entity::find_by_id(id)
                .one(conn)
                .await?
                .map(ContentItem::File),
            ContentKind::Image => image_item::Entity::find_by_id(id)
                .one(conn)
                .await?
                .map(ContentItem::Image),
            ContentKind::Video => video_item::Entity::find_by_id(id)
                .one(conn)
                .await?
                .map(ContentItem::Video),
        };

        Ok(item)
    }

    /// All slots of a module in order, with their items resolved
    pub async fn list_for_module(
        db: &DatabaseConnection,
        module_id: i32,
    ) -> Result<Vec<(content::Model, Option<ContentItem>)>, DbErr> {
        let slots = content::Entity::find()
            .filter(content::Column::ModuleId.eq(module_id))
            .order_by_asc(content::Column::Order)
            .all(db)
            .await?;

        // Batch fetch the items of each kind
        let ids_of = |kind: ContentKind| -> Vec<i32> {
            slots
                .iter()
                .filter(|slot| slot.kind == kind)
                .map(|slot| slot.object_id)
                .collect()
        };

        let mut items: HashMap<(ContentKind, i32), ContentItem> = HashMap::new();

        for item in text_item::Entity::find()
            .filter(text_item::Column::Id.is_in(ids_of(ContentKind::Text)))
            .all(db)
            .await?
        {
            items.insert((ContentKind::Text, item.id), ContentItem::Text(item));
        }
        for item in file_item::Entity::find()
            .filter(file_item::Column::Id.is_in(ids_of(ContentKind::File)))
            .all(db)
            .await?
        {
            items.insert((ContentKind::File, item.id), ContentItem::File(item));
        }
        for item in image_item::Entity::find()
            .filter(image_item::Column::Id.is_in(ids_of(ContentKind::Image)))
            .all(db)
            .await?
        {
            items.insert((ContentKind::Image, item.id), ContentItem::Image(item));
        }
        for item in video_item::Entity::find()
            .filter(video_item::Column::Id.is_in(ids_of(ContentKind::Video)))
            .all(db)
            .await?
        {
            items.insert((ContentKind::Video, item.id), ContentItem::Video(item));
        }

        let result = slots
            .into_iter()
            .map(|slot| {
                let item = items.remove(&(slot.kind, slot.object_id));
                (slot, item)
            })
            .collect();

        Ok(result)
    }

    /// Updates the title and, when given, the payload of the item behind a slot
    pub async fn update_item(
        db: &DatabaseConnection,
        slot: &content::Model,
        changes: ItemChanges,
    ) -> Result<ContentItem, ServiceError> {
        if let Some(payload) = &changes.payload
            && payload.kind() != slot.kind
        {
            return Err(ServiceError::invalid(
                "kind",
                format!("Expected a {} item, got {}", slot.kind, payload.kind()),
            ));
        }

        let item = Self::resolve(db, slot)
            .await?
            .ok_or(ServiceError::NotFound("item"))?;
        let now = Utc::now();

        let updated = match (item, changes.payload) {
            (ContentItem::Text(item), payload) => {
                let mut active: text_item::ActiveModel = item.into();
                active.title = Set(changes.title);
                active.updated = Set(now);
                if let Some(ItemPayload::Text { content }) = payload {
                    active.content = Set(content);
                }
                ContentItem::Text(active.update(db).await?)
            }
            (ContentItem::File(item), payload) => {
                let mut active: file_item::ActiveModel = item.into();
                active.title = Set(changes.title);
                active.updated = Set(now);
                if let Some(ItemPayload::File { file }) = payload {
                    active.file = Set(file);
                }
                ContentItem::File(active.update(db).await?)
            }
            (ContentItem::Image(item), payload) => {
                let mut active: image_item::ActiveModel = item.into();
                active.title = Set(changes.title);
                active.updated = Set(now);
                if let Some(ItemPayload::Image { file }) = payload {
                    active.file = Set(file);
                }
                ContentItem::Image(active.update(db).await?)
            }
            (ContentItem::Video(item), payload) => {
                let mut active: video_item::ActiveModel = item.into();
                active.title = Set(changes.title);
                active.updated = Set(now);
                if let Some(ItemPayload::Video { url }) = payload {
                    active.url = Set(url);
                }
                ContentItem::Video(active.update(db).await?)
            }
        };

        info!("Updated {} item {}", updated.kind(), updated.id());
        Ok(updated)
    }

    /// Deletes a slot together with the item it points at
    pub async fn delete(db: &DatabaseConnection, slot: content::Model) -> Result<(), DbErr> {
        let txn = db.begin().await?;

        if let Some(item) = Self::resolve(&txn, &slot).await? {
            match item {
                ContentItem::Text(item) => item.delete(&txn).await?,
                ContentItem::File(item) => item.delete(&txn).await?,
                ContentItem::Image(item) => item.delete(&txn).await?,
                ContentItem::Video(item) => item.delete(&txn).await?,
            };
        }

        let (id, module_id) = (slot.id, slot.module_id);
        slot.delete(&txn).await?;
        txn.commit().await?;

        info!("Deleted content {id} from module {module_id}");
        Ok(())
    }

    /// Sets explicit positions for contents of one module
    pub async fn reorder(
        db: &DatabaseConnection,
        module_id: i32,
        orders: &[(i32, i32)],
    ) -> Result<u64, DbErr> {
        let txn = db.begin().await?;
        let updated = OrderScope::reorder::<content::Entity, _>(
            &txn,
            content::Column::Id,
            content::Column::ModuleId,
            module_id,
            content::Column::Order,
            orders,
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }
}
