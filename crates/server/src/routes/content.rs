use crate::{
    auth::CurrentUser,
    dtos::{
        common::{OrderRequest, OrderResponse},
        content::{ContentResponse, ItemUpload},
    },
    error::ApiError,
    forms::{
        Form,
        content::{ItemForm, ItemInput, Upload},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use database::{
    entities::{content, course, module},
    services::{
        content::{ContentItem, ContentService, ItemChanges, NewItem},
        module::ModuleService,
    },
};
use log::warn;
use models::content::{ContentKind, ItemPayload};

/// The module if its course belongs to `user`
async fn owned_module(
    state: &AppState,
    user: &CurrentUser,
    module_id: i32,
) -> Result<(module::Model, course::Model), ApiError> {
    ModuleService::get_with_course(&state.db, module_id)
        .await?
        .filter(|(_, course)| course.owner_id == user.id())
        .ok_or(ApiError::NotFound("module"))
}

/// The content slot if the item behind it belongs to `user`
async fn owned_content(
    state: &AppState,
    user: &CurrentUser,
    content_id: i32,
) -> Result<(content::Model, ContentItem), ApiError> {
    let slot = ContentService::get(&state.db, content_id)
        .await?
        .ok_or(ApiError::NotFound("content"))?;
    let item = ContentService::resolve(&state.db, &slot)
        .await?
        .filter(|item| item.owner_id() == user.id())
        .ok_or(ApiError::NotFound("content"))?;

    Ok((slot, item))
}

/// Fills the form from the multipart body
async fn read_form(mut multipart: Multipart, mut form: ItemForm) -> Result<ItemForm, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?;
            form.file = Some(Upload {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

/// Turns validated input into a stored payload, saving uploads under the kind's directory
async fn store_payload(
    state: &AppState,
    kind: ContentKind,
    input: ItemInput,
) -> Result<ItemPayload, ApiError> {
    let payload = match input {
        ItemInput::Text(content) => ItemPayload::Text { content },
        ItemInput::Video(url) => ItemPayload::Video { url },
        ItemInput::Upload(upload) => {
            let dir = kind
                .upload_dir()
                .ok_or_else(|| ApiError::BadRequest(format!("{kind} items take no file")))?;
            let file = state.media.save(dir, &upload.file_name, &upload.bytes).await?;

            match kind {
                ContentKind::Image => ItemPayload::Image { file },
                _ => ItemPayload::File { file },
            }
        }
    };

    Ok(payload)
}

/// Stored upload of a payload, if any
fn upload_path(payload: &ItemPayload) -> Option<&str> {
    match payload {
        ItemPayload::File { file } | ItemPayload::Image { file } => Some(file),
        ItemPayload::Text { .. } | ItemPayload::Video { .. } => None,
    }
}

async fn remove_upload(state: &AppState, payload: &ItemPayload) {
    if let Some(path) = upload_path(payload)
        && let Err(err) = state.media.remove(path).await
    {
        warn!("Could not remove upload {path}: {err}");
    }
}

/// Removes an upload stored for a write that then failed
async fn discard_on_error<T, E>(
    state: &AppState,
    stored: Option<&ItemPayload>,
    result: Result<T, E>,
) -> Result<T, E> {
    if result.is_err()
        && let Some(payload) = stored
    {
        remove_upload(state, payload).await;
    }
    result
}

/// Add an item of the given kind at the end of a module
#[utoipa::path(
    post,
    path = "/modules/{id}/contents/{kind}",
    params(
        ("id" = i32, Path, description = "Module ID"),
        ("kind" = String, Path, description = "One of text, file, image, video")
    ),
    request_body(content = ItemUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Content created", body = ContentResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Module or kind not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Contents"
)]
pub async fn create_content(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((module_id, kind)): Path<(i32, String)>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ContentResponse>), ApiError> {
    user.require(&["courses.add_content"])?;
    let kind = ContentKind::parse(&kind).map_err(|_| ApiError::NotFound("kind"))?;
    let (module, _) = owned_module(&state, &user, module_id).await?;

    let cleaned = read_form(multipart, ItemForm::for_create(kind))
        .await?
        .validate()?;
    let input = cleaned
        .payload
        .ok_or_else(|| ApiError::BadRequest("missing payload".to_owned()))?;
    let payload = store_payload(&state, kind, input).await?;

    let created = ContentService::create(
        &state.db,
        module.id,
        NewItem {
            owner_id: user.id(),
            title: cleaned.title,
            payload: payload.clone(),
            order: None,
        },
    )
    .await;
    let (slot, item) = discard_on_error(&state, Some(&payload), created).await?;

    let ctx = state.render_context();
    Ok((
        StatusCode::CREATED,
        Json(ContentResponse::new(slot, Some(&item), &ctx)),
    ))
}

/// Edit the item behind a content slot; omitting the payload keeps it
#[utoipa::path(
    put,
    path = "/contents/{id}",
    params(
        ("id" = i32, Path, description = "Content ID")
    ),
    request_body(content = ItemUpload, content_type = "multipart/form-data", description = "Payload fields may be left out to keep the stored one"),
    responses(
        (status = 200, description = "Content updated", body = ContentResponse),
        (status = 404, description = "Content not found"),
        (status = 422, description = "Invalid input")
    ),
    tag = "Contents"
)]
pub async fn update_content(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ContentResponse>, ApiError> {
    user.require(&["courses.change_content"])?;
    let (slot, item) = owned_content(&state, &user, id).await?;

    let cleaned = read_form(multipart, ItemForm::for_update(slot.kind))
        .await?
        .validate()?;
    let payload = match cleaned.payload {
        Some(input) => Some(store_payload(&state, slot.kind, input).await?),
        None => None,
    };
    let stored = payload.clone();

    let result = ContentService::update_item(
        &state.db,
        &slot,
        ItemChanges {
            title: cleaned.title,
            payload,
        },
    )
    .await;
    let updated = discard_on_error(&state, stored.as_ref(), result).await?;

    if stored.is_some() {
        remove_upload(&state, &item.payload()).await;
    }

    let ctx = state.render_context();
    Ok(Json(ContentResponse::new(slot, Some(&updated), &ctx)))
}

/// Delete a content slot together with its item
#[utoipa::path(
    delete,
    path = "/contents/{id}",
    params(
        ("id" = i32, Path, description = "Content ID")
    ),
    responses(
        (status = 204, description = "Content deleted"),
        (status = 404, description = "Content not found")
    ),
    tag = "Contents"
)]
pub async fn delete_content(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    user.require(&["courses.delete_content"])?;
    let (slot, item) = owned_content(&state, &user, id).await?;

    ContentService::delete(&state.db, slot).await?;
    remove_upload(&state, &item.payload()).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Set content positions within a module
#[utoipa::path(
    post,
    path = "/modules/{id}/contents/order",
    params(
        ("id" = i32, Path, description = "Module ID")
    ),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Positions saved", body = OrderResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Module not found"),
        (status = 422, description = "Positions out of range")
    ),
    tag = "Contents"
)]
pub async fn order_contents(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(order): Json<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    user.require(&["courses.change_content"])?;
    let (module, _) = owned_module(&state, &user, id).await?;
    let updated = ContentService::reorder(&state.db, module.id, &order.pairs()?).await?;

    Ok(Json(OrderResponse {
        saved: "OK",
        updated,
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_only_files_and_images_have_uploads() {
        let file = ItemPayload::File {
            file: "files/notes.pdf".to_owned(),
        };
        let video = ItemPayload::Video {
            url: "https://vimeo.com/1".to_owned(),
        };

        assert_eq!(upload_path(&file), Some("files/notes.pdf"));
        assert_eq!(upload_path(&video), None);
    }
}
