use crate::{
    auth::CurrentUser,
    dtos::{
        common::{OrderRequest, OrderResponse},
        content::ContentResponse,
        course::{ModuleContentsResponse, ModuleFormSetResponse, ModuleResponse},
    },
    error::ApiError,
    forms::{
        Form,
        course::{EXTRA_ROWS, ModuleFormSet},
    },
    routes::course::owned_course,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use database::services::{content::ContentService, course::CourseService, module::ModuleService};

/// Existing modules of a course plus blank rows for new ones
#[utoipa::path(
    get,
    path = "/courses/{id}/modules/formset",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Formset initial state", body = ModuleFormSetResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Course not found")
    ),
    tag = "Modules"
)]
pub async fn get_formset(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ModuleFormSetResponse>, ApiError> {
    user.require(&["courses.change_course"])?;
    let course = owned_course(&state, &user, id).await?;

    let modules = ModuleService::list_for_course(&state.db, course.id).await?;
    let formset = ModuleFormSet::initial(&modules);

    Ok(Json(ModuleFormSetResponse {
        fields: formset.fields(),
        rows: formset.rows,
        extra: EXTRA_ROWS,
    }))
}

/// Apply an edited module formset
#[utoipa::path(
    post,
    path = "/courses/{id}/modules/formset",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = ModuleFormSet,
    responses(
        (status = 200, description = "Modules of the course after the changes", body = Vec<ModuleResponse>),
        (status = 404, description = "Course or module not found"),
        (status = 422, description = "Invalid rows, keyed `rows-{index}-{field}`")
    ),
    tag = "Modules"
)]
pub async fn save_formset(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(formset): Json<ModuleFormSet>,
) -> Result<Json<Vec<ModuleResponse>>, ApiError> {
    user.require(&["courses.change_course"])?;
    let course = owned_course(&state, &user, id).await?;

    let changes = formset.validate()?;
    let modules = ModuleService::apply_formset(&state.db, course.id, changes).await?;

    Ok(Json(modules.into_iter().map(ModuleResponse::from).collect()))
}

/// Set module positions within a course
#[utoipa::path(
    post,
    path = "/courses/{id}/modules/order",
    params(
        ("id" = i32, Path, description = "Course ID")
    ),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Positions saved", body = OrderResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Course not found"),
        (status = 422, description = "Positions out of range")
    ),
    tag = "Modules"
)]
pub async fn order_modules(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(order): Json<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    user.require(&["courses.change_module"])?;
    let course = owned_course(&state, &user, id).await?;
    let updated = ModuleService::reorder(&state.db, course.id, &order.pairs()?).await?;

    Ok(Json(OrderResponse {
        saved: "OK",
        updated,
    }))
}

/// A module's contents in order, for its owner and enrolled students
#[utoipa::path(
    get,
    path = "/modules/{id}/contents",
    params(
        ("id" = i32, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Module with its contents", body = ModuleContentsResponse),
        (status = 401, description = "No authenticated user"),
        (status = 404, description = "Module not found")
    ),
    tag = "Modules"
)]
pub async fn module_contents(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ModuleContentsResponse>, ApiError> {
    let (module, course) = ModuleService::get_with_course(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("module"))?;

    let allowed = course.owner_id == user.id()
        || CourseService::is_enrolled(&state.db, course.id, user.id()).await?;
    if !allowed {
        return Err(ApiError::NotFound("module"));
    }

    let ctx = state.render_context();
    let contents = ContentService::list_for_module(&state.db, module.id)
        .await?
        .into_iter()
        .map(|(slot, item)| ContentResponse::new(slot, item.as_ref(), &ctx))
        .collect();

    Ok(Json(ModuleContentsResponse {
        module: ModuleResponse::from(module),
        contents,
    }))
}
