use crate::{
    error::ApiError,
    forms::{FORM_NAMES, FormDescriptor, describe},
};
use axum::{Json, extract::Path};

/// Names of the forms that can be described
#[utoipa::path(
    get,
    path = "/forms",
    responses(
        (status = 200, description = "Registered form names", body = Vec<String>)
    ),
    tag = "Forms"
)]
pub async fn list_forms() -> Json<Vec<&'static str>> {
    Json(FORM_NAMES.to_vec())
}

/// Field descriptors of a form: labels, widgets and their attributes
#[utoipa::path(
    get,
    path = "/forms/{name}",
    params(
        ("name" = String, Path, description = "Form name, e.g. course or module-formset")
    ),
    responses(
        (status = 200, description = "Form descriptor", body = FormDescriptor),
        (status = 404, description = "Unknown form")
    ),
    tag = "Forms"
)]
pub async fn get_form(Path(name): Path<String>) -> Result<Json<FormDescriptor>, ApiError> {
    describe(&name).map(Json).ok_or(ApiError::NotFound("form"))
}
