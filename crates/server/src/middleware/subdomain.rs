//! Sends `{slug}.example.com` to the course's page on `example.com`

use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use database::services::course::CourseService;
use log::debug;
use models::host::{SubdomainTarget, course_detail_path};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

pub async fn redirect_course_subdomain(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let target = request_host(request.headers(), request.uri()).and_then(SubdomainTarget::parse);

    let Some(target) = target else {
        return Ok(next.run(request).await);
    };

    debug!("Request for course subdomain {}", target.slug);
    let course = CourseService::get_by_slug(&state.db, &target.slug)
        .await?
        .ok_or(ApiError::NotFound("course"))?;

    let scheme = request_scheme(request.headers(), request.uri());
    let location = target.redirect_url(&scheme, &course_detail_path(&course.slug));

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Option<&'a str> {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
}

/// Scheme the client used: the proxy's forwarded value, else the request's own, else http
fn request_scheme(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .or_else(|| uri.scheme_str().map(str::to_owned))
        .unwrap_or_else(|| "http".to_owned())
}
