use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{OriginalUri, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::header::LINK;
use web_conferences_database::models::{ContextRef, CourseId, GroupId, User};

use crate::conferences::list_conferences;
use crate::error::AppError;
use crate::json::api_conferences_json;
use crate::pagination::{paginate, PageParams, Pagination};
use crate::session::Session;
use crate::AppState;

/// `GET /api/v1/courses/:course_id/conferences`
pub async fn course_conferences(
    State(state): State<AppState>,
    session: Session,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageParams>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AppError> {
    let user = session.require_user()?;
    let Path(course_id) = path?;
    list(&state, user, ContextRef::Course(CourseId(course_id)), query, uri.path()).await
}

/// `GET /api/v1/groups/:group_id/conferences`
pub async fn group_conferences(
    State(state): State<AppState>,
    session: Session,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageParams>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, AppError> {
    let user = session.require_user()?;
    let Path(group_id) = path?;
    list(&state, user, ContextRef::Group(GroupId(group_id)), query, uri.path()).await
}

async fn list(
    state: &AppState,
    user: &User,
    context: ContextRef,
    query: Result<Query<PageParams>, QueryRejection>,
    path: &str,
) -> Result<Response, AppError> {
    // rights come before the query string
    let conferences = list_conferences(state, user, context).await?;

    let Query(params) = query?;
    let pagination = Pagination::resolve(params, &state.api);
    let page = paginate(conferences, pagination);
    let link = page.link_header(path)?;

    Ok((
        [(LINK, link)],
        Json(api_conferences_json(&page.items, &state.plugins)),
    )
        .into_response())
}
