//! Disruption REST routes: filtered listing, lookup, and export downloads.

use std::convert::Infallible;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{info, warn};

use crate::model::Disruption;
use crate::services::export::{self, ExportError, ExportFormat};
use crate::services::feed::{self, FeedError};
use crate::services::search::{self, SearchError, SearchQuery, SearchResults};
use crate::state::AppState;

pub(crate) fn search_error_to_status(err: &SearchError) -> StatusCode {
    match err {
        SearchError::UnknownFacetValue { .. } | SearchError::InvalidDate { .. } | SearchError::InvalidNumber { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

pub(crate) fn feed_error_to_status(err: &FeedError) -> StatusCode {
    match err {
        FeedError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

pub(crate) fn export_error_to_status(err: &ExportError) -> StatusCode {
    match err {
        ExportError::Empty => StatusCode::NO_CONTENT,
        ExportError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
        ExportError::Csv(_) | ExportError::Json(_) | ExportError::Xlsx(_) | ExportError::Pdf(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/disruptions`: filter the live feed, newest first, one page.
pub async fn list_disruptions(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, StatusCode> {
    let (filters, page) = query.parse().map_err(|e| {
        warn!(error = %e, "disruptions: rejected query");
        search_error_to_status(&e)
    })?;
    let records = state.feed.read().await.snapshot();
    Ok(Json(search::search(&records, &filters, page)))
}

/// `GET /api/disruptions/{id}`
pub async fn get_disruption(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Disruption>, StatusCode> {
    feed::find(&state, &id).await.map(Json).map_err(|e| feed_error_to_status(&e))
}

/// `GET /api/export/{format}`: every record matching the filters, ignoring
/// pagination. An empty match set is a no-op answered with 204.
pub async fn export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, StatusCode> {
    let format = ExportFormat::parse(&format).map_err(|e| export_error_to_status(&e))?;
    let (filters, _) = query.parse().map_err(|e| search_error_to_status(&e))?;

    let records = filters.apply(&state.feed.read().await.snapshot());
    let rendered = match export::render(format, &records, Utc::now()) {
        Ok(rendered) => rendered,
        Err(ExportError::Empty) => return Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => {
            warn!(error = %e, format = format.extension(), "export: render failed");
            return Err(export_error_to_status(&e));
        }
    };

    info!(
        format = format.extension(),
        records = records.len(),
        bytes = rendered.len(),
        "export: rendered"
    );

    let disposition = format!("attachment; filename=\"{}\"", rendered.filename);
    let stream = futures::stream::iter(
        rendered
            .chunks
            .into_iter()
            .map(|chunk| Ok::<Bytes, Infallible>(Bytes::from(chunk))),
    );

    Ok((
        [(CONTENT_TYPE, format.content_type()), (CONTENT_DISPOSITION, disposition.as_str())],
        Body::from_stream(stream),
    )
        .into_response())
}

#[cfg(test)]
#[path = "disruptions_test.rs"]
mod tests;
