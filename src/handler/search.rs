use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    dtos::searchdtos::{SearchResultsDto, SearchWorkersDto},
    error::HttpError,
    AppState,
};

pub fn search_handler() -> Router {
    Router::new().route("/search/workers", post(search_workers))
}

pub async fn search_workers(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SearchWorkersDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let workers = app_state
        .search_service
        .search_workers(&body.into_query())
        .await?;

    // No match is an empty list, not an error
    Ok(Json(serde_json::json!({
        "status": "success",
        "data": SearchResultsDto {
            total: workers.len(),
            workers,
        }
    })))
}
