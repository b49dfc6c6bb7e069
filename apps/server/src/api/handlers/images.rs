//! Image handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted, Reply},
    db::Id,
    models::{CreateUpdateImage, ImageDto},
    state::AppState,
    Result,
};

pub async fn list_images(State(state): State<AppState>) -> Result<Reply<Vec<ImageDto>>> {
    Ok(Reply::Ok(state.image_service.get_all().await?))
}

pub async fn search_images(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<ImageDto>>> {
    let images = state
        .image_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(images))
}

pub async fn get_image(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<ImageDto>> {
    Ok(Reply::Ok(state.image_service.get_by_id(id).await?))
}

pub async fn create_image(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUpdateImage>,
) -> Result<Reply<ImageDto>> {
    Ok(Reply::Created(state.image_service.create(&input).await?))
}

pub async fn update_image(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdateImage>,
) -> Result<Reply<ImageDto>> {
    Ok(Reply::Ok(state.image_service.update(id, &input).await?))
}

pub async fn delete_image(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<JsonValue>> {
    state.image_service.delete(id).await?;
    Ok(deleted())
}
