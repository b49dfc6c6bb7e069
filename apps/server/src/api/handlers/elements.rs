//! Element handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted, Reply},
    db::Id,
    models::{CreateUpdateElement, ElementDto},
    state::AppState,
    Result,
};

pub async fn list_elements(State(state): State<AppState>) -> Result<Reply<Vec<ElementDto>>> {
    Ok(Reply::Ok(state.element_service.get_all().await?))
}

pub async fn search_elements(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<ElementDto>>> {
    let elements = state
        .element_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(elements))
}

pub async fn get_element(
    State(state): State<AppState>,
    PathParams(element_id): PathParams<Id>,
) -> Result<Reply<ElementDto>> {
    Ok(Reply::Ok(state.element_service.get_by_id(element_id).await?))
}

pub async fn elements_in_set(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
) -> Result<Reply<Vec<ElementDto>>> {
    Ok(Reply::Ok(state.element_service.get_by_set(set_id).await?))
}

pub async fn create_element(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdateElement>,
) -> Result<Reply<ElementDto>> {
    Ok(Reply::Created(
        state.element_service.create(set_id, &input).await?,
    ))
}

pub async fn update_element(
    State(state): State<AppState>,
    PathParams((set_id, element_id)): PathParams<(Id, Id)>,
    JsonBody(input): JsonBody<CreateUpdateElement>,
) -> Result<Reply<ElementDto>> {
    let element = state
        .element_service
        .update(set_id, element_id, &input)
        .await?;
    Ok(Reply::Ok(element))
}

pub async fn delete_element(
    State(state): State<AppState>,
    PathParams((set_id, element_id)): PathParams<(Id, Id)>,
) -> Result<Reply<JsonValue>> {
    state.element_service.delete(set_id, element_id).await?;
    Ok(deleted())
}
