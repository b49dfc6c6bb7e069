//! Element set handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted_with, Reply},
    db::Id,
    models::{CreateUpdateSet, ElementSetDto},
    state::AppState,
    Result,
};

pub async fn list_sets(State(state): State<AppState>) -> Result<Reply<Vec<ElementSetDto>>> {
    Ok(Reply::Ok(state.set_service.get_all().await?))
}

pub async fn search_sets(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<ElementSetDto>>> {
    let sets = state
        .set_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(sets))
}

pub async fn get_set(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
) -> Result<Reply<ElementSetDto>> {
    Ok(Reply::Ok(state.set_service.get_by_id(set_id).await?))
}

pub async fn create_set(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUpdateSet>,
) -> Result<Reply<ElementSetDto>> {
    Ok(Reply::Created(state.set_service.create(&input).await?))
}

pub async fn update_set(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdateSet>,
) -> Result<Reply<ElementSetDto>> {
    Ok(Reply::Ok(state.set_service.update(set_id, &input).await?))
}

pub async fn delete_set(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
) -> Result<Reply<JsonValue>> {
    let report = state.set_service.delete(set_id).await?;
    deleted_with(&report)
}

pub async fn sets_for_element(
    State(state): State<AppState>,
    PathParams(element_id): PathParams<Id>,
) -> Result<Reply<Vec<ElementSetDto>>> {
    Ok(Reply::Ok(state.set_service.sets_for_element(element_id).await?))
}
