//! Reference handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted, Reply},
    db::Id,
    models::{CreateUpdateReference, ReferenceDto},
    state::AppState,
    Result,
};

pub async fn list_references(State(state): State<AppState>) -> Result<Reply<Vec<ReferenceDto>>> {
    Ok(Reply::Ok(state.reference_service.get_all().await?))
}

pub async fn search_references(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<ReferenceDto>>> {
    let references = state
        .reference_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(references))
}

pub async fn get_reference(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<ReferenceDto>> {
    Ok(Reply::Ok(state.reference_service.get_by_id(id).await?))
}

pub async fn create_reference(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUpdateReference>,
) -> Result<Reply<ReferenceDto>> {
    Ok(Reply::Created(state.reference_service.create(&input).await?))
}

pub async fn update_reference(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdateReference>,
) -> Result<Reply<ReferenceDto>> {
    Ok(Reply::Ok(state.reference_service.update(id, &input).await?))
}

pub async fn delete_reference(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<JsonValue>> {
    state.reference_service.delete(id).await?;
    Ok(deleted())
}
