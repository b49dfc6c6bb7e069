//! Index code handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted, Reply},
    db::Id,
    models::{CreateUpdateIndexCode, IndexCodeDto, IndexCodeSystemDto},
    state::AppState,
    Result,
};

pub async fn list_systems(State(state): State<AppState>) -> Result<Reply<Vec<IndexCodeSystemDto>>> {
    Ok(Reply::Ok(state.index_code_service.systems().await?))
}

pub async fn list_index_codes(State(state): State<AppState>) -> Result<Reply<Vec<IndexCodeDto>>> {
    Ok(Reply::Ok(state.index_code_service.get_all().await?))
}

pub async fn search_index_codes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<IndexCodeDto>>> {
    let codes = state
        .index_code_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(codes))
}

pub async fn get_index_code(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<IndexCodeDto>> {
    Ok(Reply::Ok(state.index_code_service.get_by_id(id).await?))
}

pub async fn create_index_code(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUpdateIndexCode>,
) -> Result<Reply<IndexCodeDto>> {
    Ok(Reply::Created(state.index_code_service.create(&input).await?))
}

pub async fn update_index_code(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdateIndexCode>,
) -> Result<Reply<IndexCodeDto>> {
    Ok(Reply::Ok(state.index_code_service.update(id, &input).await?))
}

pub async fn delete_index_code(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<JsonValue>> {
    state.index_code_service.delete(id).await?;
    Ok(deleted())
}
