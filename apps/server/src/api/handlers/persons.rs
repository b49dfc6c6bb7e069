//! Person handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted, Reply},
    db::Id,
    models::{CreateUpdatePerson, PersonDto},
    state::AppState,
    Result,
};

pub async fn list_persons(
    State(state): State<AppState>,
) -> Result<Reply<Vec<PersonDto>>> {
    Ok(Reply::Ok(state.person_service.get_all().await?))
}

pub async fn search_persons(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<PersonDto>>> {
    let persons = state
        .person_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(persons))
}

pub async fn get_person(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<PersonDto>> {
    Ok(Reply::Ok(state.person_service.get_by_id(id).await?))
}

pub async fn create_person(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUpdatePerson>,
) -> Result<Reply<PersonDto>> {
    Ok(Reply::Created(
        state.person_service.create(&input).await?,
    ))
}

pub async fn update_person(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdatePerson>,
) -> Result<Reply<PersonDto>> {
    Ok(Reply::Ok(
        state.person_service.update(id, &input).await?,
    ))
}

pub async fn delete_person(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<JsonValue>> {
    state.person_service.delete(id).await?;
    Ok(deleted())
}

pub async fn persons_for_set(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
) -> Result<Reply<Vec<PersonDto>>> {
    let persons = state
        .person_service
        .persons_for_set(set_id)
        .await?;
    Ok(Reply::Ok(persons))
}

pub async fn persons_for_element(
    State(state): State<AppState>,
    PathParams(element_id): PathParams<Id>,
) -> Result<Reply<Vec<PersonDto>>> {
    let persons = state
        .person_service
        .persons_for_element(element_id)
        .await?;
    Ok(Reply::Ok(persons))
}
