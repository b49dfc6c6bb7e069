//! Specialty handlers (read only)

use axum::extract::{Query, State};

use super::SearchQuery;
use crate::{
    api::extractors::PathParams,
    api::response::Reply,
    db::Id,
    models::{ElementDto, SpecialtyDto},
    state::AppState,
    Result,
};

pub async fn list_specialties(State(state): State<AppState>) -> Result<Reply<Vec<SpecialtyDto>>> {
    Ok(Reply::Ok(state.specialty_service.get_all().await?))
}

pub async fn search_specialties(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<SpecialtyDto>>> {
    let specialties = state
        .specialty_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(specialties))
}

pub async fn get_specialty(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<SpecialtyDto>> {
    Ok(Reply::Ok(state.specialty_service.get_by_id(id).await?))
}

pub async fn specialty_elements(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<Vec<ElementDto>>> {
    Ok(Reply::Ok(
        state.specialty_service.elements_for_specialty(id).await?,
    ))
}
