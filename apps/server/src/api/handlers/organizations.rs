//! Organization handlers

use axum::extract::{Query, State};
use serde_json::Value as JsonValue;

use super::SearchQuery;
use crate::{
    api::extractors::{JsonBody, PathParams},
    api::response::{deleted, Reply},
    db::Id,
    models::{CreateUpdateOrganization, OrganizationDto},
    state::AppState,
    Result,
};

pub async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Reply<Vec<OrganizationDto>>> {
    Ok(Reply::Ok(state.organization_service.get_all().await?))
}

pub async fn search_organizations(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Reply<Vec<OrganizationDto>>> {
    let organizations = state
        .organization_service
        .search(query.search_keyword.as_deref())
        .await?;
    Ok(Reply::Ok(organizations))
}

pub async fn get_organization(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<OrganizationDto>> {
    Ok(Reply::Ok(state.organization_service.get_by_id(id).await?))
}

pub async fn create_organization(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateUpdateOrganization>,
) -> Result<Reply<OrganizationDto>> {
    Ok(Reply::Created(
        state.organization_service.create(&input).await?,
    ))
}

pub async fn update_organization(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
    JsonBody(input): JsonBody<CreateUpdateOrganization>,
) -> Result<Reply<OrganizationDto>> {
    Ok(Reply::Ok(
        state.organization_service.update(id, &input).await?,
    ))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    PathParams(id): PathParams<Id>,
) -> Result<Reply<JsonValue>> {
    state.organization_service.delete(id).await?;
    Ok(deleted())
}

pub async fn organizations_for_set(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
) -> Result<Reply<Vec<OrganizationDto>>> {
    let organizations = state
        .organization_service
        .organizations_for_set(set_id)
        .await?;
    Ok(Reply::Ok(organizations))
}

pub async fn organizations_for_element(
    State(state): State<AppState>,
    PathParams(element_id): PathParams<Id>,
) -> Result<Reply<Vec<OrganizationDto>>> {
    let organizations = state
        .organization_service
        .organizations_for_element(element_id)
        .await?;
    Ok(Reply::Ok(organizations))
}
