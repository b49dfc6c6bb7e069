//! Reporting module import and export handlers

use axum::{extract::State, Extension};

use crate::{
    api::extractors::{PathParams, XmlBody},
    api::response::Reply,
    db::Id,
    models::ModuleImport,
    request_context::RequestContext,
    state::AppState,
    Result,
};

pub async fn create_module(
    State(state): State<AppState>,
    XmlBody(xml): XmlBody,
) -> Result<Reply<ModuleImport>> {
    Ok(Reply::Created(state.module_service.create_module(&xml).await?))
}

pub async fn update_module(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
    XmlBody(xml): XmlBody,
) -> Result<Reply<ModuleImport>> {
    Ok(Reply::Ok(
        state.module_service.update_module(set_id, &xml).await?,
    ))
}

pub async fn export_module(
    State(state): State<AppState>,
    PathParams(set_id): PathParams<Id>,
) -> Result<Reply<()>> {
    Ok(Reply::Xml(state.module_service.export_module(set_id).await?))
}

/// Import a module held by the external module source on behalf of `X-Requester`.
pub async fn import_from_source(
    State(state): State<AppState>,
    PathParams(module_id): PathParams<String>,
    context: Option<Extension<RequestContext>>,
) -> Result<Reply<ModuleImport>> {
    let requester = context
        .as_ref()
        .map(|Extension(ctx)| ctx.requester.as_str())
        .unwrap_or(RequestContext::ANONYMOUS);
    let import = state
        .module_service
        .import_from_source(&module_id, requester)
        .await?;
    Ok(Reply::Created(import))
}
