//! Route handlers for the web UI
//!
//! Every handler re-authenticates as admin; no token outlives the request.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::backend::{CollectionDescriptor, SessionToken};

use super::error::WebError;
use super::server::AppState;
use super::templates::{CollectionTemplate, CreateCollectionTemplate, FieldDisplay, HomeTemplate};

fn render(template: &impl Template) -> Result<Html<String>, WebError> {
    Ok(Html(template.render()?))
}

async fn admin_token(state: &AppState) -> Result<SessionToken, WebError> {
    state
        .backend
        .authenticate_admin(&state.admin)
        .await
        .map_err(WebError::Auth)
}

// ============== Home ==============

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let token = admin_token(&state).await?;

    let collections = state
        .backend
        .list_collections(&token)
        .await
        .map_err(|e| WebError::backend("Unable to retrieve collections", e))?;

    render(&HomeTemplate { collections })
}

// ============== Create ==============

pub async fn create_collection_page(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    render(&CreateCollectionTemplate {
        collection_type: state.collections.collection_type.clone(),
        fields: state.collections.fields.iter().map(FieldDisplay::from).collect(),
    })
}

#[derive(Deserialize)]
pub struct CreateCollectionForm {
    #[serde(rename = "collectionName", default)]
    collection_name: String,
}

pub async fn create_collection_submit(
    State(state): State<AppState>,
    Form(form): Form<CreateCollectionForm>,
) -> Result<Redirect, WebError> {
    // Validate before touching the backend
    let descriptor = CollectionDescriptor::new(
        form.collection_name,
        state.collections.collection_type.clone(),
        state.collections.fields.clone(),
    )?;

    let token = admin_token(&state).await?;

    state
        .backend
        .create_collection(&token, &descriptor)
        .await
        .map_err(|e| WebError::backend("Failed to create collection", e))?;

    tracing::info!(collection = %descriptor.name, "Created collection");
    Ok(Redirect::to("/"))
}

// ============== Collection detail ==============

pub async fn collection_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, WebError> {
    let token = admin_token(&state).await?;

    let collection = state
        .backend
        .get_collection(&token, &name)
        .await
        .map_err(|e| WebError::backend("Unable to retrieve collection", e))?;

    render(&CollectionTemplate::from_collection(&name, collection))
}

pub async fn collection_delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Redirect, WebError> {
    let token = admin_token(&state).await?;

    state
        .backend
        .delete_collection(&token, &name)
        .await
        .map_err(|e| WebError::backend("Failed to delete collection", e))?;

    tracing::info!(collection = %name, "Deleted collection");
    Ok(Redirect::to("/"))
}
