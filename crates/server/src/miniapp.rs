//! Public catalog pages mounted under `/miniapp/`.

use axum::{
    Form, Router,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tera::Context;

use crate::{ServerError, server::ServerState};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const REQUIRED: &str = "This field is required.";

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/miniapp/", get(index))
        .route("/miniapp/stores/", get(stores_form).post(stores_lookup))
        .route("/miniapp/{id}/", get(detail))
}

/// Positive integer id taken from the path; anything else is a 404.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppId(pub i32);

impl AppId {
    fn parse(raw: &str) -> Option<Self> {
        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Some(AppId(id)),
            _ => None,
        }
    }
}

impl<S> FromRequestParts<S> for AppId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ServerError::NotFound(parts.uri.path().to_string()))?;
        AppId::parse(&raw).ok_or_else(|| ServerError::NotFound(parts.uri.path().to_string()))
    }
}

async fn index(State(state): State<ServerState>) -> Result<Html<String>, ServerError> {
    let apps = state.catalog.list_apps().await?;

    let mut context = Context::new();
    context.insert("apps", &apps);
    state.templates.render("miniapp/index.html", &context)
}

async fn detail(
    AppId(id): AppId,
    State(state): State<ServerState>,
) -> Result<Html<String>, ServerError> {
    let detail = state.catalog.app_detail(id).await?;

    let mut context = Context::new();
    context.insert("detail", &detail);
    state.templates.render("miniapp/detail.html", &context)
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreLookup {
    app_variety: Option<String>,
}

async fn render_stores(
    state: &ServerState,
    selected: Option<i32>,
    stores: &[catalog::Store],
    error: Option<&str>,
) -> Result<Html<String>, ServerError> {
    let apps = state.catalog.list_apps().await?;

    let mut context = Context::new();
    context.insert("apps", &apps);
    context.insert("selected", &selected);
    context.insert("stores", stores);
    context.insert("error", &error);
    state.templates.render("miniapp/stores.html", &context)
}

async fn stores_form(State(state): State<ServerState>) -> Result<Html<String>, ServerError> {
    render_stores(&state, None, &[], None).await
}

async fn stores_lookup(
    State(state): State<ServerState>,
    Form(lookup): Form<StoreLookup>,
) -> Result<Html<String>, ServerError> {
    let raw = lookup.app_variety.unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return render_stores(&state, None, &[], Some(REQUIRED)).await;
    }

    let Ok(app_id) = raw.parse::<i32>() else {
        return render_stores(&state, None, &[], Some(INVALID_CHOICE)).await;
    };
    if !state.catalog.app_exists(app_id).await? {
        tracing::debug!("store lookup for unknown app {app_id}");
        return render_stores(&state, None, &[], Some(INVALID_CHOICE)).await;
    }

    let stores = state.catalog.stores_carrying(app_id).await?;
    render_stores(&state, Some(app_id), &stores, None).await
}
