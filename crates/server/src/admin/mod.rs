//! Staff-only management screens under `/admin/`.
//!
//! Which entities appear, their list columns, inlines and widgets all come
//! from [`registry::SITE`]; the handlers here only dispatch on
//! [`registry::Kind`].

use axum::{
    Extension, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use catalog::{Catalog, CatalogError, User};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::Context;

use crate::{ServerError, server::ServerState};

use forms::{Field, FormData, InlineFormset};
use registry::{Kind, ModelAdmin, SITE, column_label, lookup};

mod app_entries;
mod auth;
mod certificates;
mod forms;
mod registry;
mod stores;

const DATETIME_DISPLAY: &str = "%Y-%m-%d %H:%M";

pub fn routes(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/admin/", get(dashboard))
        .route("/admin/{slug}/", get(changelist))
        .route("/admin/{slug}/add/", get(add_form).post(add_submit))
        .route(
            "/admin/{slug}/{id}/change/",
            get(change_form).post(change_submit),
        )
        .route("/admin/{slug}/{id}/delete/", post(delete))
        .route_layer(middleware::from_fn_with_state(state, auth::require_staff))
        .route_layer(middleware::from_fn(auth::same_origin))
}

/// A change list line: the object id and one cell per `list_display` column.
#[derive(Debug, Serialize)]
pub struct Row {
    pub id: i32,
    pub cells: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub fields: Vec<Field>,
    pub inlines: Vec<InlineFormset>,
}

fn display_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_DISPLAY).to_string()
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

fn empty_cell() -> String {
    "-".to_string()
}

fn object_id(raw: &str) -> Result<i32, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::NotFound(format!("object {raw}")))
}

async fn rows(catalog: &Catalog, admin: &ModelAdmin) -> Result<Vec<Row>, CatalogError> {
    match admin.kind {
        Kind::AppEntry => app_entries::rows(catalog, admin).await,
        Kind::Store => stores::rows(catalog, admin).await,
        Kind::Certificate => certificates::rows(catalog, admin).await,
    }
}

async fn initial(
    catalog: &Catalog,
    admin: &ModelAdmin,
    id: Option<i32>,
) -> Result<FormData, CatalogError> {
    match admin.kind {
        Kind::AppEntry => app_entries::initial(catalog, admin, id).await,
        Kind::Store => stores::initial(catalog, id).await,
        Kind::Certificate => certificates::initial(catalog, id).await,
    }
}

async fn form_view(
    catalog: &Catalog,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
) -> Result<FormView, CatalogError> {
    match admin.kind {
        Kind::AppEntry => app_entries::form(catalog, admin, id, data).await,
        Kind::Store => stores::form(catalog, admin, data).await,
        Kind::Certificate => certificates::form(catalog, data).await,
    }
}

async fn save(
    catalog: &Catalog,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
) -> Result<i32, CatalogError> {
    match admin.kind {
        Kind::AppEntry => app_entries::save(catalog, admin, id, data).await,
        Kind::Store => stores::save(catalog, id, data).await,
        Kind::Certificate => certificates::save(catalog, id, data).await,
    }
}

async fn remove(catalog: &Catalog, admin: &ModelAdmin, id: i32) -> Result<(), CatalogError> {
    match admin.kind {
        Kind::AppEntry => catalog.delete_app(id).await,
        Kind::Store => catalog.delete_store(id).await,
        Kind::Certificate => catalog.delete_certificate(id).await,
    }
}

async fn dashboard(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Html<String>, ServerError> {
    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("site", &SITE);
    state.templates.render("admin/index.html", &context)
}

async fn changelist(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ServerError> {
    let admin = lookup(&slug)?;
    let rows = rows(&state.catalog, admin).await?;
    let columns: Vec<String> = admin.list_display.iter().map(|c| column_label(c)).collect();

    let mut context = Context::new();
    context.insert("user", &user);
    context.insert("admin", admin);
    context.insert("columns", &columns);
    context.insert("rows", &rows);
    state.templates.render("admin/change_list.html", &context)
}

async fn render_form(
    state: &ServerState,
    user: &User,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
    error: Option<String>,
) -> Result<Html<String>, ServerError> {
    let view = form_view(&state.catalog, admin, id, data).await?;
    let action = match id {
        Some(id) => format!("/admin/{}/{id}/change/", admin.slug),
        None => format!("/admin/{}/add/", admin.slug),
    };

    let mut context = Context::new();
    context.insert("user", user);
    context.insert("admin", admin);
    context.insert("object_id", &id);
    context.insert("action", &action);
    context.insert("fields", &view.fields);
    context.insert("inlines", &view.inlines);
    context.insert("error", &error);
    state.templates.render("admin/change_form.html", &context)
}

/// Save a submitted form; invalid input re-renders it with the message.
async fn submit(
    state: &ServerState,
    user: &User,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: FormData,
) -> Result<Response, ServerError> {
    match save(&state.catalog, admin, id, &data).await {
        Ok(saved) => {
            tracing::info!(
                "{} saved {} {saved}",
                user.username,
                admin.verbose_name
            );
            Ok(Redirect::to(&admin.changelist_url()).into_response())
        }
        Err(err @ (CatalogError::ConstraintViolation(_) | CatalogError::Validation(_))) => {
            tracing::debug!("rejected {} form: {err}", admin.verbose_name);
            let page = render_form(state, user, admin, id, &data, Some(err.to_string())).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn add_form(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, ServerError> {
    let admin = lookup(&slug)?;
    let data = initial(&state.catalog, admin, None).await?;
    render_form(&state, &user, admin, None, &data, None).await
}

async fn add_submit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let admin = lookup(&slug)?;
    let data = FormData::from_multipart(multipart).await?;
    submit(&state, &user, admin, None, data).await
}

async fn change_form(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Html<String>, ServerError> {
    let admin = lookup(&slug)?;
    let id = object_id(&id)?;
    let data = initial(&state.catalog, admin, Some(id)).await?;
    render_form(&state, &user, admin, Some(id), &data, None).await
}

async fn change_submit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((slug, id)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let admin = lookup(&slug)?;
    let id = object_id(&id)?;
    let data = FormData::from_multipart(multipart).await?;
    submit(&state, &user, admin, Some(id), data).await
}

async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Redirect, ServerError> {
    let admin = lookup(&slug)?;
    let id = object_id(&id)?;
    remove(&state.catalog, admin, id).await?;
    tracing::info!("{} deleted {} {id}", user.username, admin.verbose_name);
    Ok(Redirect::to(&admin.changelist_url()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_must_be_integers() {
        assert_eq!(object_id("12").unwrap(), 12);
        assert!(matches!(object_id("twelve"), Err(ServerError::NotFound(_))));
    }

    #[test]
    fn cells_are_formatted() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(empty_cell(), "-");
        let date = DateTime::parse_from_rfc3339("2025-06-19T08:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(display_datetime(&date), "2025-06-19 08:05");
    }
}
