use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use catalog::CatalogError;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod admin;
mod miniapp;
mod pages;
mod server;
mod templates;

/// Page served for every unknown route, id or slug.
pub const NOT_FOUND_PAGE: &str = include_str!("../templates/404.html");

#[derive(Debug)]
pub enum ServerError {
    Catalog(CatalogError),
    Template(tera::Error),
    NotFound(String),
    Generic(String),
}

fn status_for_catalog_error(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::ConstraintViolation(_) => StatusCode::CONFLICT,
        CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Media(_) | CatalogError::Password(_) | CatalogError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_catalog_error(err: CatalogError) -> String {
    match err {
        CatalogError::Media(_) | CatalogError::Password(_) | CatalogError::Database(_) => {
            tracing::error!("catalog error: {err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn error_page(status: StatusCode, message: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><title>{status}</title></head>\
         <body><h1>{status}</h1><p>{}</p></body></html>\n",
        tera::escape_html(message)
    ))
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Catalog(err) => {
                (status_for_catalog_error(&err), message_for_catalog_error(err))
            }
            ServerError::Template(err) => {
                tracing::error!("template error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::NotFound(what) => {
                tracing::debug!("not found: {what}");
                return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        if status == StatusCode::NOT_FOUND {
            return (status, Html(NOT_FOUND_PAGE)).into_response();
        }
        (status, error_page(status, &error)).into_response()
    }
}

impl From<CatalogError> for ServerError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<tera::Error> for ServerError {
    fn from(value: tera::Error) -> Self {
        Self::Template(value)
    }
}
