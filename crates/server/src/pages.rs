//! Site-level pages outside the catalog.

use axum::{extract::State, response::Html};
use tera::Context;

use crate::{ServerError, server::ServerState};

pub async fn home(State(state): State<ServerState>) -> Result<Html<String>, ServerError> {
    state.templates.render("home.html", &Context::new())
}

pub async fn about() -> &'static str {
    "This is about page"
}

pub async fn contact() -> &'static str {
    "This is contact page"
}
