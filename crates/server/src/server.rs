use std::sync::Arc;

use axum::{Router, http::Uri, routing::get};
use catalog::Catalog;
use tower_http::services::ServeDir;

use crate::{ServerError, admin, miniapp, pages, templates::Templates};

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<Catalog>,
    pub templates: Arc<Templates>,
}

impl ServerState {
    pub fn new(catalog: Arc<Catalog>) -> Result<Self, tera::Error> {
        Ok(Self {
            catalog,
            templates: Arc::new(Templates::new()?),
        })
    }
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_string())
}

pub fn router(state: ServerState) -> Router {
    let media = ServeDir::new(state.catalog.media_root());

    Router::new()
        .route("/", get(pages::home))
        .route("/about/", get(pages::about))
        .route("/contact/", get(pages::contact))
        .merge(miniapp::routes())
        .merge(admin::routes(state.clone()))
        .nest_service("/media", media)
        .fallback(not_found)
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
