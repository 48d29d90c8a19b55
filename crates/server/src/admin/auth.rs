use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use crate::{ServerError, server::ServerState};

const CHALLENGE: &str = "Basic realm=\"miniapp admin\", charset=\"UTF-8\"";

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, CHALLENGE)],
        Html("<!doctype html>\n<h1>401 Unauthorized</h1><p>Staff login required.</p>\n"),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html("<!doctype html>\n<h1>403 Forbidden</h1><p>Cross-site request rejected.</p>\n"),
    )
        .into_response()
}

/// `host[:port]` of an `Origin` or `Referer` value; `None` for `null` or garbage.
fn authority_of(value: &HeaderValue) -> Option<String> {
    let uri: Uri = value.to_str().ok()?.parse().ok()?;
    uri.authority()
        .map(|authority| authority.as_str().to_ascii_lowercase())
}

fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(str::to_ascii_lowercase)
        .or_else(|| uri.authority().map(|a| a.as_str().to_ascii_lowercase()))
}

/// Refuse state-changing requests a browser sent on behalf of another site.
///
/// The `Origin` header (or `Referer` when there is no `Origin`) must name the
/// host the request was sent to. Requests carrying neither come from
/// non-browser clients and pass.
pub async fn same_origin(request: Request, next: Next) -> Response {
    if request.method().is_safe() {
        return next.run(request).await;
    }
    let headers = request.headers();
    let Some(claimed) = headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
    else {
        return next.run(request).await;
    };

    match (authority_of(claimed), request_host(headers, request.uri())) {
        (Some(source), Some(host)) if source == host => next.run(request).await,
        (source, host) => {
            tracing::warn!(
                "rejected cross-site {} {} from {source:?} to {host:?}",
                request.method(),
                request.uri().path()
            );
            forbidden()
        }
    }
}

/// Let the request through only for staff users; the user is stored in the
/// request extensions for the handlers.
pub async fn require_staff(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(credentials)) = auth_header else {
        return challenge();
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return challenge();
    }

    match state
        .catalog
        .authenticate(credentials.username(), credentials.password())
        .await
    {
        Ok(Some(user)) if user.is_staff => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(_) => {
            tracing::warn!("rejected admin login for {}", credentials.username());
            challenge()
        }
        Err(err) => ServerError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_ignores_scheme_and_path() {
        let origin = HeaderValue::from_static("http://LocalHost:8000");
        assert_eq!(authority_of(&origin).as_deref(), Some("localhost:8000"));

        let referer = HeaderValue::from_static("https://shop.example/admin/appentry/1/change/");
        assert_eq!(authority_of(&referer).as_deref(), Some("shop.example"));
    }

    #[test]
    fn opaque_origin_has_no_authority() {
        assert_eq!(authority_of(&HeaderValue::from_static("null")), None);
    }

    #[test]
    fn host_header_wins_over_uri() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("Catalog.local"));
        let uri: Uri = "http://other.example/admin/".parse().unwrap();
        assert_eq!(
            request_host(&headers, &uri).as_deref(),
            Some("catalog.local")
        );
        assert_eq!(
            request_host(&HeaderMap::new(), &uri).as_deref(),
            Some("other.example")
        );
        assert_eq!(
            request_host(&HeaderMap::new(), &"/admin/".parse().unwrap()),
            None
        );
    }
}
