//! Principal extraction for the adapter layer.
//!
//! Identity and session issuance live outside this service: the core
//! only ever consumes an already-authenticated principal string. This
//! module is the thin boundary that resolves one out of an inbound
//! request — a real deployment would swap the header read below for
//! whatever session/JWT verification the surrounding platform already
//! does.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

const PRINCIPAL_HEADER: &str = "x-principal";

/// An authenticated caller identity. Host-only and seat-ownership
/// checks downstream compare this against `Draft.hostSeatId` /
/// `Seat.principal`; the core never interprets the string itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .ok_or((StatusCode::UNAUTHORIZED, "missing principal"))?
            .to_str()
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid principal header"))?;
        if value.is_empty() {
            return Err((StatusCode::UNAUTHORIZED, "empty principal"));
        }
        Ok(Principal(value.to_string()))
    }
}

/// Same lookup, but absence is not an error — used by read paths
/// (`getState`) that serve a public projection to anonymous callers and
/// only attach a private hand when a principal is present.
pub struct OptionalPrincipal(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Ok(OptionalPrincipal(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract_principal(header: Option<&str>) -> Result<Principal, (StatusCode, &'static str)> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(PRINCIPAL_HEADER, h);
        }
        let request = builder.body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let result = extract_principal(None).await;
        assert_eq!(result.unwrap_err().0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn present_header_round_trips() {
        let result = extract_principal(Some("alice")).await;
        assert_eq!(result.unwrap(), Principal("alice".to_string()));
    }

    #[tokio::test]
    async fn optional_principal_is_none_when_absent() {
        let request = Request::builder().uri("/").body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let OptionalPrincipal(value) = OptionalPrincipal::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(value, None);
    }
}
