//! API middleware
//!
//! Authentication lives at the gateway in front of the portal. The
//! gateway forwards the caller's identity as headers, and the actor
//! middleware maps those onto a domain actor before any handler runs.

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use core_kernel::{Actor, FacilityId, TpaId};

use crate::error::ApiError;

/// Header carrying the caller's user identifier
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role: `facility`, `tpa`, or `admin`
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the facility or TPA the caller acts for
pub const ACTOR_ORG_HEADER: &str = "x-actor-org";

/// Actor resolution middleware
///
/// Rejects requests without identity headers and inserts the resolved
/// actor into the request extensions for handlers to pick up.
pub async fn actor_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match actor_from_headers(request.headers()) {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            Ok(next.run(request).await)
        }
        Err(error) => {
            warn!(uri = %request.uri(), error = %error, "actor resolution failed");
            Err(error)
        }
    }
}

/// Maps forwarded identity headers onto a domain actor
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` when the identity headers are
/// absent, and `ApiError::BadRequest` when they name an unknown role or
/// an unparseable organisation id.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let id = header_value(headers, ACTOR_ID_HEADER).ok_or(ApiError::Unauthorized)?;
    let role = header_value(headers, ACTOR_ROLE_HEADER).ok_or(ApiError::Unauthorized)?;

    match role {
        "facility" => {
            let org = required_org(headers, "facility")?;
            let facility_id: FacilityId = org.parse().map_err(|_| {
                ApiError::BadRequest(format!("X-Actor-Org is not a valid facility id: {org}"))
            })?;
            Ok(Actor::facility(id, facility_id))
        }
        "tpa" => {
            let org = required_org(headers, "tpa")?;
            let tpa_id: TpaId = org.parse().map_err(|_| {
                ApiError::BadRequest(format!("X-Actor-Org is not a valid TPA id: {org}"))
            })?;
            Ok(Actor::tpa(id, tpa_id))
        }
        "admin" => Ok(Actor::admin(id)),
        other => Err(ApiError::BadRequest(format!("Unknown actor role: {other}"))),
    }
}

fn required_org<'a>(headers: &'a HeaderMap, role: &str) -> Result<&'a str, ApiError> {
    header_value(headers, ACTOR_ORG_HEADER).ok_or_else(|| {
        ApiError::BadRequest(format!("X-Actor-Org is required for {role} actors"))
    })
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Request logging middleware
///
/// Logs every API request with its actor, status, and duration.
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let actor = request
        .extensions()
        .get::<Actor>()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        actor = %actor,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_admin_actor_resolves_without_org() {
        let map = headers(&[
            (ACTOR_ID_HEADER, "scheme-officer-1"),
            (ACTOR_ROLE_HEADER, "admin"),
        ]);
        let actor = actor_from_headers(&map).unwrap();
        assert!(actor.is_admin());
        assert_eq!(actor.id(), "scheme-officer-1");
    }

    #[test]
    fn test_facility_actor_accepts_prefixed_org() {
        let facility_id = FacilityId::new();
        let map = headers(&[
            (ACTOR_ID_HEADER, "desk-officer-1"),
            (ACTOR_ROLE_HEADER, "facility"),
            (ACTOR_ORG_HEADER, &facility_id.to_string()),
        ]);
        let actor = actor_from_headers(&map).unwrap();
        assert!(actor.represents_facility(facility_id));
    }

    #[test]
    fn test_tpa_actor_accepts_bare_uuid_org() {
        let tpa_id = TpaId::new();
        let map = headers(&[
            (ACTOR_ID_HEADER, "reviewer-1"),
            (ACTOR_ROLE_HEADER, "tpa"),
            (ACTOR_ORG_HEADER, &tpa_id.as_uuid().to_string()),
        ]);
        let actor = actor_from_headers(&map).unwrap();
        assert!(actor.represents_tpa(tpa_id));
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let map = headers(&[(ACTOR_ROLE_HEADER, "admin")]);
        assert!(matches!(
            actor_from_headers(&map),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_unknown_role_is_bad_request() {
        let map = headers(&[
            (ACTOR_ID_HEADER, "someone"),
            (ACTOR_ROLE_HEADER, "auditor"),
        ]);
        assert!(matches!(
            actor_from_headers(&map),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_facility_without_org_is_bad_request() {
        let map = headers(&[
            (ACTOR_ID_HEADER, "desk-officer-1"),
            (ACTOR_ROLE_HEADER, "facility"),
        ]);
        assert!(matches!(
            actor_from_headers(&map),
            Err(ApiError::BadRequest(_))
        ));
    }
}
