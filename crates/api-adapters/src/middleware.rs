//! Bearer-token authentication and role authorization.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use domains::{Claims, DomainError, Role};

use crate::error::ApiError;
use crate::AppState;

/// Verifies the bearer token and attaches its `Claims` to the request.
/// Missing, malformed, forged or expired tokens end the request with 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = {
        let token = bearer_token(req.headers()).ok_or_else(|| {
            DomainError::Unauthenticated("Access denied. No token provided.".to_string())
        })?;
        state.tokens.verify(token)?
    };

    tracing::debug!(user_id = %claims.user_id, role = %claims.role, "token accepted");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must run inside `authenticate`. A valid token with too low a role ends
/// the request with 403.
pub async fn require_role(required: Role, req: Request, next: Next) -> Result<Response, ApiError> {
    let role = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.role)
        .ok_or_else(|| DomainError::Unauthenticated("Access denied. No token provided.".to_string()))?;

    if !role.satisfies(required) {
        tracing::warn!(%role, %required, "insufficient role");
        return Err(DomainError::Forbidden(format!(
            "Access denied. Requires the {required} role."
        ))
        .into());
    }

    Ok(next.run(req).await)
}

/// Extracts `<token>` from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn parses_bearer_scheme_only() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
