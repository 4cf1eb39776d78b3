use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use shared_models::auth::{Caller, Role};
use shared_models::error::AppError;

/// Middleware resolving the caller identity injected by the gateway.
///
/// Identity and authentication live outside this service; the gateway is
/// trusted to assert `x-user-id` and `x-user-role` on every protected route.
/// The role is resolved into a `Caller` once here, so handlers only ever
/// consult capability flags.
pub async fn caller_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = header_value(&request, "x-user-id")?
        .parse::<Uuid>()
        .map_err(|_| AppError::BadRequest("x-user-id is not a valid UUID".to_string()))?;

    let role = header_value(&request, "x-user-role")?
        .parse::<Role>()
        .map_err(|_| AppError::BadRequest("x-user-role is not a known role".to_string()))?;

    let caller = Caller { user_id, role };
    tracing::debug!("Resolved caller {} with role {:?}", caller.user_id, caller.role);

    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

fn header_value(request: &Request<Body>, name: &str) -> Result<String, AppError> {
    let value = request
        .headers()
        .get(name)
        .ok_or_else(|| AppError::Auth(format!("Missing {} header", name)))?;

    value
        .to_str()
        .map(|v| v.to_string())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} header", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request_with(id: Option<&str>, role: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = id {
            builder = builder.header("x-user-id", id);
        }
        if let Some(role) = role {
            builder = builder.header("x-user-role", role);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn header_value_missing_is_auth_error() {
        let request = request_with(None, None);
        assert_matches!(header_value(&request, "x-user-id"), Err(AppError::Auth(_)));
    }

    #[test]
    fn header_value_present() {
        let request = request_with(Some("abc"), Some("staff"));
        assert_eq!(header_value(&request, "x-user-role").unwrap(), "staff");
    }
}
