use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::EntityTrait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::capabilities::{has_capability, parse_role, Capability};
use super::jwt::{validate_token, Claims, TokenType};
use musicat_db::entities::user::{self, UserRole};
use musicat_db::AppState;

/// Extension type to access authenticated user claims in handlers
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

fn forbidden(capability: Capability) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Insufficient permissions",
            "required": capability.as_str(),
        })),
    )
        .into_response()
}

/// Validate the bearer access token on `request`.
fn access_claims(state: &AppState, request: &Request) -> Result<Claims, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(unauthorized("Missing or invalid Authorization header")),
    };

    match validate_token(token, &state.jwt_secret) {
        Ok(claims) if claims.token_type == TokenType::Access => Ok(claims),
        Ok(_) => Err(unauthorized("Invalid token type, access token required")),
        Err(_) => Err(unauthorized("Invalid or expired token")),
    }
}

/// The user's role as currently stored. `None` when the user is gone or the
/// database cannot be reached.
pub async fn current_role(state: &AppState, user_id: Uuid) -> Option<UserRole> {
    let db = state.db.clone();
    tokio::spawn(async move {
        user::Entity::find_by_id(user_id)
            .one(&db)
            .await
            .ok()
            .flatten()
            .map(|u| u.role)
    })
    .await
    .ok()
    .flatten()
}

/// Middleware: require valid access token
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match access_claims(&state, &request) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser(claims));
            next.run(request).await
        }
        Err(response) => response,
    }
}

/// Middleware: require an access token whose holder has `capability`.
///
/// The token's role claim is only a first filter; the decision is made on the
/// role stored in the database.
pub async fn require_capability(
    State((state, capability)): State<(Arc<AppState>, Capability)>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match access_claims(&state, &request) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    let claimed = parse_role(&claims.role);
    if !claimed.is_some_and(|role| has_capability(role, capability)) {
        return forbidden(capability);
    }

    // SECURITY: verify role from DB, not just JWT
    let allowed = current_role(&state, claims.sub)
        .await
        .is_some_and(|role| has_capability(role, capability));
    if !allowed {
        tracing::warn!(
            user_id = %claims.sub,
            capability = capability.as_str(),
            "capability denied"
        );
        return forbidden(capability);
    }

    request.extensions_mut().insert(AuthUser(claims));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{generate_access_token, generate_token};
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware as axum_mw,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            db: sea_orm::DatabaseConnection::Disconnected,
            jwt_secret: "test-middleware-secret".to_string(),
            report_page: "/admin/reports".to_string(),
        })
    }

    async fn ok_handler() -> &'static str {
        "OK"
    }

    fn auth_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/protected", get(ok_handler))
            .layer(axum_mw::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn reports_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/report", get(ok_handler))
            .layer(axum_mw::from_fn_with_state(
                (state.clone(), Capability::GenerateReports),
                require_capability,
            ))
            .with_state(state)
    }

    fn request(uri: &str, token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_require_auth_no_header() {
        let resp = auth_app(test_state())
            .oneshot(request("/protected", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_invalid_token() {
        let resp = auth_app(test_state())
            .oneshot(request("/protected", Some("invalid-token")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_valid_access_token() {
        let state = test_state();
        let token =
            generate_access_token(Uuid::new_v4(), "listener", "user", &state.jwt_secret).unwrap();

        let resp = auth_app(state)
            .oneshot(request("/protected", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_require_auth_refresh_token_rejected() {
        let state = test_state();
        let token = generate_token(
            Uuid::new_v4(),
            "listener",
            "user",
            TokenType::Refresh,
            &state.jwt_secret,
        )
        .unwrap();

        let resp = auth_app(state)
            .oneshot(request("/protected", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_no_bearer_prefix() {
        let req = HttpRequest::builder()
            .uri("/protected")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let resp = auth_app(test_state()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_capability_no_header() {
        let resp = reports_app(test_state())
            .oneshot(request("/report", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_capability_user_forbidden() {
        let state = test_state();
        let token =
            generate_access_token(Uuid::new_v4(), "listener", "user", &state.jwt_secret).unwrap();

        let resp = reports_app(state)
            .oneshot(request("/report", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_require_capability_moderator_cannot_generate_reports() {
        let state = test_state();
        let token =
            generate_access_token(Uuid::new_v4(), "mod", "moderator", &state.jwt_secret).unwrap();

        let resp = reports_app(state)
            .oneshot(request("/report", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_require_capability_admin_claim_rechecked_against_db() {
        // The Disconnected DB cannot confirm the role, so the claim alone is
        // not enough.
        let state = test_state();
        let token =
            generate_access_token(Uuid::new_v4(), "root", "admin", &state.jwt_secret).unwrap();

        let resp = reports_app(state)
            .oneshot(request("/report", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_require_capability_invalid_token() {
        let resp = reports_app(test_state())
            .oneshot(request("/report", Some("garbage")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
