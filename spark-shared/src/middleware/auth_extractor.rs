use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthUser, Claims};

/// HS256 signing material. Built once from configuration and carried in the router
/// state.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::new(ErrorCode::TokenExpired, "token has expired")
            }
            _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
        })?;

        Ok(token_data.claims)
    }
}

/// Router states that can verify bearer tokens.
pub trait AuthState {
    fn jwt_keys(&self) -> &JwtKeys;
}

impl AuthState for JwtKeys {
    fn jwt_keys(&self) -> &JwtKeys {
        self
    }
}

impl<T: AuthState> AuthState for Arc<T> {
    fn jwt_keys(&self) -> &JwtKeys {
        (**self).jwt_keys()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: AuthState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state.jwt_keys().verify(&token)?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        Ok(AuthUser::from(claims))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "authorization header must use Bearer scheme"))
}

/// Optional auth extractor
pub struct OptionalAuthUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: AuthState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(_) => Ok(Self(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::types::auth::UserRole;

    const SECRET: &str = "test-secret";

    fn app() -> Router {
        async fn whoami(user: AuthUser) -> String {
            user.id.to_string()
        }

        async fn maybe(OptionalAuthUser(user): OptionalAuthUser) -> String {
            user.map(|u| u.id.to_string()).unwrap_or_else(|| "anonymous".into())
        }

        Router::new()
            .route("/whoami", get(whoami))
            .route("/maybe", get(maybe))
            .with_state(JwtKeys::from_secret(SECRET))
    }

    async fn call(uri: &str, auth: Option<String>) -> (StatusCode, String) {
        let mut req = Request::builder().uri(uri);
        if let Some(value) = auth {
            req = req.header("Authorization", value);
        }
        let response = app().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let keys = JwtKeys::from_secret(SECRET);
        let token = keys.issue(&Claims::new(12, UserRole::User, 600)).unwrap();

        let (status, body) = call("/whoami", Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "12");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (status, body) = call("/whoami", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("E0004"));
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let (status, _) = call("/whoami", Some("Basic abc".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_invalid() {
        let token = JwtKeys::from_secret("other-secret")
            .issue(&Claims::new(12, UserRole::User, 600))
            .unwrap();

        let (status, body) = call("/whoami", Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("E1005"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(SECRET);
        let token = keys.issue(&Claims::new(12, UserRole::User, -3600)).unwrap();

        let (status, body) = call("/whoami", Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("E1004"));
    }

    #[tokio::test]
    async fn optional_auth_falls_back_to_anonymous() {
        let (status, body) = call("/maybe", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }
}
