use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::repo::User, error::ApiError, state::AppState};

/// Fixed session lifetime. There is no refresh flow and no server-side
/// revocation; a token simply stops working 24 hours after issue.
const TOKEN_TTL: TimeDuration = TimeDuration::hours(24);

/// Identity claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 signing and verification keys derived from the server secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_secret(&state.config.jwt.secret)
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user: &User) -> Result<String, ApiError> {
        self.sign_with_ttl(user, TOKEN_TTL)
    }

    fn sign_with_ttl(&self, user: &User, ttl: TimeDuration) -> Result<String, ApiError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(e.into()))?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        // No grace period: a token is invalid the second it expires.
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, "jwt verified");
                Ok(data.claims)
            }
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(ApiError::TokenExpired),
                _ => Err(ApiError::InvalidToken),
            },
        }
    }
}

/// Request gate: extracts `Authorization: Bearer <token>`, verifies it and
/// hands the claims to the handler. Never touches the store.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::MissingToken)?;

        let token = header.strip_prefix("Bearer ").ok_or(ApiError::MissingToken)?;

        let claims = JwtKeys::from_ref(state).verify(token)?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "u1".into(),
            email: "u1@x.com".into(),
            password_hash: "hash".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::from_secret("test-secret")
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let user = test_user();
        let token = keys().sign(&user).expect("sign");
        let claims = keys().verify(&token).expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "u1@x.com");
        assert_eq!(claims.username, "u1");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let token = keys()
            .sign_with_ttl(&test_user(), TimeDuration::seconds(-90))
            .expect("sign");
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let token = keys().sign(&test_user()).expect("sign");
        let mut chars: Vec<char> = token.chars().collect();
        let last = *chars.last().unwrap();
        *chars.last_mut().unwrap() = if last == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        let err = keys().verify(&tampered).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let token = keys().sign(&test_user()).expect("sign");
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(parts.len(), 3);
        let first = parts[1].chars().next().unwrap();
        let flipped = if first == 'A' { 'B' } else { 'A' };
        parts[1].replace_range(0..1, &flipped.to_string());

        let err = keys().verify(&parts.join(".")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = keys().sign(&test_user()).expect("sign");
        let err = JwtKeys::from_secret("other-secret")
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn verify_rejects_garbage() {
        let err = keys().verify("not-a-jwt").unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    mod gate {
        use super::*;
        use axum::http::Request;

        async fn run_gate(auth_header: Option<String>) -> Result<AuthUser, ApiError> {
            let state = AppState::fake();
            let mut builder = Request::builder().uri("/api/search");
            if let Some(value) = auth_header {
                builder = builder.header(axum::http::header::AUTHORIZATION, value);
            }
            let (mut parts, _) = builder.body(()).unwrap().into_parts();
            AuthUser::from_request_parts(&mut parts, &state).await
        }

        #[tokio::test]
        async fn rejects_missing_header() {
            let err = run_gate(None).await.unwrap_err();
            assert!(matches!(err, ApiError::MissingToken));
        }

        #[tokio::test]
        async fn rejects_non_bearer_scheme() {
            let err = run_gate(Some("Basic dXNlcg==".into())).await.unwrap_err();
            assert!(matches!(err, ApiError::MissingToken));
        }

        #[tokio::test]
        async fn rejects_tampered_token() {
            let err = run_gate(Some("Bearer not.a.token".into())).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidToken));
        }

        #[tokio::test]
        async fn passes_claims_through_on_valid_token() {
            let state = AppState::fake();
            let user = test_user();
            let token = JwtKeys::from_ref(&state).sign(&user).expect("sign");

            let AuthUser(claims) = run_gate(Some(format!("Bearer {token}")))
                .await
                .expect("gate should pass");
            assert_eq!(claims.sub, user.id);
            assert_eq!(claims.username, user.username);
        }
    }
}
