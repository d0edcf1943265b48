use axum::{Json, extract::FromRequestParts, http::StatusCode, http::request::Parts};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::{
    errors::{AppError, ErrorBody},
    models::{Identity, user::Claims},
    state::AppState,
};

/// The caller behind a verified bearer token.
pub struct AuthIdentity(pub Identity);

impl FromRequestParts<AppState> for AuthIdentity {
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized("Missing or invalid Authorization header".into())
                        .to_response()
                })?;

        let AuthIdentity(claimed) =
            AuthIdentity::from_token(bearer.token(), &state.jwt_secret).map_err(|e| e.to_response())?;

        // The stored role wins over the one in the token.
        let user = state
            .directory
            .user(claimed.id)
            .await
            .map_err(|e| {
                tracing::error!("Error resolving token subject {}: {}", claimed.id, e);
                e.to_response()
            })?
            .ok_or_else(|| {
                tracing::warn!("Token subject {} no longer exists", claimed.id);
                AppError::Unauthorized("Invalid token".into()).to_response()
            })?;

        Ok(AuthIdentity(user.identity()))
    }
}

impl AuthIdentity {
    pub fn from_token(token: &str, secret: &str) -> Result<Self, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let id = token_data
            .claims
            .sub
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::Unauthorized("Invalid token subject".into()))?;

        Ok(Self(Identity::new(id, token_data.claims.role)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;
    use crate::models::Role;

    fn token(sub: &str, role: Role, secret: &str) -> String {
        let claims = Claims {
            sub: sub.into(),
            role,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_identity() {
        let AuthIdentity(identity) =
            AuthIdentity::from_token(&token("42", Role::StoreOwner, "k"), "k").unwrap();

        assert_eq!(identity, Identity::new(42, Role::StoreOwner));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let err = AuthIdentity::from_token(&token("42", Role::User, "k"), "other").err();
        assert!(matches!(err, Some(AppError::Unauthorized(_))));
    }

    #[test]
    fn non_numeric_subject_is_unauthorized() {
        let err = AuthIdentity::from_token(&token("abc", Role::User, "k"), "k").err();
        assert!(matches!(err, Some(AppError::Unauthorized(_))));
    }
}
