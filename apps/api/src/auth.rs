//! Identity-provider token verification.
//!
//! Tokens carry the claims issued through `/internal/jwt-claims` at the top level, next to
//! the registered `exp`, `iss` and `aud` claims.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use userhub_core::{AppError, AppResult};
use userhub_domain::{CallerContext, IdentityClaims};

use crate::api_config::TokenKeyConfig;


/// Verifies bearer tokens and decodes their identity claims.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier for RS256 or HS256 tokens. Audience and issuer are checked only
    /// when configured.
    pub fn new(
        key: &TokenKeyConfig,
        audience: Option<&str>,
        issuer: Option<&str>,
    ) -> Result<Self, AppError> {
        let (key, algorithm) = match key {
            TokenKeyConfig::Rs256PublicKey(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|error| {
                    AppError::Validation(format!("invalid JWT_PUBLIC_KEY: {error}"))
                })?,
                Algorithm::RS256,
            ),
            TokenKeyConfig::Hs256Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    /// Checks signature and registered claims, then returns the identity claims.
    pub fn verify(&self, token: &str) -> AppResult<IdentityClaims> {
        decode::<IdentityClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| AppError::Unauthorized(format!("invalid bearer token: {error}")))
    }
}

/// Builds the request context. Tokens without a selected institution membership cannot call
/// institution-scoped routes.
pub fn caller_context(claims: &IdentityClaims) -> AppResult<CallerContext> {
    let (Some(institution), Some(user_id), Some(institution_user_id)) = (
        claims.selected_institution.as_ref(),
        claims.user_id,
        claims.institution_user_id,
    ) else {
        return Err(AppError::Unauthorized(
            "token has no selected institution".to_owned(),
        ));
    };

    Ok(CallerContext::new(
        institution.id,
        user_id,
        institution_user_id,
        claims.known_privileges(),
    ))
}

/// Compares shared secrets without stopping at the first differing byte.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    if presented.len() != expected.len() {
        return false;
    }

    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (left, right)| diff | (left ^ right))
        == 0
}
