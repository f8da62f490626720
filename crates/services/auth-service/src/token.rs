//! Token service - issues and validates signed session and refresh tokens.
//!
//! Tokens are compact HS256 JWTs. Nothing is stored server-side: a token is
//! valid exactly when its signature checks out and it has not yet expired.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use common::{AppError, AppResult, JwtConfig, TokenError};
use domain::{AccountRole, REFRESH_TOKEN_HOURS, REFRESH_TOKEN_TYPE, SESSION_TOKEN_HOURS};

/// Session token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account ID
    pub sub: i32,
    pub email: String,
    pub username: String,
    pub role: AccountRole,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Refresh token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Account ID
    pub sub: i32,
    /// Always `"refresh"`
    #[serde(rename = "type")]
    pub token_type: String,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Signs and verifies tokens with one process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default lifetimes (24h session, 7d refresh).
    pub fn new(config: &JwtConfig) -> Self {
        // Only HS256 is accepted; a token declaring any other algorithm is rejected
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_bytes()),
            validation,
            session_ttl: Duration::hours(SESSION_TOKEN_HOURS),
            refresh_ttl: Duration::hours(REFRESH_TOKEN_HOURS),
        }
    }

    /// Override token lifetimes.
    pub fn with_ttl(mut self, session_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Issue a session token carrying the account's identity claims.
    pub fn issue_session(
        &self,
        account_id: i32,
        email: &str,
        username: &str,
        role: AccountRole,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: account_id,
            email: email.to_string(),
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };

        self.sign(&claims)
    }

    /// Issue a long-lived refresh token for the account.
    pub fn issue_refresh(&self, account_id: i32) -> AppResult<String> {
        let claims = RefreshClaims {
            sub: account_id,
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            exp: (Utc::now() + self.refresh_ttl).timestamp(),
        };

        self.sign(&claims)
    }

    /// Validate a session token and return its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims: SessionClaims = self.verify(token)?;
        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = self.verify(token)?;
        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(TokenError::Malformed);
        }
        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Token signing failed: {}", e)))
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        if decode_header(token).is_err() {
            return Err(Self::unreadable_header(token));
        }
        let data = decode::<T>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    // jsonwebtoken cannot parse algorithms it does not implement ("none" among
    // them), so read `alg` from the raw header to tell those apart from garbage.
    fn unreadable_header(token: &str) -> TokenError {
        let segment = token.split('.').next().unwrap_or_default();
        let alg = URL_SAFE_NO_PAD
            .decode(segment.trim_end_matches('='))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
            .and_then(|header| header.get("alg")?.as_str().map(str::to_owned));

        match alg {
            Some(alg) if alg != "HS256" => TokenError::WrongAlgorithm,
            _ => TokenError::Malformed,
        }
    }

    // A token is dead at its expiry second, not one second after
    fn check_expiry(exp: i64) -> Result<(), TokenError> {
        if exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}
