/// RS256 bearer-token handling for the blog backend
///
/// The auth backend signs access tokens with its private key; the blog service
/// only ever sees the public half. Keys are held by value in [`JwtValidator`]
/// and [`JwtIssuer`] so each caller decides where they live (actix app data,
/// test fixtures) instead of sharing process-wide state.
///
/// ## Security Design
///
/// - **RS256 ONLY**: symmetric algorithms are rejected to prevent confusion attacks
/// - **No hardcoded keys**: PEM material comes from configuration
/// - **Expiry is always checked**
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;

/// JWT algorithm accepted by every validator
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Email address, when the issuer includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// Parse the subject as a user id
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

/// Verifies access tokens with the auth backend's public key
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Build a validator from an RSA public key in PEM format
    pub fn from_rsa_pem(public_key_pem: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.validate_aud = false;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Validate signature and expiry, returning the decoded claims
    ///
    /// `token` is the raw JWT without the `Bearer ` prefix.
    pub fn validate(&self, token: &str) -> Result<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }
}

/// Mints access tokens. Production traffic gets its tokens from the auth
/// backend; this is for tests and local tooling.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
}

impl JwtIssuer {
    /// Build an issuer from an RSA private key in PEM format
    pub fn from_rsa_pem(private_key_pem: &str) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA private key: {e}"))?;
        Ok(Self { encoding_key })
    }

    /// Generate an access token valid for one hour
    pub fn access_token(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        self.token_with_expiry(user_id, email, now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS))
    }

    /// Generate a token with an explicit expiry
    pub fn token_with_expiry(
        &self,
        user_id: Uuid,
        email: &str,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            email: Some(email.to_string()),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to generate access token: {e}"))
    }
}
