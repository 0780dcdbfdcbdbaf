use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::infra::config::Config;

/// Claims carried by a bearer token from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    pub exp: u64,
}

/// Validate a bearer token against the configured key, issuer and
/// audience. Expiry is always enforced.
pub fn validate_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.auth_token_key.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    if let Some(issuer) = config.auth_issuer.as_deref() {
        validation.set_issuer(&[issuer]);
    }
    if let Some(audience) = config.auth_audience.as_deref() {
        validation.set_audience(&[audience]);
    }

    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}
