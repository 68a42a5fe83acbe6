use crate::config::session::SessionConfig;
use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static SESSION_CONFIG: OnceLock<SessionConfig> = OnceLock::new();

/// Install the session config. Must be called once at startup.
pub fn init_session_config(config: SessionConfig) -> Result<()> {
    SESSION_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Session config already initialized"))?;
    Ok(())
}

pub(crate) fn session_config() -> Result<&'static SessionConfig> {
    SESSION_CONFIG.get().ok_or_else(|| {
        anyhow::anyhow!("Session config not initialized, call init_session_config() at startup")
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: usize,
    pub iat: usize,
}

/// Sign a session token that names `user_id` as the logged-in user.
pub fn encode_session_token(user_id: i32) -> Result<String> {
    let config = session_config()?;
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + config.ttl as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))
}

/// Verify a session token and return the user id it carries.
pub fn decode_session_token(token: &str) -> crate::error::AppResult<i32> {
    let config = session_config()?;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?
    .claims;

    claims
        .sub
        .parse()
        .map_err(|_| crate::error::AppError::Unauthorized)
}
