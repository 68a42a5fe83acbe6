use anyhow::Result;
use std::env;

const DEFAULT_SESSION_TTL: u64 = 14 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Self::Strict,
            "none" => Self::None,
            _ => Self::Lax,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    /// Seconds a login stays valid.
    pub ttl: u64,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable must be set"))?;

        if secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "SESSION_SECRET must be at least 32 characters"
            ));
        }

        let ttl = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL);

        let same_site = SameSite::parse(
            &env::var("SESSION_COOKIE_SAMESITE").unwrap_or_else(|_| "Lax".to_string()),
        );

        // Browsers drop SameSite=None cookies that are not Secure.
        let cookie_secure =
            same_site == SameSite::None || super::parse_bool_env("SESSION_COOKIE_SECURE", false);

        Ok(Self {
            secret,
            ttl,
            cookie_secure,
            same_site,
        })
    }
}
