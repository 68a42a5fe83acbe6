use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Limits per route group: login/logout, public reads, and catalog writes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub session: RateLimitRule,
    pub read: RateLimitRule,
    pub write: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session: RateLimitRule::new(5, 10),
            read: RateLimitRule::new(30, 60),
            write: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = super::parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            match cfg.apply(&raw) {
                Ok(updated) => cfg = updated,
                Err(err) => tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err),
            }
        }

        cfg
    }

    /// Accepts `per:burst` for every group or `session=5:10,read=30:60,write=10:20`.
    fn apply(mut self, raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty value".to_string());
        }

        if !trimmed.contains('=') {
            let rule = parse_rule(trimmed)?;
            self.session = rule;
            self.read = rule;
            self.write = rule;
            return Ok(self);
        }

        for item in trimmed.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (group, raw_rule) = item
                .split_once('=')
                .ok_or_else(|| format!("invalid item '{}', expected group=per:burst", item))?;
            let rule = parse_rule(raw_rule.trim())?;
            match group.trim().to_ascii_lowercase().as_str() {
                "session" | "login" => self.session = rule,
                "read" | "public" => self.read = rule,
                "write" => self.write = rule,
                other => {
                    return Err(format!(
                        "unknown group '{}', expected session/read/write",
                        other
                    ))
                }
            }
        }

        Ok(self)
    }
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 || burst_size == 0 {
        return Err("per_second and burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}
