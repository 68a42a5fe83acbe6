use crate::config::session::SessionConfig;
use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE: &str = "session";

fn with_attributes(mut cookie: String, config: &SessionConfig) -> String {
    cookie.push_str("; HttpOnly; SameSite=");
    cookie.push_str(config.same_site.as_str());
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_session_cookie(config: &SessionConfig, token: &str) -> String {
    with_attributes(
        format!("{SESSION_COOKIE}={token}; Path=/; Max-Age={}", config.ttl),
        config,
    )
}

pub fn build_clear_cookie(config: &SessionConfig) -> String {
    with_attributes(
        format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"),
        config,
    )
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie_header| {
            cookie_header.split(';').find_map(|cookie| {
                let (key, value) = cookie.trim().split_once('=')?;
                (key.trim() == name && !value.trim().is_empty())
                    .then(|| value.trim().to_string())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::session::SameSite;
    use axum::http::HeaderValue;

    fn config(same_site: SameSite, secure: bool) -> SessionConfig {
        SessionConfig {
            secret: "x".repeat(32),
            ttl: 60,
            cookie_secure: secure,
            same_site,
        }
    }

    #[test]
    fn session_cookie_has_max_age_and_flags() {
        let cookie = build_session_cookie(&config(SameSite::Lax, false), "abc");
        assert_eq!(cookie, "session=abc; Path=/; Max-Age=60; HttpOnly; SameSite=Lax");
    }

    #[test]
    fn secure_flag_is_appended() {
        let cookie = build_clear_cookie(&config(SameSite::None, true));
        assert!(cookie.starts_with("session=; Path=/; Max-Age=0"));
        assert!(cookie.ends_with("SameSite=None; Secure"));
    }

    #[test]
    fn extracts_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok123; lang=en"),
        );
        assert_eq!(
            extract_cookie(&headers, SESSION_COOKIE),
            Some("tok123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn cleared_cookie_value_is_treated_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(extract_cookie(&headers, SESSION_COOKIE), None);
    }
}
