//! Auth cookie construction.
//!
//! The session token rides in the `at` cookie. The gateway builds Set-Cookie
//! values by hand so the attributes match across set and clear: same path,
//! same domain, same flags. Reading uses the cookie jar in `graphql_routes`.

/// Name of the auth cookie.
pub const AUTH_COOKIE: &str = "at";

/// Fallback lifetime when the token carries no usable expiration.
pub const DEFAULT_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Domain attribute for the auth cookie: the request host without the port,
/// with the leading label stripped so the cookie is shared across
/// subdomains. Hosts with fewer than three labels are used as-is.
#[must_use]
pub fn cookie_domain(host: &str) -> String {
    let host = if let Some(rest) = host.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    if host.parse::<std::net::IpAddr>().is_ok() {
        return host.to_string();
    }
    match host.split_once('.') {
        Some((_, rest)) if rest.contains('.') => rest.to_string(),
        _ => host.to_string(),
    }
}

/// Set-Cookie value installing the session token. `max_age` runs to the
/// token expiration, or [`DEFAULT_MAX_AGE_SECS`] when the expiration is
/// absent or already past.
#[must_use]
pub fn set_auth_cookie(
    host: &str,
    token: &str,
    expiration_epoch: u64,
    now_epoch: u64,
    dev_mode: bool,
) -> String {
    let max_age = if expiration_epoch > now_epoch {
        expiration_epoch - now_epoch
    } else {
        DEFAULT_MAX_AGE_SECS
    };
    attributes(host, token, max_age, dev_mode)
}

/// Set-Cookie value deleting the session cookie.
#[must_use]
pub fn clear_auth_cookie(host: &str, dev_mode: bool) -> String {
    attributes(host, "", 0, dev_mode)
}

fn attributes(host: &str, token: &str, max_age: u64, dev_mode: bool) -> String {
    let mut value = format!(
        "{AUTH_COOKIE}={token}; Path=/; Domain={}; Max-Age={max_age}; HttpOnly",
        cookie_domain(host)
    );
    if !dev_mode {
        value.push_str("; Secure");
    }
    value
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn domain_strips_port_and_leading_label() {
        assert_eq!(cookie_domain("app.meridian.example:8443"), "meridian.example");
        assert_eq!(cookie_domain("app.meridian.example"), "meridian.example");
    }

    #[test]
    fn domain_keeps_short_hosts() {
        assert_eq!(cookie_domain("meridian.example"), "meridian.example");
        assert_eq!(cookie_domain("localhost:8080"), "localhost");
    }

    #[test]
    fn domain_keeps_ip_addresses_whole() {
        assert_eq!(cookie_domain("10.0.0.7:8080"), "10.0.0.7");
        assert_eq!(cookie_domain("[::1]:8080"), "::1");
    }

    #[test]
    fn set_cookie_uses_token_expiration() {
        let value = set_auth_cookie("app.meridian.example", "tok", 1_000_060, 1_000_000, false);
        assert_eq!(
            value,
            "at=tok; Path=/; Domain=meridian.example; Max-Age=60; HttpOnly; Secure"
        );
    }

    #[test]
    fn set_cookie_defaults_when_expiration_passed() {
        let value = set_auth_cookie("app.meridian.example", "tok", 10, 1_000_000, true);
        assert!(value.contains(&format!("Max-Age={DEFAULT_MAX_AGE_SECS}")));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn clear_cookie_empties_value_and_max_age() {
        let value = clear_auth_cookie("app.meridian.example", false);
        assert_eq!(
            value,
            "at=; Path=/; Domain=meridian.example; Max-Age=0; HttpOnly; Secure"
        );
    }
}
