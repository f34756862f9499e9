//! Video URL and title validation.
//!
//! URLs are untrusted input. Only allowlisted YouTube hosts over https are
//! accepted, literal private-range IPv4 hosts are rejected outright, and the
//! video id is strictly character-checked before the URL is normalized to
//! the canonical watch form.

use std::net::Ipv4Addr;

use thiserror::Error;
use url::Url;

/// Hosts accepted by default.
pub const DEFAULT_ALLOWED_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "youtu.be",
];

/// Validation failure; all variants map to `INVALID_REQUEST` at the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlValidationError {
    #[error("URL could not be parsed")]
    Unparseable,

    #[error("scheme '{0}' is not allowed")]
    SchemeNotAllowed(String),

    #[error("host '{0}' is not on the allowlist")]
    HostNotAllowed(String),

    #[error("host resolves to a private address range")]
    PrivateAddress,

    #[error("URL does not contain a video id")]
    MissingVideoId,

    #[error("video id contains invalid characters")]
    InvalidVideoId,
}

/// Allowlist policy applied to incoming URLs.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_hosts: Vec<String>,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self {
            allowed_hosts: DEFAULT_ALLOWED_HOSTS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

impl UrlPolicy {
    /// Policy with an overridden host allowlist (lowercased on entry).
    pub fn with_hosts(hosts: impl IntoIterator<Item = String>) -> Self {
        Self {
            allowed_hosts: hosts
                .into_iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    fn host_allowed(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|h| h == &host)
    }
}

/// Validate a raw URL and normalize it to the canonical watch form.
///
/// Returns `https://www.youtube.com/watch?v={id}` on success.
pub fn normalize_video_url(raw: &str, policy: &UrlPolicy) -> Result<String, UrlValidationError> {
    let parsed = Url::parse(raw.trim()).map_err(|_| UrlValidationError::Unparseable)?;

    if parsed.scheme() != "https" {
        return Err(UrlValidationError::SchemeNotAllowed(
            parsed.scheme().to_string(),
        ));
    }

    let host = parsed
        .host_str()
        .ok_or(UrlValidationError::Unparseable)?
        .to_ascii_lowercase();

    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        if is_private_ipv4(addr) {
            return Err(UrlValidationError::PrivateAddress);
        }
    }

    if !policy.host_allowed(&host) {
        return Err(UrlValidationError::HostNotAllowed(host));
    }

    let video_id = extract_video_id(&parsed, &host)?;
    Ok(format!("https://www.youtube.com/watch?v={}", video_id))
}

/// Loopback and RFC 1918 ranges.
fn is_private_ipv4(addr: Ipv4Addr) -> bool {
    let octets = addr.octets();
    addr.is_loopback()
        || octets[0] == 10
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168)
}

/// Pull the video id out of the recognized URL shapes.
fn extract_video_id(url: &Url, host: &str) -> Result<String, UrlValidationError> {
    let path = url.path();

    // youtu.be/{id}
    if host == "youtu.be" {
        let id = path.trim_start_matches('/');
        return check_video_id(id);
    }

    // /watch?v={id}
    if path == "/watch" {
        let id = url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .ok_or(UrlValidationError::MissingVideoId)?;
        return check_video_id(&id);
    }

    // /shorts/{id}, /embed/{id}, /v/{id}
    for prefix in ["/shorts/", "/embed/", "/v/"] {
        if let Some(rest) = path.strip_prefix(prefix) {
            let id = rest.split('/').next().unwrap_or_default();
            return check_video_id(id);
        }
    }

    Err(UrlValidationError::MissingVideoId)
}

fn check_video_id(id: &str) -> Result<String, UrlValidationError> {
    if id.is_empty() {
        return Err(UrlValidationError::MissingVideoId);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(UrlValidationError::InvalidVideoId);
    }
    Ok(id.to_string())
}

/// Validate a client-supplied title: 1-120 characters, no angle-bracketed
/// substrings (crude HTML rejection).
pub fn validate_title(title: &str) -> Result<(), UrlValidationError> {
    let len = title.chars().count();
    if len == 0 || len > 120 {
        return Err(UrlValidationError::Unparseable);
    }
    let mut rest = title;
    while let Some(open) = rest.find('<') {
        if rest[open..].contains('>') {
            return Err(UrlValidationError::Unparseable);
        }
        rest = &rest[open + 1..];
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> Result<String, UrlValidationError> {
        normalize_video_url(raw, &UrlPolicy::default())
    }

    const CANONICAL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_standard_watch_url() {
        assert_eq!(normalize("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_bare_host_watch_url() {
        assert_eq!(normalize("https://youtube.com/watch?v=dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_mobile_url() {
        assert_eq!(normalize("https://m.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_short_link() {
        assert_eq!(normalize("https://youtu.be/dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_short_link_with_timestamp() {
        assert_eq!(normalize("https://youtu.be/dQw4w9WgXcQ?t=30").unwrap(), CANONICAL);
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(normalize("https://www.youtube.com/shorts/dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(normalize("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_normalization_drops_extra_params() {
        assert_eq!(
            normalize("https://www.youtube.com/watch?v=dQw4w9WgXcQ&feature=share&si=abc123").unwrap(),
            CANONICAL
        );
    }

    #[test]
    fn test_case_insensitive_host() {
        assert_eq!(normalize("https://YOUTUBE.COM/watch?v=dQw4w9WgXcQ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_leading_whitespace_tolerated() {
        assert_eq!(normalize("  https://youtu.be/dQw4w9WgXcQ  ").unwrap(), CANONICAL);
    }

    #[test]
    fn test_rejects_http_scheme() {
        assert_eq!(
            normalize("http://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Err(UrlValidationError::SchemeNotAllowed("http".to_string()))
        );
    }

    #[test]
    fn test_rejects_non_youtube_host() {
        assert!(matches!(
            normalize("https://example.com/watch?v=dQw4w9WgXcQ"),
            Err(UrlValidationError::HostNotAllowed(_))
        ));
    }

    #[test]
    fn test_rejects_lookalike_host() {
        assert!(matches!(
            normalize("https://evil-youtube.com/watch?v=dQw4w9WgXcQ"),
            Err(UrlValidationError::HostNotAllowed(_))
        ));
    }

    #[test]
    fn test_rejects_embedded_redirect() {
        assert!(matches!(
            normalize("https://example.com/redirect?target=https://youtube.com/watch?v=dQw4w9WgXcQ"),
            Err(UrlValidationError::HostNotAllowed(_))
        ));
    }

    #[test]
    fn test_rejects_loopback_literal() {
        assert_eq!(
            normalize("https://127.0.0.1/watch?v=abc"),
            Err(UrlValidationError::PrivateAddress)
        );
    }

    #[test]
    fn test_rejects_private_ranges() {
        for url in [
            "https://10.1.2.3/watch?v=abc",
            "https://172.16.0.1/watch?v=abc",
            "https://172.31.255.255/watch?v=abc",
            "https://192.168.1.1/watch?v=abc",
        ] {
            assert_eq!(normalize(url), Err(UrlValidationError::PrivateAddress), "{}", url);
        }
    }

    #[test]
    fn test_public_ip_rejected_by_allowlist_not_ssrf_guard() {
        assert!(matches!(
            normalize("https://172.32.0.1/watch?v=abc"),
            Err(UrlValidationError::HostNotAllowed(_))
        ));
    }

    #[test]
    fn test_rejects_missing_video_id() {
        assert_eq!(
            normalize("https://www.youtube.com/watch"),
            Err(UrlValidationError::MissingVideoId)
        );
        assert_eq!(
            normalize("https://youtu.be/"),
            Err(UrlValidationError::MissingVideoId)
        );
    }

    #[test]
    fn test_rejects_bad_video_id_chars() {
        assert_eq!(
            normalize("https://www.youtube.com/watch?v=abc!!xyz"),
            Err(UrlValidationError::InvalidVideoId)
        );
    }

    #[test]
    fn test_rejects_channel_url() {
        assert_eq!(
            normalize("https://www.youtube.com/@SomeChannel"),
            Err(UrlValidationError::MissingVideoId)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(normalize("not a url"), Err(UrlValidationError::Unparseable));
    }

    #[test]
    fn test_custom_allowlist() {
        let policy = UrlPolicy::with_hosts(vec!["video.internal".to_string()]);
        assert!(normalize_video_url("https://video.internal/watch?v=abc123", &policy).is_ok());
        assert!(normalize_video_url("https://www.youtube.com/watch?v=abc123", &policy).is_err());
    }

    #[test]
    fn test_title_bounds() {
        assert!(validate_title("A reasonable title").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(121)).is_err());
        assert!(validate_title(&"x".repeat(120)).is_ok());
    }

    #[test]
    fn test_title_rejects_markup() {
        assert!(validate_title("hello <script>alert(1)</script>").is_err());
        assert!(validate_title("a <b> c").is_err());
        // Lone brackets without a closing pair pass the crude check.
        assert!(validate_title("5 < 10 is true").is_ok());
        assert!(validate_title("math: a > b").is_ok());
    }
}
