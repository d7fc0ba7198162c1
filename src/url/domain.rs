use url::Url;

/// Extracts the lowercase host from a URL
///
/// The port is not part of the result, so `http://127.0.0.1:8080/` yields
/// `127.0.0.1`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use appimage_ripple::url::extract_domain;
///
/// let url = Url::parse("https://GitHub.com/owner/repo").unwrap();
/// assert_eq!(extract_domain(&url), Some("github.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_ascii_lowercase())
}

/// Checks a host against an artifact-host pattern
///
/// `github.com` matches only `github.com`; `*.github.com` matches the bare
/// domain and any subdomain of it. Both sides are compared case-insensitively.
pub fn host_matches(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let host = host.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}

/// Returns true if `host` matches any of the given patterns
pub fn host_matches_any<S: AsRef<str>>(patterns: &[S], host: &str) -> bool {
    patterns.iter().any(|p| host_matches(p.as_ref(), host))
}
