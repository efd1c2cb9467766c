/// URL classification: canonical keys, priority ranks and domain matching
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Matches a scheme followed by one or more `www.` labels
static LEADING_WWW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z][a-z0-9+.\-]*://)(?:www\.)+").expect("static regex")
});

const FILE_SCHEME: &str = "file://";

/// Compute the key used to decide whether two tabs show the same page
///
/// Algorithm:
/// 1. Lowercase the whole URL
/// 2. Drop `www.` directly after the scheme
/// 3. Strip every trailing `/`
///
/// The scheme is kept, so `http://x.com` and `https://x.com` stay distinct.
/// An empty URL canonicalizes to "".
///
/// Examples:
/// - https://www.GitHub.com/ → https://github.com
/// - http://x.com/path// → http://x.com/path
pub fn canonicalize(url: &str) -> String {
    let lowered = url.to_lowercase();
    let without_www = LEADING_WWW.replace(&lowered, "$1");
    without_www.trim_end_matches('/').to_string()
}

/// Position of the first priority entry contained in the URL
///
/// This is a plain substring scan over the lowercased URL, so an entry can
/// match anywhere (including the path). Returns None for blank URLs.
pub fn mega_priority_rank<S: AsRef<str>>(url: &str, priority: &[S]) -> Option<usize> {
    if url.is_empty() {
        return None;
    }

    let lowered = url.to_lowercase();
    priority
        .iter()
        .map(|entry| entry.as_ref())
        .position(|entry| !entry.is_empty() && lowered.contains(&entry.to_lowercase()))
}

pub fn is_file_url(url: &str) -> bool {
    url.to_lowercase().starts_with(FILE_SCHEME)
}

/// Hostname of a URL without a leading `www.`
///
/// Returns None for blank or unparsable URLs and for URLs without a host
/// (file://, about:blank).
pub fn domain_of(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// True if the URL's domain equals one of `domains` or is a subdomain of one
///
/// Unlike the priority scan this never matches on a bare substring:
/// `netflixplus.com` is not a match for `netflix.com`.
pub fn matches_domain<S: AsRef<str>>(url: &str, domains: &[S]) -> bool {
    if domains.is_empty() {
        return false;
    }

    let Some(domain) = domain_of(url) else {
        return false;
    };

    domains.iter().any(|entry| {
        let entry = entry.as_ref().trim().to_lowercase();
        !entry.is_empty()
            && (domain == entry
                || domain
                    .strip_suffix(entry.as_str())
                    .is_some_and(|rest| rest.ends_with('.')))
    })
}

pub fn is_entertainment<S: AsRef<str>>(url: &str, domains: &[S]) -> bool {
    matches_domain(url, domains)
}
