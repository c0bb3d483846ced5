use url::Url;

const TRACKING_PREFIXES: &[&str] = &["utm_", "mc_", "_hs"];
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "ref", "ref_src", "share_id", "context"];

/// Canonical form of a posting link, so the same thread reached through a share
/// link or a tracking redirect compares equal.
///
/// Returns `None` when `raw` is not an absolute URL.
pub fn canonical_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);

    // `Url` already drops a port equal to the scheme default.
    let host = url.host_str().map(|h| h.trim_start_matches("www.").to_string());
    if let Some(host) = host {
        url.set_host(Some(&host)).ok()?;
    }

    let mut kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        kept.sort();
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }

    Some(url.to_string())
}

/// Compare two links for tier-1 identity. Empty links never match.
pub fn same_url(a: &str, b: &str, normalize: bool) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    if !normalize {
        return false;
    }

    match (canonical_url(a), canonical_url(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&lower.as_str())
        || TRACKING_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}
