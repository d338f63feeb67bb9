//! URL normalization.
//!
//! Two URLs name the same page iff their normalized forms are equal. The
//! visited set, dedup, and the no-double-fetch guarantee all key on the
//! normalized form.

use url::Url;

/// Query parameters that carry tracking state, not identity.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "mc_cid", "mc_eid", "igshid", "ref_src",
];

/// Normalize a URL: lowercase the host, drop the fragment, trim the
/// trailing slash, and strip tracking query parameters (`utm_*` and the
/// usual click identifiers).
///
/// Unparseable input is returned trimmed but otherwise untouched so callers
/// can still use it as a map key.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut url = match Url::parse(trimmed) {
        Ok(u) => u,
        Err(_) => return trimmed.to_string(),
    };

    url.set_fragment(None);

    if let Some(host) = url.host_str().map(str::to_ascii_lowercase) {
        // set_host only fails for cannot-be-a-base URLs, which have no host
        let _ = url.set_host(Some(&host));
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &kept {
            serializer.append_pair(k, v);
        }
        let query = serializer.finish();
        url.set_query(Some(&query));
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    let mut out = url.to_string();
    if url.path() == "/" && url.query().is_none() && out.ends_with('/') {
        // bare host: https://example.com/ -> https://example.com
        out.pop();
    }
    out
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

/// Whether two raw URLs normalize to the same page.
pub fn same_page(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
