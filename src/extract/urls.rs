use url::Url;

/// Keys of a URL's query component, one entry per occurrence.
///
/// Unparseable URLs yield an empty list.
pub fn query_string_keys(url: &str) -> Vec<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Normalizes a `<script src>` value into an absolute URL.
///
/// Absolute sources pass through unchanged, root-relative sources get the
/// page origin prefixed, and anything else gets the origin plus a path
/// separator.
pub fn resolve_script_src(page: &Url, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }

    let origin = page.origin().ascii_serialization();
    if src.starts_with('/') {
        format!("{}{}", origin, src)
    } else {
        format!("{}/{}", origin, src)
    }
}
