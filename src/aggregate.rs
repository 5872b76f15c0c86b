//! Merging heuristic output into one parameter set.
//!
//! [`collect`] runs every extraction heuristic over a resource in a fixed
//! order and returns the raw candidate sequence; callers merge it into a
//! [`ParamSet`](crate::model::ParamSet), which handles deduplication. The
//! page body and each fetched linked script go through their own `collect`
//! pass against the same accumulating set.

use url::Url;

use crate::extract;

/// What kind of text a resource is, deciding whether the HTML attribute
/// heuristics apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Html,
    Script,
}

impl ResourceKind {
    /// Classifies a resource from its `Content-Type` header value.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.contains("javascript") {
            ResourceKind::Script
        } else {
            ResourceKind::Html
        }
    }
}

/// Runs all heuristics over one resource in the fixed order: URL query
/// keys, then the body heuristics, then `name`/`id` attribute values for
/// non-script resources. Empty candidates are dropped; duplicates are
/// kept for the caller's set to collapse.
pub fn collect(page_url: Option<&Url>, body: &str, kind: ResourceKind) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(url) = page_url {
        candidates.extend(extract::query_string_keys(url.as_str()));
    }

    candidates.extend(extract::variable_names(body));
    candidates.extend(extract::json_keys(body));
    candidates.extend(extract::template_variables(body));
    candidates.extend(extract::function_parameters(body));
    candidates.extend(extract::path_parameters(body));
    candidates.extend(extract::inline_query_keys(body));

    if kind != ResourceKind::Script {
        candidates.extend(extract::attribute_values(body, "name"));
        candidates.extend(extract::attribute_values(body, "id"));
    }

    candidates.retain(|candidate| !candidate.is_empty());
    candidates
}

/// Absolute URLs of the page's fetchable linked scripts.
pub fn linked_scripts(page_url: &Url, body: &str) -> Vec<String> {
    extract::script_sources(body)
        .iter()
        .map(|src| extract::resolve_script_src(page_url, src))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamSet;

    #[test]
    fn test_collect_url_keys_come_first() {
        let url = Url::parse("https://x.test/?zeta=1").unwrap();
        let body = "<script>let alpha = 1;</script>";
        let candidates = collect(Some(&url), body, ResourceKind::Html);
        assert_eq!(candidates[0], "zeta");
        assert!(candidates.contains(&"alpha".to_string()));
    }

    #[test]
    fn test_collect_skips_attributes_for_scripts() {
        let body = r#"name="field" let x = 1;"#;
        let html = collect(None, body, ResourceKind::Html);
        let script = collect(None, body, ResourceKind::Script);

        assert!(html.contains(&"field".to_string()));
        assert!(!script.contains(&"field".to_string()));
        assert!(script.contains(&"x".to_string()));
    }

    #[test]
    fn test_resource_kind_from_content_type() {
        assert_eq!(
            ResourceKind::from_content_type("application/javascript; charset=utf-8"),
            ResourceKind::Script
        );
        assert_eq!(
            ResourceKind::from_content_type("text/javascript"),
            ResourceKind::Script
        );
        assert_eq!(
            ResourceKind::from_content_type("text/html; charset=utf-8"),
            ResourceKind::Html
        );
    }

    #[test]
    fn test_cross_heuristic_duplicate_collapses_to_first_position() {
        // "token" appears as a JSON key first and an id attribute later.
        let body = r#"{"token": 1} <input id="token"> <input id="other">"#;
        let mut set = ParamSet::new();
        set.extend(collect(None, body, ResourceKind::Html));

        let names = set.to_vec();
        let token_pos = names.iter().position(|n| n == "token").unwrap();
        let other_pos = names.iter().position(|n| n == "other").unwrap();
        assert!(token_pos < other_pos);
        assert_eq!(names.iter().filter(|n| *n == "token").count(), 1);
    }

    #[test]
    fn test_linked_scripts_resolved() {
        let url = Url::parse("https://x.test/page").unwrap();
        let body = r#"<script src="/a.js"></script><script src="b.js"></script>"#;
        assert_eq!(
            linked_scripts(&url, body),
            vec!["https://x.test/a.js", "https://x.test/b.js"]
        );
    }
}
