use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<script[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());

/// Extensions that mark a `<script src>` as a fetchable script file.
const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".mjs"];

/// Values of a given HTML attribute (`name` or `id`) across the markup.
///
/// The quote class accepts `"`, `'`, and `|`, so pipe-delimited values
/// match too.
pub fn attribute_values(body: &str, attribute: &str) -> Vec<String> {
    let pattern = format!(r#"{}\s*=\s*["|']([\w\-]+)["|']"#, regex::escape(attribute));
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(_) => return Vec::new(),
    };

    regex
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Raw `<script src>` values that point at a script file.
///
/// Sources are returned as written in the markup; callers resolve them
/// against the page origin.
pub fn script_sources(body: &str) -> Vec<String> {
    SCRIPT_SRC
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|src| is_script_file(src))
        .collect()
}

fn is_script_file(src: &str) -> bool {
    let path = src
        .split(['?', '#'])
        .next()
        .unwrap_or(src)
        .to_lowercase();
    SCRIPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
