use regex::Regex;
use std::sync::LazyLock;

static VARIABLE_DECLARATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(let|const|var)\s+([\w\s,]+)").unwrap());

static JSON_OBJECT_KEYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([\w\-]+)["']\s*:"#).unwrap());

static TEMPLATE_VARIABLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\s*[\w\-]+)\s*\}").unwrap());

// Capture slots 1, 3 and 5 hold identifiers; 2 and 4 are the repeating
// comma groups. Matches any parenthesized comma list, not just function
// signatures.
static FUNCTION_PARAMETERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\(\s*["']?([\w\-]+)["']?\s*(,\s*["']?([\w\-]+)["']?\s*)*(,\s*["']?([\w\-]+)["']?\s*)*\)"#)
        .unwrap()
});

static PATH_PARAMETERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/\{(.*?)\}").unwrap());

static INLINE_QUERY_KEYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\?([\w\-]+)=)|(&([\w\-]+)=)").unwrap());

/// Identifiers declared with `let`, `const` or `var`, including every name
/// in a comma-separated declaration list.
pub fn variable_names(body: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in VARIABLE_DECLARATIONS.captures_iter(body) {
        if let Some(list) = caps.get(2) {
            names.extend(
                list.as_str()
                    .split(',')
                    .map(|name| name.trim().to_string()),
            );
        }
    }
    names
}

/// Quoted object/JSON key literals immediately followed by a colon.
pub fn json_keys(body: &str) -> Vec<String> {
    JSON_OBJECT_KEYS
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Identifiers inside `${...}` template interpolations.
pub fn template_variables(body: &str) -> Vec<String> {
    TEMPLATE_VARIABLES
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Identifiers from parenthesized, comma-separated, optionally quoted lists.
pub fn function_parameters(body: &str) -> Vec<String> {
    let mut params = Vec::new();
    for caps in FUNCTION_PARAMETERS.captures_iter(body) {
        for slot in [1, 3, 5] {
            if let Some(m) = caps.get(slot) {
                params.push(m.as_str().to_string());
            }
        }
    }
    params
}

/// Brace-enclosed segments of `/{segment}` path templates.
pub fn path_parameters(body: &str) -> Vec<String> {
    PATH_PARAMETERS
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Keys from `?key=` and `&key=` fragments anywhere in the text, including
/// outside a real URL context.
pub fn inline_query_keys(body: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for caps in INLINE_QUERY_KEYS.captures_iter(body) {
        for slot in [2, 4] {
            if let Some(m) = caps.get(slot) {
                keys.push(m.as_str().to_string());
            }
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_names_comma_list() {
        let body = "<script>const foo, bar = 1;</script>";
        assert_eq!(variable_names(body), vec!["foo", "bar"]);
    }

    #[test]
    fn test_variable_names_all_declarators() {
        let body = "let alpha = 1; var beta = 2; const gamma = 3;";
        let names = variable_names(body);
        assert!(names.contains(&"alpha".to_string()));
        assert!(names.contains(&"beta".to_string()));
        assert!(names.contains(&"gamma".to_string()));
    }

    #[test]
    fn test_json_keys_hyphenated() {
        let body = r#"{"user-id": 5, 'token': "x"}"#;
        assert_eq!(json_keys(body), vec!["user-id", "token"]);
    }

    #[test]
    fn test_template_variables_trimmed() {
        let body = "url = `${ userId }/posts/${page}`";
        assert_eq!(template_variables(body), vec!["userId", "page"]);
    }

    #[test]
    fn test_function_parameters_quoted_and_bare() {
        let body = "doThing(first, 'second', third)";
        let params = function_parameters(body);
        assert!(params.contains(&"first".to_string()));
        assert!(params.contains(&"third".to_string()));
    }

    #[test]
    fn test_function_parameters_over_match_is_expected() {
        // Not a function at all, still matched. Accepted noise.
        let params = function_parameters("(red, green, blue)");
        assert!(params.contains(&"red".to_string()));
        assert!(params.contains(&"blue".to_string()));
    }

    #[test]
    fn test_path_parameters() {
        let body = "GET /api/users/{userId}/orders/{orderId}";
        assert_eq!(path_parameters(body), vec!["userId", "orderId"]);
    }

    #[test]
    fn test_inline_query_keys() {
        let body = "see example.com/search?q=test&page=2 for details";
        assert_eq!(inline_query_keys(body), vec!["q", "page"]);
    }

    #[test]
    fn test_empty_input_yields_empty() {
        assert!(variable_names("").is_empty());
        assert!(json_keys("").is_empty());
        assert!(template_variables("").is_empty());
        assert!(function_parameters("").is_empty());
        assert!(path_parameters("").is_empty());
        assert!(inline_query_keys("").is_empty());
    }

    #[test]
    fn test_heuristics_are_deterministic() {
        let body = r#"let a, b; {"k": 1} ${v} fn(x, y) /{seg} ?q=1"#;
        assert_eq!(variable_names(body), variable_names(body));
        assert_eq!(json_keys(body), json_keys(body));
        assert_eq!(template_variables(body), template_variables(body));
        assert_eq!(function_parameters(body), function_parameters(body));
        assert_eq!(path_parameters(body), path_parameters(body));
        assert_eq!(inline_query_keys(body), inline_query_keys(body));
    }
}
