//! Parameter-name extraction heuristics.
//!
//! Each heuristic is a pure function `(text) -> Vec<String>` that scans a
//! blob of page text for tokens likely to be input-parameter names. The
//! heuristics are independent of each other and best-effort by design:
//! they are regex scans, not parsers, and they degrade to partial or empty
//! results on malformed input instead of failing.
//!
//! # Available heuristics
//!
//! | Heuristic | Scans for |
//! |-----------|-----------|
//! | [`query_string_keys`] | Keys in a URL's query component |
//! | [`variable_names`] | `let`/`const`/`var` declarations |
//! | [`json_keys`] | Quoted object keys followed by `:` |
//! | [`template_variables`] | `${name}` interpolations |
//! | [`function_parameters`] | Parenthesized identifier lists |
//! | [`path_parameters`] | `/{segment}` path templates |
//! | [`inline_query_keys`] | `?key=` / `&key=` fragments in text |
//! | [`attribute_values`] | HTML `name`/`id` attribute values |
//!
//! `function_parameters` deliberately over-matches: any parenthesized comma
//! list is treated as a parameter list. That noise is accepted as the cost
//! of catching minified and inlined call sites.

mod html;
mod js;
mod urls;

pub use html::{attribute_values, script_sources};
pub use js::{
    function_parameters, inline_query_keys, json_keys, path_parameters, template_variables,
    variable_names,
};
pub use urls::{query_string_keys, resolve_script_src};
