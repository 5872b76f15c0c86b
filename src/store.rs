//! Hostname-scoped persistence for discovered parameters and settings.
//!
//! Every entry is stored as a JSON file whose key is namespaced by the
//! page hostname, so data from different sites never mixes. Two kinds of
//! entries live side by side with different lifecycles:
//!
//! - `{host}_all` and `{host}_refs` hold the current visit's parameters
//!   and reflections. They are removed by [`SiteStore::clear_site`], the
//!   page-unload equivalent.
//! - `ref_checkbox_{host}`, `regex_checkbox_{host}`, `regex_pattern_{host}`,
//!   `log_checkbox_{host}` and `logged_params_{host}` are per-site settings
//!   and the passive-log accumulator. They persist across visits and are
//!   never touched by `clear_site`.

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::model::ParamSet;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store entry encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn params_key(hostname: &str) -> String {
    format!("{}_all", hostname)
}

pub fn reflections_key(hostname: &str) -> String {
    format!("{}_refs", hostname)
}

pub fn autocheck_key(hostname: &str) -> String {
    format!("ref_checkbox_{}", hostname)
}

pub fn filter_enabled_key(hostname: &str) -> String {
    format!("regex_checkbox_{}", hostname)
}

pub fn filter_pattern_key(hostname: &str) -> String {
    format!("regex_pattern_{}", hostname)
}

pub fn logging_key(hostname: &str) -> String {
    format!("log_checkbox_{}", hostname)
}

pub fn logged_params_key(hostname: &str) -> String {
    format!("logged_params_{}", hostname)
}

/// File-backed key-value store with hostname-namespaced keys.
pub struct SiteStore {
    dir: PathBuf,
}

impl SiteStore {
    pub fn new() -> Self {
        Self {
            dir: data_dir(),
        }
    }

    /// Creates a store rooted at a specific directory. Used by tests.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Converts a store key to a safe filename.
    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe_key))
    }

    /// Retrieves a value, returning `None` when the key is absent or the
    /// entry fails to decode.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.ensure_dir()?;
        let path = self.entry_path(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn save_params(&self, hostname: &str, params: &[String]) -> Result<(), StoreError> {
        self.set(&params_key(hostname), &params)
    }

    pub fn load_params(&self, hostname: &str) -> Vec<String> {
        self.get(&params_key(hostname)).unwrap_or_default()
    }

    pub fn save_reflections(&self, hostname: &str, reflections: &[String]) -> Result<(), StoreError> {
        self.set(&reflections_key(hostname), &reflections)
    }

    pub fn load_reflections(&self, hostname: &str) -> Vec<String> {
        self.get(&reflections_key(hostname)).unwrap_or_default()
    }

    /// Removes the visit-scoped entries for a hostname, leaving its
    /// settings and logged history untouched.
    pub fn clear_site(&self, hostname: &str) -> Result<(), StoreError> {
        self.remove(&reflections_key(hostname))?;
        self.remove(&params_key(hostname))?;
        Ok(())
    }

    pub fn autocheck_enabled(&self, hostname: &str) -> bool {
        self.get(&autocheck_key(hostname)).unwrap_or(false)
    }

    pub fn set_autocheck(&self, hostname: &str, enabled: bool) -> Result<(), StoreError> {
        self.set(&autocheck_key(hostname), &enabled)
    }

    /// Returns the compiled regex filter for a hostname, or `None` when
    /// filtering is disabled, the pattern is empty, or it fails to compile.
    pub fn regex_filter(&self, hostname: &str) -> Option<Regex> {
        if !self.get(&filter_enabled_key(hostname)).unwrap_or(false) {
            return None;
        }

        let pattern: String = self.get(&filter_pattern_key(hostname))?;
        if pattern.is_empty() {
            return None;
        }

        match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(host = hostname, error = %e, "stored filter pattern does not compile, ignoring");
                None
            }
        }
    }

    pub fn set_regex_filter(&self, hostname: &str, pattern: Option<&str>) -> Result<(), StoreError> {
        match pattern {
            Some(pattern) => {
                self.set(&filter_enabled_key(hostname), &true)?;
                self.set(&filter_pattern_key(hostname), &pattern)
            }
            None => self.set(&filter_enabled_key(hostname), &false),
        }
    }

    pub fn logging_enabled(&self, hostname: &str) -> bool {
        self.get(&logging_key(hostname)).unwrap_or(false)
    }

    pub fn set_logging(&self, hostname: &str, enabled: bool) -> Result<(), StoreError> {
        self.set(&logging_key(hostname), &enabled)
    }

    pub fn logged_params(&self, hostname: &str) -> Vec<String> {
        self.get(&logged_params_key(hostname)).unwrap_or_default()
    }

    /// Appends newly seen names to the persistent per-site log,
    /// deduplicated against what is already recorded.
    pub fn append_logged(&self, hostname: &str, params: &[String]) -> Result<(), StoreError> {
        let mut log: ParamSet = ParamSet::from(self.logged_params(hostname));
        let before = log.len();
        log.extend(params.iter().cloned());
        if log.len() != before {
            self.set(&logged_params_key(hostname), &log)?;
        }
        Ok(())
    }
}

impl Default for SiteStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Data directory for the store, falling back to `/tmp` when no
/// platform directory can be determined.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("paramprobe")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SiteStore) {
        let dir = TempDir::new().unwrap();
        let store = SiteStore::with_dir(dir.path());
        (dir, store)
    }

    #[test]
    fn test_params_round_trip() {
        let (_dir, store) = test_store();
        let params = vec!["q".to_string(), "page".to_string()];
        store.save_params("x.test", &params).unwrap();
        assert_eq!(store.load_params("x.test"), params);
    }

    #[test]
    fn test_hostnames_do_not_mix() {
        let (_dir, store) = test_store();
        store.save_params("a.test", &["one".to_string()]).unwrap();
        store.save_params("b.test", &["two".to_string()]).unwrap();

        assert_eq!(store.load_params("a.test"), vec!["one"]);
        assert_eq!(store.load_params("b.test"), vec!["two"]);
    }

    #[test]
    fn test_clear_site_leaves_settings() {
        let (_dir, store) = test_store();
        store.save_params("x.test", &["q".to_string()]).unwrap();
        store.save_reflections("x.test", &["q".to_string()]).unwrap();
        store.set_autocheck("x.test", true).unwrap();
        store.set_regex_filter("x.test", Some("^q")).unwrap();
        store
            .append_logged("x.test", &["q".to_string()])
            .unwrap();

        store.clear_site("x.test").unwrap();

        assert!(store.load_params("x.test").is_empty());
        assert!(store.load_reflections("x.test").is_empty());
        assert!(store.autocheck_enabled("x.test"));
        assert!(store.regex_filter("x.test").is_some());
        assert_eq!(store.logged_params("x.test"), vec!["q"]);
    }

    #[test]
    fn test_regex_filter_disabled_or_empty() {
        let (_dir, store) = test_store();
        assert!(store.regex_filter("x.test").is_none());

        store.set_regex_filter("x.test", Some("")).unwrap();
        assert!(store.regex_filter("x.test").is_none());

        store.set_regex_filter("x.test", Some("^user")).unwrap();
        assert!(store.regex_filter("x.test").is_some());

        store.set_regex_filter("x.test", None).unwrap();
        assert!(store.regex_filter("x.test").is_none());
    }

    #[test]
    fn test_regex_filter_invalid_pattern() {
        let (_dir, store) = test_store();
        store.set_regex_filter("x.test", Some("([unclosed")).unwrap();
        assert!(store.regex_filter("x.test").is_none());
    }

    #[test]
    fn test_append_logged_deduplicates() {
        let (_dir, store) = test_store();
        store
            .append_logged("x.test", &["a".to_string(), "b".to_string()])
            .unwrap();
        store
            .append_logged("x.test", &["b".to_string(), "c".to_string()])
            .unwrap();

        assert_eq!(store.logged_params("x.test"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let (_dir, store) = test_store();
        assert!(store.remove("nothing_here").is_ok());
    }
}
